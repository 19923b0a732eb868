// WdmPlan: Spectrum planning and validation for WDM optical networks
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use approx::assert_relative_eq;
use maplit::btreeset;
use optnet::{
    node::{AddDropModuleType, ArchitectureConfig, ArchitectureFamily, GenericArchitecture},
    types::{DirectionlessModule, NetworkError, NodeId, SlotGrid},
};
use pretty_assertions::assert_eq;
use test_log::test;

use super::star;
use crate::architecture::{ArchitectureError, InsertionLoss, SwitchingArchitecture};

fn generic(
    family: ArchitectureFamily,
    directionless: bool,
    module: AddDropModuleType,
) -> ArchitectureConfig {
    ArchitectureConfig::Generic(GenericArchitecture::new(family, directionless, module))
}

#[test]
fn insertion_loss_chain() {
    let a = InsertionLoss::new(5.0, 3.0);
    let b = InsertionLoss::new(7.0, 4.0);
    let c = a.then(b);
    assert_relative_eq!(c.loss_db, 12.0);
    assert_relative_eq!(c.pmd_ps, 5.0);
    assert_relative_eq!(InsertionLoss::splitter(4).loss_db, 6.0206, epsilon = 1e-4);
    assert_relative_eq!(InsertionLoss::splitter(1).loss_db, 0.0);
    assert_relative_eq!(InsertionLoss::splitter(0).loss_db, 0.0);
}

#[test]
fn non_blocking_outputs() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert!(arch.is_never_creating_waste());
    assert_eq!(arch.outputs_on_add(s.bc, false), Ok(btreeset! {s.bc}));
    assert_eq!(arch.outputs_on_add(s.bc, true), Ok(btreeset! {s.bc}));
    assert_eq!(arch.outputs_on_drop(s.ab), Ok(btreeset! {}));
    assert_eq!(arch.outputs_on_express(s.ab, s.bc), Ok(btreeset! {s.bc}));
    assert_eq!(arch.outputs_unavoidable(s.ab), Ok(btreeset! {}));
    assert_eq!(arch.drop_modules_unavoidable(s.ab), Ok(btreeset! {}));
}

#[test]
fn wrong_direction() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_eq!(
        arch.outputs_on_add(s.ab, false),
        Err(ArchitectureError::FiberNotAtNode(s.ab, s.b))
    );
    assert_eq!(
        arch.outputs_on_drop(s.bc),
        Err(ArchitectureError::FiberNotAtNode(s.bc, s.b))
    );
    assert_eq!(
        arch.outputs_on_express(s.ab, s.cb),
        Err(ArchitectureError::FiberNotAtNode(s.cb, s.b))
    );
    assert_eq!(
        arch.outputs_unavoidable(s.ba),
        Err(ArchitectureError::FiberNotAtNode(s.ba, s.b))
    );
}

#[test]
fn unknown_node() {
    let (net, _) = star(ArchitectureConfig::NonBlocking);
    let n = NodeId::new(10);
    assert_eq!(
        SwitchingArchitecture::of(&net, n).err(),
        Some(ArchitectureError::Network(NetworkError::NodeNotFound(n)))
    );
}

#[test]
fn at_fiber_end() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    assert_eq!(SwitchingArchitecture::at_fiber_end(&net, s.ab).unwrap().node(), s.b);
    assert_eq!(SwitchingArchitecture::at_fiber_end(&net, s.ba).unwrap().node(), s.a);
    assert_eq!(SwitchingArchitecture::at_fiber_end(&net, s.bd).unwrap().node(), s.d);
}

#[test]
fn filterless_broadcast_outputs() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    net.set_num_modules(s.b, 1, 2).unwrap();
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert!(!arch.is_never_creating_waste());
    assert_eq!(
        arch.outputs_on_add(s.bc, false),
        Ok(btreeset! {s.ba, s.bc, s.bd})
    );
    assert_eq!(arch.outputs_on_drop(s.ab), Ok(btreeset! {s.bc, s.bd}));
    assert_eq!(
        arch.outputs_on_express(s.ab, s.bc),
        Ok(btreeset! {s.bc, s.bd})
    );
    assert_eq!(arch.outputs_unavoidable(s.cb), Ok(btreeset! {s.ba, s.bd}));
    assert_eq!(
        arch.drop_modules_unavoidable(s.ab),
        Ok(btreeset! {DirectionlessModule::new(s.b, 0), DirectionlessModule::new(s.b, 1)})
    );
}

#[test]
fn filterless_without_pair_broadcasts_everywhere() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    // a unidirectional fiber from A to B has no reverse direction to exclude.
    let extra = net.add_fiber(s.a, s.b, 10.0).unwrap();
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_eq!(
        arch.outputs_unavoidable(extra),
        Ok(btreeset! {s.ba, s.bc, s.bd})
    );
}

#[test]
fn generic_filterless_outputs() {
    let config = generic(
        ArchitectureFamily::Filterless,
        false,
        AddDropModuleType::MuxBased,
    );
    let (mut net, s) = star(config);
    net.set_num_modules(s.b, 2, 2).unwrap();
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert!(!arch.is_never_creating_waste());
    // colored add port
    assert_eq!(arch.outputs_on_add(s.bc, false), Ok(btreeset! {s.bc}));
    // directionless add module
    assert_eq!(
        arch.outputs_on_add(s.bc, true),
        Ok(btreeset! {s.ba, s.bc, s.bd})
    );
    assert_eq!(arch.outputs_unavoidable(s.db), Ok(btreeset! {s.ba, s.bc}));
    // drop modules are not shared
    assert_eq!(arch.drop_modules_unavoidable(s.ab), Ok(btreeset! {}));
}

#[test]
fn generic_filtered_outputs() {
    for family in [
        ArchitectureFamily::RouteAndSelect,
        ArchitectureFamily::BroadcastAndSelect,
    ] {
        let (net, s) = star(generic(family, true, AddDropModuleType::SwitchBased));
        let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
        assert!(arch.is_never_creating_waste());
        assert_eq!(arch.outputs_on_add(s.bd, true), Ok(btreeset! {s.bd}));
        assert_eq!(arch.outputs_on_express(s.ab, s.bd), Ok(btreeset! {s.bd}));
        assert_eq!(arch.outputs_unavoidable(s.ab), Ok(btreeset! {}));
        assert_eq!(arch.drop_modules_unavoidable(s.ab), Ok(btreeset! {}));
    }
}

#[test]
fn non_blocking_losses() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_relative_eq!(arch.add_loss().loss_db, 12.0);
    assert_relative_eq!(arch.add_loss().pmd_ps, 0.5f64.sqrt());
    assert_relative_eq!(arch.drop_loss().loss_db, 12.0);
    assert_relative_eq!(arch.express_loss().loss_db, 14.0);
    assert_relative_eq!(arch.express_loss().pmd_ps, 0.5f64.sqrt());
}

#[test]
fn filterless_broadcast_losses() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    net.set_num_modules(s.b, 0, 2).unwrap();
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    // three degrees: every coupler has four ports
    assert_relative_eq!(arch.add_loss().loss_db, 6.0206, epsilon = 1e-4);
    assert_relative_eq!(arch.drop_loss().loss_db, 9.0309, epsilon = 1e-4);
    assert_relative_eq!(arch.express_loss().loss_db, 12.0412, epsilon = 1e-4);
    assert_relative_eq!(arch.express_loss().pmd_ps, 0.0);
}

#[test]
fn generic_losses() {
    // filterless, colored, mux-based
    let (net, s) = star(generic(
        ArchitectureFamily::Filterless,
        false,
        AddDropModuleType::MuxBased,
    ));
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_relative_eq!(arch.add_loss().loss_db, 11.0206, epsilon = 1e-4);
    assert_relative_eq!(arch.add_loss().pmd_ps, 0.5);
    assert_relative_eq!(arch.drop_loss().loss_db, 11.0206, epsilon = 1e-4);
    assert_relative_eq!(arch.express_loss().loss_db, 12.0412, epsilon = 1e-4);

    // route and select, directionless, switch-based
    let (net, s) = star(generic(
        ArchitectureFamily::RouteAndSelect,
        true,
        AddDropModuleType::SwitchBased,
    ));
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_relative_eq!(arch.add_loss().loss_db, 18.7712, epsilon = 1e-4);
    assert_relative_eq!(arch.add_loss().pmd_ps, 0.5f64.sqrt());
    assert_relative_eq!(arch.drop_loss().loss_db, 18.7712, epsilon = 1e-4);
    assert_relative_eq!(arch.express_loss().loss_db, 14.0);

    // broadcast and select
    let (net, s) = star(generic(
        ArchitectureFamily::BroadcastAndSelect,
        false,
        AddDropModuleType::MuxBased,
    ));
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_relative_eq!(arch.express_loss().loss_db, 13.0206, epsilon = 1e-4);
    assert_relative_eq!(arch.express_loss().pmd_ps, 0.5);
}

#[test]
fn equalization() {
    let (mut net, s) = star(ArchitectureConfig::NonBlocking);
    let grid = SlotGrid::default();
    {
        let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
        assert_eq!(arch.equalization_target_dbm(), None);
        assert_eq!(arch.equalized_power_dbm(4, &grid), None);
    }
    net.set_equalization_target(s.b, Some(-2.0)).unwrap();
    let arch = SwitchingArchitecture::of(&net, s.b).unwrap();
    assert_eq!(arch.equalization_target_dbm(), Some(-2.0));
    assert_relative_eq!(
        arch.equalized_power_dbm(1, &grid).unwrap(),
        -2.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        arch.equalized_power_dbm(4, &grid).unwrap(),
        4.0206,
        epsilon = 1e-4
    );
    assert_eq!(arch.equalized_power_dbm(0, &grid), None);
}
