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

use std::collections::BTreeSet;

use maplit::btreeset;
use optnet::{
    network::Network,
    node::ArchitectureConfig,
    types::{DirectionlessModule, FiberId, LightpathId, SlotId, SlotRange},
};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_log::test;

use super::star;
use crate::{
    propagation::{OccupationError, OccupationInfo},
    spectrum::{SpectrumError, SpectrumLedger},
};

fn info(net: &Network, fibers: Vec<FiberId>, slots: BTreeSet<SlotId>) -> OccupationInfo {
    OccupationInfo::new(net, fibers, None, None, Some(slots)).unwrap()
}

#[test]
fn allocate_and_release() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let mut ledger = SpectrumLedger::new();
    let l0 = LightpathId(0);
    let l1 = LightpathId(1);
    ledger
        .allocate(l0, &info(&net, vec![s.ab, s.bc], btreeset! {0, 1}))
        .unwrap();
    let before = ledger.clone();

    ledger
        .allocate(l1, &info(&net, vec![s.cb], btreeset! {1, 2}))
        .unwrap();
    assert!(ledger.is_allocated(l1));
    assert_eq!(ledger.occupants_fiber(s.bd, 1), (btreeset! {}, btreeset! {l0, l1}));
    assert_eq!(ledger.occupants_fiber(s.cb, 2), (btreeset! {l1}, btreeset! {}));
    assert_eq!(ledger.legit_occupied_slots_fiber(s.cb), btreeset! {1, 2});
    assert_eq!(ledger.waste_occupied_slots_fiber(s.bd), btreeset! {0, 1, 2});
    assert_eq!(ledger.occupied_slots_fiber(s.ba), btreeset! {1, 2});
    assert_eq!(
        ledger.allocated_lightpaths().collect::<Vec<_>>(),
        vec![l0, l1]
    );

    assert!(ledger.release(l1));
    assert!(!ledger.release(l1));
    assert_eq!(ledger, before);

    assert!(ledger.release(l0));
    assert_eq!(ledger, SpectrumLedger::new());
    assert!(ledger.occupied_fibers().is_empty());
}

#[test]
fn allocate_errors() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let mut ledger = SpectrumLedger::new();
    let l0 = LightpathId(0);
    ledger
        .allocate(l0, &info(&net, vec![s.ab], btreeset! {0}))
        .unwrap();
    let before = ledger.clone();

    assert_eq!(
        ledger.allocate(l0, &info(&net, vec![s.bc], btreeset! {0})),
        Err(SpectrumError::AlreadyAllocated(l0))
    );
    let no_slots = OccupationInfo::new(&net, vec![s.bc], None, None, None).unwrap();
    assert_eq!(
        ledger.allocate(LightpathId(1), &no_slots),
        Err(SpectrumError::NoSlotSet)
    );
    assert_eq!(ledger, before);
}

#[test]
fn empty_slot_set() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let mut ledger = SpectrumLedger::new();
    let l0 = LightpathId(0);
    ledger
        .allocate(l0, &info(&net, vec![s.ab], btreeset! {}))
        .unwrap();
    assert!(ledger.is_allocated(l0));
    assert!(ledger.occupied_fibers().is_empty());
    assert!(ledger.is_spectrum_occupation_ok_for(l0));
    assert!(ledger.release(l0));
    assert_eq!(ledger, SpectrumLedger::new());
}

#[test]
fn allocatable() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let mut ledger = SpectrumLedger::new();
    ledger
        .allocate(LightpathId(0), &info(&net, vec![s.ab], btreeset! {0, 1}))
        .unwrap();

    // legit on legit
    assert!(!ledger.is_allocatable(&net, &info(&net, vec![s.ab], btreeset! {1, 2})));
    // waste on waste
    assert!(ledger.is_allocatable(&net, &info(&net, vec![s.cb], btreeset! {0, 1})));
    // legit on waste
    assert!(!ledger.is_allocatable(&net, &info(&net, vec![s.bd], btreeset! {0})));
    assert!(ledger.is_allocatable(&net, &info(&net, vec![s.bd], btreeset! {2})));

    // waste on legit
    ledger
        .allocate(LightpathId(1), &info(&net, vec![s.bc], btreeset! {5}))
        .unwrap();
    assert!(!ledger.is_allocatable(&net, &info(&net, vec![s.ab], btreeset! {5})));
    assert!(ledger.is_allocatable(&net, &info(&net, vec![s.ab], btreeset! {6})));

    // requesting no slots is always possible
    let no_slots = OccupationInfo::new(&net, vec![s.ab], None, None, None).unwrap();
    assert!(ledger.is_allocatable(&net, &no_slots));

    assert!(ledger.is_spectrum_occupation_ok());
}

#[test]
fn slots_outside_the_valid_range_are_not_allocatable() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    net.set_valid_slots(s.ab, [SlotRange::new(1, 10).unwrap()])
        .unwrap();
    let ledger = SpectrumLedger::new();
    assert!(!ledger
        .idle_slots_fiber(&net, s.ab)
        .unwrap()
        .contains(&500));
    assert!(!ledger.is_allocatable(&net, &info(&net, vec![s.ab], btreeset! {500, 501})));
    assert!(!ledger.is_allocatable(&net, &info(&net, vec![s.ab], btreeset! {10, 11})));
    assert!(ledger.is_allocatable(&net, &info(&net, vec![s.ab], btreeset! {9, 10})));
    // only legitimate fibers must support the slots
    assert!(ledger.is_allocatable(&net, &info(&net, vec![s.cb], btreeset! {0})));
}

#[test]
fn self_clashing_is_not_allocatable() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let ledger = SpectrumLedger::new();
    let i = info(&net, vec![s.ab, s.ba, s.ab], btreeset! {0});
    assert!(i.is_self_clashing());
    assert!(!ledger.is_allocatable(&net, &i));
}

#[test]
fn idle_and_waste_only_slots() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let mut ledger = SpectrumLedger::new();
    ledger
        .allocate(LightpathId(0), &info(&net, vec![s.ab], btreeset! {0, 1}))
        .unwrap();
    let num_valid = net.get_fiber(s.bd).unwrap().valid_slots().len();
    assert_eq!(
        ledger.idle_slots_fiber(&net, s.bd).unwrap().len(),
        num_valid - 2
    );
    assert_eq!(
        ledger.empty_or_waste_only_slots_fiber(&net, s.bd).unwrap().len(),
        num_valid
    );
    assert_eq!(
        ledger.empty_or_waste_only_slots_fiber(&net, s.ab).unwrap().len(),
        num_valid - 2
    );
}

#[test]
fn legit_clash() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let mut ledger = SpectrumLedger::new();
    let (l0, l1, l2) = (LightpathId(0), LightpathId(1), LightpathId(2));
    ledger
        .allocate(l0, &info(&net, vec![s.ab, s.bc], btreeset! {0, 1, 2}))
        .unwrap();
    ledger
        .allocate(l1, &info(&net, vec![s.ab], btreeset! {2, 3}))
        .unwrap();
    ledger
        .allocate(l2, &info(&net, vec![s.cb], btreeset! {0}))
        .unwrap();

    assert!(!ledger.is_spectrum_occupation_ok());
    assert_eq!(ledger.clashing_slots_fiber(s.ab), btreeset! {2});
    assert_eq!(ledger.clashing_slots_fiber(s.bc), btreeset! {});
    assert_eq!(ledger.occupants_fiber(s.ab, 2), (btreeset! {l0, l1}, btreeset! {}));
    assert!(!ledger.is_spectrum_occupation_ok_for(l0));
    assert!(!ledger.is_spectrum_occupation_ok_for(l1));
    assert!(ledger.is_spectrum_occupation_ok_for(l2));
    assert!(ledger.is_spectrum_occupation_ok_for(LightpathId(10)));

    ledger.release(l1);
    assert!(ledger.is_spectrum_occupation_ok());
    assert!(ledger.is_spectrum_occupation_ok_for(l0));
}

#[test]
fn waste_clash() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let mut ledger = SpectrumLedger::new();
    let (l0, l1) = (LightpathId(0), LightpathId(1));
    ledger
        .allocate(l0, &info(&net, vec![s.ab], btreeset! {0}))
        .unwrap();
    ledger
        .allocate(l1, &info(&net, vec![s.bc], btreeset! {0}))
        .unwrap();
    assert!(!ledger.is_spectrum_occupation_ok());
    assert_eq!(ledger.clashing_slots_fiber(s.bc), btreeset! {0});
    // the waste of l1 also reaches B->A and B->D, where l0 only has waste
    assert_eq!(ledger.clashing_slots_fiber(s.bd), btreeset! {});
    assert!(!ledger.is_spectrum_occupation_ok_for(l0));
    assert!(!ledger.is_spectrum_occupation_ok_for(l1));
}

#[test]
fn drop_modules() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    net.set_num_modules(s.b, 0, 2).unwrap();
    let m0 = DirectionlessModule::new(s.b, 0);
    let m1 = DirectionlessModule::new(s.b, 1);
    let mut ledger = SpectrumLedger::new();
    let (l0, l1) = (LightpathId(0), LightpathId(1));
    let i0 = OccupationInfo::new(&net, vec![s.ab], None, Some(0), Some(btreeset! {3})).unwrap();
    let i1 = OccupationInfo::new(&net, vec![s.cb], None, Some(1), Some(btreeset! {3})).unwrap();
    ledger.allocate(l0, &i0).unwrap();
    assert_eq!(ledger.legit_occupied_slots_drop_module(m0), btreeset! {3});
    assert_eq!(ledger.occupied_slots_drop_module(m1), btreeset! {3});
    assert_eq!(ledger.occupants_drop_module(m1, 3), (btreeset! {}, btreeset! {l0}));

    // the waste of each signal reaches the drop module of the other one
    assert!(!ledger.is_allocatable(&net, &i1));
    assert!(ledger.is_allocatable(&net, &i1.clone().with_slots([4])));

    ledger.allocate(l1, &i1).unwrap();
    assert!(!ledger.is_spectrum_occupation_ok());
    assert_eq!(ledger.clashing_slots_drop_module(m0), btreeset! {3});
    assert_eq!(ledger.clashing_slots_drop_module(m1), btreeset! {3});
    assert_eq!(ledger.occupied_drop_modules(), btreeset! {m0, m1});
    assert!(ledger.occupied_add_modules().is_empty());
}

#[test]
fn add_modules() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    net.set_num_modules(s.b, 1, 0).unwrap();
    let m = DirectionlessModule::new(s.b, 0);
    let mut ledger = SpectrumLedger::new();
    let (l0, l1) = (LightpathId(0), LightpathId(1));
    let i0 = OccupationInfo::new(&net, vec![s.ba], Some(0), None, Some(btreeset! {5})).unwrap();
    let i1 = OccupationInfo::new(&net, vec![s.bc], Some(0), None, Some(btreeset! {5})).unwrap();
    ledger.allocate(l0, &i0).unwrap();
    assert_eq!(ledger.occupied_slots_add_module(m), btreeset! {5});
    assert!(ledger.clashing_slots_add_module(m).is_empty());
    assert_eq!(ledger.occupied_add_modules(), btreeset! {m});

    ledger.allocate(l1, &i1).unwrap();
    assert_eq!(ledger.clashing_slots_add_module(m), btreeset! {5});
    assert!(ledger.release(l0));
    assert!(ledger.clashing_slots_add_module(m).is_empty());
    assert_eq!(ledger.occupied_slots_add_module(m), btreeset! {5});
}

#[test]
fn from_network() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let l0 = net.add_lightpath("A-C", vec![s.ab, s.bc], 0..4).unwrap();
    let l1 = net.add_lightpath("C-B", vec![s.cb], 0..2).unwrap();
    let ledger = SpectrumLedger::from_network(&net).unwrap();
    assert!(ledger.is_allocated(l0));
    assert!(ledger.is_allocated(l1));
    assert!(ledger.is_spectrum_occupation_ok());
    assert_eq!(
        ledger.occupation_info(l0).map(|i| i.waste_fibers().clone()),
        Some(btreeset! {s.bd})
    );

    // a signal that never reaches its receiver
    net.add_lightpath("U-turn", vec![s.ab, s.ba], 10..12)
        .unwrap();
    let mut ledger = ledger;
    assert_eq!(
        ledger.reset_from_network(&net),
        Err(SpectrumError::Occupation(
            OccupationError::SignalNotReachingDrop(s.ba)
        ))
    );
    assert_eq!(ledger, SpectrumLedger::new());
}

#[test]
fn allocatable_sequence_keeps_the_ledger_consistent() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let routes = vec![
        vec![s.ab],
        vec![s.ab, s.bc],
        vec![s.ab, s.bd],
        vec![s.cb],
        vec![s.cb, s.ba],
        vec![s.db, s.bc],
        vec![s.ba],
        vec![s.bc],
        vec![s.bd],
        vec![s.db],
    ];
    let mut rng = StdRng::seed_from_u64(42);
    let mut ledger = SpectrumLedger::new();
    let mut allocated = Vec::new();
    for i in 0..300u32 {
        let route = routes[rng.gen_range(0..routes.len())].clone();
        let start: SlotId = rng.gen_range(0..20);
        let width: SlotId = rng.gen_range(1..=4);
        let lp = LightpathId(i);
        let slots = (start..start + width).collect();
        let info = OccupationInfo::new(&net, route, None, None, Some(slots)).unwrap();
        if ledger.is_allocatable(&net, &info) {
            ledger.allocate(lp, &info).unwrap();
            allocated.push(lp);
        }
        if rng.gen_bool(0.2) && !allocated.is_empty() {
            let lp = allocated.remove(rng.gen_range(0..allocated.len()));
            assert!(ledger.release(lp));
        }
        assert!(ledger.is_spectrum_occupation_ok());
    }
    assert!(!allocated.is_empty());
    for lp in allocated {
        assert!(ledger.release(lp));
    }
    assert_eq!(ledger, SpectrumLedger::new());
}
