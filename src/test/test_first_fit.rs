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
    types::{FiberId, LightpathId, SlotId, SlotRange},
};
use pretty_assertions::assert_eq;
use test_log::test;

use super::{f, ring, star, Star};
use crate::{
    propagation::OccupationInfo,
    spectrum::{
        available_slots, first_fit, first_fit_hops, first_fit_in, first_fit_two_routes,
        valid_range_starts, HopAssignment, SpectrumError, SpectrumLedger,
    },
};

fn route(net: &Network, fibers: Vec<FiberId>) -> OccupationInfo {
    OccupationInfo::new(net, fibers, None, None, None).unwrap()
}

fn allocate(
    net: &Network,
    ledger: &mut SpectrumLedger,
    lp: u32,
    fibers: Vec<FiberId>,
    slots: BTreeSet<SlotId>,
) {
    let info = route(net, fibers).with_slots(slots);
    ledger.allocate(LightpathId(lp), &info).unwrap();
}

/// Star where A->B only supports slots 1 to 10, and slots 2 to 4 are occupied on A->B.
fn narrow_fiber() -> (Network, Star, SpectrumLedger) {
    let (mut net, s) = star(ArchitectureConfig::NonBlocking);
    net.set_valid_slots(s.ab, [SlotRange::new(1, 10).unwrap()])
        .unwrap();
    let mut ledger = SpectrumLedger::new();
    allocate(&net, &mut ledger, 0, vec![s.ab], btreeset! {2, 3, 4});
    (net, s, ledger)
}

#[test]
fn range_starts() {
    let available = btreeset! {1, 2, 3, 5, 6};
    assert_eq!(valid_range_starts(&available, 1), vec![1, 2, 3, 5, 6]);
    assert_eq!(valid_range_starts(&available, 2), vec![1, 2, 5]);
    assert_eq!(valid_range_starts(&available, 3), vec![1]);
    assert_eq!(valid_range_starts(&available, 4), Vec::<SlotId>::new());
    assert_eq!(valid_range_starts(&btreeset! {}, 1), Vec::<SlotId>::new());
    assert_eq!(valid_range_starts(&btreeset! {-2, -1, 0}, 2), vec![-2, -1]);

    assert_eq!(first_fit_in(&available, 2), Some(btreeset! {1, 2}));
    assert_eq!(first_fit_in(&available, 0), Some(btreeset! {}));
    assert_eq!(first_fit_in(&available, 4), None);
}

#[test]
fn first_fit_single_fiber() {
    let (net, s, ledger) = narrow_fiber();
    let info = route(&net, vec![s.ab]);
    let none = BTreeSet::new();
    assert_eq!(
        available_slots(&net, &ledger, &info, None, &none),
        Ok(btreeset! {1, 5, 6, 7, 8, 9, 10})
    );
    assert_eq!(
        first_fit(&net, &ledger, &info, 1, None, &none),
        Ok(Some(btreeset! {1}))
    );
    assert_eq!(
        first_fit(&net, &ledger, &info, 3, None, &none),
        Ok(Some(btreeset! {5, 6, 7}))
    );
    assert_eq!(
        first_fit(&net, &ledger, &info, 4, None, &none),
        Ok(Some(btreeset! {5, 6, 7, 8}))
    );
    assert_eq!(first_fit(&net, &ledger, &info, 8, None, &none), Ok(None));
    assert_eq!(
        first_fit(&net, &ledger, &info, 0, None, &none),
        Ok(Some(btreeset! {}))
    );
}

#[test]
fn first_fit_with_constraints() {
    let (net, s, ledger) = narrow_fiber();
    let info = route(&net, vec![s.ab]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, Some(6), &btreeset! {}),
        Ok(Some(btreeset! {6, 7}))
    );
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, None, &btreeset! {6}),
        Ok(Some(btreeset! {7, 8}))
    );
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, Some(9), &btreeset! {10}),
        Ok(None)
    );
}

#[test]
fn first_fit_route() {
    let (net, s, ledger) = narrow_fiber();
    let info = route(&net, vec![s.ab, s.bc]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, None, &btreeset! {}),
        Ok(Some(btreeset! {5, 6}))
    );
    // the slot set of the info is ignored
    let info = info.with_slots([2, 3]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, None, &btreeset! {}),
        Ok(Some(btreeset! {5, 6}))
    );
}

#[test]
fn first_fit_waste() {
    let (net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    let mut ledger = SpectrumLedger::new();
    let none = BTreeSet::new();
    allocate(&net, &mut ledger, 0, vec![s.ab], btreeset! {0, 1});

    // waste may overlap waste
    let info = route(&net, vec![s.cb]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, None, &none),
        Ok(Some(btreeset! {0, 1}))
    );
    // legit may not overlap waste
    let info = route(&net, vec![s.bd]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, None, &none),
        Ok(Some(btreeset! {2, 3}))
    );

    // waste may not overlap legit
    allocate(&net, &mut ledger, 1, vec![s.bc], btreeset! {2, 3});
    assert!(ledger.is_spectrum_occupation_ok());
    let info = route(&net, vec![s.ab]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 2, None, &none),
        Ok(Some(btreeset! {4, 5}))
    );

    // the found range can be allocated
    let slots = first_fit(&net, &ledger, &info, 2, None, &none)
        .unwrap()
        .unwrap();
    assert!(ledger.is_allocatable(&net, &info.with_slots(slots)));
}

#[test]
fn first_fit_drop_modules() {
    let (mut net, s) = star(ArchitectureConfig::FilterlessBroadcast);
    net.set_num_modules(s.b, 0, 2).unwrap();
    let mut ledger = SpectrumLedger::new();
    let i0 = OccupationInfo::new(&net, vec![s.ab], None, Some(0), Some(btreeset! {0})).unwrap();
    ledger.allocate(LightpathId(0), &i0).unwrap();
    let i1 = OccupationInfo::new(&net, vec![s.cb], None, Some(1), None).unwrap();
    assert_eq!(
        first_fit(&net, &ledger, &i1, 1, None, &btreeset! {}),
        Ok(Some(btreeset! {1}))
    );
}

#[test]
fn first_fit_self_clashing() {
    let (net, s) = star(ArchitectureConfig::NonBlocking);
    let ledger = SpectrumLedger::new();
    let info = route(&net, vec![s.ab, s.ba, s.ab]);
    assert_eq!(
        first_fit(&net, &ledger, &info, 1, None, &btreeset! {}),
        Ok(None)
    );
}

#[test]
fn two_routes() {
    let net = ring(4, ArchitectureConfig::NonBlocking);
    let mut ledger = SpectrumLedger::new();
    // N0 -> N1 -> N2 and N0 -> N3 -> N2
    let a = route(&net, vec![f(0), f(2)]);
    let b = route(&net, vec![f(7), f(5)]);
    assert!(a.is_mutually_clashing_free_with(&b));
    assert_eq!(
        first_fit_two_routes(&net, &ledger, &a, &b, 2, None),
        Ok(Some((btreeset! {0, 1}, btreeset! {0, 1})))
    );
    assert_eq!(
        first_fit_two_routes(&net, &ledger, &a, &b, 0, None),
        Ok(Some((btreeset! {}, btreeset! {})))
    );

    allocate(&net, &mut ledger, 0, vec![f(0)], btreeset! {0, 1});
    assert_eq!(
        first_fit_two_routes(&net, &ledger, &a, &b, 2, None),
        Ok(Some((btreeset! {2, 3}, btreeset! {0, 1})))
    );
}

#[test]
fn two_routes_sharing_a_fiber() {
    let net = ring(4, ArchitectureConfig::NonBlocking);
    let ledger = SpectrumLedger::new();
    let a = route(&net, vec![f(0), f(2)]);
    let b = route(&net, vec![f(0)]);
    assert!(!a.is_mutually_clashing_free_with(&b));
    assert_eq!(
        first_fit_two_routes(&net, &ledger, &a, &b, 2, None),
        Ok(Some((btreeset! {0, 1}, btreeset! {2, 3})))
    );
    assert_eq!(
        first_fit_two_routes(&net, &ledger, &a, &b, 2, Some(10)),
        Ok(Some((btreeset! {10, 11}, btreeset! {12, 13})))
    );

    let c = route(&net, vec![f(0), f(1), f(0)]);
    assert_eq!(
        first_fit_two_routes(&net, &ledger, &a, &c, 2, None),
        Ok(None)
    );
}

#[test]
fn hops() {
    let (mut net, s) = star(ArchitectureConfig::NonBlocking);
    let (ab2, ba2) = net.add_link(s.a, s.b, 100.0).unwrap();
    let mut ledger = SpectrumLedger::new();
    allocate(&net, &mut ledger, 0, vec![s.ab], btreeset! {0, 1});
    allocate(&net, &mut ledger, 1, vec![ba2], btreeset! {2, 3});
    let hops = [(s.a, s.b), (s.b, s.c)];

    assert_eq!(
        first_fit_hops(&net, &ledger, &hops, 2, None),
        Ok(Some(HopAssignment {
            slots: btreeset! {0, 1},
            fibers: vec![(ab2, ba2), (s.bc, s.cb)],
        }))
    );
    // no single pair is free on 0..4 or 1..5
    assert_eq!(
        first_fit_hops(&net, &ledger, &hops, 4, None),
        Ok(Some(HopAssignment {
            slots: btreeset! {2, 3, 4, 5},
            fibers: vec![(s.ab, s.ba), (s.bc, s.cb)],
        }))
    );
    assert_eq!(
        first_fit_hops(&net, &ledger, &hops, 2, Some(3)),
        Ok(Some(HopAssignment {
            slots: btreeset! {3, 4},
            fibers: vec![(s.ab, s.ba), (s.bc, s.cb)],
        }))
    );
    assert_eq!(
        first_fit_hops(&net, &ledger, &hops, 0, None),
        Ok(Some(HopAssignment {
            slots: btreeset! {},
            fibers: vec![(s.ab, s.ba), (s.bc, s.cb)],
        }))
    );
}

#[test]
fn hops_without_pair() {
    let (mut net, s) = star(ArchitectureConfig::NonBlocking);
    let ledger = SpectrumLedger::new();
    assert_eq!(
        first_fit_hops(&net, &ledger, &[(s.a, s.c)], 1, None),
        Ok(None)
    );
    net.add_fiber(s.a, s.c, 10.0).unwrap();
    assert_eq!(
        first_fit_hops(&net, &ledger, &[(s.a, s.c)], 1, None),
        Ok(None)
    );
    assert_eq!(
        first_fit_hops(&net, &ledger, &[], 1, None),
        Err(SpectrumError::EmptyFiberSet)
    );
}
