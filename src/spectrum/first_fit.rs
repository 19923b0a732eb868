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

//! First-fit search for free slot ranges.
//!
//! All searches return the contiguous range of slots with the lowest start that is available on
//! every resource touched by the signal. A legitimate resource must be completely idle, while a
//! waste resource may carry other waste signals but no legitimate signal.

use std::collections::BTreeSet;

use log::*;
use optnet::{
    network::Network,
    types::{FiberId, NodeId, SlotId},
};

use super::{SpectrumError, SpectrumLedger};
use crate::propagation::OccupationInfo;

/// Compute all slots on which the signal described by `info` can be placed without clashing. Only
/// slots of at least `min_slot` are considered, and all `forbidden` slots are removed.
pub fn available_slots(
    net: &Network,
    ledger: &SpectrumLedger,
    info: &OccupationInfo,
    min_slot: Option<SlotId>,
    forbidden: &BTreeSet<SlotId>,
) -> Result<BTreeSet<SlotId>, SpectrumError> {
    let (first, rest) = info
        .legit_fibers()
        .split_first()
        .ok_or(SpectrumError::EmptyFiberSet)?;

    let mut available = ledger.idle_slots_fiber(net, *first)?;
    for f in rest {
        let idle = ledger.idle_slots_fiber(net, *f)?;
        available.retain(|s| idle.contains(s));
    }
    if let Some(m) = info.legit_add_module() {
        let occupied = ledger.occupied_slots_add_module(m);
        available.retain(|s| !occupied.contains(s));
    }
    if let Some(m) = info.legit_drop_module() {
        let occupied = ledger.occupied_slots_drop_module(m);
        available.retain(|s| !occupied.contains(s));
    }
    for f in info.waste_fibers() {
        let usable = ledger.empty_or_waste_only_slots_fiber(net, *f)?;
        available.retain(|s| usable.contains(s));
    }
    for m in info.waste_add_modules() {
        let legit = ledger.legit_occupied_slots_add_module(*m);
        available.retain(|s| !legit.contains(s));
    }
    for m in info.waste_drop_modules() {
        let legit = ledger.legit_occupied_slots_drop_module(*m);
        available.retain(|s| !legit.contains(s));
    }
    if let Some(min) = min_slot {
        available.retain(|s| *s >= min);
    }
    available.retain(|s| !forbidden.contains(s));

    Ok(available)
}

/// Iterate over the first slot of every contiguous range of `num_slots` slots within `available`,
/// in increasing order. Ranges may overlap.
fn range_starts(
    available: &BTreeSet<SlotId>,
    num_slots: usize,
) -> impl Iterator<Item = SlotId> + '_ {
    let width = num_slots.max(1) as SlotId;
    let mut run_start: Option<SlotId> = None;
    let mut prev: Option<SlotId> = None;
    available.iter().filter_map(move |s| {
        if prev.map(|p| p + 1 != *s).unwrap_or(true) {
            run_start = Some(*s);
        }
        prev = Some(*s);
        let start = run_start.unwrap_or(*s);
        if *s - start + 1 >= width {
            Some(*s - width + 1)
        } else {
            None
        }
    })
}

/// All slots at which a contiguous range of `num_slots` slots within `available` starts, in
/// increasing order.
pub fn valid_range_starts(available: &BTreeSet<SlotId>, num_slots: usize) -> Vec<SlotId> {
    range_starts(available, num_slots).collect()
}

/// The contiguous range of `num_slots` slots within `available` with the lowest start. An empty
/// range is returned for `num_slots == 0`.
pub fn first_fit_in(available: &BTreeSet<SlotId>, num_slots: usize) -> Option<BTreeSet<SlotId>> {
    if num_slots == 0 {
        return Some(BTreeSet::new());
    }
    range_starts(available, num_slots)
        .next()
        .map(|start| slot_range(start, num_slots))
}

/// The range of `num_slots` slots starting at `start`.
fn slot_range(start: SlotId, num_slots: usize) -> BTreeSet<SlotId> {
    (start..start + num_slots as SlotId).collect()
}

/// Find the lowest contiguous range of `num_slots` slots for the signal described by `info`. The
/// slot set of `info` is ignored. Returns `None` if no such range exists, or if the signal clashes
/// with itself.
pub fn first_fit(
    net: &Network,
    ledger: &SpectrumLedger,
    info: &OccupationInfo,
    num_slots: usize,
    min_slot: Option<SlotId>,
    forbidden: &BTreeSet<SlotId>,
) -> Result<Option<BTreeSet<SlotId>>, SpectrumError> {
    if info.legit_fibers().is_empty() {
        return Err(SpectrumError::EmptyFiberSet);
    }
    if info.is_self_clashing() {
        debug!("No slots for a self-clashing signal");
        return Ok(None);
    }
    if num_slots == 0 {
        return Ok(Some(BTreeSet::new()));
    }
    let available = available_slots(net, ledger, info, min_slot, forbidden)?;
    Ok(first_fit_in(&available, num_slots))
}

/// Find two ranges of `num_slots` slots for two signals that are established together (1+1
/// protection). If the two signals never reach each other's legitimate resources, the ranges are
/// searched independently. Otherwise, the first pair of starts (in increasing order) whose ranges
/// do not overlap is returned.
pub fn first_fit_two_routes(
    net: &Network,
    ledger: &SpectrumLedger,
    a: &OccupationInfo,
    b: &OccupationInfo,
    num_slots: usize,
    min_slot: Option<SlotId>,
) -> Result<Option<(BTreeSet<SlotId>, BTreeSet<SlotId>)>, SpectrumError> {
    if a.legit_fibers().is_empty() || b.legit_fibers().is_empty() {
        return Err(SpectrumError::EmptyFiberSet);
    }
    if a.is_self_clashing() || b.is_self_clashing() {
        return Ok(None);
    }
    if num_slots == 0 {
        return Ok(Some((BTreeSet::new(), BTreeSet::new())));
    }

    let none = BTreeSet::new();
    let available_a = available_slots(net, ledger, a, min_slot, &none)?;
    let available_b = available_slots(net, ledger, b, min_slot, &none)?;

    if a.is_mutually_clashing_free_with(b) {
        return Ok(first_fit_in(&available_a, num_slots)
            .zip(first_fit_in(&available_b, num_slots)));
    }

    let width = num_slots as SlotId;
    let starts_b = valid_range_starts(&available_b, num_slots);
    for s1 in range_starts(&available_a, num_slots) {
        if let Some(s2) = starts_b.iter().find(|s2| (s1 - **s2).abs() >= width) {
            return Ok(Some((slot_range(s1, num_slots), slot_range(*s2, num_slots))));
        }
    }
    Ok(None)
}

/// Result of [`first_fit_hops`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopAssignment {
    /// The assigned slots
    pub slots: BTreeSet<SlotId>,
    /// For every hop, the chosen fiber and its bidirectional pair.
    pub fibers: Vec<(FiberId, FiberId)>,
}

/// Find the lowest range of `num_slots` slots for a sequence of hops between adjacent nodes, using
/// both directions of a bidirectional pair of fibers on each hop. Each hop may choose among all
/// bidirectional pairs from its first to its second node. A range is valid if, on every hop, at
/// least one pair is idle in both directions for the entire range.
pub fn first_fit_hops(
    net: &Network,
    ledger: &SpectrumLedger,
    hops: &[(NodeId, NodeId)],
    num_slots: usize,
    min_slot: Option<SlotId>,
) -> Result<Option<HopAssignment>, SpectrumError> {
    if hops.is_empty() {
        return Err(SpectrumError::EmptyFiberSet);
    }

    // candidate pairs per hop, with the slots idle on both fibers.
    let mut candidates: Vec<Vec<((FiberId, FiberId), BTreeSet<SlotId>)>> = Vec::new();
    for (a, b) in hops {
        let mut pairs = Vec::new();
        for f in net.get_fibers_between(*a, *b)? {
            if let Some(r) = net.get_fiber(f)?.bidi_pair() {
                let idle_r = ledger.idle_slots_fiber(net, r)?;
                let mut idle = ledger.idle_slots_fiber(net, f)?;
                idle.retain(|s| idle_r.contains(s));
                pairs.push(((f, r), idle));
            }
        }
        if pairs.is_empty() {
            debug!("Hop without any bidirectional pair of fibers");
            return Ok(None);
        }
        candidates.push(pairs);
    }

    if num_slots == 0 {
        return Ok(Some(HopAssignment {
            slots: BTreeSet::new(),
            fibers: candidates.iter().map(|pairs| pairs[0].0).collect(),
        }));
    }

    // union within a hop, intersection across hops.
    let mut available: Option<BTreeSet<SlotId>> = None;
    for pairs in candidates.iter() {
        let hop: BTreeSet<SlotId> = pairs
            .iter()
            .flat_map(|(_, idle)| idle.iter().copied())
            .collect();
        available = Some(match available {
            Some(mut x) => {
                x.retain(|s| hop.contains(s));
                x
            }
            None => hop,
        });
    }
    let mut available = available.unwrap_or_default();
    if let Some(min) = min_slot {
        available.retain(|s| *s >= min);
    }

    for start in range_starts(&available, num_slots) {
        let range = slot_range(start, num_slots);
        let chosen: Option<Vec<(FiberId, FiberId)>> = candidates
            .iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .find(|(_, idle)| range.is_subset(idle))
                    .map(|(pair, _)| *pair)
            })
            .collect();
        if let Some(fibers) = chosen {
            return Ok(Some(HopAssignment {
                slots: range,
                fibers,
            }));
        }
    }
    Ok(None)
}
