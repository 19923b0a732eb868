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

//! Module containing the spectrum ledger.

use std::collections::{BTreeMap, BTreeSet};

use log::*;
use optnet::{
    network::Network,
    types::{DirectionlessModule, FiberId, LightpathId, SlotId},
};

use super::SpectrumError;
use crate::propagation::OccupationInfo;

/// Lightpaths occupying each slot of a single resource.
pub type SlotOccupation = BTreeMap<SlotId, BTreeSet<LightpathId>>;

/// Kind of signal occupying a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Signal {
    /// The resource is part of the lightpath's design.
    Legit,
    /// The resource receives the signal unintentionally.
    Waste,
}

/// Legitimate and waste occupation of all resources of the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResourceOccupation<K: Ord> {
    /// Legitimate occupation
    legit: BTreeMap<K, SlotOccupation>,
    /// Waste occupation
    waste: BTreeMap<K, SlotOccupation>,
}

impl<K: Ord> Default for ResourceOccupation<K> {
    fn default() -> Self {
        Self {
            legit: BTreeMap::new(),
            waste: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> ResourceOccupation<K> {
    /// Get the map of the given signal kind
    fn map(&self, signal: Signal) -> &BTreeMap<K, SlotOccupation> {
        match signal {
            Signal::Legit => &self.legit,
            Signal::Waste => &self.waste,
        }
    }

    /// Get the mutable map of the given signal kind
    fn map_mut(&mut self, signal: Signal) -> &mut BTreeMap<K, SlotOccupation> {
        match signal {
            Signal::Legit => &mut self.legit,
            Signal::Waste => &mut self.waste,
        }
    }

    /// Record that `lp` occupies `slots` on `key`.
    fn insert(&mut self, signal: Signal, key: K, slots: &BTreeSet<SlotId>, lp: LightpathId) {
        let occ = self.map_mut(signal).entry(key).or_default();
        for s in slots {
            occ.entry(*s).or_default().insert(lp);
        }
    }

    /// Remove `lp` from `slots` on `key`. Empty entries are removed.
    fn remove(&mut self, signal: Signal, key: K, slots: &BTreeSet<SlotId>, lp: LightpathId) {
        let map = self.map_mut(signal);
        if let Some(occ) = map.get_mut(&key) {
            for s in slots {
                if let Some(lps) = occ.get_mut(s) {
                    lps.remove(&lp);
                    if lps.is_empty() {
                        occ.remove(s);
                    }
                }
            }
            if occ.is_empty() {
                map.remove(&key);
            }
        }
    }

    /// Slots with at least one occupant of the given kind.
    fn slots(&self, signal: Signal, key: K) -> BTreeSet<SlotId> {
        self.map(signal)
            .get(&key)
            .map(|occ| occ.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Slots with at least one occupant, legitimate or waste.
    fn occupied(&self, key: K) -> BTreeSet<SlotId> {
        let mut slots = self.slots(Signal::Legit, key);
        slots.extend(self.slots(Signal::Waste, key));
        slots
    }

    /// Occupants of a single slot.
    fn occupants(&self, signal: Signal, key: K, slot: SlotId) -> BTreeSet<LightpathId> {
        self.map(signal)
            .get(&key)
            .and_then(|occ| occ.get(&slot))
            .cloned()
            .unwrap_or_default()
    }

    /// Check if any of the slots has an occupant of the given kind.
    fn any(&self, signal: Signal, key: K, slots: &BTreeSet<SlotId>) -> bool {
        self.map(signal)
            .get(&key)
            .map(|occ| slots.iter().any(|s| occ.contains_key(s)))
            .unwrap_or(false)
    }

    /// Check if none of the slots has any occupant.
    fn is_idle(&self, key: K, slots: &BTreeSet<SlotId>) -> bool {
        !self.any(Signal::Legit, key, slots) && !self.any(Signal::Waste, key, slots)
    }

    /// Slots that have more than one legitimate occupant, or a legitimate and a waste occupant.
    fn clashing(&self, key: K) -> BTreeSet<SlotId> {
        let legit = match self.legit.get(&key) {
            Some(l) => l,
            None => return BTreeSet::new(),
        };
        let waste = self.waste.get(&key);
        legit
            .iter()
            .filter(|(s, lps)| {
                lps.len() > 1 || waste.map(|w| w.contains_key(*s)).unwrap_or(false)
            })
            .map(|(s, _)| *s)
            .collect()
    }

    /// All resources with any occupation.
    fn keys(&self) -> BTreeSet<K> {
        self.legit.keys().chain(self.waste.keys()).copied().collect()
    }

    /// Check if the legitimate occupant `lp` is alone on `slots` of `key`.
    fn is_alone(&self, key: K, slots: &BTreeSet<SlotId>, lp: LightpathId) -> bool {
        slots.iter().all(|s| {
            self.occupants(Signal::Legit, key, *s).into_iter().all(|x| x == lp)
                && self.occupants(Signal::Waste, key, *s).is_empty()
        })
    }
}

/// # Spectrum ledger
///
/// The ledger stores, for every fiber, directionless add module and directionless drop module,
/// which lightpath occupies which slot, separately for legitimate and for waste signals. A
/// consistent ledger satisfies the following invariant: for every resource and slot, there is at
/// most one legitimate occupant, and if there is one, there is no waste occupant (not even of the
/// same lightpath). Multiple waste signals may overlap.
///
/// The ledger never checks for conflicts while allocating. Use
/// [`SpectrumLedger::is_allocatable`] before allocating to keep the ledger consistent, and
/// [`SpectrumLedger::is_spectrum_occupation_ok`] to validate an existing design.
///
/// ```
/// use optnet::prelude::*;
/// use wdmplan::{propagation::OccupationInfo, spectrum::SpectrumLedger};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut net = Network::default();
/// let a = net.add_node("A");
/// let b = net.add_node("B");
/// let (ab, _) = net.add_link(a, b, 80.0)?;
/// let lp = net.add_lightpath("A-B", vec![ab], 0..4)?;
///
/// let mut ledger = SpectrumLedger::from_network(&net)?;
/// assert!(ledger.is_spectrum_occupation_ok());
///
/// // another signal on the same slots cannot be allocated
/// let other = OccupationInfo::new(&net, vec![ab], None, None, Some((2..6).collect()))?;
/// assert!(!ledger.is_allocatable(&net, &other));
///
/// ledger.release(lp);
/// assert!(ledger.is_allocatable(&net, &other));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpectrumLedger {
    /// Occupation of fibers
    fibers: ResourceOccupation<FiberId>,
    /// Occupation of directionless add modules
    add_modules: ResourceOccupation<DirectionlessModule>,
    /// Occupation of directionless drop modules
    drop_modules: ResourceOccupation<DirectionlessModule>,
    /// Occupation info of every allocated lightpath, used to release it again.
    allocated: BTreeMap<LightpathId, OccupationInfo>,
}

impl SpectrumLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the ledger from all lightpaths of the network, in the order of their ID.
    pub fn from_network(net: &Network) -> Result<Self, SpectrumError> {
        let mut ledger = Self::new();
        ledger.reset_from_network(net)?;
        Ok(ledger)
    }

    /// Clear the ledger and allocate every lightpath of the network, in the order of their ID.
    /// If an error occurs, the ledger is left empty.
    pub fn reset_from_network(&mut self, net: &Network) -> Result<(), SpectrumError> {
        *self = Self::new();
        let infos = net
            .get_lightpath_ids()
            .into_iter()
            .map(|lp| OccupationInfo::of_lightpath(net, lp).map(|info| (lp, info)))
            .collect::<Result<Vec<_>, _>>()?;
        for (lp, info) in infos {
            self.allocate(lp, &info)?;
        }
        info!(
            "Rebuilt the spectrum ledger from {} lightpaths",
            self.allocated.len()
        );
        Ok(())
    }

    /// Record the occupation of a lightpath. This function does not check for conflicts. It
    /// fails if the lightpath is already allocated, or if `info` has no slot set. In that case,
    /// the ledger is not modified.
    pub fn allocate(
        &mut self,
        lp: LightpathId,
        info: &OccupationInfo,
    ) -> Result<(), SpectrumError> {
        if self.allocated.contains_key(&lp) {
            return Err(SpectrumError::AlreadyAllocated(lp));
        }
        let slots = info.slots().ok_or(SpectrumError::NoSlotSet)?;

        if !slots.is_empty() {
            for f in info.legit_fibers() {
                self.fibers.insert(Signal::Legit, *f, slots, lp);
            }
            for f in info.waste_fibers() {
                self.fibers.insert(Signal::Waste, *f, slots, lp);
            }
            if let Some(m) = info.legit_add_module() {
                self.add_modules.insert(Signal::Legit, m, slots, lp);
            }
            for m in info.waste_add_modules() {
                self.add_modules.insert(Signal::Waste, *m, slots, lp);
            }
            if let Some(m) = info.legit_drop_module() {
                self.drop_modules.insert(Signal::Legit, m, slots, lp);
            }
            for m in info.waste_drop_modules() {
                self.drop_modules.insert(Signal::Waste, *m, slots, lp);
            }
        }

        trace!("Allocate {} on {} slots", lp, slots.len());
        self.allocated.insert(lp, info.clone());
        Ok(())
    }

    /// Remove every occupation of `lp`. Returns `false` if the lightpath was not allocated.
    pub fn release(&mut self, lp: LightpathId) -> bool {
        let info = match self.allocated.remove(&lp) {
            Some(info) => info,
            None => return false,
        };
        let slots = match info.slots() {
            Some(s) => s,
            None => return true,
        };
        for f in info.legit_fibers() {
            self.fibers.remove(Signal::Legit, *f, slots, lp);
        }
        for f in info.waste_fibers() {
            self.fibers.remove(Signal::Waste, *f, slots, lp);
        }
        if let Some(m) = info.legit_add_module() {
            self.add_modules.remove(Signal::Legit, m, slots, lp);
        }
        for m in info.waste_add_modules() {
            self.add_modules.remove(Signal::Waste, *m, slots, lp);
        }
        if let Some(m) = info.legit_drop_module() {
            self.drop_modules.remove(Signal::Legit, m, slots, lp);
        }
        for m in info.waste_drop_modules() {
            self.drop_modules.remove(Signal::Waste, *m, slots, lp);
        }
        trace!("Release {}", lp);
        true
    }

    /// Check if the occupation can be allocated without creating a clash. This is not the case
    /// if the occupation clashes with itself, if any legitimate resource has any occupant on the
    /// requested slots, or if any waste resource carries a legitimate signal on the requested
    /// slots. A legitimate fiber must also support every requested slot, and fibers unknown to
    /// `net` are never idle. An info without slot set requests no slot.
    pub fn is_allocatable(&self, net: &Network, info: &OccupationInfo) -> bool {
        if info.is_self_clashing() {
            return false;
        }
        let slots = match info.slots() {
            Some(s) if !s.is_empty() => s,
            _ => return true,
        };

        info.legit_fibers().iter().all(|f| {
            net.get_fiber(*f)
                .map(|fiber| slots.iter().all(|s| fiber.is_valid_slot(*s)))
                .unwrap_or(false)
                && self.fibers.is_idle(*f, slots)
        })
            && info
                .legit_add_module()
                .map(|m| self.add_modules.is_idle(m, slots))
                .unwrap_or(true)
            && info
                .legit_drop_module()
                .map(|m| self.drop_modules.is_idle(m, slots))
                .unwrap_or(true)
            && info
                .waste_fibers()
                .iter()
                .all(|f| !self.fibers.any(Signal::Legit, *f, slots))
            && info
                .waste_add_modules()
                .iter()
                .all(|m| !self.add_modules.any(Signal::Legit, *m, slots))
            && info
                .waste_drop_modules()
                .iter()
                .all(|m| !self.drop_modules.any(Signal::Legit, *m, slots))
    }

    /// Valid slots of the fiber that are not occupied by any signal.
    pub fn idle_slots_fiber(
        &self,
        net: &Network,
        fiber: FiberId,
    ) -> Result<BTreeSet<SlotId>, SpectrumError> {
        let occupied = self.fibers.occupied(fiber);
        Ok(net
            .get_fiber(fiber)?
            .valid_slots()
            .into_iter()
            .filter(|s| !occupied.contains(s))
            .collect())
    }

    /// Valid slots of the fiber that are either empty or only occupied by waste signals.
    pub fn empty_or_waste_only_slots_fiber(
        &self,
        net: &Network,
        fiber: FiberId,
    ) -> Result<BTreeSet<SlotId>, SpectrumError> {
        let legit = self.fibers.slots(Signal::Legit, fiber);
        Ok(net
            .get_fiber(fiber)?
            .valid_slots()
            .into_iter()
            .filter(|s| !legit.contains(s))
            .collect())
    }

    /// Slots of the fiber occupied by any signal.
    pub fn occupied_slots_fiber(&self, fiber: FiberId) -> BTreeSet<SlotId> {
        self.fibers.occupied(fiber)
    }

    /// Slots of the add module occupied by any signal.
    pub fn occupied_slots_add_module(&self, module: DirectionlessModule) -> BTreeSet<SlotId> {
        self.add_modules.occupied(module)
    }

    /// Slots of the drop module occupied by any signal.
    pub fn occupied_slots_drop_module(&self, module: DirectionlessModule) -> BTreeSet<SlotId> {
        self.drop_modules.occupied(module)
    }

    /// Slots of the fiber occupied by a legitimate signal.
    pub fn legit_occupied_slots_fiber(&self, fiber: FiberId) -> BTreeSet<SlotId> {
        self.fibers.slots(Signal::Legit, fiber)
    }

    /// Slots of the add module occupied by a legitimate signal.
    pub fn legit_occupied_slots_add_module(&self, module: DirectionlessModule) -> BTreeSet<SlotId> {
        self.add_modules.slots(Signal::Legit, module)
    }

    /// Slots of the drop module occupied by a legitimate signal.
    pub fn legit_occupied_slots_drop_module(
        &self,
        module: DirectionlessModule,
    ) -> BTreeSet<SlotId> {
        self.drop_modules.slots(Signal::Legit, module)
    }

    /// Slots of the fiber occupied by a waste signal.
    pub fn waste_occupied_slots_fiber(&self, fiber: FiberId) -> BTreeSet<SlotId> {
        self.fibers.slots(Signal::Waste, fiber)
    }

    /// Slots of the fiber that violate the ledger invariant.
    pub fn clashing_slots_fiber(&self, fiber: FiberId) -> BTreeSet<SlotId> {
        self.fibers.clashing(fiber)
    }

    /// Slots of the add module that violate the ledger invariant.
    pub fn clashing_slots_add_module(&self, module: DirectionlessModule) -> BTreeSet<SlotId> {
        self.add_modules.clashing(module)
    }

    /// Slots of the drop module that violate the ledger invariant.
    pub fn clashing_slots_drop_module(&self, module: DirectionlessModule) -> BTreeSet<SlotId> {
        self.drop_modules.clashing(module)
    }

    /// Legitimate and waste occupants of a slot on a fiber.
    pub fn occupants_fiber(
        &self,
        fiber: FiberId,
        slot: SlotId,
    ) -> (BTreeSet<LightpathId>, BTreeSet<LightpathId>) {
        (
            self.fibers.occupants(Signal::Legit, fiber, slot),
            self.fibers.occupants(Signal::Waste, fiber, slot),
        )
    }

    /// Legitimate and waste occupants of a slot on an add module.
    pub fn occupants_add_module(
        &self,
        module: DirectionlessModule,
        slot: SlotId,
    ) -> (BTreeSet<LightpathId>, BTreeSet<LightpathId>) {
        (
            self.add_modules.occupants(Signal::Legit, module, slot),
            self.add_modules.occupants(Signal::Waste, module, slot),
        )
    }

    /// Legitimate and waste occupants of a slot on a drop module.
    pub fn occupants_drop_module(
        &self,
        module: DirectionlessModule,
        slot: SlotId,
    ) -> (BTreeSet<LightpathId>, BTreeSet<LightpathId>) {
        (
            self.drop_modules.occupants(Signal::Legit, module, slot),
            self.drop_modules.occupants(Signal::Waste, module, slot),
        )
    }

    /// Full legitimate and waste occupation of a fiber.
    pub fn fiber_occupation(&self, fiber: FiberId) -> (SlotOccupation, SlotOccupation) {
        (
            self.fibers.legit.get(&fiber).cloned().unwrap_or_default(),
            self.fibers.waste.get(&fiber).cloned().unwrap_or_default(),
        )
    }

    /// All fibers with any occupation.
    pub fn occupied_fibers(&self) -> BTreeSet<FiberId> {
        self.fibers.keys()
    }

    /// All add modules with any occupation.
    pub fn occupied_add_modules(&self) -> BTreeSet<DirectionlessModule> {
        self.add_modules.keys()
    }

    /// All drop modules with any occupation.
    pub fn occupied_drop_modules(&self) -> BTreeSet<DirectionlessModule> {
        self.drop_modules.keys()
    }

    /// Check the ledger invariant on every resource and every slot.
    pub fn is_spectrum_occupation_ok(&self) -> bool {
        self.fibers
            .keys()
            .into_iter()
            .all(|f| self.fibers.clashing(f).is_empty())
            && self
                .add_modules
                .keys()
                .into_iter()
                .all(|m| self.add_modules.clashing(m).is_empty())
            && self
                .drop_modules
                .keys()
                .into_iter()
                .all(|m| self.drop_modules.clashing(m).is_empty())
    }

    /// Check that the signal of `lp` does not clash with any other signal: every legitimate
    /// resource is used by `lp` alone, and no waste resource carries a legitimate signal. A
    /// lightpath that is not allocated cannot clash.
    pub fn is_spectrum_occupation_ok_for(&self, lp: LightpathId) -> bool {
        let info = match self.allocated.get(&lp) {
            Some(info) => info,
            None => return true,
        };
        let slots = match info.slots() {
            Some(s) => s,
            None => return true,
        };
        info.legit_fibers()
            .iter()
            .all(|f| self.fibers.is_alone(*f, slots, lp))
            && info
                .legit_add_module()
                .map(|m| self.add_modules.is_alone(m, slots, lp))
                .unwrap_or(true)
            && info
                .legit_drop_module()
                .map(|m| self.drop_modules.is_alone(m, slots, lp))
                .unwrap_or(true)
            && info
                .waste_fibers()
                .iter()
                .all(|f| !self.fibers.any(Signal::Legit, *f, slots))
            && info
                .waste_add_modules()
                .iter()
                .all(|m| !self.add_modules.any(Signal::Legit, *m, slots))
            && info
                .waste_drop_modules()
                .iter()
                .all(|m| !self.drop_modules.any(Signal::Legit, *m, slots))
    }

    /// Check if the lightpath is allocated.
    pub fn is_allocated(&self, lp: LightpathId) -> bool {
        self.allocated.contains_key(&lp)
    }

    /// Iterate over all allocated lightpaths, in order of their ID.
    pub fn allocated_lightpaths(&self) -> impl Iterator<Item = LightpathId> + '_ {
        self.allocated.keys().copied()
    }

    /// The occupation info with which the lightpath was allocated.
    pub fn occupation_info(&self, lp: LightpathId) -> Option<&OccupationInfo> {
        self.allocated.get(&lp)
    }
}
