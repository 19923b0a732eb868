// OptNet: Optical WDM network model written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
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

//! Optical slots and the frequency grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::NetworkError;

/// Identifier of an optical slot. The slot may be negative, as it is relative to the base
/// frequency of the [`SlotGrid`].
pub type SlotId = i32;

/// Inclusive range of valid slots on a fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    /// First valid slot
    pub first: SlotId,
    /// Last valid slot (inclusive)
    pub last: SlotId,
}

impl SlotRange {
    /// Create a new range. Returns an error if `first > last`.
    pub fn new(first: SlotId, last: SlotId) -> Result<Self, NetworkError> {
        if first > last {
            return Err(NetworkError::InvalidSlotRange(first, last));
        }
        Ok(Self { first, last })
    }

    /// Number of slots in the range
    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    /// A range always contains at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if the slot is part of the range
    pub fn contains(&self, slot: SlotId) -> bool {
        self.first <= slot && slot <= self.last
    }

    /// Iterate over all slots in the range, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = SlotId> {
        self.first..=self.last
    }
}

/// Collect the slots of all ranges into an ordered set.
pub fn slots_of(ranges: &[SlotRange]) -> BTreeSet<SlotId> {
    ranges.iter().flat_map(|r| r.iter()).collect()
}

/// The flexible frequency grid. The central frequency of slot `s` is `base + s * width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotGrid {
    /// Central frequency of slot 0, in THz.
    pub base_frequency_thz: f64,
    /// Width of a single slot, in GHz.
    pub slot_width_ghz: f64,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            base_frequency_thz: 193.1,
            slot_width_ghz: 12.5,
        }
    }
}

impl SlotGrid {
    /// Central frequency of a slot in THz.
    pub fn frequency_thz(&self, slot: SlotId) -> f64 {
        self.base_frequency_thz + slot as f64 * self.slot_width_ghz / 1000.0
    }

    /// Total bandwidth occupied by `num_slots` slots, in GHz.
    pub fn bandwidth_ghz(&self, num_slots: usize) -> f64 {
        num_slots as f64 * self.slot_width_ghz
    }

    /// Return the slot whose central frequency is closest to `freq_thz`.
    pub fn slot_at(&self, freq_thz: f64) -> SlotId {
        ((freq_thz - self.base_frequency_thz) * 1000.0 / self.slot_width_ghz).round() as SlotId
    }
}
