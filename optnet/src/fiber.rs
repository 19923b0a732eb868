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

//! # Fibers and optical amplifiers

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{slots_of, FiberId, NodeId, SlotId, SlotRange};

/// Default attenuation coefficient in dB/km.
pub const DEFAULT_ATTENUATION_DB_PER_KM: f64 = 0.25;
/// Default chromatic dispersion coefficient in ps/nm/km.
pub const DEFAULT_CD_PS_PER_NM_KM: f64 = 17.0;
/// Default PMD design coefficient in ps/sqrt(km).
pub const DEFAULT_PMD_PS_PER_SQRT_KM: f64 = 0.1;

/// Optical amplifier, either placed inline, as a booster at the fiber origin, or as a
/// preamplifier at the fiber end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amplifier {
    /// Position in km from the fiber origin.
    pub position_km: f64,
    /// Gain in dB
    pub gain_db: f64,
    /// Noise figure in dB
    pub noise_figure_db: f64,
    /// PMD in ps
    pub pmd_ps: f64,
    /// Chromatic dispersion added to the signal, in ps/nm. Negative values compensate.
    pub cd_compensation_ps_per_nm: f64,
    /// Minimum acceptable gain in dB
    pub min_gain_db: f64,
    /// Maximum acceptable gain in dB
    pub max_gain_db: f64,
    /// Minimum acceptable total input power in dBm
    pub min_input_power_dbm: f64,
    /// Maximum acceptable total input power in dBm
    pub max_input_power_dbm: f64,
}

impl Amplifier {
    /// Create an amplifier at the given position with the given gain, and typical values for all
    /// other parameters (noise figure of 5 dB, PMD of 0.5 ps, no CD compensation, gain between
    /// 15 and 30 dB and input power between -29 and 2 dBm).
    pub fn new(position_km: f64, gain_db: f64) -> Self {
        Self {
            position_km,
            gain_db,
            noise_figure_db: 5.0,
            pmd_ps: 0.5,
            cd_compensation_ps_per_nm: 0.0,
            min_gain_db: 15.0,
            max_gain_db: 30.0,
            min_input_power_dbm: -29.0,
            max_input_power_dbm: 2.0,
        }
    }
}

/// # Fiber
///
/// A unidirectional fiber between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fiber {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) length_km: f64,
    pub(crate) attenuation_db_per_km: f64,
    pub(crate) cd_ps_per_nm_km: f64,
    pub(crate) pmd_ps_per_sqrt_km: f64,
    pub(crate) amplifiers: Vec<Amplifier>,
    pub(crate) valid_slots: Vec<SlotRange>,
    pub(crate) bidi_pair: Option<FiberId>,
    pub(crate) booster: Option<Amplifier>,
    pub(crate) preamplifier: Option<Amplifier>,
}

impl Fiber {
    pub(crate) fn new(source: NodeId, target: NodeId, length_km: f64) -> Self {
        Self {
            source,
            target,
            length_km,
            attenuation_db_per_km: DEFAULT_ATTENUATION_DB_PER_KM,
            cd_ps_per_nm_km: DEFAULT_CD_PS_PER_NM_KM,
            pmd_ps_per_sqrt_km: DEFAULT_PMD_PS_PER_SQRT_KM,
            amplifiers: Vec::new(),
            valid_slots: Vec::new(),
            bidi_pair: None,
            booster: None,
            preamplifier: None,
        }
    }

    /// Node at which the fiber starts.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Node at which the fiber ends.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Length in km
    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    /// Attenuation coefficient in dB/km
    pub fn attenuation_db_per_km(&self) -> f64 {
        self.attenuation_db_per_km
    }

    /// Chromatic dispersion coefficient in ps/nm/km
    pub fn cd_ps_per_nm_km(&self) -> f64 {
        self.cd_ps_per_nm_km
    }

    /// PMD design coefficient in ps/sqrt(km)
    pub fn pmd_ps_per_sqrt_km(&self) -> f64 {
        self.pmd_ps_per_sqrt_km
    }

    /// Inline amplifiers, ordered by their position.
    pub fn amplifiers(&self) -> &[Amplifier] {
        &self.amplifiers
    }

    /// Ranges of slots that may be used on this fiber.
    pub fn valid_slot_ranges(&self) -> &[SlotRange] {
        &self.valid_slots
    }

    /// Set of slots that may be used on this fiber.
    pub fn valid_slots(&self) -> BTreeSet<SlotId> {
        slots_of(&self.valid_slots)
    }

    /// Check if a slot may be used on this fiber.
    pub fn is_valid_slot(&self, slot: SlotId) -> bool {
        self.valid_slots.iter().any(|r| r.contains(slot))
    }

    /// The fiber in the opposite direction, if the two form a bidirectional pair.
    pub fn bidi_pair(&self) -> Option<FiberId> {
        self.bidi_pair
    }

    /// Booster amplifier at the origin of the fiber.
    pub fn booster(&self) -> Option<&Amplifier> {
        self.booster.as_ref()
    }

    /// Preamplifier at the end of the fiber.
    pub fn preamplifier(&self) -> Option<&Amplifier> {
        self.preamplifier.as_ref()
    }
}
