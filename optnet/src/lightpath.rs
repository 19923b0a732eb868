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

//! # Lightpaths
//!
//! A lightpath is a unidirectional optical circuit. It occupies the same set of slots on every
//! fiber of its route (no wavelength conversion).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{FiberId, LightpathId, SlotId};

/// Parameters of the transponder terminating a lightpath.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transponder {
    /// Total power injected by the transmitter, in dBm.
    pub injection_power_dbm: f64,
    /// Minimum power at the receiver, in dBm.
    pub min_power_dbm: f64,
    /// Maximum power at the receiver, in dBm.
    pub max_power_dbm: f64,
    /// Maximum absolute chromatic dispersion the receiver tolerates, in ps/nm.
    pub max_cd_ps_per_nm: f64,
    /// Maximum PMD the receiver tolerates, in ps.
    pub max_pmd_ps: f64,
    /// Minimum OSNR at 12.5 GHz the receiver requires, in dB.
    pub min_osnr_db: f64,
}

impl Default for Transponder {
    fn default() -> Self {
        Self {
            injection_power_dbm: 0.0,
            min_power_dbm: -20.0,
            max_power_dbm: 10.0,
            max_cd_ps_per_nm: 50_000.0,
            max_pmd_ps: 30.0,
            min_osnr_db: 12.0,
        }
    }
}

/// # Lightpath
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lightpath {
    pub(crate) id: LightpathId,
    pub(crate) name: String,
    pub(crate) fibers: Vec<FiberId>,
    pub(crate) slots: BTreeSet<SlotId>,
    pub(crate) add_module: Option<usize>,
    pub(crate) drop_module: Option<usize>,
    pub(crate) line_rate_gbps: f64,
    pub(crate) transponder: Transponder,
    pub(crate) backup_of: Option<LightpathId>,
}

impl Lightpath {
    /// ID of the lightpath.
    pub fn id(&self) -> LightpathId {
        self.id
    }

    /// Name of the lightpath
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered sequence of fibers (the legitimate path).
    pub fn fibers(&self) -> &[FiberId] {
        &self.fibers
    }

    /// Slots occupied on every fiber of the route.
    pub fn slots(&self) -> &BTreeSet<SlotId> {
        &self.slots
    }

    /// Index of the directionless add module at the origin, if any.
    pub fn add_module(&self) -> Option<usize> {
        self.add_module
    }

    /// Index of the directionless drop module at the destination, if any.
    pub fn drop_module(&self) -> Option<usize> {
        self.drop_module
    }

    /// Line rate in Gbps
    pub fn line_rate_gbps(&self) -> f64 {
        self.line_rate_gbps
    }

    /// Transponder parameters
    pub fn transponder(&self) -> &Transponder {
        &self.transponder
    }

    /// If this lightpath is the 1+1 backup of another lightpath, return the protected one.
    pub fn backup_of(&self) -> Option<LightpathId> {
        self.backup_of
    }
}
