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

//! # Optical add/drop multiplexer
//!
//! This module contains the configuration of a node. Each node stores how its switching fabric is
//! built ([`ArchitectureConfig`]), how many directionless add and drop modules it has, and
//! whether it equalizes the output power.

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Default insertion loss of a wavelength-selective switch, in dB.
pub const DEFAULT_WSS_LOSS_DB: f64 = 7.0;
/// Default PMD of a wavelength-selective switch, in ps.
pub const DEFAULT_WSS_PMD_PS: f64 = 0.5;
/// Default insertion loss of a multiplexer or demultiplexer, in dB.
pub const DEFAULT_MUX_LOSS_DB: f64 = 5.0;
/// Default PMD of a multiplexer or demultiplexer, in ps.
pub const DEFAULT_MUX_PMD_PS: f64 = 0.5;

/// Configuration of the switching fabric of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum ArchitectureConfig {
    /// Wavelength-selective, non-blocking node. A signal only reaches the intended port.
    #[default]
    NonBlocking,
    /// Filterless node based on splitters and couplers. A signal reaches every output except the
    /// reverse direction of the fiber it came in from.
    FilterlessBroadcast,
    /// Parametrized architecture.
    Generic(GenericArchitecture),
}

impl ArchitectureConfig {
    /// Returns `true` if the architecture never sends a signal to an unintended port.
    pub fn is_never_creating_waste(&self) -> bool {
        match self {
            Self::NonBlocking => true,
            Self::FilterlessBroadcast => false,
            Self::Generic(g) => g.family != ArchitectureFamily::Filterless,
        }
    }
}

/// Family of the parametrized architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchitectureFamily {
    /// WSS on the input and on the output degree.
    RouteAndSelect,
    /// Splitter on the input degree, WSS on the output degree.
    BroadcastAndSelect,
    /// Splitter on the input degree, coupler on the output degree.
    Filterless,
}

/// Type of the add and drop modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddDropModuleType {
    /// (De)multiplexer based modules.
    MuxBased,
    /// WSS based modules.
    SwitchBased,
}

/// Parameters of the generic architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericArchitecture {
    /// Family of the architecture
    pub family: ArchitectureFamily,
    /// Whether add and drop modules are directionless (shared by all degrees).
    pub directionless: bool,
    /// Kind of add and drop modules.
    pub add_drop_module: AddDropModuleType,
    /// Insertion loss of a (de)multiplexer in dB
    pub mux_loss_db: f64,
    /// PMD of a (de)multiplexer in ps
    pub mux_pmd_ps: f64,
    /// Insertion loss of a WSS in dB
    pub wss_loss_db: f64,
    /// PMD of a WSS in ps
    pub wss_pmd_ps: f64,
}

impl GenericArchitecture {
    /// Create a new generic architecture with the default loss and PMD values.
    pub fn new(
        family: ArchitectureFamily,
        directionless: bool,
        add_drop_module: AddDropModuleType,
    ) -> Self {
        Self {
            family,
            directionless,
            add_drop_module,
            mux_loss_db: DEFAULT_MUX_LOSS_DB,
            mux_pmd_ps: DEFAULT_MUX_PMD_PS,
            wss_loss_db: DEFAULT_WSS_LOSS_DB,
            wss_pmd_ps: DEFAULT_WSS_PMD_PS,
        }
    }
}

/// # Optical node
///
/// Stores the configuration of a single OADM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OadmNode {
    pub(crate) name: String,
    pub(crate) node_id: NodeId,
    pub(crate) architecture: ArchitectureConfig,
    pub(crate) num_add_modules: usize,
    pub(crate) num_drop_modules: usize,
    pub(crate) equalization_target_dbm: Option<f64>,
}

impl OadmNode {
    pub(crate) fn new(name: String, node_id: NodeId) -> Self {
        Self {
            name,
            node_id,
            architecture: ArchitectureConfig::default(),
            num_add_modules: 0,
            num_drop_modules: 0,
            equalization_target_dbm: None,
        }
    }

    /// Return the name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the ID of the node.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Return the configured switching architecture.
    pub fn architecture(&self) -> &ArchitectureConfig {
        &self.architecture
    }

    /// Number of directionless add modules
    pub fn num_add_modules(&self) -> usize {
        self.num_add_modules
    }

    /// Number of directionless drop modules
    pub fn num_drop_modules(&self) -> usize {
        self.num_drop_modules
    }

    /// Output power per 12.5 GHz the node equalizes to, if configured (in dBm).
    pub fn equalization_target_dbm(&self) -> Option<f64> {
        self.equalization_target_dbm
    }
}
