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

//! # Switching architectures
//!
//! A [`SwitchingArchitecture`] is the stateless policy of a single node, derived from the
//! [`ArchitectureConfig`] stored in the network. It answers which fibers leaving the node receive
//! a copy of a signal that is added, dropped, expressed, or that simply enters the node, and how
//! much insertion loss and PMD the node adds on each path.

use std::collections::BTreeSet;

use optnet::{
    network::Network,
    node::{AddDropModuleType, ArchitectureConfig, ArchitectureFamily, GenericArchitecture},
    node::{DEFAULT_MUX_LOSS_DB, DEFAULT_MUX_PMD_PS, DEFAULT_WSS_LOSS_DB, DEFAULT_WSS_PMD_PS},
    types::{DirectionlessModule, FiberId, NetworkError, NodeId, SlotGrid},
};
use thiserror::Error;

/// Reference bandwidth of the equalization target and of the OSNR, in GHz.
pub const REFERENCE_BANDWIDTH_GHZ: f64 = 12.5;

/// Loss and PMD of a single optical element, or of a chain of elements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InsertionLoss {
    /// Insertion loss in dB
    pub loss_db: f64,
    /// PMD in ps
    pub pmd_ps: f64,
}

impl InsertionLoss {
    /// Create a new insertion loss.
    pub fn new(loss_db: f64, pmd_ps: f64) -> Self {
        Self { loss_db, pmd_ps }
    }

    /// Loss of a passive splitter or coupler with the given fan-out. A fan-out of one (or zero)
    /// is lossless.
    pub fn splitter(fanout: usize) -> Self {
        Self {
            loss_db: 10.0 * (fanout.max(1) as f64).log10(),
            pmd_ps: 0.0,
        }
    }

    /// Chain two elements. Losses add in dB, PMD adds in the squared domain.
    pub fn then(self, other: Self) -> Self {
        Self {
            loss_db: self.loss_db + other.loss_db,
            pmd_ps: (self.pmd_ps.powi(2) + other.pmd_ps.powi(2)).sqrt(),
        }
    }
}

/// Error thrown when querying a switching architecture.
#[derive(Debug, Error, PartialEq)]
pub enum ArchitectureError {
    /// The fiber neither starts nor ends at the node (depending on the operation).
    #[error("Fiber {0:?} is not connected to node {1:?} in the required direction")]
    FiberNotAtNode(FiberId, NodeId),
    /// Network error
    #[error("{0}")]
    Network(#[from] NetworkError),
}

/// The switching policy of a single node.
#[derive(Debug, Clone)]
pub struct SwitchingArchitecture<'n> {
    /// The network
    net: &'n Network,
    /// The node to which this architecture belongs
    node: NodeId,
    /// Configuration stored in the node.
    config: &'n ArchitectureConfig,
    /// Fibers leaving the node
    out_fibers: BTreeSet<FiberId>,
    /// Fibers entering the node
    in_fibers: BTreeSet<FiberId>,
    /// Number of directionless drop modules
    num_drop_modules: usize,
    /// Target output power per 12.5 GHz.
    equalization_target_dbm: Option<f64>,
}

impl<'n> SwitchingArchitecture<'n> {
    /// Derive the architecture of `node` from the network.
    pub fn of(net: &'n Network, node: NodeId) -> Result<Self, ArchitectureError> {
        let n = net.get_node(node)?;
        Ok(Self {
            net,
            node,
            config: n.architecture(),
            out_fibers: net.get_out_fibers(node)?,
            in_fibers: net.get_in_fibers(node)?,
            num_drop_modules: n.num_drop_modules(),
            equalization_target_dbm: n.equalization_target_dbm(),
        })
    }

    /// Derive the architecture of the node at which `fiber` ends.
    pub fn at_fiber_end(net: &'n Network, fiber: FiberId) -> Result<Self, ArchitectureError> {
        Self::of(net, net.get_fiber(fiber)?.target())
    }

    /// The node of this architecture.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The configuration from which this architecture was derived.
    pub fn config(&self) -> &'n ArchitectureConfig {
        self.config
    }

    /// Returns `true` if the node never sends a signal to an unintended output.
    pub fn is_never_creating_waste(&self) -> bool {
        self.config.is_never_creating_waste()
    }

    /// Returns `true` if the node is filterless, i.e., it cannot block any signal.
    fn is_filterless(&self) -> bool {
        !self.is_never_creating_waste()
    }

    /// Returns `true` if add and drop are shared by all degrees.
    fn is_directionless(&self) -> bool {
        match self.config {
            ArchitectureConfig::NonBlocking => false,
            ArchitectureConfig::FilterlessBroadcast => true,
            ArchitectureConfig::Generic(g) => g.directionless,
        }
    }

    /// Make sure that the fiber leaves the node
    fn check_out(&self, fiber: FiberId) -> Result<(), ArchitectureError> {
        if self.out_fibers.contains(&fiber) {
            Ok(())
        } else {
            Err(ArchitectureError::FiberNotAtNode(fiber, self.node))
        }
    }

    /// Make sure that the fiber enters the node
    fn check_in(&self, fiber: FiberId) -> Result<(), ArchitectureError> {
        if self.in_fibers.contains(&fiber) {
            Ok(())
        } else {
            Err(ArchitectureError::FiberNotAtNode(fiber, self.node))
        }
    }

    /// All outputs except the reverse direction of `input`.
    fn broadcast_from(&self, input: FiberId) -> Result<BTreeSet<FiberId>, ArchitectureError> {
        let reverse = self.net.get_fiber(input)?.bidi_pair();
        Ok(self
            .out_fibers
            .iter()
            .copied()
            .filter(|f| Some(*f) != reverse)
            .collect())
    }

    /// Fibers reached when adding a signal towards `output`. Set `directionless` if the signal is
    /// added through a directionless add module.
    pub fn outputs_on_add(
        &self,
        output: FiberId,
        directionless: bool,
    ) -> Result<BTreeSet<FiberId>, ArchitectureError> {
        self.check_out(output)?;
        Ok(match self.config {
            ArchitectureConfig::FilterlessBroadcast => self.out_fibers.clone(),
            ArchitectureConfig::Generic(g)
                if g.family == ArchitectureFamily::Filterless
                    && (g.directionless || directionless) =>
            {
                self.out_fibers.clone()
            }
            _ => BTreeSet::from([output]),
        })
    }

    /// Fibers reached (other than the legitimate drop port) when dropping a signal that arrives
    /// on `input`.
    pub fn outputs_on_drop(&self, input: FiberId) -> Result<BTreeSet<FiberId>, ArchitectureError> {
        self.check_in(input)?;
        if self.is_filterless() {
            self.broadcast_from(input)
        } else {
            Ok(BTreeSet::new())
        }
    }

    /// Fibers reached when switching a signal from `input` to `output`.
    pub fn outputs_on_express(
        &self,
        input: FiberId,
        output: FiberId,
    ) -> Result<BTreeSet<FiberId>, ArchitectureError> {
        self.check_in(input)?;
        self.check_out(output)?;
        if self.is_filterless() {
            self.broadcast_from(input)
        } else {
            Ok(BTreeSet::from([output]))
        }
    }

    /// Fibers that receive a signal arriving on `input`, independent of how the node is switched.
    pub fn outputs_unavoidable(
        &self,
        input: FiberId,
    ) -> Result<BTreeSet<FiberId>, ArchitectureError> {
        self.check_in(input)?;
        if self.is_filterless() {
            self.broadcast_from(input)
        } else {
            Ok(BTreeSet::new())
        }
    }

    /// Directionless drop modules that receive a signal arriving on `input`, independent of how the
    /// node is switched.
    pub fn drop_modules_unavoidable(
        &self,
        input: FiberId,
    ) -> Result<BTreeSet<DirectionlessModule>, ArchitectureError> {
        self.check_in(input)?;
        if self.is_filterless() && self.is_directionless() {
            Ok((0..self.num_drop_modules)
                .map(|i| DirectionlessModule::new(self.node, i))
                .collect())
        } else {
            Ok(BTreeSet::new())
        }
    }

    /// Number of fibers leaving the node
    fn d_out(&self) -> usize {
        self.out_fibers.len()
    }

    /// Number of fibers entering the node
    fn d_in(&self) -> usize {
        self.in_fibers.len()
    }

    /// Stage on the input degree of a generic architecture.
    fn input_stage(&self, g: &GenericArchitecture) -> InsertionLoss {
        match g.family {
            ArchitectureFamily::RouteAndSelect => wss(g),
            ArchitectureFamily::BroadcastAndSelect | ArchitectureFamily::Filterless => {
                InsertionLoss::splitter(self.d_out() + 1)
            }
        }
    }

    /// Stage on the output degree of a generic architecture.
    fn output_stage(&self, g: &GenericArchitecture) -> InsertionLoss {
        match g.family {
            ArchitectureFamily::RouteAndSelect | ArchitectureFamily::BroadcastAndSelect => wss(g),
            ArchitectureFamily::Filterless => InsertionLoss::splitter(self.d_in() + 1),
        }
    }

    /// The element of an add or drop module.
    fn module(&self, g: &GenericArchitecture) -> InsertionLoss {
        match g.add_drop_module {
            AddDropModuleType::MuxBased => InsertionLoss::new(g.mux_loss_db, g.mux_pmd_ps),
            AddDropModuleType::SwitchBased => wss(g),
        }
    }

    /// Loss and PMD of the path from the add port to an output fiber.
    pub fn add_loss(&self) -> InsertionLoss {
        match self.config {
            ArchitectureConfig::NonBlocking => default_mux().then(default_wss()),
            ArchitectureConfig::FilterlessBroadcast => InsertionLoss::splitter(self.d_in() + 1),
            ArchitectureConfig::Generic(g) => {
                let mut module = self.module(g);
                if g.directionless {
                    module = module.then(InsertionLoss::splitter(self.d_out()));
                }
                module.then(self.output_stage(g))
            }
        }
    }

    /// Loss and PMD of the path from an input fiber to the drop port.
    pub fn drop_loss(&self) -> InsertionLoss {
        match self.config {
            ArchitectureConfig::NonBlocking => default_wss().then(default_mux()),
            ArchitectureConfig::FilterlessBroadcast => {
                InsertionLoss::splitter(self.d_out() + 1)
                    .then(InsertionLoss::splitter(self.num_drop_modules))
            }
            ArchitectureConfig::Generic(g) => {
                let mut module = self.module(g);
                if g.directionless {
                    module = module.then(InsertionLoss::splitter(self.d_in()));
                }
                self.input_stage(g).then(module)
            }
        }
    }

    /// Loss and PMD of the path from an input fiber to an output fiber.
    pub fn express_loss(&self) -> InsertionLoss {
        match self.config {
            ArchitectureConfig::NonBlocking => default_wss().then(default_wss()),
            ArchitectureConfig::FilterlessBroadcast => InsertionLoss::splitter(self.d_out() + 1)
                .then(InsertionLoss::splitter(self.d_in() + 1)),
            ArchitectureConfig::Generic(g) => self.input_stage(g).then(self.output_stage(g)),
        }
    }

    /// Output power per 12.5 GHz the node equalizes every signal to, if configured.
    pub fn equalization_target_dbm(&self) -> Option<f64> {
        self.equalization_target_dbm
    }

    /// Total output power of a signal occupying `num_slots` after being added or expressed at this
    /// node, if the node equalizes its output power. A signal without slots is never equalized.
    pub fn equalized_power_dbm(&self, num_slots: usize, grid: &SlotGrid) -> Option<f64> {
        if num_slots == 0 {
            return None;
        }
        self.equalization_target_dbm.map(|target| {
            target + 10.0 * (grid.bandwidth_ghz(num_slots) / REFERENCE_BANDWIDTH_GHZ).log10()
        })
    }
}

/// WSS of a generic architecture
fn wss(g: &GenericArchitecture) -> InsertionLoss {
    InsertionLoss::new(g.wss_loss_db, g.wss_pmd_ps)
}

/// WSS with default parameters
fn default_wss() -> InsertionLoss {
    InsertionLoss::new(DEFAULT_WSS_LOSS_DB, DEFAULT_WSS_PMD_PS)
}

/// Multiplexer with default parameters
fn default_mux() -> InsertionLoss {
    InsertionLoss::new(DEFAULT_MUX_LOSS_DB, DEFAULT_MUX_PMD_PS)
}
