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

//! # Top-level Network module
//!
//! This module represents the physical topology (nodes and fibers), the configuration of every
//! node, and all lightpaths established in the network.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use log::*;
use petgraph::{visit::EdgeRef, Direction};
use serde::{Deserialize, Serialize};

use crate::{
    fiber::{Amplifier, Fiber},
    lightpath::{Lightpath, Transponder},
    node::{ArchitectureConfig, OadmNode},
    types::{
        DirectionlessModule, FiberId, LightpathId, NetworkError, NodeId, SlotGrid, SlotId,
        SlotRange, Topology,
    },
};

/// Slots that are valid on a newly created fiber: 320 slots of 12.5 GHz (4 THz).
pub const DEFAULT_VALID_SLOTS: SlotRange = SlotRange {
    first: 0,
    last: 319,
};

/// # Network struct
/// The struct contains the physical topology, the configuration of all nodes, and all lightpaths.
///
/// ```rust
/// use optnet::prelude::*;
///
/// fn main() -> Result<(), NetworkError> {
///     let mut net = Network::default();
///
///     // add two nodes and connect them with a pair of fibers of 80 km.
///     let a = net.add_node("a");
///     let b = net.add_node("b");
///     let (ab, _ba) = net.add_link(a, b, 80.0)?;
///
///     // establish a lightpath on slots 0 to 3
///     let lp = net.add_lightpath("a-b", vec![ab], 0..4)?;
///     assert_eq!(net.get_lightpath(lp)?.slots().len(), 4);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub(crate) topology: Topology,
    pub(crate) lightpaths: BTreeMap<LightpathId, Lightpath>,
    pub(crate) next_lightpath: u32,
    pub(crate) grid: SlotGrid,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(SlotGrid::default())
    }
}

impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
            && self.lightpaths == other.lightpaths
            && self.topology.node_indices().collect_vec()
                == other.topology.node_indices().collect_vec()
            && self.topology.edge_indices().collect_vec()
                == other.topology.edge_indices().collect_vec()
            && self
                .topology
                .node_indices()
                .all(|n| self.topology.node_weight(n) == other.topology.node_weight(n))
            && self
                .topology
                .edge_indices()
                .all(|e| self.topology.edge_weight(e) == other.topology.edge_weight(e))
    }
}

impl Network {
    /// Generate an empty network using the given frequency grid.
    pub fn new(grid: SlotGrid) -> Self {
        Self {
            topology: Topology::default(),
            lightpaths: BTreeMap::new(),
            next_lightpath: 0,
            grid,
        }
    }

    /// Add a new node to the topology. The node is non-blocking and has no directionless modules.
    /// This function returns the ID of the node.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        let id = self.topology.add_node(OadmNode::new(name, NodeId::end()));
        self.topology[id].node_id = id;
        id
    }

    /// Add a single unidirectional fiber from `source` to `target`. The fiber uses the default
    /// coefficients, no amplifiers, and [`DEFAULT_VALID_SLOTS`].
    pub fn add_fiber(
        &mut self,
        source: NodeId,
        target: NodeId,
        length_km: f64,
    ) -> Result<FiberId, NetworkError> {
        self.get_node(source)?;
        self.get_node(target)?;
        let mut fiber = Fiber::new(source, target, length_km);
        fiber.valid_slots = vec![DEFAULT_VALID_SLOTS];
        Ok(self.topology.add_edge(source, target, fiber))
    }

    /// Add a pair of fibers between `a` and `b` (one in each direction), and mark them as a
    /// bidirectional pair. Returns the fiber `a -> b` and the fiber `b -> a`.
    pub fn add_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        length_km: f64,
    ) -> Result<(FiberId, FiberId), NetworkError> {
        let ab = self.add_fiber(a, b, length_km)?;
        let ba = self.add_fiber(b, a, length_km)?;
        self.set_bidi_pair(ab, ba)?;
        Ok((ab, ba))
    }

    /// Mark two fibers as a bidirectional pair.
    pub fn set_bidi_pair(&mut self, a: FiberId, b: FiberId) -> Result<(), NetworkError> {
        self.get_fiber_mut(a)?.bidi_pair = Some(b);
        self.get_fiber_mut(b)?.bidi_pair = Some(a);
        Ok(())
    }

    // ************************
    // * Node configuration   *
    // ************************

    /// Set the switching architecture of a node.
    pub fn set_architecture(
        &mut self,
        node: NodeId,
        architecture: ArchitectureConfig,
    ) -> Result<(), NetworkError> {
        debug!(
            "Set architecture of {} to {:?}",
            self.get_node_name(node)?,
            architecture
        );
        self.get_node_mut(node)?.architecture = architecture;
        Ok(())
    }

    /// Set the number of directionless add and drop modules of a node.
    pub fn set_num_modules(
        &mut self,
        node: NodeId,
        num_add: usize,
        num_drop: usize,
    ) -> Result<(), NetworkError> {
        let n = self.get_node_mut(node)?;
        n.num_add_modules = num_add;
        n.num_drop_modules = num_drop;
        Ok(())
    }

    /// Configure the output power (per 12.5 GHz) the node equalizes every lightpath to. Set to
    /// `None` to disable equalization.
    pub fn set_equalization_target(
        &mut self,
        node: NodeId,
        target_dbm: Option<f64>,
    ) -> Result<(), NetworkError> {
        self.get_node_mut(node)?.equalization_target_dbm = target_dbm;
        Ok(())
    }

    // ************************
    // * Fiber configuration  *
    // ************************

    /// Replace the valid slot ranges of a fiber.
    pub fn set_valid_slots(
        &mut self,
        fiber: FiberId,
        ranges: impl IntoIterator<Item = SlotRange>,
    ) -> Result<(), NetworkError> {
        self.get_fiber_mut(fiber)?.valid_slots = ranges.into_iter().collect();
        Ok(())
    }

    /// Set the attenuation (dB/km), chromatic dispersion (ps/nm/km) and PMD (ps/sqrt(km))
    /// coefficients of a fiber.
    pub fn set_fiber_coefficients(
        &mut self,
        fiber: FiberId,
        attenuation_db_per_km: f64,
        cd_ps_per_nm_km: f64,
        pmd_ps_per_sqrt_km: f64,
    ) -> Result<(), NetworkError> {
        let f = self.get_fiber_mut(fiber)?;
        f.attenuation_db_per_km = attenuation_db_per_km;
        f.cd_ps_per_nm_km = cd_ps_per_nm_km;
        f.pmd_ps_per_sqrt_km = pmd_ps_per_sqrt_km;
        Ok(())
    }

    /// Add an inline amplifier. Amplifiers are kept ordered by their position, which must lie
    /// within the fiber.
    pub fn add_amplifier(&mut self, fiber: FiberId, amp: Amplifier) -> Result<(), NetworkError> {
        let f = self.get_fiber_mut(fiber)?;
        if !(0.0..=f.length_km).contains(&amp.position_km) {
            return Err(NetworkError::AmplifierOutsideFiber(fiber, amp.position_km));
        }
        let pos = f
            .amplifiers
            .iter()
            .position(|a| a.position_km > amp.position_km)
            .unwrap_or(f.amplifiers.len());
        f.amplifiers.insert(pos, amp);
        Ok(())
    }

    /// Place (or remove) the booster amplifier at the origin of the fiber.
    pub fn set_booster(
        &mut self,
        fiber: FiberId,
        amp: Option<Amplifier>,
    ) -> Result<(), NetworkError> {
        self.get_fiber_mut(fiber)?.booster = amp.map(|mut a| {
            a.position_km = 0.0;
            a
        });
        Ok(())
    }

    /// Place (or remove) the preamplifier at the end of the fiber.
    pub fn set_preamplifier(
        &mut self,
        fiber: FiberId,
        amp: Option<Amplifier>,
    ) -> Result<(), NetworkError> {
        let f = self.get_fiber_mut(fiber)?;
        let length = f.length_km;
        f.preamplifier = amp.map(|mut a| {
            a.position_km = length;
            a
        });
        Ok(())
    }

    // ************************
    // * Lightpaths           *
    // ************************

    /// Establish a new lightpath along `fibers`, occupying `slots` on every fiber. The route must
    /// be non-empty and contiguous. The lightpath uses the default [`Transponder`], a line rate of
    /// 100 Gbps, and no directionless modules.
    pub fn add_lightpath(
        &mut self,
        name: impl Into<String>,
        fibers: Vec<FiberId>,
        slots: impl IntoIterator<Item = SlotId>,
    ) -> Result<LightpathId, NetworkError> {
        self.check_route(&fibers)?;
        let id = LightpathId(self.next_lightpath);
        self.next_lightpath += 1;
        let lp = Lightpath {
            id,
            name: name.into(),
            fibers,
            slots: slots.into_iter().collect(),
            add_module: None,
            drop_module: None,
            line_rate_gbps: 100.0,
            transponder: Transponder::default(),
            backup_of: None,
        };
        debug!("Add lightpath {} ({}) on slots {:?}", id, lp.name, lp.slots);
        self.lightpaths.insert(id, lp);
        Ok(id)
    }

    /// Change the route and the slots of a lightpath.
    pub fn reroute_lightpath(
        &mut self,
        lp: LightpathId,
        fibers: Vec<FiberId>,
        slots: impl IntoIterator<Item = SlotId>,
    ) -> Result<(), NetworkError> {
        self.check_route(&fibers)?;
        let (origin, destination) = self.route_endpoints(&fibers)?;
        let (add, drop) = {
            let l = self.get_lightpath(lp)?;
            (l.add_module, l.drop_module)
        };
        if let Some(i) = add {
            self.check_add_module(DirectionlessModule::new(origin, i))?;
        }
        if let Some(i) = drop {
            self.check_drop_module(DirectionlessModule::new(destination, i))?;
        }
        let l = self.get_lightpath_mut(lp)?;
        l.fibers = fibers;
        l.slots = slots.into_iter().collect();
        debug!("Reroute lightpath {}", lp);
        Ok(())
    }

    /// Set the directionless add module (at the origin) and drop module (at the destination) of
    /// a lightpath.
    pub fn set_lightpath_modules(
        &mut self,
        lp: LightpathId,
        add_module: Option<usize>,
        drop_module: Option<usize>,
    ) -> Result<(), NetworkError> {
        let (origin, destination) = self.route_endpoints(self.get_lightpath(lp)?.fibers())?;
        if let Some(i) = add_module {
            self.check_add_module(DirectionlessModule::new(origin, i))?;
        }
        if let Some(i) = drop_module {
            self.check_drop_module(DirectionlessModule::new(destination, i))?;
        }
        let l = self.get_lightpath_mut(lp)?;
        l.add_module = add_module;
        l.drop_module = drop_module;
        Ok(())
    }

    /// Set the transponder of a lightpath.
    pub fn set_transponder(
        &mut self,
        lp: LightpathId,
        transponder: Transponder,
    ) -> Result<(), NetworkError> {
        self.get_lightpath_mut(lp)?.transponder = transponder;
        Ok(())
    }

    /// Set the line rate (in Gbps) of a lightpath.
    pub fn set_line_rate(&mut self, lp: LightpathId, rate_gbps: f64) -> Result<(), NetworkError> {
        self.get_lightpath_mut(lp)?.line_rate_gbps = rate_gbps;
        Ok(())
    }

    /// Mark `backup` as the 1+1 backup of `primary`.
    pub fn set_backup_of(
        &mut self,
        backup: LightpathId,
        primary: LightpathId,
    ) -> Result<(), NetworkError> {
        self.get_lightpath(primary)?;
        self.get_lightpath_mut(backup)?.backup_of = Some(primary);
        Ok(())
    }

    /// Remove a lightpath from the network. Backups of that lightpath are no longer marked as
    /// backup.
    pub fn remove_lightpath(&mut self, lp: LightpathId) -> Result<Lightpath, NetworkError> {
        let removed = self
            .lightpaths
            .remove(&lp)
            .ok_or(NetworkError::LightpathNotFound(lp))?;
        self.lightpaths
            .values_mut()
            .filter(|l| l.backup_of == Some(lp))
            .for_each(|l| l.backup_of = None);
        debug!("Remove lightpath {}", lp);
        Ok(removed)
    }

    // ********************
    // * Helper Functions *
    // ********************

    /// Returns a reference to the network topology (PetGraph struct)
    pub fn get_topology(&self) -> &Topology {
        &self.topology
    }

    /// Return the frequency grid of the network.
    pub fn slot_grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Returns the number of nodes in the topology
    pub fn num_nodes(&self) -> usize {
        self.topology.node_count()
    }

    /// Returns the number of fibers in the topology
    pub fn num_fibers(&self) -> usize {
        self.topology.edge_count()
    }

    /// Returns a list of all node IDs, in increasing order
    pub fn get_nodes(&self) -> Vec<NodeId> {
        self.topology.node_indices().collect()
    }

    /// Returns a list of all fiber IDs, in increasing order
    pub fn get_fibers(&self) -> Vec<FiberId> {
        self.topology.edge_indices().collect()
    }

    /// Return a reference to the node configuration.
    pub fn get_node(&self, node: NodeId) -> Result<&OadmNode, NetworkError> {
        self.topology
            .node_weight(node)
            .ok_or(NetworkError::NodeNotFound(node))
    }

    fn get_node_mut(&mut self, node: NodeId) -> Result<&mut OadmNode, NetworkError> {
        self.topology
            .node_weight_mut(node)
            .ok_or(NetworkError::NodeNotFound(node))
    }

    /// Returns the name of the node, if the ID was found.
    pub fn get_node_name(&self, node: NodeId) -> Result<&str, NetworkError> {
        Ok(self.get_node(node)?.name())
    }

    /// Get the NodeId with the given name. If multiple nodes have the same name, then the first
    /// occurence of this name is returned. If the name was not found, an error is returned.
    pub fn get_node_id(&self, name: impl AsRef<str>) -> Result<NodeId, NetworkError> {
        self.topology
            .node_indices()
            .find(|n| self.topology[*n].name() == name.as_ref())
            .ok_or_else(|| NetworkError::NodeNameNotFound(name.as_ref().to_string()))
    }

    /// Return a reference to the fiber.
    pub fn get_fiber(&self, fiber: FiberId) -> Result<&Fiber, NetworkError> {
        self.topology
            .edge_weight(fiber)
            .ok_or(NetworkError::FiberNotFound(fiber))
    }

    pub(crate) fn get_fiber_mut(&mut self, fiber: FiberId) -> Result<&mut Fiber, NetworkError> {
        self.topology
            .edge_weight_mut(fiber)
            .ok_or(NetworkError::FiberNotFound(fiber))
    }

    /// All fibers leaving `node`, in increasing order.
    pub fn get_out_fibers(&self, node: NodeId) -> Result<BTreeSet<FiberId>, NetworkError> {
        self.get_node(node)?;
        Ok(self
            .topology
            .edges_directed(node, Direction::Outgoing)
            .map(|e| e.id())
            .collect())
    }

    /// All fibers entering `node`, in increasing order.
    pub fn get_in_fibers(&self, node: NodeId) -> Result<BTreeSet<FiberId>, NetworkError> {
        self.get_node(node)?;
        Ok(self
            .topology
            .edges_directed(node, Direction::Incoming)
            .map(|e| e.id())
            .collect())
    }

    /// All fibers from `a` to `b`, in increasing order.
    pub fn get_fibers_between(&self, a: NodeId, b: NodeId) -> Result<Vec<FiberId>, NetworkError> {
        self.get_node(a)?;
        self.get_node(b)?;
        Ok(self
            .topology
            .edges_directed(a, Direction::Outgoing)
            .filter(|e| e.target() == b)
            .map(|e| e.id())
            .sorted()
            .collect())
    }

    /// Return a reference to a lightpath.
    pub fn get_lightpath(&self, lp: LightpathId) -> Result<&Lightpath, NetworkError> {
        self.lightpaths
            .get(&lp)
            .ok_or(NetworkError::LightpathNotFound(lp))
    }

    fn get_lightpath_mut(&mut self, lp: LightpathId) -> Result<&mut Lightpath, NetworkError> {
        self.lightpaths
            .get_mut(&lp)
            .ok_or(NetworkError::LightpathNotFound(lp))
    }

    /// Iterate over all lightpaths, ordered by their ID.
    pub fn get_lightpaths(&self) -> impl Iterator<Item = &Lightpath> {
        self.lightpaths.values()
    }

    /// Return the IDs of all lightpaths, ordered.
    pub fn get_lightpath_ids(&self) -> Vec<LightpathId> {
        self.lightpaths.keys().copied().collect()
    }

    /// All lightpaths whose route traverses `fiber`.
    pub fn get_lightpaths_on_fiber(&self, fiber: FiberId) -> Vec<LightpathId> {
        self.lightpaths
            .values()
            .filter(|l| l.fibers.contains(&fiber))
            .map(|l| l.id)
            .collect()
    }

    /// Check that a route is non-empty, that all fibers exist, and that every fiber starts where
    /// the previous one ends.
    pub fn check_route(&self, fibers: &[FiberId]) -> Result<(), NetworkError> {
        if fibers.is_empty() {
            return Err(NetworkError::EmptyRoute);
        }
        for f in fibers {
            self.get_fiber(*f)?;
        }
        for (a, b) in fibers.iter().tuple_windows() {
            if self.topology[*a].target != self.topology[*b].source {
                return Err(NetworkError::DisconnectedRoute(*a, *b));
            }
        }
        Ok(())
    }

    /// Return the origin and the destination node of a route.
    pub fn route_endpoints(&self, fibers: &[FiberId]) -> Result<(NodeId, NodeId), NetworkError> {
        let first = fibers.first().ok_or(NetworkError::EmptyRoute)?;
        let last = fibers.last().ok_or(NetworkError::EmptyRoute)?;
        Ok((self.get_fiber(*first)?.source, self.get_fiber(*last)?.target))
    }

    /// Check that the directionless add module exists.
    pub fn check_add_module(&self, module: DirectionlessModule) -> Result<(), NetworkError> {
        if module.index < self.get_node(module.node)?.num_add_modules {
            Ok(())
        } else {
            Err(NetworkError::ModuleNotFound(module.node, module.index))
        }
    }

    /// Check that the directionless drop module exists.
    pub fn check_drop_module(&self, module: DirectionlessModule) -> Result<(), NetworkError> {
        if module.index < self.get_node(module.node)?.num_drop_modules {
            Ok(())
        } else {
            Err(NetworkError::ModuleNotFound(module.node, module.index))
        }
    }

    /// Serialize the network into a json string.
    pub fn as_json_str(&self) -> String {
        // serializing plain data structures cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Read the network from a json string generated by [`Network::as_json_str`].
    pub fn from_json_str(s: &str) -> Result<Self, NetworkError> {
        let net: Self = serde_json::from_str(s)?;
        info!(
            "Loaded network with {} nodes, {} fibers and {} lightpaths",
            net.num_nodes(),
            net.num_fibers(),
            net.lightpaths.len()
        );
        Ok(net)
    }
}
