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

//! Module containing all type definitions

use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{fiber::Fiber, node::OadmNode};

mod slots;
pub use slots::{slots_of, SlotGrid, SlotId, SlotRange};

pub(crate) type IndexType = u32;
/// Node Identification (and index into the graph)
pub type NodeId = NodeIndex<IndexType>;
/// Fiber Identification (and index into the graph). Every fiber is a directed edge.
pub type FiberId = EdgeIndex<IndexType>;

/// Physical topology. Nodes carry the OADM configuration, edges carry the fiber parameters.
pub type Topology = StableGraph<OadmNode, Fiber, Directed, IndexType>;

/// Lightpath identification
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightpathId(pub u32);

impl std::fmt::Display for LightpathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LP{}", self.0)
    }
}

impl From<u32> for LightpathId {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

/// A directionless add or drop module. Such a module is not bound to any degree of the node, but
/// shared by all fibers at that node. It is tracked as its own spectrum resource.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectionlessModule {
    /// Node at which the module is installed.
    pub node: NodeId,
    /// Index of the module at that node.
    pub index: usize,
}

impl DirectionlessModule {
    /// Create a new module identifier.
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

/// Network Errors
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Node is not present in the topology
    #[error("Node was not found in topology: {0:?}")]
    NodeNotFound(NodeId),
    /// Node name is not present in the topology
    #[error("Node name was not found in topology: {0}")]
    NodeNameNotFound(String),
    /// Fiber is not present in the topology. This also happens when using a fiber of a different
    /// network.
    #[error("Fiber was not found in topology: {0:?}")]
    FiberNotFound(FiberId),
    /// Lightpath is not present in the network
    #[error("Lightpath was not found in the network: {0}")]
    LightpathNotFound(LightpathId),
    /// A route must contain at least one fiber.
    #[error("The route does not contain any fiber")]
    EmptyRoute,
    /// Two consecutive fibers of a route do not share a node.
    #[error("Route is disconnected between fibers {0:?} and {1:?}")]
    DisconnectedRoute(FiberId, FiberId),
    /// The directionless module does not exist at that node.
    #[error("Directionless module {1} does not exist at node {0:?}")]
    ModuleNotFound(NodeId, usize),
    /// An inline amplifier is placed before the origin or after the end of the fiber.
    #[error("Amplifier at {1} km is outside of fiber {0:?}")]
    AmplifierOutsideFiber(FiberId, f64),
    /// A slot range has its lower bound above its upper bound.
    #[error("Invalid slot range: {0} > {1}")]
    InvalidSlotRange(SlotId, SlotId),
    /// Json error
    #[error("{0}")]
    JsonError(Box<serde_json::Error>),
}

impl From<serde_json::Error> for NetworkError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonError(Box::new(value))
    }
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NodeNotFound(l0), Self::NodeNotFound(r0)) => l0 == r0,
            (Self::NodeNameNotFound(l0), Self::NodeNameNotFound(r0)) => l0 == r0,
            (Self::FiberNotFound(l0), Self::FiberNotFound(r0)) => l0 == r0,
            (Self::LightpathNotFound(l0), Self::LightpathNotFound(r0)) => l0 == r0,
            (Self::DisconnectedRoute(l0, l1), Self::DisconnectedRoute(r0, r1)) => {
                l0 == r0 && l1 == r1
            }
            (Self::ModuleNotFound(l0, l1), Self::ModuleNotFound(r0, r1)) => l0 == r0 && l1 == r1,
            (Self::AmplifierOutsideFiber(l0, l1), Self::AmplifierOutsideFiber(r0, r1)) => {
                l0 == r0 && l1 == r1
            }
            (Self::InvalidSlotRange(l0, l1), Self::InvalidSlotRange(r0, r1)) => {
                l0 == r0 && l1 == r1
            }
            (Self::JsonError(l), Self::JsonError(r)) => l.to_string() == r.to_string(),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}
