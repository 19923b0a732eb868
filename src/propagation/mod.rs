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

//! # Signal propagation of a single lightpath
//!
//! This module computes the [`OccupationInfo`] of a lightpath: the resources it legitimately
//! occupies (its route and its directionless modules) and the resources that receive a copy of its
//! signal because some node on the way cannot block it (waste). The waste is found by building the
//! [`PropagationGraph`] rooted at the add point and traversing it until closure.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use itertools::Itertools;
use log::*;
use optnet::{
    lightpath::Lightpath,
    network::Network,
    types::{DirectionlessModule, FiberId, LightpathId, NetworkError, SlotId},
};
use petgraph::{graph::NodeIndex, visit::EdgeRef, Directed, Direction, Graph};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::architecture::{ArchitectureError, SwitchingArchitecture};

pub mod all_loops;
pub use all_loops::{lasing_loops, lightpath_lasing_loops};

/// Error thrown while computing the propagation of a signal.
#[derive(Debug, Error, PartialEq)]
pub enum OccupationError {
    /// The signal added at the origin never reaches the drop port at the destination.
    #[error("The signal never reaches the drop port at the end of fiber {0:?}")]
    SignalNotReachingDrop(FiberId),
    /// Error of a switching architecture
    #[error("{0}")]
    Architecture(#[from] ArchitectureError),
    /// Network error
    #[error("{0}")]
    Network(#[from] NetworkError),
}

/// Vertex of the propagation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Vertex {
    /// Sentinel where the signal is added.
    Add,
    /// Sentinel where the signal is received.
    Drop,
    /// A fiber
    Fiber(FiberId),
    /// A directionless add module
    AddModule(DirectionlessModule),
    /// A directionless drop module
    DropModule(DirectionlessModule),
}

/// The propagation graph of a single lightpath. There is an edge from `a` to `b` if the signal on
/// `a` is forwarded to `b`. Only vertices reachable from [`Vertex::Add`] are part of the graph.
#[derive(Debug, Clone)]
pub struct PropagationGraph {
    /// The graph itself
    graph: Graph<Vertex, (), Directed, u32>,
    /// Lookup of the vertex index
    index: HashMap<Vertex, NodeIndex<u32>>,
}

impl PropagationGraph {
    /// Build the propagation graph of a signal added at the origin of `fibers[0]` and dropped at
    /// the end of the last fiber. The route must be checked before.
    pub fn build(
        net: &Network,
        fibers: &[FiberId],
        add_module: Option<DirectionlessModule>,
        drop_module: Option<DirectionlessModule>,
    ) -> Result<Self, OccupationError> {
        let first = *fibers.first().ok_or(NetworkError::EmptyRoute)?;
        let last = *fibers.last().ok_or(NetworkError::EmptyRoute)?;

        // positions of each fiber in the route (the route may repeat a fiber)
        let mut positions: HashMap<FiberId, Vec<usize>> = HashMap::new();
        fibers
            .iter()
            .enumerate()
            .for_each(|(i, f)| positions.entry(*f).or_default().push(i));

        let mut pg = Self {
            graph: Graph::default(),
            index: HashMap::new(),
        };
        let mut todo = VecDeque::from([Vertex::Add]);
        pg.vertex(Vertex::Add);

        while let Some(v) = todo.pop_front() {
            let next: Vec<Vertex> = match v {
                Vertex::Add => match add_module {
                    Some(m) => vec![Vertex::AddModule(m)],
                    None => add_outputs(net, first, false)?,
                },
                Vertex::AddModule(_) => add_outputs(net, first, true)?,
                Vertex::Fiber(f) => {
                    let arch = SwitchingArchitecture::at_fiber_end(net, f)?;
                    let mut next: BTreeSet<Vertex> = arch
                        .outputs_unavoidable(f)?
                        .into_iter()
                        .map(Vertex::Fiber)
                        .collect();
                    next.extend(
                        arch.drop_modules_unavoidable(f)?
                            .into_iter()
                            .map(Vertex::DropModule),
                    );
                    for i in positions.get(&f).into_iter().flatten() {
                        if let Some(out) = fibers.get(i + 1) {
                            next.extend(
                                arch.outputs_on_express(f, *out)?
                                    .into_iter()
                                    .map(Vertex::Fiber),
                            );
                        }
                    }
                    if f == last {
                        next.extend(arch.outputs_on_drop(f)?.into_iter().map(Vertex::Fiber));
                        next.insert(drop_module.map(Vertex::DropModule).unwrap_or(Vertex::Drop));
                    }
                    next.into_iter().collect()
                }
                Vertex::DropModule(m) if Some(m) == drop_module => vec![Vertex::Drop],
                Vertex::DropModule(_) | Vertex::Drop => Vec::new(),
            };

            let from = pg.vertex(v);
            for n in next {
                let is_new = !pg.index.contains_key(&n);
                let to = pg.vertex(n);
                pg.graph.update_edge(from, to, ());
                if is_new {
                    todo.push_back(n);
                }
            }
        }

        if !pg.index.contains_key(&Vertex::Drop) {
            return Err(OccupationError::SignalNotReachingDrop(last));
        }

        Ok(pg)
    }

    /// Get the index of a vertex, or create it.
    fn vertex(&mut self, v: Vertex) -> NodeIndex<u32> {
        if let Some(idx) = self.index.get(&v) {
            *idx
        } else {
            let idx = self.graph.add_node(v);
            self.index.insert(v, idx);
            idx
        }
    }

    /// Iterate over all vertices reached by the signal.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.graph.node_weights().copied()
    }

    /// Check if the signal reaches `v`.
    pub fn contains(&self, v: Vertex) -> bool {
        self.index.contains_key(&v)
    }

    /// All vertices that forward the signal directly to `v`.
    pub fn predecessors(&self, v: Vertex) -> BTreeSet<Vertex> {
        self.index
            .get(&v)
            .map(|idx| {
                self.graph
                    .edges_directed(*idx, Direction::Incoming)
                    .map(|e| self.graph[e.source()])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All vertices to which `v` directly forwards the signal.
    pub fn successors(&self, v: Vertex) -> BTreeSet<Vertex> {
        self.index
            .get(&v)
            .map(|idx| self.graph.neighbors(*idx).map(|n| self.graph[n]).collect())
            .unwrap_or_default()
    }

    /// All edges between two fibers, i.e., the propagation graph restricted to fibers.
    pub fn fiber_edges(&self) -> Vec<(FiberId, FiberId)> {
        self.graph
            .edge_references()
            .filter_map(|e| match (self.graph[e.source()], self.graph[e.target()]) {
                (Vertex::Fiber(a), Vertex::Fiber(b)) => Some((a, b)),
                _ => None,
            })
            .collect()
    }
}

/// Fibers reached when adding the signal towards `first`.
fn add_outputs(
    net: &Network,
    first: FiberId,
    directionless: bool,
) -> Result<Vec<Vertex>, OccupationError> {
    let origin = net.get_fiber(first)?.source();
    Ok(SwitchingArchitecture::of(net, origin)?
        .outputs_on_add(first, directionless)?
        .into_iter()
        .map(Vertex::Fiber)
        .collect())
}

/// # Occupation of a lightpath
///
/// The legitimate resources of a lightpath (its route and directionless modules), together with
/// the waste resources that receive a copy of its signal, and whether the lightpath clashes with
/// itself. The info is computed once, from the current route. Recompute it after rerouting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OccupationInfo {
    /// Legitimate route
    legit_fibers: Vec<FiberId>,
    /// Legitimate add module
    legit_add_module: Option<DirectionlessModule>,
    /// Legitimate drop module
    legit_drop_module: Option<DirectionlessModule>,
    /// Slots occupied on every resource, if known.
    slots: Option<BTreeSet<SlotId>>,
    /// Fibers not on the route that receive the signal
    waste_fibers: BTreeSet<FiberId>,
    /// Add modules that receive the signal, other than the legitimate one.
    waste_add_modules: BTreeSet<DirectionlessModule>,
    /// Drop modules that receive the signal, other than the legitimate one.
    waste_drop_modules: BTreeSet<DirectionlessModule>,
    /// Whether the signal interferes with itself.
    self_clashing: bool,
}

impl OccupationInfo {
    /// Compute the occupation of a signal along `fibers`, added through the directionless add
    /// module `add_module` at the origin (if any), and dropped through the directionless drop
    /// module `drop_module` at the destination (if any). `slots` may be `None` if the info is used
    /// to search for free slots.
    pub fn new(
        net: &Network,
        fibers: Vec<FiberId>,
        add_module: Option<usize>,
        drop_module: Option<usize>,
        slots: Option<BTreeSet<SlotId>>,
    ) -> Result<Self, OccupationError> {
        net.check_route(&fibers)?;
        let (origin, destination) = net.route_endpoints(&fibers)?;
        let add_module = add_module.map(|i| DirectionlessModule::new(origin, i));
        let drop_module = drop_module.map(|i| DirectionlessModule::new(destination, i));
        if let Some(m) = add_module {
            net.check_add_module(m)?;
        }
        if let Some(m) = drop_module {
            net.check_drop_module(m)?;
        }

        let mut seen = HashSet::new();
        let repeats_fiber = !fibers.iter().all(|f| seen.insert(*f));

        let mut info = Self {
            legit_fibers: fibers,
            legit_add_module: add_module,
            legit_drop_module: drop_module,
            slots,
            waste_fibers: BTreeSet::new(),
            waste_add_modules: BTreeSet::new(),
            waste_drop_modules: BTreeSet::new(),
            self_clashing: repeats_fiber,
        };

        // fast path: no node on the route can leak the signal.
        let mut nodes = vec![origin];
        for f in info.legit_fibers.iter() {
            nodes.push(net.get_fiber(*f)?.target());
        }
        let mut never_waste = true;
        for n in nodes {
            if !SwitchingArchitecture::of(net, n)?.is_never_creating_waste() {
                never_waste = false;
                break;
            }
        }
        if never_waste {
            return Ok(info);
        }

        let pg = PropagationGraph::build(net, &info.legit_fibers, add_module, drop_module)?;

        for v in pg.vertices() {
            match v {
                Vertex::Fiber(f) if !info.legit_fibers.contains(&f) => {
                    info.waste_fibers.insert(f);
                }
                Vertex::AddModule(m) if Some(m) != add_module => {
                    info.waste_add_modules.insert(m);
                }
                Vertex::DropModule(m) if Some(m) != drop_module => {
                    info.waste_drop_modules.insert(m);
                }
                _ => {}
            }
        }

        if !info.self_clashing {
            info.self_clashing = info.reached_as_waste(&pg);
        }

        if info.self_clashing {
            debug!(
                "Signal along {:?} interferes with itself",
                info.legit_fibers.iter().map(|f| f.index()).collect_vec()
            );
        }

        Ok(info)
    }

    /// Compute the occupation info of a lightpath using its current route, modules and slots.
    pub fn of_lightpath(net: &Network, lp: LightpathId) -> Result<Self, OccupationError> {
        let l: &Lightpath = net.get_lightpath(lp)?;
        Self::new(
            net,
            l.fibers().to_vec(),
            l.add_module(),
            l.drop_module(),
            Some(l.slots().clone()),
        )
    }

    /// Check if any legitimate resource receives the signal from a vertex other than its
    /// legitimate predecessor.
    fn reached_as_waste(&self, pg: &PropagationGraph) -> bool {
        let first_pred = match self.legit_add_module {
            Some(m) => Vertex::AddModule(m),
            None => Vertex::Add,
        };
        let mut legit: Vec<(Vertex, Vertex)> = Vec::new();
        if let Some(m) = self.legit_add_module {
            legit.push((Vertex::AddModule(m), Vertex::Add));
        }
        for (i, f) in self.legit_fibers.iter().enumerate() {
            let pred = if i == 0 {
                first_pred
            } else {
                Vertex::Fiber(self.legit_fibers[i - 1])
            };
            legit.push((Vertex::Fiber(*f), pred));
        }
        if let (Some(m), Some(last)) = (self.legit_drop_module, self.legit_fibers.last()) {
            legit.push((Vertex::DropModule(m), Vertex::Fiber(*last)));
        }

        legit
            .into_iter()
            .any(|(v, pred)| pg.predecessors(v).into_iter().any(|p| p != pred))
    }

    /// Return a copy of this info with a different slot set.
    pub fn with_slots(mut self, slots: impl IntoIterator<Item = SlotId>) -> Self {
        self.slots = Some(slots.into_iter().collect());
        self
    }

    /// The legitimate route
    pub fn legit_fibers(&self) -> &[FiberId] {
        &self.legit_fibers
    }

    /// The legitimate directionless add module
    pub fn legit_add_module(&self) -> Option<DirectionlessModule> {
        self.legit_add_module
    }

    /// The legitimate directionless drop module
    pub fn legit_drop_module(&self) -> Option<DirectionlessModule> {
        self.legit_drop_module
    }

    /// The slots requested on each resource, if known.
    pub fn slots(&self) -> Option<&BTreeSet<SlotId>> {
        self.slots.as_ref()
    }

    /// Fibers reached by the signal that are not on the route.
    pub fn waste_fibers(&self) -> &BTreeSet<FiberId> {
        &self.waste_fibers
    }

    /// Add modules reached by the signal, other than the legitimate one.
    pub fn waste_add_modules(&self) -> &BTreeSet<DirectionlessModule> {
        &self.waste_add_modules
    }

    /// Drop modules reached by the signal, other than the legitimate one.
    pub fn waste_drop_modules(&self) -> &BTreeSet<DirectionlessModule> {
        &self.waste_drop_modules
    }

    /// Returns `true` if the route repeats a fiber, or if the signal reaches a legitimate
    /// resource as waste. Such an occupation can never be allocated.
    pub fn is_self_clashing(&self) -> bool {
        self.self_clashing
    }

    /// Returns `true` if the signal never reaches any resource except the legitimate ones.
    pub fn is_waste_free(&self) -> bool {
        self.waste_fibers.is_empty()
            && self.waste_add_modules.is_empty()
            && self.waste_drop_modules.is_empty()
    }

    /// All fibers reached by the signal, legitimate or waste.
    pub fn all_fibers(&self) -> BTreeSet<FiberId> {
        self.legit_fibers
            .iter()
            .chain(self.waste_fibers.iter())
            .copied()
            .collect()
    }

    /// All add modules reached by the signal, legitimate or waste.
    pub fn all_add_modules(&self) -> BTreeSet<DirectionlessModule> {
        self.legit_add_module
            .iter()
            .chain(self.waste_add_modules.iter())
            .copied()
            .collect()
    }

    /// All drop modules reached by the signal, legitimate or waste.
    pub fn all_drop_modules(&self) -> BTreeSet<DirectionlessModule> {
        self.legit_drop_module
            .iter()
            .chain(self.waste_drop_modules.iter())
            .copied()
            .collect()
    }

    /// Returns `true` if the legitimate resources of `self` are never reached by `other`, and the
    /// legitimate resources of `other` are never reached by `self`.
    pub fn is_mutually_clashing_free_with(&self, other: &Self) -> bool {
        self.legit_clashing_free_with(other) && other.legit_clashing_free_with(self)
    }

    /// One direction of [`OccupationInfo::is_mutually_clashing_free_with`].
    fn legit_clashing_free_with(&self, other: &Self) -> bool {
        let other_fibers = other.all_fibers();
        if self.legit_fibers.iter().any(|f| other_fibers.contains(f)) {
            return false;
        }
        if let Some(m) = self.legit_add_module {
            if other.all_add_modules().contains(&m) {
                return false;
            }
        }
        if let Some(m) = self.legit_drop_module {
            if other.all_drop_modules().contains(&m) {
                return false;
            }
        }
        true
    }
}
