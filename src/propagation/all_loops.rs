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

//! Module to compute all lasing loops, i.e., simple cycles of unavoidable propagation.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::*;
use optnet::{network::Network, types::FiberId};
use petgraph::{algo::tarjan_scc, graph::NodeIndex, stable_graph::StableGraph};

use super::{OccupationError, OccupationInfo, PropagationGraph};
use crate::architecture::SwitchingArchitecture;

/// Graph type with one vertex per fiber and no edge labels.
type Graph = StableGraph<FiberId, (), petgraph::Directed, u32>;

/// Vertex of the loop graph
type Idx = NodeIndex<u32>;

/// Compute all lasing loops of the network. There is an edge from fiber `f` to fiber `g` if the
/// node at the end of `f` forwards any signal arriving on `f` to `g`, independent of how it is
/// switched. Every returned loop starts at its smallest fiber, and the loops are sorted.
pub fn lasing_loops(net: &Network) -> Result<Vec<Vec<FiberId>>, OccupationError> {
    let mut edges = Vec::new();
    for f in net.get_fibers() {
        let arch = SwitchingArchitecture::at_fiber_end(net, f)?;
        for g in arch.outputs_unavoidable(f)? {
            edges.push((f, g));
        }
    }
    let loops = simple_cycles(net.get_fibers(), edges);
    if !loops.is_empty() {
        warn!("Found {} lasing loops in the network", loops.len());
    }
    Ok(loops)
}

/// Compute all loops in the propagation graph of a single lightpath, only considering fibers.
pub fn lightpath_lasing_loops(
    net: &Network,
    info: &OccupationInfo,
) -> Result<Vec<Vec<FiberId>>, OccupationError> {
    let pg = PropagationGraph::build(
        net,
        info.legit_fibers(),
        info.legit_add_module(),
        info.legit_drop_module(),
    )?;
    Ok(simple_cycles(info.all_fibers(), pg.fiber_edges()))
}

/// Enumerate all simple cycles of the graph with the given fibers and edges, and normalize them.
fn simple_cycles(
    fibers: impl IntoIterator<Item = FiberId>,
    edges: impl IntoIterator<Item = (FiberId, FiberId)>,
) -> Vec<Vec<FiberId>> {
    let mut g = Graph::default();
    let mut index: HashMap<FiberId, Idx> = HashMap::new();
    for f in fibers {
        index.entry(f).or_insert_with(|| g.add_node(f));
    }
    for (a, b) in edges {
        let a = *index.entry(a).or_insert_with(|| g.add_node(a));
        let b = *index.entry(b).or_insert_with(|| g.add_node(b));
        g.update_edge(a, b, ());
    }

    johnson(&g)
        .into_iter()
        .map(|c| normalize(c.into_iter().map(|x| g[x]).collect()))
        .sorted()
        .dedup()
        .collect()
}

/// Rotate a cycle such that it starts at its smallest fiber.
fn normalize(mut cycle: Vec<FiberId>) -> Vec<FiberId> {
    if let Some(pos) = cycle.iter().position_min() {
        cycle.rotate_left(pos);
    }
    cycle
}

/// Compute the set of all simple loops in a directed graph. This function was ported from
/// [`networkx::algorithms::cycles::simple_cycles`](https://networkx.org/documentation/stable/reference/algorithms/generated/networkx.algorithms.cycles.simple_cycles.html#simple-cycles).
///
/// Find simple cycles (elementary circuits) of a directed graph. A simple cycle, or elementary
/// circuit, is a closed path where no node appears twice. Two elementary circuits are distinct if
/// they are not cyclic permutations of each other. This is a nonrecursive, iterator/generator
/// version of Johnson’s algorithm [\[1\]](https://doi.org/10.1137/0204007).
fn johnson(g: &Graph) -> Vec<Vec<Idx>> {
    let mut result = Vec::new();

    // self loops are reported on their own and removed from the graph.
    let mut subg = g.clone();
    for v in g.node_indices() {
        if let Some(e) = subg.find_edge(v, v) {
            result.push(vec![v]);
            subg.remove_edge(e);
        }
    }

    let mut sccs: Vec<HashSet<Idx>> = nontrivial_sccs(&subg);

    while let Some(mut scc) = sccs.pop() {
        let sccg = subgraph(&subg, &scc);
        let startnode = match starting_node(&sccg) {
            Some(s) => s,
            None => continue,
        };
        scc.remove(&startnode);
        let mut path = vec![startnode];
        // vertex: blocked from search?
        let mut blocked = HashSet::from([startnode]);
        // nodes involved in a cycle
        let mut closed = HashSet::new();
        let mut no_circuits: HashMap<Idx, HashSet<Idx>> = HashMap::new();
        let mut stack = vec![(startnode, succ(&sccg, startnode))];

        while let Some((node, nbrs)) = stack.last_mut() {
            let thisnode = *node;
            if let Some(nextnode) = nbrs.pop() {
                if nextnode == startnode {
                    result.push(path.clone());
                    closed.extend(path.iter().copied());
                } else if !blocked.contains(&nextnode) {
                    path.push(nextnode);
                    stack.push((nextnode, succ(&sccg, nextnode)));
                    closed.remove(&nextnode);
                    blocked.insert(nextnode);
                    continue;
                }
            }
            if nbrs.is_empty() {
                if closed.contains(&thisnode) {
                    unblock(thisnode, &mut blocked, &mut no_circuits);
                } else {
                    for nbr in succ(&sccg, thisnode) {
                        no_circuits.entry(nbr).or_default().insert(thisnode);
                    }
                }
                stack.pop();
                path.pop();
            }
        }

        let h = subgraph(&sccg, &scc);
        sccs.extend(nontrivial_sccs(&h));
    }

    result
}

/// Unblock function, as described in [`networkx::algorithms::cycles::simple_cycles`](https://networkx.org/documentation/stable/reference/algorithms/generated/networkx.algorithms.cycles.simple_cycles.html#simple-cycles).
fn unblock(start: Idx, blocked: &mut HashSet<Idx>, no_circuits: &mut HashMap<Idx, HashSet<Idx>>) {
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if blocked.remove(&node) {
            if let Some(b_node) = no_circuits.get_mut(&node) {
                stack.extend(b_node.drain());
            }
        }
    }
}

/// All strongly connected components with more than one vertex.
fn nontrivial_sccs(g: &Graph) -> Vec<HashSet<Idx>> {
    tarjan_scc(g)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| scc.into_iter().collect())
        .collect()
}

/// Extract the subgraph of `g` that only contains nodes in `nodes`.
fn subgraph(g: &Graph, nodes: &HashSet<Idx>) -> Graph {
    let mut s = g.clone();
    g.node_indices()
        .filter(|r| !nodes.contains(r))
        .for_each(|r| {
            s.remove_node(r);
        });
    s
}

/// Get the starting node, which is the node with the highest degree.
fn starting_node(g: &Graph) -> Option<Idx> {
    g.node_indices().max_by_key(|r| g.neighbors(*r).count())
}

/// Get the successors of a node.
fn succ(g: &Graph, node: Idx) -> Vec<Idx> {
    g.neighbors(node).collect_vec()
}
