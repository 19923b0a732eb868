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

//! Test module, containing the test topologies shared by all tests.

use optnet::{
    builder::NetworkBuilder,
    network::Network,
    node::ArchitectureConfig,
    types::{FiberId, NodeId, SlotGrid},
};

mod test_architecture;
mod test_first_fit;
mod test_ledger;

/// Fibers of the star network.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Star {
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub d: NodeId,
    pub ab: FiberId,
    pub ba: FiberId,
    pub bc: FiberId,
    pub cb: FiberId,
    pub bd: FiberId,
    pub db: FiberId,
}

/// # Star network
///
/// ```text
/// A ---- B ---- C
///        |
///        D
/// ```
///
/// Every link is a bidirectional pair of fibers of 100 km. Node `B` uses the architecture `b`, all
/// other nodes are non-blocking.
pub(crate) fn star(b: ArchitectureConfig) -> (Network, Star) {
    let mut net = Network::default();
    let na = net.add_node("A");
    let nb = net.add_node("B");
    let nc = net.add_node("C");
    let nd = net.add_node("D");
    let (ab, ba) = net.add_link(na, nb, 100.0).unwrap();
    let (bc, cb) = net.add_link(nb, nc, 100.0).unwrap();
    let (bd, db) = net.add_link(nb, nd, 100.0).unwrap();
    net.set_architecture(nb, b).unwrap();
    (
        net,
        Star {
            a: na,
            b: nb,
            c: nc,
            d: nd,
            ab,
            ba,
            bc,
            cb,
            bd,
            db,
        },
    )
}

/// # Ring network
///
/// A ring of `n` nodes called `N0` to `N{n-1}`, where every node uses the architecture
/// `architecture`. Fiber `2i` goes from `Ni` to `N(i+1)`, and fiber `2i+1` in the opposite
/// direction.
pub(crate) fn ring(n: usize, architecture: ArchitectureConfig) -> Network {
    let mut net = Network::build_ring(SlotGrid::default(), n, 100.0).unwrap();
    net.build_architectures(|_, _| architecture.clone())
        .unwrap();
    net
}

/// Shorthand for a fiber id
pub(crate) fn f(i: usize) -> FiberId {
    FiberId::new(i)
}
