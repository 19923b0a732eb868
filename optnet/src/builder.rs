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

//! Module for generating topologies and configurations quickly, according to parameters.

use crate::{
    fiber::Amplifier,
    network::Network,
    node::ArchitectureConfig,
    types::{FiberId, NetworkError, NodeId, SlotGrid},
};

/// Trait for generating topologies and configurations quickly. The following example shows how
/// you can setup a basic amplified ring:
///
/// ```
/// use optnet::prelude::*;
/// use optnet::builder::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create a ring with 4 nodes, where each link is 160 km long.
/// let mut net = Network::build_ring(SlotGrid::default(), 4, 160.0)?;
/// // Make every node filterless
/// net.build_architectures(|_, _| ArchitectureConfig::FilterlessBroadcast)?;
/// // place an inline amplifier every 80 km, compensating the loss of the previous span.
/// net.build_inline_amplifiers(80.0)?;
/// # Ok(())
/// # }
/// ```
pub trait NetworkBuilder {
    /// Generate a ring of `n` nodes, where node `i` is connected to node `i + 1` (and node `n-1`
    /// to node `0`) with a bidirectional pair of fibers of `length_km`. Each node will be called
    /// `"N{x}"`, where `x` is the node id.
    fn build_ring(grid: SlotGrid, n: usize, length_km: f64) -> Result<Self, NetworkError>
    where
        Self: Sized;

    /// Generate a line of `n` nodes, where node `i` is connected to node `i + 1`. Each node will
    /// be called `"N{x}"`, where `x` is the node id.
    fn build_line(grid: SlotGrid, n: usize, length_km: f64) -> Result<Self, NetworkError>
    where
        Self: Sized;

    /// Generate a complete graph with `n` nodes, where every pair of nodes is connected with a
    /// bidirectional pair of fibers. Each node will be called `"N{x}"`, where `x` is the node id.
    fn build_complete_graph(
        grid: SlotGrid,
        n: usize,
        length_km: f64,
    ) -> Result<Self, NetworkError>
    where
        Self: Sized;

    /// Set the architecture of every node according to the function `architecture`, which takes
    /// the node and the network as input.
    fn build_architectures<F>(&mut self, architecture: F) -> Result<(), NetworkError>
    where
        F: FnMut(NodeId, &Network) -> ArchitectureConfig;

    /// Place inline amplifiers every `span_km` on every fiber. Each amplifier compensates the
    /// attenuation of the span before it. Existing inline amplifiers are removed. No amplifier
    /// is placed at the fiber end.
    fn build_inline_amplifiers(&mut self, span_km: f64) -> Result<(), NetworkError>;
}

impl NetworkBuilder for Network {
    fn build_ring(grid: SlotGrid, n: usize, length_km: f64) -> Result<Self, NetworkError> {
        let mut net = Network::build_line(grid, n, length_km)?;
        if n > 2 {
            let first = NodeId::new(0);
            let last = NodeId::new(n - 1);
            net.add_link(last, first, length_km)?;
        }
        Ok(net)
    }

    fn build_line(grid: SlotGrid, n: usize, length_km: f64) -> Result<Self, NetworkError> {
        let mut net = Network::new(grid);
        let nodes: Vec<NodeId> = (0..n).map(|i| net.add_node(format!("N{i}"))).collect();
        for w in nodes.windows(2) {
            net.add_link(w[0], w[1], length_km)?;
        }
        Ok(net)
    }

    fn build_complete_graph(
        grid: SlotGrid,
        n: usize,
        length_km: f64,
    ) -> Result<Self, NetworkError> {
        let mut net = Network::new(grid);
        let nodes: Vec<NodeId> = (0..n).map(|i| net.add_node(format!("N{i}"))).collect();
        for (i, a) in nodes.iter().enumerate() {
            for b in nodes.iter().skip(i + 1) {
                net.add_link(*a, *b, length_km)?;
            }
        }
        Ok(net)
    }

    fn build_architectures<F>(&mut self, mut architecture: F) -> Result<(), NetworkError>
    where
        F: FnMut(NodeId, &Network) -> ArchitectureConfig,
    {
        for node in self.get_nodes() {
            let config = architecture(node, self);
            self.set_architecture(node, config)?;
        }
        Ok(())
    }

    fn build_inline_amplifiers(&mut self, span_km: f64) -> Result<(), NetworkError> {
        let fibers: Vec<FiberId> = self.get_fibers();
        for fiber in fibers {
            let f = self.get_fiber_mut(fiber)?;
            f.amplifiers.clear();
            let span_loss = f.attenuation_db_per_km * span_km;
            let mut pos = span_km;
            while pos < f.length_km {
                f.amplifiers.push(Amplifier::new(pos, span_loss));
                pos += span_km;
            }
        }
        Ok(())
    }
}
