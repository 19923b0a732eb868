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

#![deny(missing_docs, missing_debug_implementations)]

//! # OptNet
//!
//! This is a library for describing transparent WDM optical networks: the physical topology, the
//! switching fabric of every node, and the lightpaths established on top of it.
//!
//! ## Main Concepts
//!
//! The [`network::Network`] is the main datastructure to operate on. It stores all nodes
//! ([`node::OadmNode`]) and fibers ([`fiber::Fiber`]) on a directed graph (see
//! [Petgraph](https://docs.rs/petgraph/latest/petgraph/index.html)), where every fiber is a
//! directed edge. Two fibers in opposite direction can be marked as a bidirectional pair.
//!
//! Every node is configured with a [`node::ArchitectureConfig`], describing how the node forwards
//! an incoming signal. The network itself does not interpret the architecture. It only stores it.
//!
//! A [`lightpath::Lightpath`] is a unidirectional circuit along a contiguous sequence of fibers,
//! occupying the same set of slots on every fiber. Slots are indices into the flexible frequency
//! grid ([`types::SlotGrid`]).
//!
//! Use the trait [`builder::NetworkBuilder`] to quickly generate rings, lines and complete graphs.
//!
//! ## Example usage
//!
//! ```
//! use optnet::prelude::*;
//!
//! fn main() -> Result<(), NetworkError> {
//!     let mut net = Network::default();
//!
//!     let a = net.add_node("A");
//!     let b = net.add_node("B");
//!     let c = net.add_node("C");
//!
//!     let (ab, _) = net.add_link(a, b, 100.0)?;
//!     let (bc, _) = net.add_link(b, c, 120.0)?;
//!
//!     // node B is a filterless node.
//!     net.set_architecture(b, ArchitectureConfig::FilterlessBroadcast)?;
//!
//!     let lp = net.add_lightpath("A-C", vec![ab, bc], 10..14)?;
//!     assert_eq!(net.route_endpoints(net.get_lightpath(lp)?.fibers())?, (a, c));
//!     assert_eq!(net.get_lightpaths_on_fiber(bc), vec![lp]);
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod fiber;
#[cfg(not(tarpaulin_include))]
pub mod formatter;
pub mod lightpath;
pub mod network;
pub mod node;
pub mod prelude;
pub mod types;

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
mod test;
