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

//! # WdmPlan: Spectrum planning and validation for WDM optical networks
//!
//! This library plans and validates the spectrum of transparent WDM optical networks described
//! with [`optnet`]. A lightpath occupies the same set of frequency slots on every fiber of its
//! route. Depending on how the nodes are built, its signal may also leak into fibers and
//! directionless modules that are not part of its route (waste). This library answers the
//! following questions:
//!
//! - Which slots are free on a fiber or module, considering both legitimate and waste signals?
//! - Can a lightpath be established on a given set of slots without clashing with any other
//!   signal (or with itself)?
//! - Which is the lowest range of slots a new lightpath (or a pair of protected lightpaths) can
//!   use?
//! - Does the network contain lasing loops, i.e., rings of nodes that can never block a signal?
//! - Which power, chromatic dispersion, PMD and OSNR does a lightpath accumulate, and does the
//!   receiver tolerate it?
//!
//! ## Structure
//! The source code of this program is structured as follows:
//! - The module [`architecture`] derives the switching policy ([`SwitchingArchitecture`]) of a
//!   node from its configuration, including its insertion losses.
//! - The module [`propagation`] computes the [`OccupationInfo`] of a lightpath by building its
//!   propagation graph, and enumerates lasing loops ([`propagation::lasing_loops`]).
//! - The module [`spectrum`] contains the [`SpectrumLedger`] and the first-fit searches.
//! - The module [`impairments`] accumulates the physical-layer impairments of every lightpath
//!   ([`SignalImpairmentPropagator`]).
//! - The module [`formatter`] prints occupation reports and violations.
//!
//! ## Example usage
//!
//! ```
//! use optnet::prelude::*;
//! use std::collections::BTreeSet;
//! use wdmplan::{first_fit, OccupationInfo, SpectrumLedger};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut net = Network::default();
//! let a = net.add_node("A");
//! let b = net.add_node("B");
//! let c = net.add_node("C");
//! let (ab, _) = net.add_link(a, b, 80.0)?;
//! let (bc, _) = net.add_link(b, c, 80.0)?;
//!
//! net.add_lightpath("A-B", vec![ab], 0..4)?;
//! let ledger = SpectrumLedger::from_network(&net)?;
//!
//! // search four slots for a lightpath from A to C
//! let info = OccupationInfo::new(&net, vec![ab, bc], None, None, None)?;
//! let slots = first_fit(&net, &ledger, &info, 4, None, &BTreeSet::new())?;
//! assert_eq!(slots, Some((4..8).collect()));
//! # Ok(())
//! # }
//! ```

#![deny(
    missing_docs,
    clippy::missing_docs_in_private_items,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod architecture;
pub mod formatter;
pub mod impairments;
pub mod propagation;
pub mod spectrum;
#[cfg(test)]
mod test;

pub use architecture::{ArchitectureError, InsertionLoss, SwitchingArchitecture};
pub use impairments::{ImpairmentError, OpticalSignalState, SignalImpairmentPropagator};
pub use propagation::{lasing_loops, OccupationError, OccupationInfo};
pub use spectrum::{first_fit, first_fit_hops, first_fit_two_routes, SpectrumError, SpectrumLedger};
