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

//! # Spectrum occupation
//!
//! This module tracks which slots of which resource (fiber, directionless add module or
//! directionless drop module) are occupied by which lightpath, distinguishing legitimate signals
//! from waste signals ([`SpectrumLedger`]), and searches for free slot ranges
//! ([`first_fit`], [`first_fit_two_routes`] and [`first_fit_hops`]).

use optnet::types::{LightpathId, NetworkError};
use thiserror::Error;

use crate::propagation::OccupationError;

pub mod first_fit;
pub mod ledger;

pub use first_fit::{
    available_slots, first_fit, first_fit_hops, first_fit_in, first_fit_two_routes,
    valid_range_starts, HopAssignment,
};
pub use ledger::SpectrumLedger;

/// Error thrown by the spectrum ledger or by the slot search.
#[derive(Debug, Error, PartialEq)]
pub enum SpectrumError {
    /// The lightpath is already allocated in the ledger.
    #[error("Lightpath {0} is already allocated")]
    AlreadyAllocated(LightpathId),
    /// The occupation does not specify any slot set.
    #[error("The occupation does not specify a slot set")]
    NoSlotSet,
    /// The operation requires at least one fiber.
    #[error("The operation requires at least one fiber")]
    EmptyFiberSet,
    /// Error while computing the occupation of a lightpath
    #[error("{0}")]
    Occupation(#[from] OccupationError),
    /// Network error
    #[error("{0}")]
    Network(#[from] NetworkError),
}
