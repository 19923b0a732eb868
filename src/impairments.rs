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

//! # Physical-layer impairments
//!
//! This module walks the route of every lightpath and accumulates its optical power, chromatic
//! dispersion, polarization-mode dispersion and OSNR through the add path of the origin node,
//! every fiber with its amplifiers, the express path of every intermediate node, and finally the
//! drop path of the destination node. The results are kept in the [`SignalImpairmentPropagator`]
//! until they are explicitly recomputed.

use std::collections::BTreeMap;

use log::*;
use optnet::{
    fiber::{Amplifier, Fiber},
    network::Network,
    types::{FiberId, LightpathId, NetworkError},
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::architecture::{ArchitectureError, InsertionLoss, SwitchingArchitecture};

/// Constant of the OSNR contribution of an amplifier, in dB. This is `-10 log10(h * nu * B_ref)`
/// for a reference bandwidth of 12.5 GHz (0.1 nm) at 193.1 THz, in dBm.
pub const OSNR_CONSTANT_DB: f64 = 58.0;

/// Error thrown while computing impairments
#[derive(Debug, Error, PartialEq)]
pub enum ImpairmentError {
    /// The impairments of that lightpath were not computed.
    #[error("No impairments computed for lightpath {0}")]
    LightpathNotFound(LightpathId),
    /// The index is not part of the route of the lightpath.
    #[error("Lightpath {0} has no fiber at position {1} of its route")]
    InvalidRouteIndex(LightpathId, usize),
    /// Error of a switching architecture
    #[error("{0}")]
    Architecture(#[from] ArchitectureError),
    /// Network error
    #[error("{0}")]
    Network(#[from] NetworkError),
}

/// State of an optical signal at a specific point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpticalSignalState {
    /// Total power of the signal in dBm
    pub power_dbm: f64,
    /// Accumulated chromatic dispersion in ps/nm
    pub cd_ps_per_nm: f64,
    /// Accumulated squared PMD in ps^2
    pub pmd_squared_ps2: f64,
    /// OSNR at 12.5 GHz reference bandwidth, in dB. This is infinite while no noise was added.
    pub osnr_db: f64,
}

impl OpticalSignalState {
    /// State of a freshly transmitted signal.
    pub fn new(power_dbm: f64) -> Self {
        Self {
            power_dbm,
            cd_ps_per_nm: 0.0,
            pmd_squared_ps2: 0.0,
            osnr_db: f64::INFINITY,
        }
    }

    /// Accumulated PMD in ps
    pub fn pmd_ps(&self) -> f64 {
        self.pmd_squared_ps2.sqrt()
    }

    /// Pass the signal through a passive element.
    pub fn apply_loss(&mut self, loss: InsertionLoss) {
        self.power_dbm -= loss.loss_db;
        self.pmd_squared_ps2 += loss.pmd_ps.powi(2);
    }

    /// Pass the signal through a passive element, that sets the output power to `power_dbm`.
    pub fn apply_equalization(&mut self, loss: InsertionLoss, power_dbm: f64) {
        self.power_dbm = power_dbm;
        self.pmd_squared_ps2 += loss.pmd_ps.powi(2);
    }

    /// Propagate the signal along `length_km` of the fiber.
    pub fn apply_segment(&mut self, fiber: &Fiber, length_km: f64) {
        self.power_dbm -= fiber.attenuation_db_per_km() * length_km;
        self.cd_ps_per_nm += fiber.cd_ps_per_nm_km() * length_km;
        self.pmd_squared_ps2 += fiber.pmd_ps_per_sqrt_km().powi(2) * length_km;
    }

    /// Pass the signal through an amplifier.
    pub fn apply_amplifier(&mut self, amp: &Amplifier) {
        let contribution = OSNR_CONSTANT_DB + self.power_dbm - amp.noise_figure_db;
        self.osnr_db = combine_osnr_db(self.osnr_db, contribution);
        self.pmd_squared_ps2 += amp.pmd_ps.powi(2);
        self.cd_ps_per_nm += amp.cd_compensation_ps_per_nm;
        self.power_dbm += amp.gain_db;
    }
}

/// Combine two OSNR values (in dB) by summing their noise to signal ratios in linear domain. An
/// infinite OSNR does not contribute any noise.
pub fn combine_osnr_db(a: f64, b: f64) -> f64 {
    if a.is_infinite() && a > 0.0 {
        return b;
    }
    if b.is_infinite() && b > 0.0 {
        return a;
    }
    let noise = 10f64.powf(-a / 10.0) + 10f64.powf(-b / 10.0);
    -10.0 * noise.log10()
}

/// Convert a power from dBm to mW.
pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Convert a power from mW to dBm.
pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.log10()
}

/// Where the amplifier is placed on the fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AmplifierPosition {
    /// Booster at the fiber origin
    Booster,
    /// Inline amplifier with the given index
    Inline(usize),
    /// Preamplifier at the fiber end
    Preamplifier,
}

impl AmplifierPosition {
    /// Get the amplifier of the fiber at this position.
    pub fn get<'a>(&self, fiber: &'a Fiber) -> Option<&'a Amplifier> {
        match self {
            Self::Booster => fiber.booster(),
            Self::Inline(i) => fiber.amplifiers().get(*i),
            Self::Preamplifier => fiber.preamplifier(),
        }
    }

    /// All amplifier positions of a fiber, in the order the signal traverses them.
    pub fn all(fiber: &Fiber) -> Vec<Self> {
        fiber
            .booster()
            .map(|_| Self::Booster)
            .into_iter()
            .chain((0..fiber.amplifiers().len()).map(Self::Inline))
            .chain(fiber.preamplifier().map(|_| Self::Preamplifier))
            .collect()
    }
}

/// Input and output state of a single amplifier.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AmplifierStates {
    /// Position of the amplifier
    pub position: AmplifierPosition,
    /// State before the amplifier
    pub input: OpticalSignalState,
    /// State after the amplifier
    pub output: OpticalSignalState,
}

/// Impairments of a single lightpath.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightpathImpairments {
    /// The route of the lightpath
    pub fibers: Vec<FiberId>,
    /// State at the end of each fiber of the route, before the preamplifier.
    pub fiber_end: Vec<OpticalSignalState>,
    /// States of all amplifiers for each fiber of the route.
    pub amplifiers: Vec<Vec<AmplifierStates>>,
    /// State at the receiver, after the drop path of the destination node.
    pub receiver: OpticalSignalState,
}

/// Compute the impairments of a single lightpath.
pub fn propagate(net: &Network, lp: LightpathId) -> Result<LightpathImpairments, ImpairmentError> {
    let l = net.get_lightpath(lp)?;
    let num_slots = l.slots().len();
    let mut state = OpticalSignalState::new(l.transponder().injection_power_dbm);
    let mut fiber_end = Vec::with_capacity(l.fibers().len());
    let mut amplifiers = Vec::with_capacity(l.fibers().len());

    for (i, fid) in l.fibers().iter().enumerate() {
        let fiber = net.get_fiber(*fid)?;

        // add or express path at the origin
        let arch = SwitchingArchitecture::of(net, fiber.source())?;
        let loss = if i == 0 {
            arch.add_loss()
        } else {
            arch.express_loss()
        };
        match arch.equalized_power_dbm(num_slots, net.slot_grid()) {
            Some(power) => state.apply_equalization(loss, power),
            None => state.apply_loss(loss),
        }

        let mut amps = Vec::new();
        let mut amplify = |state: &mut OpticalSignalState, pos: AmplifierPosition, a: &Amplifier| {
            let input = *state;
            state.apply_amplifier(a);
            amps.push(AmplifierStates {
                position: pos,
                input,
                output: *state,
            });
        };

        if let Some(booster) = fiber.booster() {
            amplify(&mut state, AmplifierPosition::Booster, booster);
        }
        let mut pos_km = 0.0;
        for (k, amp) in fiber.amplifiers().iter().enumerate() {
            state.apply_segment(fiber, amp.position_km - pos_km);
            pos_km = amp.position_km;
            amplify(&mut state, AmplifierPosition::Inline(k), amp);
        }
        state.apply_segment(fiber, fiber.length_km() - pos_km);
        fiber_end.push(state);
        if let Some(pre) = fiber.preamplifier() {
            amplify(&mut state, AmplifierPosition::Preamplifier, pre);
        }
        amplifiers.push(amps);
    }

    // drop path at the destination
    let (_, destination) = net.route_endpoints(l.fibers())?;
    state.apply_loss(SwitchingArchitecture::of(net, destination)?.drop_loss());

    Ok(LightpathImpairments {
        fibers: l.fibers().to_vec(),
        fiber_end,
        amplifiers,
        receiver: state,
    })
}

/// A transponder tolerance violated at the receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpairmentViolation {
    /// Received power below the minimum (received, minimum), in dBm.
    PowerTooLow(f64, f64),
    /// Received power above the maximum (received, maximum), in dBm.
    PowerTooHigh(f64, f64),
    /// Absolute chromatic dispersion above the maximum (received, maximum), in ps/nm.
    ChromaticDispersion(f64, f64),
    /// PMD above the maximum (received, maximum), in ps.
    Pmd(f64, f64),
    /// OSNR below the minimum (received, minimum), in dB.
    Osnr(f64, f64),
}

/// An amplifier operated outside of its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmplifierViolation {
    /// The configured gain is outside of the gain bounds.
    Gain {
        /// The fiber
        fiber: FiberId,
        /// The amplifier on that fiber
        position: AmplifierPosition,
        /// The configured gain in dB
        gain_db: f64,
    },
    /// The total input power of all lightpaths is outside of the input power bounds.
    InputPower {
        /// The fiber
        fiber: FiberId,
        /// The amplifier on that fiber
        position: AmplifierPosition,
        /// The total input power in dBm
        power_dbm: f64,
    },
}

/// # Signal impairment propagator
///
/// Stores the impairments of every lightpath of the network. The results are not updated
/// automatically. Call [`SignalImpairmentPropagator::update_all_performance_info`] after changing
/// the network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalImpairmentPropagator {
    /// Impairments of every lightpath
    results: BTreeMap<LightpathId, LightpathImpairments>,
}

impl SignalImpairmentPropagator {
    /// Compute the impairments of every lightpath in the network.
    pub fn from_network(net: &Network) -> Result<Self, ImpairmentError> {
        let mut s = Self::default();
        s.update_all_performance_info(net)?;
        Ok(s)
    }

    /// Recompute the impairments of every lightpath in the network. On error, the previous results
    /// are kept.
    pub fn update_all_performance_info(&mut self, net: &Network) -> Result<(), ImpairmentError> {
        let results = net
            .get_lightpath_ids()
            .into_iter()
            .map(|lp| propagate(net, lp).map(|r| (lp, r)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        debug!("Computed the impairments of {} lightpaths", results.len());
        self.results = results;
        Ok(())
    }

    /// Get all impairments of a lightpath
    pub fn get(&self, lp: LightpathId) -> Result<&LightpathImpairments, ImpairmentError> {
        self.results
            .get(&lp)
            .ok_or(ImpairmentError::LightpathNotFound(lp))
    }

    /// State at the end of the fiber at position `index` of the route, before the preamplifier.
    pub fn state_at_fiber_end(
        &self,
        lp: LightpathId,
        index: usize,
    ) -> Result<OpticalSignalState, ImpairmentError> {
        self.get(lp)?
            .fiber_end
            .get(index)
            .copied()
            .ok_or(ImpairmentError::InvalidRouteIndex(lp, index))
    }

    /// Input and output states of all amplifiers on the fiber at position `index` of the route.
    pub fn amplifier_states(
        &self,
        lp: LightpathId,
        index: usize,
    ) -> Result<&[AmplifierStates], ImpairmentError> {
        self.get(lp)?
            .amplifiers
            .get(index)
            .map(|x| x.as_slice())
            .ok_or(ImpairmentError::InvalidRouteIndex(lp, index))
    }

    /// State at the receiver of the lightpath
    pub fn state_at_receiver(
        &self,
        lp: LightpathId,
    ) -> Result<OpticalSignalState, ImpairmentError> {
        Ok(self.get(lp)?.receiver)
    }

    /// Total input power (in dBm) of an amplifier, summing the power of every lightpath that
    /// traverses the fiber. Returns `None` if no lightpath traverses the amplifier.
    pub fn total_power_at_amplifier_input(
        &self,
        fiber: FiberId,
        position: AmplifierPosition,
    ) -> Option<f64> {
        let mut total_mw = 0.0;
        let mut found = false;
        for r in self.results.values() {
            for (i, _) in r.fibers.iter().enumerate().filter(|(_, f)| **f == fiber) {
                for a in r.amplifiers[i].iter().filter(|a| a.position == position) {
                    total_mw += dbm_to_mw(a.input.power_dbm);
                    found = true;
                }
            }
        }
        found.then(|| mw_to_dbm(total_mw))
    }

    /// Compare the state at the receiver with the tolerances of the transponder.
    pub fn lightpath_violations(
        &self,
        net: &Network,
        lp: LightpathId,
    ) -> Result<Vec<ImpairmentViolation>, ImpairmentError> {
        let t = net.get_lightpath(lp)?.transponder();
        let rx = self.state_at_receiver(lp)?;
        let mut violations = Vec::new();
        if rx.power_dbm < t.min_power_dbm {
            violations.push(ImpairmentViolation::PowerTooLow(rx.power_dbm, t.min_power_dbm));
        }
        if rx.power_dbm > t.max_power_dbm {
            violations.push(ImpairmentViolation::PowerTooHigh(rx.power_dbm, t.max_power_dbm));
        }
        if rx.cd_ps_per_nm.abs() > t.max_cd_ps_per_nm {
            violations.push(ImpairmentViolation::ChromaticDispersion(
                rx.cd_ps_per_nm,
                t.max_cd_ps_per_nm,
            ));
        }
        if rx.pmd_ps() > t.max_pmd_ps {
            violations.push(ImpairmentViolation::Pmd(rx.pmd_ps(), t.max_pmd_ps));
        }
        if rx.osnr_db < t.min_osnr_db {
            violations.push(ImpairmentViolation::Osnr(rx.osnr_db, t.min_osnr_db));
        }
        if !violations.is_empty() {
            debug!("Lightpath {} violates {} tolerances", lp, violations.len());
        }
        Ok(violations)
    }

    /// Check every amplifier of the network: its gain must be within its gain bounds, and the
    /// total input power (if any lightpath traverses it) within its input power bounds.
    pub fn amplifier_violations(
        &self,
        net: &Network,
    ) -> Result<Vec<AmplifierViolation>, ImpairmentError> {
        let mut violations = Vec::new();
        for fid in net.get_fibers() {
            let fiber = net.get_fiber(fid)?;
            for position in AmplifierPosition::all(fiber) {
                let amp = match position.get(fiber) {
                    Some(a) => a,
                    None => continue,
                };
                if amp.gain_db < amp.min_gain_db || amp.gain_db > amp.max_gain_db {
                    violations.push(AmplifierViolation::Gain {
                        fiber: fid,
                        position,
                        gain_db: amp.gain_db,
                    });
                }
                if let Some(power) = self.total_power_at_amplifier_input(fid, position) {
                    if power < amp.min_input_power_dbm || power > amp.max_input_power_dbm {
                        violations.push(AmplifierViolation::InputPower {
                            fiber: fid,
                            position,
                            power_dbm: power,
                        });
                    }
                }
            }
        }
        Ok(violations)
    }
}
