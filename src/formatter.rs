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

//! Formatting things.

use std::collections::BTreeSet;

use itertools::Itertools;
use optnet::{
    network::Network,
    prelude::NetworkFormatter,
    types::{DirectionlessModule, FiberId, LightpathId, SlotId},
};

use crate::{
    impairments::{AmplifierPosition, AmplifierViolation, ImpairmentViolation},
    propagation::OccupationInfo,
    spectrum::SpectrumLedger,
};

/// Format a single line of the occupation report.
fn slot_line(
    net: &Network,
    slot: SlotId,
    legit: &BTreeSet<LightpathId>,
    waste: &BTreeSet<LightpathId>,
    clash: bool,
) -> String {
    let mut line = format!(
        "  {:>4} ({:.4} THz):",
        slot,
        net.slot_grid().frequency_thz(slot)
    );
    if !legit.is_empty() {
        line.push_str(&format!(" legit {}", legit.fmt(net)));
    }
    if !waste.is_empty() {
        line.push_str(&format!(" waste {}", waste.fmt(net)));
    }
    if clash {
        line.push_str(" CLASH");
    }
    line
}

/// Slot-by-slot report of a single fiber, listing every occupied slot together with its
/// legitimate and waste occupants.
pub fn fiber_report(net: &Network, ledger: &SpectrumLedger, fiber: FiberId) -> String {
    let clashing = ledger.clashing_slots_fiber(fiber);
    let lines = ledger
        .occupied_slots_fiber(fiber)
        .into_iter()
        .map(|s| {
            let (legit, waste) = ledger.occupants_fiber(fiber, s);
            slot_line(net, s, &legit, &waste, clashing.contains(&s))
        })
        .join("\n");
    format!("fiber {}:\n{}", fiber.fmt(net), lines)
}

/// Slot-by-slot report of a directionless module.
fn module_report(
    net: &Network,
    ledger: &SpectrumLedger,
    module: DirectionlessModule,
    add: bool,
) -> String {
    let (kind, occupied, clashing) = if add {
        (
            "add module",
            ledger.occupied_slots_add_module(module),
            ledger.clashing_slots_add_module(module),
        )
    } else {
        (
            "drop module",
            ledger.occupied_slots_drop_module(module),
            ledger.clashing_slots_drop_module(module),
        )
    };
    let lines = occupied
        .into_iter()
        .map(|s| {
            let (legit, waste) = if add {
                ledger.occupants_add_module(module, s)
            } else {
                ledger.occupants_drop_module(module, s)
            };
            slot_line(net, s, &legit, &waste, clashing.contains(&s))
        })
        .join("\n");
    format!("{} {}:\n{}", kind, module.fmt(net), lines)
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for SpectrumLedger {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        self.occupied_fibers()
            .into_iter()
            .map(|f| fiber_report(net, self, f))
            .chain(
                self.occupied_add_modules()
                    .into_iter()
                    .map(|m| module_report(net, self, m, true)),
            )
            .chain(
                self.occupied_drop_modules()
                    .into_iter()
                    .map(|m| module_report(net, self, m, false)),
            )
            .join("\n")
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for OccupationInfo {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        let mut s = format!("route: {}", self.legit_fibers().fmt(net));
        if let Some(m) = self.legit_add_module() {
            s.push_str(&format!(", add module: {}", m.fmt(net)));
        }
        if let Some(m) = self.legit_drop_module() {
            s.push_str(&format!(", drop module: {}", m.fmt(net)));
        }
        if !self.waste_fibers().is_empty() {
            s.push_str(&format!(", waste fibers: {}", self.waste_fibers().fmt(net)));
        }
        if !self.waste_add_modules().is_empty() {
            s.push_str(&format!(", waste add modules: {}", self.waste_add_modules().fmt(net)));
        }
        if !self.waste_drop_modules().is_empty() {
            s.push_str(&format!(
                ", waste drop modules: {}",
                self.waste_drop_modules().fmt(net)
            ));
        }
        if self.is_self_clashing() {
            s.push_str(" (self-clashing)");
        }
        s
    }
}

impl std::fmt::Display for AmplifierPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmplifierPosition::Booster => write!(f, "booster"),
            AmplifierPosition::Inline(i) => write!(f, "inline amplifier {i}"),
            AmplifierPosition::Preamplifier => write!(f, "preamplifier"),
        }
    }
}

impl std::fmt::Display for ImpairmentViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpairmentViolation::PowerTooLow(x, min) => {
                write!(f, "received power {x:.2} dBm below {min:.2} dBm")
            }
            ImpairmentViolation::PowerTooHigh(x, max) => {
                write!(f, "received power {x:.2} dBm above {max:.2} dBm")
            }
            ImpairmentViolation::ChromaticDispersion(x, max) => {
                write!(f, "chromatic dispersion {x:.1} ps/nm exceeds {max:.1} ps/nm")
            }
            ImpairmentViolation::Pmd(x, max) => write!(f, "PMD {x:.2} ps exceeds {max:.2} ps"),
            ImpairmentViolation::Osnr(x, min) => write!(f, "OSNR {x:.2} dB below {min:.2} dB"),
        }
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for AmplifierViolation {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        match self {
            AmplifierViolation::Gain {
                fiber,
                position,
                gain_db,
            } => format!(
                "{} of fiber {}: gain {:.2} dB out of bounds",
                position,
                fiber.fmt(net),
                gain_db
            ),
            AmplifierViolation::InputPower {
                fiber,
                position,
                power_dbm,
            } => format!(
                "{} of fiber {}: total input power {:.2} dBm out of bounds",
                position,
                fiber.fmt(net),
                power_dbm
            ),
        }
    }
}
