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

use std::path::PathBuf;

use clap::Parser;
use log::*;
use optnet::prelude::*;

use wdmplan::{
    formatter::fiber_report, lasing_loops, SignalImpairmentPropagator, SpectrumLedger,
};

/// Check the spectrum assignment and the physical feasibility of all lightpaths in a network.
#[derive(Debug, Parser)]
struct Cli {
    /// Json file of the network, as generated by `Network::as_json_str`.
    #[clap(long = "network", short = 'n')]
    network: PathBuf,
    /// Print the slot-by-slot occupation of every fiber.
    #[clap(long = "report", short = 'r')]
    report: bool,
    /// Print the computed impairments of every lightpath as json.
    #[cfg(feature = "serde")]
    #[clap(long = "json", short = 'j')]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();

    let args = Cli::parse();

    let net = Network::from_json_str(&std::fs::read_to_string(&args.network)?)?;
    let ledger = SpectrumLedger::from_network(&net)?;
    let mut num_errors = 0;

    // spectrum clashes
    for lp in ledger.allocated_lightpaths() {
        if !ledger.is_spectrum_occupation_ok_for(lp) {
            num_errors += 1;
            println!("Lightpath {} clashes with another signal", lp.fmt(&net));
        }
        if let Some(info) = ledger.occupation_info(lp) {
            if info.is_self_clashing() {
                num_errors += 1;
                println!("Lightpath {} clashes with itself", lp.fmt(&net));
            }
        }
    }

    // lasing loops
    for cycle in lasing_loops(&net)? {
        num_errors += 1;
        println!("Lasing loop: {}", cycle.fmt(&net));
    }

    // impairments
    let impairments = SignalImpairmentPropagator::from_network(&net)?;
    for lp in net.get_lightpath_ids() {
        for v in impairments.lightpath_violations(&net, lp)? {
            num_errors += 1;
            println!("Lightpath {}: {}", lp.fmt(&net), v);
        }
    }
    for v in impairments.amplifier_violations(&net)? {
        num_errors += 1;
        println!("{}", v.fmt(&net));
    }

    if args.report {
        for f in ledger.occupied_fibers() {
            println!("{}", fiber_report(&net, &ledger, f));
        }
    }

    #[cfg(feature = "serde")]
    if args.json {
        let results: std::collections::BTreeMap<String, _> = net
            .get_lightpath_ids()
            .into_iter()
            .map(|lp| Ok((lp.fmt(&net).to_string(), impairments.get(lp)?)))
            .collect::<Result<_, wdmplan::ImpairmentError>>()?;
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    if num_errors == 0 {
        info!("The network is consistent");
    } else {
        warn!("Found {} problems", num_errors);
    }

    Ok(())
}
