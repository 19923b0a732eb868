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

//! Module that introduces a formatter to display all types containing `NodeId`, `FiberId` or
//! `LightpathId`.

use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;

use crate::{
    network::Network,
    types::{DirectionlessModule, FiberId, LightpathId, NetworkError, NodeId},
};

/// Trait to format a type that contains ids of the network
pub trait NetworkFormatter<'a, 'n> {
    /// Type that is returned, which implements `std::fmt::Display`.
    type Formatter;

    /// Return a struct that can be formatted and displayed. Unknown ids are displayed as `?`.
    fn fmt(&'a self, net: &'n Network) -> Self::Formatter;
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for NodeId {
    type Formatter = &'n str;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        net.get_node_name(*self).unwrap_or("?")
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for FiberId {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        match net.get_fiber(*self) {
            Ok(f) => format!("{}->{}", f.source().fmt(net), f.target().fmt(net)),
            Err(_) => "?".to_string(),
        }
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for LightpathId {
    type Formatter = &'n str;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        net.get_lightpath(*self).map(|l| l.name()).unwrap_or("?")
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for DirectionlessModule {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{}[{}]", self.node.fmt(net), self.index)
    }
}

//
// Sets
//

impl<'a, 'n> NetworkFormatter<'a, 'n> for BTreeSet<FiberId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|f| f.fmt(net)).join(", "))
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for HashSet<FiberId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|f| f.fmt(net)).join(", "))
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for BTreeSet<LightpathId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|l| l.fmt(net)).join(", "))
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for BTreeSet<DirectionlessModule> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        format!("{{{}}}", self.iter().map(|m| m.fmt(net)).join(", "))
    }
}

//
// Routes
//

impl<'a, 'n> NetworkFormatter<'a, 'n> for [FiberId] {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        let mut nodes = Vec::with_capacity(self.len() + 1);
        for (i, f) in self.iter().enumerate() {
            match net.get_fiber(*f) {
                Ok(fiber) => {
                    if i == 0 {
                        nodes.push(fiber.source().fmt(net));
                    }
                    nodes.push(fiber.target().fmt(net));
                }
                Err(_) => nodes.push("?"),
            }
        }
        nodes.into_iter().join(" -> ")
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for Vec<FiberId> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        self.as_slice().fmt(net)
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for Vec<Vec<FiberId>> {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        self.iter().map(|p| p.fmt(net)).join(" | ")
    }
}

//
// Errors
//

impl<'a, 'n> NetworkFormatter<'a, 'n> for NetworkError {
    type Formatter = String;

    fn fmt(&'a self, net: &'n Network) -> Self::Formatter {
        match self {
            NetworkError::NodeNotFound(n) => format!("Node was not found: {}", n.fmt(net)),
            NetworkError::FiberNotFound(f) => format!("Fiber was not found: {}", f.fmt(net)),
            NetworkError::DisconnectedRoute(a, b) => {
                format!("Route is disconnected between {} and {}", a.fmt(net), b.fmt(net))
            }
            NetworkError::ModuleNotFound(n, i) => {
                format!("Directionless module {} does not exist at {}", i, n.fmt(net))
            }
            NetworkError::AmplifierOutsideFiber(f, pos) => {
                format!("Amplifier at {pos} km is outside of fiber {}", f.fmt(net))
            }
            e => e.to_string(),
        }
    }
}
