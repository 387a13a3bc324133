// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Route queries between [NamedPlaces](NamedPlace), as presented to users.

use crate::{
    diagnose_no_path, earth_distance_m, find_route, locate_nearest, Diagnostics, Error, Graph,
    NamedPlace, Node, Route,
};

/// Result of the road search part of a [RouteReport].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Found(Route),
    NotFound(Diagnostics),
}

/// Everything known about a route query between two places.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteReport {
    pub source: NamedPlace,
    pub destination: NamedPlace,

    /// Great-circle distance between the places, in meters.
    pub direct_distance: f64,

    pub source_node: Node,
    pub destination_node: Node,
    pub outcome: Outcome,
}

impl RouteReport {
    /// Returns by how many percent the road route is longer than the direct distance.
    /// `None` if no route was found, or the places share a position.
    pub fn detour_percent(&self) -> Option<f64> {
        match &self.outcome {
            Outcome::Found(r) if self.direct_distance > 0.0 => {
                Some((r.total_weight / self.direct_distance - 1.0) * 100.0)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Source: {}", self.source)?;
        writeln!(f, "Destination: {}", self.destination)?;
        writeln!(f, "Direct distance: {:.2} meters", self.direct_distance)?;
        writeln!(
            f,
            "Source node: {} at {}",
            self.source_node.id, self.source_node.position
        )?;
        writeln!(
            f,
            "Destination node: {} at {}",
            self.destination_node.id, self.destination_node.position
        )?;

        match &self.outcome {
            Outcome::Found(r) => {
                writeln!(f, "Path found with {} nodes", r.nodes.len())?;
                write!(f, "Shortest road path: {:.2} meters", r.total_weight)?;
                if let Some(p) = self.detour_percent() {
                    write!(f, "\nRoad distance is {:.1}% longer than direct distance", p)?;
                }
                Ok(())
            }
            Outcome::NotFound(d) => {
                writeln!(
                    f,
                    "No road path found between '{}' and '{}'",
                    self.source.name, self.destination.name
                )?;
                write!(f, "{}", d)
            }
        }
    }
}

/// Snaps both places to the road network and finds the shortest route between them.
///
/// A missing connection is not an error; it is reported as [Outcome::NotFound] with
/// [Diagnostics]. Fails with [Error::EmptyNetwork] if the graph has no roads.
pub fn plan_route(
    g: &Graph,
    source: &NamedPlace,
    destination: &NamedPlace,
) -> Result<RouteReport, Error> {
    let direct_distance = earth_distance_m(source.position, destination.position);
    let source_node = locate_nearest(g, source.position)?;
    let destination_node = locate_nearest(g, destination.position)?;

    let outcome = match find_route(g, source_node.id, destination_node.id) {
        Ok(r) => Outcome::Found(r),
        Err(Error::NoPath { from, to }) => {
            log::info!("no path between nodes {} and {}", from, to);
            Outcome::NotFound(diagnose_no_path(g, from, to))
        }
        Err(e) => return Err(e),
    };

    Ok(RouteReport {
        source: source.clone(),
        destination: destination.clone(),
        direct_distance,
        source_node,
        destination_node,
        outcome,
    })
}
