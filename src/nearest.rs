// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance_m, Coordinate, Error, Graph, Node};

/// Finds the closest [Node] with at least one edge to the given position.
///
/// Isolated nodes are never returned, as no route can start or end at them.
/// Ties are resolved in favor of the node with the lowest id.
///
/// This function requires computing the distance to every connected [Node] in the graph,
/// and is not suitable for very large graphs.
///
/// Fails with [Error::EmptyNetwork] if the graph has no edges.
pub fn locate_nearest(g: &Graph, at: Coordinate) -> Result<Node, Error> {
    let mut best: Option<(f64, Node)> = None;

    for &nd in g.connected_nodes() {
        let dist = earth_distance_m(at, nd.position);
        match best {
            Some((best_dist, _)) if best_dist <= dist => {}
            _ => best = Some((dist, nd)),
        }
    }

    let (dist, nd) = best.ok_or(Error::EmptyNetwork)?;
    log::debug!("snapped {} to node {} ({:.1} m away)", at, nd.id, dist);
    Ok(nd)
}
