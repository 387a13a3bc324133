// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{tag_value, Error, Graph, Node, NodeRecord, WayRecord};

/// Tag key marking a way as a traversable road segment.
const ROAD_TAG: &str = "highway";

/// Helper object used for storing state related to converting
/// node and way records into a [Graph].
struct NetworkBuilder {
    g: Graph,
    road_ways: usize,
    dangling_pairs: usize,
}

impl NetworkBuilder {
    fn new() -> Self {
        Self {
            g: Graph::default(),
            road_ways: 0,
            dangling_pairs: 0,
        }
    }

    fn add_node(&mut self, n: &NodeRecord) -> Result<(), Error> {
        if !n.position.lat.is_finite() || !n.position.lon.is_finite() {
            return Err(Error::malformed(
                "node",
                format!("node {} has a non-finite position {}", n.id, n.position),
            ));
        }

        self.g.set_node(Node {
            id: n.id,
            position: n.position,
        });
        Ok(())
    }

    fn add_way(&mut self, w: &WayRecord) {
        if !is_road(w) {
            return;
        }
        self.road_ways += 1;

        for pair in w.nodes.windows(2) {
            if pair[0] == pair[1] {
                continue;
            }

            if !self.g.add_edge(pair[0], pair[1]) {
                self.dangling_pairs += 1;
            }
        }
    }

    fn finish(self) -> Graph {
        if self.dangling_pairs > 0 {
            log::warn!(
                "skipped {} way segment(s) referencing unknown nodes",
                self.dangling_pairs
            );
        }
        log::info!(
            "built road network: {} nodes, {} edges from {} road ways",
            self.g.len(),
            self.g.edge_count(),
            self.road_ways,
        );
        self.g
    }
}

/// Returns `true` if the way has a non-empty `highway` tag.
fn is_road(w: &WayRecord) -> bool {
    tag_value(&w.tags, ROAD_TAG).is_some_and(|v| !v.is_empty())
}

/// Builds an undirected road [Graph] from map records.
///
/// All nodes are added to the graph (duplicated ids are overwritten by later records),
/// and every pair of consecutive nodes on a way with a non-empty `highway` tag becomes an edge.
/// Segments referencing nodes absent from `nodes` are silently skipped.
///
/// Fails with [Error::MalformedRecord] if a node has a non-finite position.
pub fn build_network(nodes: &[NodeRecord], ways: &[WayRecord]) -> Result<Graph, Error> {
    let mut b = NetworkBuilder::new();
    for n in nodes {
        b.add_node(n)?;
    }
    for w in ways {
        b.add_way(w);
    }
    Ok(b.finish())
}
