// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{Error, Graph};

/// Result of a successful [find_route] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Sum of all edge weights along the route, in meters.
    pub total_weight: f64,

    /// Ids of nodes along the route, starting with the source and ending with the target.
    pub nodes: Vec<i64>,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.cost.total_cmp(&self.cost)
    }
}

/// Query-local state of a single search.
struct Search<'a> {
    g: &'a Graph,
    queue: BinaryHeap<QueueItem>,
    known_costs: HashMap<i64, f64>,
    came_from: HashMap<i64, i64>,
    settled: HashSet<i64>,
}

impl<'a> Search<'a> {
    fn new(g: &'a Graph, from_id: i64) -> Self {
        let mut s = Self {
            g,
            queue: BinaryHeap::default(),
            known_costs: HashMap::default(),
            came_from: HashMap::default(),
            settled: HashSet::default(),
        };
        s.known_costs.insert(from_id, 0.0);
        s.queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
        });
        s
    }

    #[inline]
    fn known_cost(&self, id: i64) -> f64 {
        self.known_costs.get(&id).copied().unwrap_or(f64::INFINITY)
    }

    /// Expands nodes until `to_id` is settled, returning its cost,
    /// or `None` if the queue runs out first.
    fn run(&mut self, to_id: i64) -> Option<f64> {
        while let Some(item) = self.queue.pop() {
            // Nodes are re-inserted instead of having their key decreased,
            // so the queue might contain outdated items for already-settled nodes.
            if item.cost > self.known_cost(item.at) || !self.settled.insert(item.at) {
                continue;
            }

            if item.at == to_id {
                return Some(item.cost);
            }

            for &neighbor_id in self.g.neighbors(item.at) {
                if self.settled.contains(&neighbor_id) {
                    continue;
                }

                let neighbor_cost = item.cost + self.g.get_edge(item.at, neighbor_id);
                if neighbor_cost < self.known_cost(neighbor_id) {
                    self.came_from.insert(neighbor_id, item.at);
                    self.known_costs.insert(neighbor_id, neighbor_cost);
                    self.queue.push(QueueItem {
                        at: neighbor_id,
                        cost: neighbor_cost,
                    });
                }
            }
        }

        None
    }

    fn reconstruct_path(&self, mut last: i64) -> Vec<i64> {
        let mut path = vec![last];

        while let Some(&nd) = self.came_from.get(&last) {
            path.push(nd);
            last = nd;
        }

        path.reverse();
        path
    }
}

fn search<'a>(g: &'a Graph, from_id: i64, to_id: i64) -> Result<(Search<'a>, f64), Error> {
    for id in [from_id, to_id] {
        if !g.contains(id) {
            return Err(Error::UnknownNode(id));
        }
    }

    let mut s = Search::new(g, from_id);
    let result = s.run(to_id);
    log::debug!(
        "search {} -> {} settled {} nodes",
        from_id,
        to_id,
        s.settled.len()
    );

    match result {
        Some(cost) => Ok((s, cost)),
        None => Err(Error::NoPath {
            from: from_id,
            to: to_id,
        }),
    }
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// Fails with [Error::UnknownNode] if either node doesn't exist in the graph,
/// and with [Error::NoPath] if the nodes are not connected.
/// See [diagnose_no_path](crate::diagnose_no_path) for explaining the latter.
pub fn find_route(g: &Graph, from_id: i64, to_id: i64) -> Result<Route, Error> {
    let (s, total_weight) = search(g, from_id, to_id)?;
    Ok(Route {
        total_weight,
        nodes: s.reconstruct_path(to_id),
    })
}

/// Same as [find_route], but only returns the total weight of the route (in meters),
/// skipping reconstruction of the node sequence.
pub fn find_route_cost(g: &Graph, from_id: i64, to_id: i64) -> Result<f64, Error> {
    search(g, from_id, to_id).map(|(_, cost)| cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_network;
    use crate::test_util::{node, road};

    #[test]
    fn prefers_indirect_path_when_shorter() {
        // A(0,0), B(0,1), C(1,1); A-B-C and a direct A-C edge weighted by a zig-zag way.
        let nodes = [
            node(1, 0.0, 0.0),
            node(2, 0.0, 1.0),
            node(3, 1.0, 1.0),
            node(4, 2.0, -1.0),
        ];
        let ways = [road(10, &[1, 2, 3]), road(11, &[1, 4, 3])];
        let g = build_network(&nodes, &ways).unwrap();

        let cost = find_route_cost(&g, 1, 3).unwrap();
        assert_almost_eq!(cost, g.get_edge(1, 2) + g.get_edge(2, 3));
        assert!(cost < g.get_edge(1, 4) + g.get_edge(4, 3));
    }

    #[test]
    fn uses_direct_edge_when_shortest() {
        let nodes = [node(1, 0.0, 0.0), node(2, 0.0, 1.0), node(3, 1.0, 1.0)];
        let ways = [road(10, &[1, 2, 3]), road(11, &[1, 3])];
        let g = build_network(&nodes, &ways).unwrap();

        let r = find_route(&g, 1, 3).unwrap();
        assert_eq!(r.nodes, vec![1, 3]);
        assert_eq!(r.total_weight, g.get_edge(1, 3));
        assert!(r.total_weight < g.get_edge(1, 2) + g.get_edge(2, 3));
    }

    #[test]
    fn route_to_self() {
        let nodes = [node(1, 0.0, 0.0), node(2, 0.0, 1.0)];
        let g = build_network(&nodes, &[road(10, &[1, 2])]).unwrap();

        let r = find_route(&g, 1, 1).unwrap();
        assert_eq!(r.nodes, vec![1]);
        assert_eq!(r.total_weight, 0.0);
    }

    #[test]
    fn skips_outdated_queue_items() {
        // 3 is first reached through 5 (expensive), then improved through 2.
        // The outdated item for 3 is popped before 4 and must be ignored.
        //
        //  5 - 1 - 2 - 3 - - - 4
        //   \_________/
        let nodes = [
            node(1, 0.0, 0.0),
            node(2, 0.0, 0.001),
            node(3, 0.0, 0.002),
            node(4, 0.0, 0.004),
            node(5, 0.0, -0.0005),
        ];
        let ways = [road(10, &[1, 5, 3]), road(11, &[1, 2, 3, 4])];
        let g = build_network(&nodes, &ways).unwrap();

        let r = find_route(&g, 1, 4).unwrap();
        assert_eq!(r.nodes, vec![1, 2, 3, 4]);
        assert_almost_eq!(
            r.total_weight,
            g.get_edge(1, 2) + g.get_edge(2, 3) + g.get_edge(3, 4)
        );
    }

    #[test]
    fn disconnected_components() {
        let nodes = [
            node(1, 0.0, 0.0),
            node(2, 0.0, 0.001),
            node(3, 1.0, 1.0),
            node(4, 1.0, 1.001),
        ];
        let ways = [road(10, &[1, 2]), road(11, &[3, 4])];
        let g = build_network(&nodes, &ways).unwrap();

        assert!(matches!(
            find_route(&g, 1, 4),
            Err(Error::NoPath { from: 1, to: 4 })
        ));
        assert!(matches!(
            find_route_cost(&g, 4, 2),
            Err(Error::NoPath { from: 4, to: 2 })
        ));
    }

    #[test]
    fn unknown_nodes() {
        let nodes = [node(1, 0.0, 0.0), node(2, 0.0, 0.001)];
        let g = build_network(&nodes, &[road(10, &[1, 2])]).unwrap();

        assert!(matches!(find_route(&g, 1, 42), Err(Error::UnknownNode(42))));
        assert!(matches!(find_route(&g, 42, 1), Err(Error::UnknownNode(42))));
    }

    #[test]
    fn end_to_end_library_to_cafe() {
        let nodes = [node(1, 0.0, 0.0), node(2, 0.0, 0.001), node(3, 0.0, 0.002)];
        let g = build_network(&nodes, &[road(10, &[1, 2]), road(11, &[2, 3])]).unwrap();

        let library = crate::Coordinate::new(0.0, 0.0);
        let cafe = crate::Coordinate::new(0.0, 0.002);
        let from = crate::locate_nearest(&g, library).unwrap();
        let to = crate::locate_nearest(&g, cafe).unwrap();
        assert_eq!(from.id, 1);
        assert_eq!(to.id, 3);

        let r = find_route(&g, from.id, to.id).unwrap();
        assert_almost_eq!(r.total_weight, g.get_edge(1, 2) + g.get_edge(2, 3));
        assert_eq!(r.nodes, vec![1, 2, 3]);
    }
}
