// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashSet, VecDeque};

use crate::Graph;

/// Explains why [find_route](crate::find_route) failed with [NoPath](crate::Error::NoPath).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    /// The start node has no edges at all.
    pub source_isolated: bool,

    /// The end node has no edges at all.
    pub target_isolated: bool,

    /// Number of nodes in the connected component of the start node
    /// (including the start node itself).
    pub source_component_size: usize,

    /// The end node belongs to the connected component of the start node.
    pub target_reachable: bool,
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Possible reasons:")?;
        writeln!(f, "- Locations are on disconnected road segments")?;
        writeln!(f, "- Missing connections in OSM data")?;
        write!(f, "- The area might be marked as private or inaccessible")?;
        if self.source_isolated {
            write!(f, "\n- Source node has no connections")?;
        }
        if self.target_isolated {
            write!(f, "\n- Destination node has no connections")?;
        }
        if !self.target_reachable {
            write!(
                f,
                "\n- Destination lies outside of the source's road component ({} nodes)",
                self.source_component_size
            )?;
        }
        Ok(())
    }
}

/// Returns ids of all nodes reachable from `start` (including `start` itself),
/// using a breadth-first traversal.
///
/// An unknown `start` yields an empty set.
pub fn reachable_from(g: &Graph, start: i64) -> HashSet<i64> {
    let mut visited = HashSet::default();
    if !g.contains(start) {
        return visited;
    }

    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);

    while let Some(u) = queue.pop_front() {
        for &v in g.neighbors(u) {
            if visited.insert(v) {
                queue.push_back(v);
            }
        }
    }

    visited
}

/// Probes connectivity between two nodes after a failed route search.
///
/// This is a separate traversal; it doesn't depend on, nor affect, any route search.
pub fn diagnose_no_path(g: &Graph, from_id: i64, to_id: i64) -> Diagnostics {
    let component = reachable_from(g, from_id);
    Diagnostics {
        source_isolated: g.degree(from_id) == 0,
        target_isolated: g.degree(to_id) == 0,
        source_component_size: component.len(),
        target_reachable: component.contains(&to_id),
    }
}
