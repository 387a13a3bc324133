// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance_m, Node};
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

/// Represents a road network as a set of [Nodes](Node) and undirected,
/// weighted connections between them.
///
/// Every connection is stored in both directions, with the same weight:
/// the great-circle distance between its endpoints, in meters. Only nodes
/// present in the graph may be connected.
///
/// A Graph is built once (see [build_network](crate::build_network)) and then only read,
/// so it can be freely shared between threads answering independent queries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<i64, Node>,
    adjacency: BTreeMap<i64, Vec<i64>>,
    weights: HashMap<(i64, i64), f64>,
}

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of undirected edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.weights.len() / 2
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over [Nodes](Node) with at least one edge, in ascending id order.
    pub fn connected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.adjacency.keys().filter_map(|id| self.nodes.get(id))
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.nodes.get(&id).copied()
    }

    /// Returns `true` if a node with the provided id exists in the graph.
    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Gets ids of all nodes directly connected to the node with a given id,
    /// in the order the connections were created.
    pub fn neighbors(&self, id: i64) -> &[i64] {
        self.adjacency
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the number of edges incident to the node with a given id.
    pub fn degree(&self, id: i64) -> usize {
        self.neighbors(id).len()
    }

    /// Gets the weight of an edge between two nodes, in meters.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.weights
            .get(&(from_id, to_id))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Creates or replaces a [Node] with `node.id`.
    ///
    /// Nodes may only be replaced before any edge touches them,
    /// as moving a connected node would invalidate edge weights.
    pub(crate) fn set_node(&mut self, node: Node) {
        debug_assert!(!self.adjacency.contains_key(&node.id));
        self.nodes.insert(node.id, node);
    }

    /// Connects two existing nodes in both directions. Returns `false`
    /// (and does nothing) if either of the nodes doesn't exist, or both ids are the same.
    ///
    /// Connecting already connected nodes is a no-op.
    pub(crate) fn add_edge(&mut self, a: i64, b: i64) -> bool {
        if a == b {
            return false;
        }

        let (Some(left), Some(right)) = (self.nodes.get(&a), self.nodes.get(&b)) else {
            return false;
        };

        let weight = earth_distance_m(left.position, right.position);

        match self.weights.entry((a, b)) {
            std::collections::hash_map::Entry::Occupied(_) => return true,
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(weight);
            }
        }
        self.weights.insert((b, a), weight);

        Self::push_neighbor(&mut self.adjacency, a, b);
        Self::push_neighbor(&mut self.adjacency, b, a);
        true
    }

    fn push_neighbor(adjacency: &mut BTreeMap<i64, Vec<i64>>, from: i64, to: i64) {
        match adjacency.entry(from) {
            Entry::Vacant(e) => {
                e.insert(vec![to]);
            }
            Entry::Occupied(mut e) => e.get_mut().push(to),
        }
    }
}
