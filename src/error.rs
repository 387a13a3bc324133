// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

/// Error conditions which may occur while reading map data, building
/// a [Graph](crate::Graph) or answering route queries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record from the map feed is missing, or has an unparseable, required field.
    #[error("malformed {kind} record: {detail}")]
    MalformedRecord { kind: &'static str, detail: String },

    /// No node with at least one edge exists, so no position can be
    /// resolved to a routable node.
    #[error("no road network available")]
    EmptyNetwork,

    /// The provided node doesn't exist in the graph.
    #[error("unknown node: {0}")]
    UnknownNode(i64),

    /// The start and end nodes are in different connected components.
    #[error("no path exists between nodes {from} and {to}")]
    NoPath { from: i64, to: i64 },

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn malformed(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind,
            detail: detail.into(),
        }
    }
}
