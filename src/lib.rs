// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Shortest road routes between named places in [OpenStreetMap](https://www.openstreetmap.org/) extracts.
//!
//! Map data is turned into an undirected, weighted road network (every way with a `highway` tag
//! is traversable in both directions, weights are great-circle distances in meters), and
//! a list of [named places](NamedPlace). Places are snapped to the closest connected node
//! and routed between with Dijkstra's algorithm.
//!
//! # Example
//!
//! ```no_run
//! let options = placeroute::osm::Options::default();
//! let data = placeroute::osm::read_file("path/to/campus.osm", &options)
//!     .expect("failed to load campus.osm");
//!
//! let g = data.build_network().expect("invalid map data");
//! let places = data.extract_places(&g, &placeroute::PlaceOptions::default());
//!
//! let start = placeroute::locate_nearest(&g, places[0].position).unwrap();
//! let end = placeroute::locate_nearest(&g, places[1].position).unwrap();
//! let route = placeroute::find_route(&g, start.id, end.id).expect("failed to find route");
//!
//! println!("{} m via {:?}", route.total_weight, route.nodes);
//! ```

#[cfg(test)]
#[macro_use]
mod test_util;

mod builder;
mod diagnostics;
mod dijkstra;
mod distance;
mod error;
mod graph;
mod nearest;
pub mod osm;
pub mod places;
pub mod report;

pub use builder::build_network;
pub use diagnostics::{diagnose_no_path, reachable_from, Diagnostics};
pub use dijkstra::{find_route, find_route_cost, Route};
pub use distance::{earth_distance_km, earth_distance_m, EARTH_RADIUS_KM};
pub use error::Error;
pub use graph::Graph;
pub use nearest::locate_nearest;
pub use places::{extract_places, NamedPlace, PlaceOptions, WayPosition};

/// A position on Earth, in decimal degrees.
///
/// Values are not validated; out-of-range latitudes or longitudes
/// simply produce meaningless distances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Represents an element of the [Graph].
///
/// `id` is the OpenStreetMap node id and is never reassigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub position: Coordinate,
}

/// An OSM node as delivered by the map feed, with its tags in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeRecord {
    pub id: i64,
    pub position: Coordinate,
    pub tags: Vec<(String, String)>,
}

/// An OSM way as delivered by the map feed: its tags in document order
/// and the ordered list of referenced node ids.
///
/// Referenced nodes might not be present in the feed
/// (e.g. when they lie outside of the extract); users must silently ignore such references.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WayRecord {
    pub id: i64,
    pub tags: Vec<(String, String)>,
    pub nodes: Vec<i64>,
}

/// Returns the value of the first tag with the provided key.
pub(crate) fn tag_value<'a>(tags: &'a [(String, String)], key: &str) -> Option<&'a str> {
    tags.iter()
        .find_map(|(k, v)| if k == key { Some(v.as_str()) } else { None })
}
