// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Human-readable places extracted from map data.

use std::collections::HashSet;
use std::io;

use crate::{tag_value, Coordinate, Error, Graph, NodeRecord, WayRecord};

/// Tag key holding a human-readable name of a feature.
const NAME_TAG: &str = "name";

/// A named feature of the map (a shop, a building, a street, ...) at a specific position.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPlace {
    pub name: String,
    pub position: Coordinate,
}

impl std::fmt::Display for NamedPlace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.position)
    }
}

/// Decides where a named way is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WayPosition {
    /// Position of the first way node present in the [Graph].
    #[default]
    FirstNode,

    /// Average position of all way nodes present in the [Graph].
    /// Useful for building outlines, whose first node is an arbitrary corner.
    Centroid,
}

/// Additional controls for [extract_places].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaceOptions {
    pub way_position: WayPosition,
}

/// Extracts all named nodes and ways as [NamedPlaces](NamedPlace).
///
/// This is independent of road classification; any feature with a `name` tag counts.
/// Ways are positioned as per [PlaceOptions::way_position], and only nodes present in the
/// provided graph are considered; a way without such nodes yields no place.
///
/// Places with the same name and exactly the same position are reported only once,
/// the first occurrence wins. The remaining places keep their input order
/// (nodes first, then ways). An empty result means the data has no named features.
pub fn extract_places(
    nodes: &[NodeRecord],
    ways: &[WayRecord],
    g: &Graph,
    options: &PlaceOptions,
) -> Vec<NamedPlace> {
    let from_nodes = nodes.iter().filter_map(|n| {
        let name = tag_value(&n.tags, NAME_TAG)?;
        let position = g.get_node(n.id).map_or(n.position, |nd| nd.position);
        Some(NamedPlace {
            name: name.to_string(),
            position,
        })
    });

    let from_ways = ways.iter().filter_map(|w| {
        let name = tag_value(&w.tags, NAME_TAG)?;
        let position = way_position(w, g, options.way_position)?;
        Some(NamedPlace {
            name: name.to_string(),
            position,
        })
    });

    let places = dedup_places(from_nodes.chain(from_ways));
    log::info!("extracted {} named places", places.len());
    places
}

fn way_position(w: &WayRecord, g: &Graph, mode: WayPosition) -> Option<Coordinate> {
    let mut known = w.nodes.iter().filter_map(|&id| g.get_node(id));

    match mode {
        WayPosition::FirstNode => known.next().map(|n| n.position),
        WayPosition::Centroid => {
            let (count, lat, lon) = known.fold((0usize, 0.0, 0.0), |(count, lat, lon), n| {
                (count + 1, lat + n.position.lat, lon + n.position.lon)
            });
            if count == 0 {
                None
            } else {
                Some(Coordinate::new(lat / count as f64, lon / count as f64))
            }
        }
    }
}

/// Removes places with a repeated `(name, lat, lon)` key, keeping the first occurrence.
fn dedup_places<I: IntoIterator<Item = NamedPlace>>(places: I) -> Vec<NamedPlace> {
    let mut seen: HashSet<(String, u64, u64)> = HashSet::default();
    places
        .into_iter()
        .filter(|p| {
            seen.insert((
                p.name.clone(),
                p.position.lat.to_bits(),
                p.position.lon.to_bits(),
            ))
        })
        .collect()
}

/// Writes places as tab-separated `name`, `lat`, `lon` lines.
pub fn write_tsv<W: io::Write>(mut w: W, places: &[NamedPlace]) -> Result<(), Error> {
    for p in places {
        writeln!(w, "{}\t{}\t{}", p.name, p.position.lat, p.position.lon)?;
    }
    w.flush()?;
    Ok(())
}

/// Reads places written by [write_tsv].
///
/// Lines without exactly 3 tab-separated fields are skipped.
/// Fails with [Error::MalformedRecord] if a latitude or longitude can't be parsed.
pub fn read_tsv<R: io::BufRead>(r: R) -> Result<Vec<NamedPlace>, Error> {
    let mut places = Vec::default();

    for (line_no, line) in r.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        let [name, lat, lon] = fields.as_slice() else {
            continue;
        };

        let parse = |s: &str| {
            s.trim().parse::<f64>().map_err(|e| {
                Error::malformed("place", format!("line {}: {:?}: {}", line_no + 1, s, e))
            })
        };

        places.push(NamedPlace {
            name: name.to_string(),
            position: Coordinate::new(parse(*lat)?, parse(*lon)?),
        });
    }

    Ok(places)
}
