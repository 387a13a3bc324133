// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

use crate::{Coordinate, Error, NodeRecord, WayRecord};

/// Map feature produced by the [Reader]. Relations are skipped.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Feature {
    Node(NodeRecord),
    Way(WayRecord),
}

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl Parser for BufParser<'_> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Reader streams map [Features](Feature) from an [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) file.
///
/// Iteration stops after the first error.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }

    fn next_feature(&mut self) -> Result<Option<Feature>, Error> {
        let mut f: Option<Feature> = None;

        while !self.eof {
            match self.parser.read_event()? {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => return parse_node(&start).map(|n| Some(Feature::Node(n))),
                    // "way" can't be self-closing
                    b"tag" => {
                        if let Some(tags) = feature_tags(&mut f) {
                            tags.push(parse_tag(&start)?);
                        }
                    }
                    b"nd" => {
                        if let Some(Feature::Way(ref mut w)) = f {
                            w.nodes.push(parse_nd(&start)?);
                        }
                    }
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = Some(Feature::Node(parse_node(&start)?)),
                    b"way" => f = Some(Feature::Way(parse_way(&start)?)),
                    b"relation" => f = None,
                    // "tag" and "nd" must be self-closing
                    _ => {}
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(f) = f.take() {
                            return Ok(Some(f));
                        }
                    }
                    _ => {}
                },

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        Ok(f)
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Feature, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_feature() {
            Ok(f) => f.map(Ok),
            Err(e) => {
                self.eof = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

fn parse_number<T: std::str::FromStr>(
    kind: &'static str,
    attr: &Attribute<'_>,
) -> Result<T, Error>
where
    T::Err: std::fmt::Display,
{
    let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    let raw = from_utf8(&attr.value)
        .map_err(|e| Error::malformed(kind, format!("{}: {}", name, e)))?;
    raw.trim()
        .parse()
        .map_err(|e| Error::malformed(kind, format!("{}={:?}: {}", name, raw, e)))
}

fn parse_node(start: &BytesStart<'_>) -> Result<NodeRecord, Error> {
    let mut id: Option<i64> = None;
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.as_ref() {
            b"id" => id = Some(parse_number("node", &attr)?),
            b"lat" => lat = Some(parse_number("node", &attr)?),
            b"lon" => lon = Some(parse_number("node", &attr)?),
            _ => {}
        }
    }

    match (id, lat, lon) {
        (Some(id), Some(lat), Some(lon)) => Ok(NodeRecord {
            id,
            position: Coordinate::new(lat, lon),
            tags: Vec::default(),
        }),
        (None, _, _) => Err(Error::malformed("node", "missing id")),
        (Some(id), _, _) => Err(Error::malformed(
            "node",
            format!("node {} is missing lat or lon", id),
        )),
    }
}

fn parse_way(start: &BytesStart<'_>) -> Result<WayRecord, Error> {
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == b"id" {
            return Ok(WayRecord {
                id: parse_number("way", &attr)?,
                ..WayRecord::default()
            });
        }
    }

    Err(Error::malformed("way", "missing id"))
}

fn parse_tag(start: &BytesStart<'_>) -> Result<(String, String), Error> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.as_ref() {
            b"k" => k = Some(attr.unescape_value()?.into_owned()),
            b"v" => v = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    match k {
        Some(k) => Ok((k, v.unwrap_or_default())),
        None => Err(Error::malformed("tag", "missing key")),
    }
}

fn parse_nd(start: &BytesStart<'_>) -> Result<i64, Error> {
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == b"ref" {
            return parse_number("nd", &attr);
        }
    }

    Err(Error::malformed("nd", "missing ref"))
}

fn feature_tags(f: &mut Option<Feature>) -> Option<&mut Vec<(String, String)>> {
    match f {
        Some(Feature::Node(n)) => Some(&mut n.tags),
        Some(Feature::Way(w)) => Some(&mut w.tags),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_XML: &[u8] = include_bytes!("test_fixtures/simple.osm");

    fn named(id: i64, lat: f64, lon: f64, tags: Vec<(String, String)>) -> NodeRecord {
        NodeRecord {
            id,
            position: Coordinate::new(lat, lon),
            tags,
        }
    }

    fn get_expected_features() -> Vec<Feature> {
        vec![
            Feature::Node(named(1, 0.0, 0.0, tags! {"name": "Library", "amenity": "library"})),
            Feature::Node(named(2, 0.0, 0.001, tags! {})),
            Feature::Node(named(3, 0.0, 0.002, tags! {"name": "Cafe"})),
            Feature::Node(named(4, 0.0005, 0.001, tags! {})),
            Feature::Node(named(5, 1.0, 1.0, tags! {"name": "Tom & Jerry's"})),
            Feature::Node(named(6, 1.0, 1.001, tags! {})),
            Feature::Way(WayRecord {
                id: 100,
                tags: tags! {"highway": "residential", "name": "Main Street"},
                nodes: vec![1, 2, 3],
            }),
            Feature::Way(WayRecord {
                id: 101,
                tags: tags! {"highway": "footway"},
                nodes: vec![2, 4, 404],
            }),
            Feature::Way(WayRecord {
                id: 102,
                tags: tags! {"building": "yes", "name": "Gym"},
                nodes: vec![4, 5, 6, 4],
            }),
            Feature::Way(WayRecord {
                id: 103,
                tags: tags! {"highway": "service"},
                nodes: vec![5, 6],
            }),
        ]
    }

    fn collect_all<I: Iterator<Item = Result<Feature, Error>>>(
        features: I,
    ) -> Result<Vec<Feature>, Error> {
        features.collect()
    }

    #[test]
    fn parse_from_buf() -> Result<(), Error> {
        assert_eq!(
            collect_all(Reader::from_buffer(SIMPLE_XML))?,
            get_expected_features()
        );
        Ok(())
    }

    #[test]
    fn parse_from_io() -> Result<(), Error> {
        assert_eq!(
            collect_all(Reader::from_io(io::Cursor::new(SIMPLE_XML)))?,
            get_expected_features()
        );
        Ok(())
    }

    #[test]
    fn malformed_node() {
        const DATA: &[u8] = br#"<osm><node id="1" lat="north" lon="0.0"/></osm>"#;
        let err = collect_all(Reader::from_buffer(DATA)).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { kind: "node", .. }));
    }

    #[test]
    fn node_missing_lon() {
        const DATA: &[u8] = br#"<osm><node id="1" lat="0.0"><tag k="name" v="X"/></node></osm>"#;
        let err = collect_all(Reader::from_buffer(DATA)).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { kind: "node", .. }));
    }

    #[test]
    fn malformed_nd() {
        const DATA: &[u8] = br#"<osm><way id="1"><nd ref="x"/></way></osm>"#;
        let err = collect_all(Reader::from_buffer(DATA)).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { kind: "nd", .. }));
    }

    #[test]
    fn stops_after_error() {
        const DATA: &[u8] = br#"<osm><node id="x" lat="0" lon="0"/><node id="2" lat="0" lon="0"/></osm>"#;
        let mut r = Reader::from_buffer(DATA);
        assert!(r.next().unwrap().is_err());
        assert!(r.next().is_none());
    }
}
