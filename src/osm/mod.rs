// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Reading [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) map extracts.

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::{
    build_network, extract_places, Error, Graph, NamedPlace, NodeRecord, PlaceOptions, WayRecord,
};

mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the file extension or the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the magic bytes at the start of the data.
    /// Anything not recognized as compressed is assumed to be plain XML.
    pub fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(&[0x1F, 0x8B]) {
            Self::XmlGz
        } else if prefix.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }

    /// Guesses the format from the file extension. Returns [FileFormat::Unknown]
    /// for unrecognized extensions.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("osm") | Some("xml") => Self::Xml,
            Some("gz") => Self::XmlGz,
            Some("bz2") => Self::XmlBz2,
            _ => Self::Unknown,
        }
    }
}

/// Additional controls for reading map data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    ///
    /// Way references to filtered-out nodes are kept, just like references to nodes
    /// outside of the extract.
    pub bbox: [f64; 4],
}

impl Options {
    fn contains(&self, n: &NodeRecord) -> bool {
        if self.bbox.iter().all(|&x| x == 0.0) || self.bbox.iter().any(|x| !x.is_finite()) {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.bbox;
        let (lat, lon) = (n.position.lat, n.position.lon);
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }
}

/// All nodes and ways of a map extract, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapData {
    pub nodes: Vec<NodeRecord>,
    pub ways: Vec<WayRecord>,
}

impl MapData {
    /// Shorthand for [build_network] over this data.
    pub fn build_network(&self) -> Result<Graph, Error> {
        build_network(&self.nodes, &self.ways)
    }

    /// Shorthand for [extract_places] over this data.
    pub fn extract_places(&self, g: &Graph, options: &PlaceOptions) -> Vec<NamedPlace> {
        extract_places(&self.nodes, &self.ways, g, options)
    }

    fn collect<I>(features: I, options: &Options) -> Result<Self, Error>
    where
        I: Iterator<Item = Result<xml::Feature, Error>>,
    {
        let mut data = Self::default();
        let mut outside_bbox: usize = 0;

        for f in features {
            match f? {
                xml::Feature::Node(n) => {
                    if options.contains(&n) {
                        data.nodes.push(n);
                    } else {
                        outside_bbox += 1;
                    }
                }
                xml::Feature::Way(w) => data.ways.push(w),
            }
        }

        if outside_bbox > 0 {
            log::debug!("dropped {} nodes outside of the bounding box", outside_bbox);
        }
        log::info!(
            "loaded {} nodes and {} ways",
            data.nodes.len(),
            data.ways.len()
        );
        Ok(data)
    }
}

/// Parse map data from a reader as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn read_io<R: io::Read>(reader: R, options: &Options) -> Result<MapData, Error> {
    let mut b = io::BufReader::new(reader);

    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        f => f,
    };

    match format {
        FileFormat::Unknown | FileFormat::Xml => {
            MapData::collect(xml::Reader::from_io(b), options)
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            MapData::collect(r, options)
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            MapData::collect(r, options)
        }
    }
}

/// Parse map data from a file at the provided path as per the provided [Options].
///
/// With [FileFormat::Unknown], the format is guessed from the file extension,
/// and if that fails, from the file content.
pub fn read_file<P: AsRef<Path>>(path: P, options: &Options) -> Result<MapData, Error> {
    let path = path.as_ref();
    let mut options = *options;
    if options.file_format == FileFormat::Unknown {
        options.file_format = FileFormat::from_path(path);
    }

    log::debug!("reading {} as {:?}", path.display(), options.file_format);
    let f = File::open(path)?;
    read_io(f, &options)
}

/// Parse map data from a static buffer as per the provided [Options].
pub fn read_buffer(data: &[u8], options: &Options) -> Result<MapData, Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        MapData::collect(xml::Reader::from_buffer(data), options)
    } else {
        let options = Options {
            file_format: format,
            ..*options
        };
        read_io(io::Cursor::new(data), &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_route, locate_nearest, Coordinate, WayPosition};

    const XML: &[u8] = include_bytes!("test_fixtures/simple.osm");
    const XML_GZ: &[u8] = include_bytes!("test_fixtures/simple.osm.gz");
    const XML_BZ2: &[u8] = include_bytes!("test_fixtures/simple.osm.bz2");

    fn check_simple_data(data: &MapData) {
        assert_eq!(data.nodes.len(), 6);
        assert_eq!(data.ways.len(), 4);

        let g = data.build_network().unwrap();

        // 100: 1-2-3, 101: 2-4 (404 is missing), 103: 5-6; 102 is a building
        assert_eq!(g.edge_count(), 4);
        assert!(g.get_edge(2, 4).is_finite());
        assert!(g.get_edge(4, 5).is_infinite());
        assert!(g.get_node(404).is_none());

        let places = data.extract_places(&g, &PlaceOptions::default());
        let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Library", "Cafe", "Tom & Jerry's", "Main Street", "Gym"]
        );
    }

    #[test]
    fn read_xml() {
        let options = Options {
            file_format: FileFormat::Xml,
            ..Options::default()
        };
        check_simple_data(&read_buffer(XML, &options).unwrap());
    }

    #[test]
    fn read_xml_through_io() {
        let options = Options {
            file_format: FileFormat::Xml,
            ..Options::default()
        };
        check_simple_data(&read_io(io::Cursor::new(XML), &options).unwrap());
    }

    #[test]
    fn read_gz() {
        let options = Options {
            file_format: FileFormat::XmlGz,
            ..Options::default()
        };
        check_simple_data(&read_buffer(XML_GZ, &options).unwrap());
    }

    #[test]
    fn read_bz2() {
        let options = Options {
            file_format: FileFormat::XmlBz2,
            ..Options::default()
        };
        check_simple_data(&read_buffer(XML_BZ2, &options).unwrap());
    }

    #[test]
    fn detect_format() {
        let options = Options::default();
        check_simple_data(&read_buffer(XML, &options).unwrap());
        check_simple_data(&read_buffer(XML_GZ, &options).unwrap());
        check_simple_data(&read_io(io::Cursor::new(XML_BZ2), &options).unwrap());

        assert_eq!(FileFormat::from_path("a/b.osm"), FileFormat::Xml);
        assert_eq!(FileFormat::from_path("a/b.osm.gz"), FileFormat::XmlGz);
        assert_eq!(FileFormat::from_path("a/b.osm.bz2"), FileFormat::XmlBz2);
        assert_eq!(FileFormat::from_path("a/b"), FileFormat::Unknown);
    }

    #[test]
    fn bbox_filter() {
        let options = Options {
            file_format: FileFormat::Xml,
            bbox: [-0.01, -0.01, 0.01, 0.01],
        };
        let data = read_buffer(XML, &options).unwrap();
        assert_eq!(data.nodes.len(), 4);

        let g = data.build_network().unwrap();
        assert_eq!(g.edge_count(), 3);
        assert!(g.get_node(5).is_none());
    }

    #[test]
    fn route_between_places_in_file() {
        let data = read_buffer(XML, &Options::default()).unwrap();
        let g = data.build_network().unwrap();
        let places = data.extract_places(&g, &PlaceOptions::default());

        let library = places.iter().find(|p| p.name == "Library").unwrap();
        let cafe = places.iter().find(|p| p.name == "Cafe").unwrap();
        let from = locate_nearest(&g, library.position).unwrap();
        let to = locate_nearest(&g, cafe.position).unwrap();

        let r = find_route(&g, from.id, to.id).unwrap();
        assert_eq!(r.nodes, vec![1, 2, 3]);
        assert_almost_eq!(r.total_weight, g.get_edge(1, 2) + g.get_edge(2, 3));
    }

    #[test]
    fn centroid_places_in_file() {
        let data = read_buffer(XML, &Options::default()).unwrap();
        let g = data.build_network().unwrap();
        let options = PlaceOptions {
            way_position: WayPosition::Centroid,
        };
        let places = data.extract_places(&g, &options);

        let gym = places.iter().find(|p| p.name == "Gym").unwrap();
        assert_almost_eq!(gym.position.lat, (0.0005 + 1.0 + 1.0 + 0.0005) / 4.0);
        assert_ne!(gym.position, Coordinate::new(0.0005, 0.001));
    }
}
