use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use placeroute::osm::{FileFormat, MapData};
use placeroute::report::{plan_route, Outcome};
use placeroute::{Graph, NamedPlace, PlaceOptions, WayPosition};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct MapLoadError(PathBuf, #[source] placeroute::Error);

#[derive(Debug, thiserror::Error)]
enum SelectError {
    #[error("no named locations found")]
    NoPlaces,

    #[error("no place matching {0:?} (use an index from 0 to {1}, or an exact name)")]
    NoMatch(String, usize),
}

#[derive(Parser)]
#[command(about = "Shortest road routes between named places in OpenStreetMap extracts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all named places
    Places {
        #[command(flatten)]
        map: MapArgs,

        /// Also write the places as a tab-separated name, lat, lon file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Find the shortest road route between two places
    Route {
        #[command(flatten)]
        map: MapArgs,

        /// Index or exact name of the start place
        from: String,

        /// Index or exact name of the end place
        to: String,

        /// Print the route as GeoJSON instead of a report
        #[arg(long)]
        geojson: bool,
    },

    /// Print the great-circle distance between two places, in kilometers
    Distance {
        #[command(flatten)]
        map: MapArgs,

        /// Index or exact name of the first place
        from: String,

        /// Index or exact name of the second place
        to: String,
    },
}

#[derive(Args)]
struct MapArgs {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Force the OSM file format instead of guessing it
    #[arg(long, value_parser = parse_format)]
    format: Option<FileFormat>,

    /// Only load nodes within min_lon,min_lat,max_lon,max_lat
    #[arg(long, value_delimiter = ',', num_args = 4)]
    bbox: Option<Vec<f64>>,

    /// Place named ways at the centroid of their nodes, instead of their first node
    #[arg(long)]
    centroid: bool,
}

fn parse_format(s: &str) -> Result<FileFormat, String> {
    match s {
        "xml" => Ok(FileFormat::Xml),
        "xml.gz" | "gz" => Ok(FileFormat::XmlGz),
        "xml.bz2" | "bz2" => Ok(FileFormat::XmlBz2),
        _ => Err(format!("unknown format {:?} (expected xml, gz or bz2)", s)),
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Places { map, output } => {
            let (_, places) = load(&map)?;
            if places.is_empty() {
                println!("No named locations found.");
                return Ok(());
            }

            for (i, p) in places.iter().enumerate() {
                println!("{}: {}", i, p);
            }

            if let Some(path) = output {
                placeroute::places::write_tsv(io::BufWriter::new(File::create(&path)?), &places)?;
                log::info!("location data saved to {}", path.display());
            }
        }

        Command::Route {
            map,
            from,
            to,
            geojson,
        } => {
            let (g, places) = load(&map)?;
            let from = select(&places, &from)?;
            let to = select(&places, &to)?;

            let report = plan_route(&g, from, to)?;
            match (&report.outcome, geojson) {
                (Outcome::Found(route), true) => print_geojson(&g, &route.nodes),
                _ => println!("{}", report),
            }
        }

        Command::Distance { map, from, to } => {
            let (_, places) = load(&map)?;
            let from = select(&places, &from)?;
            let to = select(&places, &to)?;

            let distance = placeroute::earth_distance_km(from.position, to.position);
            println!(
                "The distance between '{}' and '{}' is {:.2} kilometers.",
                from.name, to.name, distance
            );
        }
    }

    Ok(())
}

fn load(args: &MapArgs) -> Result<(Graph, Vec<NamedPlace>), MapLoadError> {
    let options = placeroute::osm::Options {
        file_format: args.format.unwrap_or_default(),
        bbox: match args.bbox.as_deref() {
            Some(&[left, bottom, right, top]) => [left, bottom, right, top],
            _ => [0.0; 4],
        },
    };
    let place_options = PlaceOptions {
        way_position: if args.centroid {
            WayPosition::Centroid
        } else {
            WayPosition::FirstNode
        },
    };

    load_map(&args.osm_file, &options)
        .and_then(|data| {
            let g = data.build_network()?;
            let places = data.extract_places(&g, &place_options);
            Ok((g, places))
        })
        .map_err(|e| MapLoadError(args.osm_file.clone(), e))
}

fn load_map<P: AsRef<Path>>(
    path: P,
    options: &placeroute::osm::Options,
) -> Result<MapData, placeroute::Error> {
    log::info!("loading OSM data from {}", path.as_ref().display());
    placeroute::osm::read_file(path, options)
}

fn select<'a>(places: &'a [NamedPlace], key: &str) -> Result<&'a NamedPlace, SelectError> {
    if places.is_empty() {
        return Err(SelectError::NoPlaces);
    }

    let by_index = key.parse::<usize>().ok().and_then(|i| places.get(i));
    by_index
        .or_else(|| places.iter().find(|p| p.name == key))
        .ok_or_else(|| SelectError::NoMatch(key.to_string(), places.len() - 1))
}

fn print_geojson(g: &Graph, route: &[i64]) {
    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{}},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut nodes = route.iter().filter_map(|&node_id| g.get_node(node_id)).peekable();
    while let Some(node) = nodes.next() {
        let suffix = if nodes.peek().is_some() { "," } else { "" };
        println!(
            "          [{}, {}]{}",
            node.position.lon, node.position.lat, suffix
        );
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");
}
