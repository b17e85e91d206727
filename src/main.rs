use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use osmnode::osm::{FileFormat, Options, Profile};
use osmnode::{NodeTable, TileLevel};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct NodeLoadError(PathBuf, #[source] osmnode::osm::Error);

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("--bbox expects exactly 4 values, got {0}")]
struct BboxError(usize);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    Car,
    Bicycle,
    Foot,
}

impl ProfileArg {
    fn profile(self) -> &'static Profile<'static> {
        match self {
            Self::Car => &osmnode::osm::CAR_PROFILE,
            Self::Bicycle => &osmnode::osm::BICYCLE_PROFILE,
            Self::Foot => &osmnode::osm::FOOT_PROFILE,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Xml,
    XmlGz,
    XmlBz2,
}

impl From<FormatArg> for FileFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Xml => FileFormat::Xml,
            FormatArg::XmlGz => FileFormat::XmlGz,
            FormatArg::XmlBz2 => FileFormat::XmlBz2,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Highway,
    Arterial,
    Local,
}

impl From<LevelArg> for TileLevel {
    fn from(l: LevelArg) -> Self {
        match l {
            LevelArg::Highway => TileLevel::Highway,
            LevelArg::Arterial => TileLevel::Arterial,
            LevelArg::Local => TileLevel::Local,
        }
    }
}

#[derive(Parser)]
struct Cli {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Which ways should be included in the graph
    #[arg(long, value_enum, default_value_t = ProfileArg::Car)]
    profile: ProfileArg,

    /// Format of the OSM file; guessed from the extension if not provided
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Hierarchy level of the tiles
    #[arg(long, value_enum, default_value_t = LevelArg::Local)]
    level: LevelArg,

    /// Only consider nodes within a bounding box: min_lon,min_lat,max_lon,max_lat
    #[arg(long, value_delimiter = ',', num_args = 4)]
    bbox: Option<Vec<f32>>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let bbox = parse_bbox(cli.bbox.as_deref())?;

    let options = Options {
        profile: cli.profile.profile(),
        file_format: cli
            .format
            .map(FileFormat::from)
            .unwrap_or_else(|| FileFormat::from_path(&cli.osm_file)),
        bbox,
        tile_level: cli.level.into(),
    };

    let mut nodes = load_nodes(&options, &cli.osm_file)?;
    let summary = osmnode::assign_graph_ids(&mut nodes, options.tile_level)?;

    println!("nodes:        {}", nodes.len());
    println!("edges:        {}", nodes.edges().len());
    println!("vertices:     {}", summary.vertices);
    println!("shape points: {}", summary.shape_points);
    println!("unplaced:     {}", summary.unplaced);
    println!("tiles:        {}", summary.tiles);

    Ok(())
}

/// Converts the `--bbox` values into [Options::bbox]; a missing bbox disables filtering.
fn parse_bbox(values: Option<&[f32]>) -> Result<[f32; 4], BboxError> {
    match values {
        None => Ok([0.0; 4]),
        Some(v) => <[f32; 4]>::try_from(v).map_err(|_| BboxError(v.len())),
    }
}

fn load_nodes<P: AsRef<Path>>(options: &Options<'_>, path: P) -> Result<NodeTable, NodeLoadError> {
    osmnode::osm::discover_from_file(options, path.as_ref())
        .map_err(|e| NodeLoadError(PathBuf::from(path.as_ref()), e))
}
