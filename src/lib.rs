// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Intersection records for building tiled, routable graphs from
//! [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! Converting OSM data into a graph happens in two passes over a [NodeTable]:
//! 1. discovery ([osm::discover_from_file] and friends) reads nodes and ways,
//!    counts how many ways use every node and splits ways into [Edges](Edge)
//!    at intersections;
//! 2. tiling ([assign_graph_ids]) partitions the intersections into a grid of tiles
//!    and gives each one a [GraphId].
//!
//! Every node is represented by an [OsmNode], keeping its position, edges,
//! use count and a few routing-relevant attributes packed into a single word.
//! Nodes used more than once are intersections (or ends of ways) and become
//! vertices of the graph; the remaining nodes are shape points.
//!
//! # Example
//!
//! ```no_run
//! let options = osmnode::osm::Options {
//!     profile: &osmnode::osm::CAR_PROFILE,
//!     file_format: osmnode::osm::FileFormat::XmlGz,
//!     bbox: [0.0; 4],
//!     tile_level: osmnode::TileLevel::Local,
//! };
//! let mut nodes = osmnode::osm::discover_from_file(&options, "path/to/monaco.osm.gz")
//!     .expect("failed to load monaco.osm.gz");
//!
//! let summary = osmnode::assign_graph_ids(&mut nodes, options.tile_level)
//!     .expect("failed to tile nodes");
//!
//! println!("{} vertices in {} tiles", summary.vertices, summary.tiles);
//! ```

pub mod graph_id;
mod modes;
pub mod node;
pub mod osm;
mod point;
mod table;
mod tiles;

pub use graph_id::{GraphId, GraphIdError};
pub use modes::Modes;
pub use node::{NodeAttributes, OsmNode};
pub use point::PointLL;
pub use table::{Edge, NodeTable};
pub use tiles::{assign_graph_ids, TileLevel, Tiles, TilingError, TilingSummary};
