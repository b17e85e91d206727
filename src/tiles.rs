// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::graph_id::MAX_LOCAL_ID;
use crate::{GraphId, GraphIdError, NodeTable, PointLL};

/// Hierarchy level of the tiled graph, determining the size of its tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileLevel {
    /// 4° tiles
    Highway = 0,

    /// 1° tiles
    Arterial = 1,

    /// 0.25° tiles
    Local = 2,
}

impl TileLevel {
    /// Length of the side of a single tile, in degrees.
    pub fn tile_size(&self) -> f32 {
        match self {
            Self::Highway => 4.0,
            Self::Arterial => 1.0,
            Self::Local => 0.25,
        }
    }
}

/// Regular grid of square tiles covering the whole world.
///
/// Tiles are numbered row by row, starting from the south-west corner
/// (-90° latitude, -180° longitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiles {
    level: TileLevel,
    ncolumns: u32,
    nrows: u32,
}

impl Tiles {
    pub fn new(level: TileLevel) -> Self {
        let size = level.tile_size();
        Self {
            level,
            ncolumns: (360.0 / size).ceil() as u32,
            nrows: (180.0 / size).ceil() as u32,
        }
    }

    pub fn level(&self) -> TileLevel {
        self.level
    }

    pub fn tile_size(&self) -> f32 {
        self.level.tile_size()
    }

    pub fn ncolumns(&self) -> u32 {
        self.ncolumns
    }

    pub fn nrows(&self) -> u32 {
        self.nrows
    }

    /// Number of tiles in the grid.
    pub fn tile_count(&self) -> u32 {
        self.ncolumns * self.nrows
    }

    /// Returns the index of the tile containing the given point,
    /// or None if the point is invalid or outside of the world bounds.
    ///
    /// Points on the north (90°) and east (180°) edges of the world
    /// belong to the last row and column, respectively.
    pub fn tile_id(&self, p: PointLL) -> Option<u32> {
        if !p.is_valid() || !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lng)
        {
            return None;
        }

        let size = self.tile_size();
        let row = (((p.lat + 90.0) / size) as u32).min(self.nrows - 1);
        let col = (((p.lng + 180.0) / size) as u32).min(self.ncolumns - 1);
        Some(row * self.ncolumns + col)
    }

    /// Returns the south-west and north-east corners of a tile,
    /// or None if the tile doesn't exist.
    pub fn tile_bounds(&self, tile_id: u32) -> Option<(PointLL, PointLL)> {
        if tile_id >= self.tile_count() {
            return None;
        }

        let size = self.tile_size();
        let row = tile_id / self.ncolumns;
        let col = tile_id % self.ncolumns;
        let min_lat = row as f32 * size - 90.0;
        let min_lng = col as f32 * size - 180.0;
        Some((
            PointLL::new(min_lat, min_lng),
            PointLL::new(min_lat + size, min_lng + size),
        ))
    }
}

/// Error which can occur when assigning [GraphIds](GraphId) to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TilingError {
    #[error("tile {0} has more than {MAX_LOCAL_ID} vertices")]
    TileFull(u32),

    #[error("graph id: {0}")]
    GraphId(#[from] GraphIdError),
}

/// Statistics of a single tiling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TilingSummary {
    /// Number of distinct tiles which received at least one vertex in this pass.
    pub tiles: usize,

    /// Number of nodes which received a [GraphId].
    pub vertices: usize,

    /// Number of nodes skipped as shape points.
    pub shape_points: usize,

    /// Number of vertices skipped due to missing or out-of-range positions.
    pub unplaced: usize,
}

/// Assigns a [GraphId] to every vertex ([OsmNode::is_intersection](crate::OsmNode::is_intersection))
/// of the table which doesn't have one yet.
///
/// Within every tile, local ids are handed out sequentially in ascending OSM id order,
/// continuing after ids assigned by previous passes at the same level. Shape points and
/// nodes without a valid position are left untouched.
///
/// On error, nodes processed before the failing one keep their ids.
pub fn assign_graph_ids(
    table: &mut NodeTable,
    level: TileLevel,
) -> Result<TilingSummary, TilingError> {
    let tiles = Tiles::new(level);
    let mut next_ids: BTreeMap<u32, u32> = BTreeMap::new();
    let mut touched_tiles: BTreeSet<u32> = BTreeSet::new();
    let mut summary = TilingSummary::default();

    // Continue numbering after already-tiled nodes
    for (_, node) in table.iter() {
        if let Some(id) = node.graph_id() {
            if id.level() == level as u32 {
                let next = next_ids.entry(id.tile_id()).or_insert(0);
                *next = (*next).max(id.id() + 1);
            }
        }
    }

    for (osm_id, node) in table.iter_mut() {
        if !node.is_intersection() {
            summary.shape_points += 1;
            continue;
        } else if node.has_graph_id() {
            continue;
        }

        let tile_id = match tiles.tile_id(node.position()) {
            Some(t) => t,
            None => {
                log::warn!(
                    "node {} has no usable position ({:?}) - not tiled",
                    osm_id,
                    node.position()
                );
                summary.unplaced += 1;
                continue;
            }
        };

        let next = next_ids.entry(tile_id).or_insert(0);
        if *next >= MAX_LOCAL_ID {
            return Err(TilingError::TileFull(tile_id));
        }

        node.set_graph_id(GraphId::new(tile_id, level as u32, *next)?);
        *next += 1;
        touched_tiles.insert(tile_id);
        summary.vertices += 1;
    }

    summary.tiles = touched_tiles.len();
    log::info!(
        "tiled {} vertices into {} tiles at level {:?} ({} shape points, {} unplaced)",
        summary.vertices,
        summary.tiles,
        level,
        summary.shape_points,
        summary.unplaced,
    );
    Ok(summary)
}
