// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

const LEVEL_BITS: u32 = 3;
const TILE_ID_BITS: u32 = 22;
const ID_BITS: u32 = 21;

const LEVEL_SHIFT: u32 = 0;
const TILE_ID_SHIFT: u32 = LEVEL_BITS;
const ID_SHIFT: u32 = LEVEL_BITS + TILE_ID_BITS;

/// Largest representable hierarchy level.
pub const MAX_LEVEL: u32 = (1 << LEVEL_BITS) - 1;

/// Largest representable tile index.
pub const MAX_TILE_ID: u32 = (1 << TILE_ID_BITS) - 1;

/// Largest representable node index within a tile.
pub const MAX_LOCAL_ID: u32 = (1 << ID_BITS) - 1;

const VALUE_MASK: u64 = (1 << (LEVEL_BITS + TILE_ID_BITS + ID_BITS)) - 1;

/// Error returned when [GraphId] components do not fit their bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphIdError {
    #[error("hierarchy level too large: {0} > {MAX_LEVEL}")]
    LevelTooLarge(u32),

    #[error("tile id too large: {0} > {MAX_TILE_ID}")]
    TileIdTooLarge(u32),

    #[error("local id too large: {0} > {MAX_LOCAL_ID}")]
    IdTooLarge(u32),
}

/// Identifier of a node within the tiled graph.
///
/// Packs the hierarchy level (3 bits), the tile index within that level (22 bits)
/// and the node index within the tile (21 bits) into a single integer.
/// The all-ones pattern is reserved for [GraphId::INVALID].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphId(u64);

impl GraphId {
    /// Sentinel for "not assigned yet".
    pub const INVALID: Self = Self(VALUE_MASK);

    pub fn new(tile_id: u32, level: u32, id: u32) -> Result<Self, GraphIdError> {
        if level > MAX_LEVEL {
            return Err(GraphIdError::LevelTooLarge(level));
        }
        if tile_id > MAX_TILE_ID {
            return Err(GraphIdError::TileIdTooLarge(tile_id));
        }
        if id > MAX_LOCAL_ID {
            return Err(GraphIdError::IdTooLarge(id));
        }

        let v = ((level as u64) << LEVEL_SHIFT)
            | ((tile_id as u64) << TILE_ID_SHIFT)
            | ((id as u64) << ID_SHIFT);
        Ok(Self(v))
    }

    /// Returns false for [GraphId::INVALID].
    pub fn is_valid(&self) -> bool {
        self.0 != VALUE_MASK
    }

    pub fn level(&self) -> u32 {
        ((self.0 >> LEVEL_SHIFT) & MAX_LEVEL as u64) as u32
    }

    pub fn tile_id(&self) -> u32 {
        ((self.0 >> TILE_ID_SHIFT) & MAX_TILE_ID as u64) as u32
    }

    pub fn id(&self) -> u32 {
        ((self.0 >> ID_SHIFT) & MAX_LOCAL_ID as u64) as u32
    }

    /// Raw packed value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the id of the first node in the same tile and level.
    pub fn tile_base(&self) -> Self {
        Self(self.0 & !((MAX_LOCAL_ID as u64) << ID_SHIFT))
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "{}/{}/{}", self.level(), self.tile_id(), self.id())
        } else {
            write!(f, "invalid")
        }
    }
}

impl std::fmt::Debug for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GraphId({})", self)
    }
}
