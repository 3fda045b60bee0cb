//! Global tile ids as stored in map layers that reference a tileset.

use serde::{Deserialize, Serialize};

use crate::tileset::{TileId, Tileset};

const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
const ROTATED_HEXAGONAL_120: u32 = 0x1000_0000;
const FLAG_MASK: u32 =
    FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY | ROTATED_HEXAGONAL_120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
    pub diagonal: bool,
    pub hexagonal_120: bool,
}

/// Raw cell value: tileset-offset id in the low bits, flip flags in the top four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalTileId(u32);

impl GlobalTileId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Id with the flip flags stripped.
    pub fn id(self) -> u32 {
        self.0 & !FLAG_MASK
    }

    pub fn flip(self) -> Flip {
        Flip {
            horizontal: self.0 & FLIPPED_HORIZONTALLY != 0,
            vertical: self.0 & FLIPPED_VERTICALLY != 0,
            diagonal: self.0 & FLIPPED_DIAGONALLY != 0,
            hexagonal_120: self.0 & ROTATED_HEXAGONAL_120 != 0,
        }
    }

    /// Cells with id 0 hold no tile.
    pub fn is_empty(self) -> bool {
        self.id() == 0
    }
}

impl From<u32> for GlobalTileId {
    fn from(raw: u32) -> Self {
        Self::new(raw)
    }
}

/// A tileset as referenced from a map, occupying `first_gid..first_gid + tile_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetRef {
    pub first_gid: u32,
    pub tile_count: u32,
}

impl TilesetRef {
    pub fn new(first_gid: u32, tileset: &Tileset) -> Self {
        Self {
            first_gid,
            tile_count: tileset.tile_count,
        }
    }

    pub fn contains(&self, gid: GlobalTileId) -> bool {
        self.local_id(gid).is_some()
    }

    pub fn local_id(&self, gid: GlobalTileId) -> Option<TileId> {
        if gid.is_empty() {
            return None;
        }
        gid.id()
            .checked_sub(self.first_gid)
            .filter(|local| *local < self.tile_count)
    }

    pub fn global_id(&self, local: TileId) -> Option<GlobalTileId> {
        if local >= self.tile_count {
            return None;
        }
        self.first_gid.checked_add(local).map(GlobalTileId::new)
    }
}
