//! In-memory model of a Tiled tileset and its invariants.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TilesetError;

pub type TileId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Orthogonal => "orthogonal",
            Orientation::Isometric => "isometric",
        }
    }

    pub fn parse(value: &str) -> Result<Self, TilesetError> {
        match value.trim() {
            "orthogonal" => Ok(Orientation::Orthogonal),
            "isometric" => Ok(Orientation::Isometric),
            other => Err(TilesetError::Parse(format!(
                "unknown grid orientation '{other}'"
            ))),
        }
    }
}

/// Per-cell grid settings used when placing tiles from this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileImage {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: TileId,
    #[serde(rename = "type")]
    pub tile_type: Option<String>,
    pub probability: Option<f32>,
    pub image: Option<TileImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl TileDefinition {
    pub fn new(id: TileId, tile_type: impl Into<String>, image: TileImage) -> Self {
        Self {
            id,
            tile_type: Some(tile_type.into()),
            probability: None,
            image: Some(image),
            properties: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| property.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    pub name: String,
    pub version: Option<String>,
    pub tiled_version: Option<String>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    pub grid: Option<Grid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    /// Atlas image the tiles are cut from; collections carry one image per tile instead.
    #[serde(default)]
    pub image: Option<TileImage>,
    pub tiles: Vec<TileDefinition>,
}

/// Which invariants `Tileset::validate` enforces beyond the structural ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default = "default_true")]
    pub require_contiguous_ids: bool,
    #[serde(default = "default_true")]
    pub require_unique_types: bool,
    #[serde(default = "default_true")]
    pub require_uniform_size: bool,
    #[serde(default)]
    pub check_images: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            require_contiguous_ids: true,
            require_unique_types: true,
            require_uniform_size: true,
            check_images: false,
        }
    }
}

impl ValidationPolicy {
    /// Only the checks a tileset cannot be used without.
    pub fn lenient() -> Self {
        Self {
            require_contiguous_ids: false,
            require_unique_types: false,
            require_uniform_size: false,
            check_images: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
    #[error("grid cell size must be non-zero, got {width}x{height}")]
    ZeroGridSize { width: u32, height: u32 },
    #[error("tile id {0} defined more than once")]
    DuplicateId(TileId),
    #[error(
        "tile ids must run from 0 to {}, missing {missing:?}, out of range {out_of_range:?}",
        .expected.saturating_sub(1)
    )]
    NonContiguousIds {
        expected: u32,
        missing: Vec<TileId>,
        out_of_range: Vec<TileId>,
    },
    #[error("tile id {id} is outside the declared tile count {tile_count}")]
    IdOutOfRange { id: TileId, tile_count: u32 },
    #[error("tilecount declares {declared} tiles but {actual} are defined")]
    CountMismatch { declared: u32, actual: usize },
    #[error("tile {0} has no image in an image collection tileset")]
    MissingImage(TileId),
    #[error("tile type '{tile_type}' used by tiles {first} and {second}")]
    DuplicateType {
        tile_type: String,
        first: TileId,
        second: TileId,
    },
    #[error("tile {id} image is {width}x{height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        id: TileId,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

impl Tileset {
    pub fn tile(&self, id: TileId) -> Option<&TileDefinition> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    pub fn tile_by_type(&self, tile_type: &str) -> Option<&TileDefinition> {
        self.tiles
            .iter()
            .find(|tile| tile.tile_type.as_deref() == Some(tile_type))
    }

    pub fn is_collection(&self) -> bool {
        self.columns == 0
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| property.value.as_str())
    }

    /// Column and row of a tile inside the atlas image. Collections have no atlas.
    pub fn grid_position(&self, id: TileId) -> Option<(u32, u32)> {
        if self.is_collection() || id >= self.tile_count {
            return None;
        }
        Some((id % self.columns, id / self.columns))
    }

    /// Order-insensitive `(id, type, source)` key used to compare tilesets.
    pub fn signature(&self) -> BTreeSet<(TileId, Option<String>, Option<String>)> {
        self.tiles
            .iter()
            .map(|tile| {
                (
                    tile.id,
                    tile.tile_type.clone(),
                    tile.image.as_ref().map(|image| image.source.clone()),
                )
            })
            .collect()
    }

    pub fn issues(&self, policy: &ValidationPolicy) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.tile_width == 0 || self.tile_height == 0 {
            issues.push(ValidationIssue::ZeroTileSize {
                width: self.tile_width,
                height: self.tile_height,
            });
        }

        if let Some(grid) = &self.grid {
            if grid.width == 0 || grid.height == 0 {
                issues.push(ValidationIssue::ZeroGridSize {
                    width: grid.width,
                    height: grid.height,
                });
            }
        }

        // Atlases only list tiles that carry extra data, so gaps are normal there.
        let check_contiguity = policy.require_contiguous_ids && self.is_collection();

        let mut known_ids = HashSet::new();
        for tile in &self.tiles {
            if !known_ids.insert(tile.id) {
                issues.push(ValidationIssue::DuplicateId(tile.id));
            }
            // Tiled keeps collection ids after a tile is removed, so only atlases bound them.
            if !self.is_collection() && tile.id >= self.tile_count {
                issues.push(ValidationIssue::IdOutOfRange {
                    id: tile.id,
                    tile_count: self.tile_count,
                });
            }
        }

        if check_contiguity {
            let expected = self.tile_count.max(self.tiles.len() as u32);
            let missing: Vec<TileId> = (0..expected).filter(|id| !known_ids.contains(id)).collect();
            let mut out_of_range: Vec<TileId> = known_ids
                .iter()
                .copied()
                .filter(|id| *id >= expected)
                .collect();
            out_of_range.sort_unstable();
            if !missing.is_empty() || !out_of_range.is_empty() {
                issues.push(ValidationIssue::NonContiguousIds {
                    expected,
                    missing,
                    out_of_range,
                });
            }
        }

        if self.is_collection() {
            if self.tiles.len() != self.tile_count as usize {
                issues.push(ValidationIssue::CountMismatch {
                    declared: self.tile_count,
                    actual: self.tiles.len(),
                });
            }
            for tile in self.tiles.iter().filter(|tile| tile.image.is_none()) {
                issues.push(ValidationIssue::MissingImage(tile.id));
            }
        }

        if policy.require_unique_types {
            let mut seen: Vec<(&str, TileId)> = Vec::new();
            for tile in &self.tiles {
                let Some(tile_type) = tile.tile_type.as_deref() else {
                    continue;
                };
                match seen.iter().find(|(label, _)| *label == tile_type) {
                    Some((_, first)) => issues.push(ValidationIssue::DuplicateType {
                        tile_type: tile_type.to_string(),
                        first: *first,
                        second: tile.id,
                    }),
                    None => seen.push((tile_type, tile.id)),
                }
            }
        }

        if policy.require_uniform_size {
            for tile in &self.tiles {
                if let Some(image) = &tile.image {
                    if image.width != self.tile_width || image.height != self.tile_height {
                        issues.push(ValidationIssue::SizeMismatch {
                            id: tile.id,
                            width: image.width,
                            height: image.height,
                            expected_width: self.tile_width,
                            expected_height: self.tile_height,
                        });
                    }
                }
            }
        }

        issues
    }

    pub fn validate(&self, policy: &ValidationPolicy) -> Result<(), TilesetError> {
        let issues = self.issues(policy);
        if issues.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        Err(TilesetError::Validation(format!(
            "tileset '{}': {}",
            self.name,
            messages.join("; ")
        )))
    }
}
