use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::climate::ClimateClass;
use crate::error::TilesetError;
use crate::gid::{GlobalTileId, TilesetRef};
use crate::loader::LoadedTileset;
use crate::tileset::TileId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub tile_id: TileId,
    pub image: PathBuf,
}

/// Total mapping from every climate class to its tile in a loaded tileset.
#[derive(Debug, Clone)]
pub struct ClimatePalette {
    entries: BTreeMap<ClimateClass, PaletteEntry>,
    by_id: HashMap<TileId, ClimateClass>,
}

impl ClimatePalette {
    pub fn from_loaded(loaded: &LoadedTileset) -> Result<Self, TilesetError> {
        let tileset = loaded.tileset();
        let mut entries: BTreeMap<ClimateClass, PaletteEntry> = BTreeMap::new();
        let mut by_id = HashMap::new();

        for tile in &tileset.tiles {
            let Some(label) = tile.tile_type.as_deref() else {
                return Err(TilesetError::Validation(format!(
                    "tile {} has no climate type",
                    tile.id
                )));
            };
            let class: ClimateClass = label.parse()?;
            let Some(image) = &tile.image else {
                return Err(TilesetError::Validation(format!(
                    "tile {} ({class}) has no image",
                    tile.id
                )));
            };
            if let Some(existing) = entries.get(&class) {
                return Err(TilesetError::Validation(format!(
                    "climate {class} used by tiles {} and {}",
                    existing.tile_id, tile.id
                )));
            }
            entries.insert(
                class,
                PaletteEntry {
                    tile_id: tile.id,
                    image: loaded.resolve(image),
                },
            );
            by_id.insert(tile.id, class);
        }

        let missing: Vec<&str> = ClimateClass::ALL
            .iter()
            .filter(|class| !entries.contains_key(*class))
            .map(|class| class.label())
            .collect();
        if !missing.is_empty() {
            return Err(TilesetError::Validation(format!(
                "tileset '{}' has no tile for {}",
                tileset.name,
                missing.join(", ")
            )));
        }

        Ok(Self { entries, by_id })
    }

    pub fn entry(&self, class: ClimateClass) -> Option<&PaletteEntry> {
        self.entries.get(&class)
    }

    pub fn tile_id(&self, class: ClimateClass) -> Option<TileId> {
        self.entry(class).map(|entry| entry.tile_id)
    }

    pub fn image(&self, class: ClimateClass) -> Option<&Path> {
        self.entry(class).map(|entry| entry.image.as_path())
    }

    pub fn climate_of(&self, id: TileId) -> Option<ClimateClass> {
        self.by_id.get(&id).copied()
    }

    /// Climate of a map cell, given where the tileset starts in the map's id space.
    pub fn climate_for_gid(
        &self,
        gid: GlobalTileId,
        tileset: &TilesetRef,
    ) -> Option<ClimateClass> {
        tileset
            .local_id(gid)
            .and_then(|local| self.climate_of(local))
    }

    /// Entries ordered coldest to warmest.
    pub fn iter(&self) -> impl Iterator<Item = (ClimateClass, &PaletteEntry)> {
        self.entries.iter().map(|(class, entry)| (*class, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::{Grid, Orientation, TileDefinition, TileImage, Tileset};

    fn climate_tileset(labels: &[&str]) -> LoadedTileset {
        let tiles = labels
            .iter()
            .enumerate()
            .map(|(id, label)| {
                TileDefinition::new(
                    id as u32,
                    *label,
                    TileImage {
                        source: format!("climate/{}.png", label.to_lowercase()),
                        width: 72,
                        height: 72,
                    },
                )
            })
            .collect();
        let tileset = Tileset {
            name: "temperature".into(),
            version: None,
            tiled_version: None,
            tile_width: 72,
            tile_height: 72,
            tile_count: labels.len() as u32,
            columns: 0,
            spacing: 0,
            margin: 0,
            grid: Some(Grid {
                orientation: Orientation::Orthogonal,
                width: 1,
                height: 1,
            }),
            properties: Vec::new(),
            image: None,
            tiles,
        };
        LoadedTileset::new("assets/temperature.tsx", tileset)
    }

    fn all_labels() -> Vec<&'static str> {
        ClimateClass::ALL.iter().map(|class| class.label()).collect()
    }

    #[test]
    fn maps_every_class() {
        let palette = ClimatePalette::from_loaded(&climate_tileset(&all_labels())).unwrap();
        assert_eq!(palette.tile_id(ClimateClass::WarmTemperate), Some(4));
        assert_eq!(palette.climate_of(2), Some(ClimateClass::Boreal));
        assert_eq!(
            palette.image(ClimateClass::Tropical),
            Some(Path::new("assets/climate/tropical.png"))
        );
        let order: Vec<ClimateClass> = palette.iter().map(|(class, _)| class).collect();
        assert_eq!(order, ClimateClass::ALL.to_vec());
    }

    #[test]
    fn resolves_map_gids() {
        let palette = ClimatePalette::from_loaded(&climate_tileset(&all_labels())).unwrap();
        let reference = TilesetRef {
            first_gid: 1,
            tile_count: 7,
        };
        assert_eq!(
            palette.climate_for_gid(GlobalTileId::new(1), &reference),
            Some(ClimateClass::Polar)
        );
        assert_eq!(
            palette.climate_for_gid(GlobalTileId::new(0x8000_0000 | 7), &reference),
            Some(ClimateClass::Tropical)
        );
        assert_eq!(palette.climate_for_gid(GlobalTileId::new(0), &reference), None);
        assert_eq!(palette.climate_for_gid(GlobalTileId::new(8), &reference), None);
    }

    #[test]
    fn rejects_unknown_duplicate_and_missing_classes() {
        let err = ClimatePalette::from_loaded(&climate_tileset(&["Polar", "Arid"])).unwrap_err();
        assert!(matches!(err, TilesetError::UnknownClimate(label) if label == "Arid"));

        let err =
            ClimatePalette::from_loaded(&climate_tileset(&["Polar", "Polar"])).unwrap_err();
        assert!(err.to_string().contains("climate Polar used by tiles 0 and 1"));

        let err = ClimatePalette::from_loaded(&climate_tileset(&["Polar", "Boreal"])).unwrap_err();
        assert!(err.to_string().contains("Subpolar, CoolTemperate"));
    }
}
