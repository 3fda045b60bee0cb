use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use climate_tiles::{
    parse_tsx, write_tsx, ClimateClass, ClimatePalette, GlobalTileId, ImageIssue, TilesetLoader,
    TilesetRef,
};

fn tileset_loader() -> TilesetLoader {
    TilesetLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn tileset_path() -> PathBuf {
    PathBuf::from("map/temperature.tsx")
}

fn fixture_text() -> String {
    fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join(tileset_path())).unwrap()
}

#[test]
fn loader_reads_fixture() {
    let loaded = tileset_loader()
        .load(tileset_path())
        .expect("tileset parses");
    let tileset = loaded.tileset();

    assert_eq!(tileset.name, "temperature");
    assert_eq!(tileset.version.as_deref(), Some("1.10"));
    assert_eq!(tileset.tiled_version.as_deref(), Some("1.10.2"));
    assert_eq!((tileset.tile_width, tileset.tile_height), (72, 72));
    assert_eq!(tileset.tile_count, 7);
    assert!(tileset.is_collection());

    let grid = tileset.grid.expect("grid element");
    assert_eq!(grid.orientation.as_str(), "orthogonal");
    assert_eq!((grid.width, grid.height), (1, 1));
}

#[test]
fn ids_span_zero_to_six_without_gaps() {
    let loaded = tileset_loader().load(tileset_path()).unwrap();
    let mut ids: Vec<u32> = loaded.tileset().tiles.iter().map(|tile| tile.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..7).collect::<Vec<_>>());
}

#[test]
fn types_are_unique_climate_classes() {
    let loaded = tileset_loader().load(tileset_path()).unwrap();
    let labels: Vec<&str> = loaded
        .tileset()
        .tiles
        .iter()
        .map(|tile| tile.tile_type.as_deref().expect("every tile has a type"))
        .collect();
    let unique: HashSet<&str> = labels.iter().copied().collect();
    assert_eq!(unique.len(), labels.len());

    for label in labels {
        label.parse::<ClimateClass>().expect("known climate class");
    }
}

#[test]
fn images_are_declared_at_tile_size_relative_to_the_tileset() {
    let loaded = tileset_loader().load(tileset_path()).unwrap();
    let expected_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("map/climate_tiles/temp_moisture");

    for tile in &loaded.tileset().tiles {
        let image = tile.image.as_ref().expect("collection tiles carry an image");
        assert_eq!((image.width, image.height), (72, 72));
        let resolved = loaded.resolve(image);
        assert_eq!(resolved.parent(), Some(expected_dir.as_path()));
    }
}

#[test]
fn id_four_is_warm_temperate() {
    let loaded = tileset_loader().load(tileset_path()).unwrap();
    let tile = loaded.tile(4).unwrap();
    assert_eq!(tile.tile_type.as_deref(), Some("WarmTemperate"));
    assert_eq!(
        tile.image.as_ref().map(|image| image.source.as_str()),
        Some("climate_tiles/temp_moisture/warmtemperate.png")
    );
    assert_eq!(
        loaded.tileset().tile_by_type("WarmTemperate").map(|tile| tile.id),
        Some(4)
    );
}

#[test]
fn rewriting_reproduces_the_file() {
    let text = fixture_text();
    let tileset = parse_tsx(&text).unwrap();
    let written = write_tsx(&tileset);
    assert_eq!(written, text);

    let reparsed = parse_tsx(&written).unwrap();
    assert_eq!(reparsed.signature(), tileset.signature());
}

#[test]
fn round_trip_ignores_tile_order() {
    let mut tileset = parse_tsx(&fixture_text()).unwrap();
    let original = tileset.signature();
    tileset.tiles.reverse();

    let reparsed = parse_tsx(&write_tsx(&tileset)).unwrap();
    assert_eq!(reparsed.signature(), original);
    assert_eq!(reparsed.tiles.first().map(|tile| tile.id), Some(6));
}

#[test]
fn image_files_are_not_shipped_with_the_manifest() {
    let loaded = tileset_loader().load(tileset_path()).unwrap();
    let issues = loaded.verify_images();
    assert_eq!(issues.len(), 7);
    assert!(issues
        .iter()
        .all(|issue| matches!(issue, ImageIssue::Missing { .. })));
}

#[test]
fn palette_resolves_images_from_a_populated_asset_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("temperature.tsx"), fixture_text()).unwrap();
    let tileset = parse_tsx(&fixture_text()).unwrap();
    for tile in &tileset.tiles {
        let image = tile.image.as_ref().unwrap();
        let path = temp_dir.path().join(&image.source);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbaImage::new(image.width, image.height)
            .save(&path)
            .unwrap();
    }

    let loaded = TilesetLoader::new(temp_dir.path())
        .load("temperature.tsx")
        .unwrap();
    assert!(loaded.verify_images().is_empty());
    loaded.check_images().unwrap();

    let palette = ClimatePalette::from_loaded(&loaded).unwrap();
    assert_eq!(
        palette.image(ClimateClass::Polar),
        Some(
            temp_dir
                .path()
                .join("climate_tiles/temp_moisture/polar.png")
                .as_path()
        )
    );
    assert_eq!(palette.climate_of(6), Some(ClimateClass::Tropical));

    let reference = TilesetRef::new(1, loaded.tileset());
    assert_eq!(
        palette.climate_for_gid(GlobalTileId::new(5), &reference),
        Some(ClimateClass::WarmTemperate)
    );
}

#[test]
fn shipped_config_loads_the_fixture() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/climate-tiles.yaml");
    let config = climate_tiles::ToolConfig::from_yaml(&config_path).expect("config parses");
    assert_eq!(config.logging.level, "info");

    let loaded = tileset_loader()
        .with_policy(config.validation)
        .load(tileset_path())
        .unwrap();
    assert_eq!(loaded.tileset().tiles.len(), 7);
}
