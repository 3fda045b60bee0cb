//! Reading and writing the Tiled `.tsx` tileset format.

use std::fmt::Write as _;

use serde::Deserialize;
use tracing::debug;

use crate::error::TilesetError;
use crate::tileset::{Grid, Orientation, Property, TileDefinition, TileImage, Tileset};

#[derive(Debug, Deserialize)]
struct RawTileset {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "tiledversion")]
    tiled_version: Option<String>,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    tilecount: Option<u32>,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    grid: Option<RawGrid>,
    #[serde(default)]
    properties: Option<RawProperties>,
    #[serde(default)]
    image: Option<RawImage>,
    #[serde(default, rename = "tile")]
    tiles: Vec<RawTile>,
}

#[derive(Debug, Deserialize)]
struct RawGrid {
    #[serde(default)]
    orientation: Option<String>,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct RawTile {
    id: u32,
    // Tiled 1.9 renamed the attribute to `class`; both spellings are in the wild.
    #[serde(default, rename = "type", alias = "class")]
    tile_type: Option<String>,
    #[serde(default)]
    probability: Option<f32>,
    #[serde(default)]
    image: Option<RawImage>,
    #[serde(default)]
    properties: Option<RawProperties>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    source: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default, rename = "property")]
    items: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    value: Option<String>,
    // Multi-line strings are stored as element text instead of `value`.
    #[serde(default, rename = "$value")]
    text: Option<String>,
}

impl RawProperties {
    fn into_properties(self) -> Vec<Property> {
        self.items
            .into_iter()
            .map(|item| Property {
                name: item.name,
                kind: item.kind,
                value: item.value.or(item.text).unwrap_or_default(),
            })
            .collect()
    }
}

/// Parses a tileset document. Only structure is checked here, see `Tileset::validate`.
pub fn parse_tsx(text: &str) -> Result<Tileset, TilesetError> {
    let raw: RawTileset =
        serde_xml_rs::from_str(text).map_err(|err| TilesetError::Parse(err.to_string()))?;

    let grid = match raw.grid {
        Some(grid) => Some(Grid {
            orientation: match grid.orientation.as_deref() {
                Some(value) => Orientation::parse(value)?,
                None => Orientation::default(),
            },
            width: grid.width,
            height: grid.height,
        }),
        None => None,
    };

    let (tile_width, tile_height) = (raw.tilewidth, raw.tileheight);
    let tiles: Vec<TileDefinition> = raw
        .tiles
        .into_iter()
        .map(|tile| TileDefinition {
            id: tile.id,
            tile_type: tile.tile_type.filter(|label| !label.is_empty()),
            probability: tile.probability,
            image: tile.image.map(|image| TileImage {
                source: image.source,
                width: image.width.unwrap_or(tile_width),
                height: image.height.unwrap_or(tile_height),
            }),
            properties: tile
                .properties
                .map(RawProperties::into_properties)
                .unwrap_or_default(),
        })
        .collect();

    let tile_count = raw.tilecount.unwrap_or(tiles.len() as u32);
    debug!(
        name = %raw.name,
        tiles = tiles.len(),
        tile_count,
        columns = raw.columns,
        "parsed tileset"
    );

    Ok(Tileset {
        name: raw.name,
        version: raw.version,
        tiled_version: raw.tiled_version,
        tile_width,
        tile_height,
        tile_count,
        columns: raw.columns,
        spacing: raw.spacing,
        margin: raw.margin,
        grid,
        properties: raw
            .properties
            .map(RawProperties::into_properties)
            .unwrap_or_default(),
        // An atlas image without declared size reads as 0x0, i.e. unknown.
        image: raw.image.map(|image| TileImage {
            source: image.source,
            width: image.width.unwrap_or(0),
            height: image.height.unwrap_or(0),
        }),
        tiles,
    })
}

/// Serializes a tileset in the layout Tiled itself writes.
pub fn write_tsx(tileset: &Tileset) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<tileset");
    if let Some(version) = &tileset.version {
        push_attr(&mut xml, "version", version);
    }
    if let Some(tiled_version) = &tileset.tiled_version {
        push_attr(&mut xml, "tiledversion", tiled_version);
    }
    push_attr(&mut xml, "name", &tileset.name);
    push_attr(&mut xml, "tilewidth", tileset.tile_width);
    push_attr(&mut xml, "tileheight", tileset.tile_height);
    if tileset.spacing != 0 {
        push_attr(&mut xml, "spacing", tileset.spacing);
    }
    if tileset.margin != 0 {
        push_attr(&mut xml, "margin", tileset.margin);
    }
    push_attr(&mut xml, "tilecount", tileset.tile_count);
    push_attr(&mut xml, "columns", tileset.columns);
    xml.push_str(">\n");

    if let Some(grid) = &tileset.grid {
        xml.push_str(" <grid");
        push_attr(&mut xml, "orientation", grid.orientation.as_str());
        push_attr(&mut xml, "width", grid.width);
        push_attr(&mut xml, "height", grid.height);
        xml.push_str("/>\n");
    }

    push_properties(&mut xml, &tileset.properties, 1);

    if let Some(image) = &tileset.image {
        xml.push_str(" <image");
        push_attr(&mut xml, "source", &image.source);
        push_attr(&mut xml, "width", image.width);
        push_attr(&mut xml, "height", image.height);
        xml.push_str("/>\n");
    }

    for tile in &tileset.tiles {
        xml.push_str(" <tile");
        push_attr(&mut xml, "id", tile.id);
        if let Some(tile_type) = &tile.tile_type {
            push_attr(&mut xml, "type", tile_type);
        }
        if let Some(probability) = tile.probability {
            push_attr(&mut xml, "probability", probability);
        }
        if tile.image.is_none() && tile.properties.is_empty() {
            xml.push_str("/>\n");
            continue;
        }
        xml.push_str(">\n");
        push_properties(&mut xml, &tile.properties, 2);
        if let Some(image) = &tile.image {
            xml.push_str("  <image");
            push_attr(&mut xml, "width", image.width);
            push_attr(&mut xml, "height", image.height);
            push_attr(&mut xml, "source", &image.source);
            xml.push_str("/>\n");
        }
        xml.push_str(" </tile>\n");
    }

    xml.push_str("</tileset>\n");
    xml
}

fn push_properties(xml: &mut String, properties: &[Property], depth: usize) {
    if properties.is_empty() {
        return;
    }
    let indent = " ".repeat(depth);
    let _ = writeln!(xml, "{indent}<properties>");
    for property in properties {
        let _ = write!(xml, "{indent} <property");
        push_attr(xml, "name", &property.name);
        if let Some(kind) = &property.kind {
            push_attr(xml, "type", kind);
        }
        if property.value.contains('\n') {
            let _ = writeln!(xml, ">{}</property>", escape(&property.value));
        } else {
            push_attr(xml, "value", &property.value);
            xml.push_str("/>\n");
        }
    }
    let _ = writeln!(xml, "{indent}</properties>");
}

fn push_attr(xml: &mut String, name: &str, value: impl ToString) {
    let _ = write!(xml, " {name}=\"{}\"", escape(&value.to_string()));
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
