use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use climate_tiles::{
    logging, parse_tsx, write_tsx, ClimatePalette, LoadedTileset, TilesetLoader, ToolConfig,
    ValidationPolicy,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect and validate Tiled climate tilesets")]
struct Cli {
    /// Path to a YAML tool configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tileset header and every tile
    Inspect {
        tileset: PathBuf,

        /// Emit the parsed tileset as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report every invariant violation in a tileset
    Validate {
        tileset: PathBuf,

        /// Also check the referenced image files on disk
        #[arg(long)]
        check_images: bool,
    },
    /// Show a single tile by id or type
    Lookup {
        tileset: PathBuf,

        #[arg(long, conflicts_with = "tile_type", required_unless_present = "tile_type")]
        id: Option<u32>,

        #[arg(long = "type")]
        tile_type: Option<String>,
    },
    /// Re-serialize a tileset in Tiled's layout
    Export {
        tileset: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List climate classes coldest to warmest with their images
    Palette { tileset: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ToolConfig::from_yaml(path)?,
        None => ToolConfig::default(),
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    logging::init(&level);
    debug!(?config, "configuration resolved");

    let loader = TilesetLoader::new(".").with_policy(config.validation);

    match cli.command {
        Command::Inspect { tileset, json } => inspect(&loader, tileset, json),
        Command::Validate {
            tileset,
            check_images,
        } => validate(config.validation, tileset, check_images),
        Command::Lookup {
            tileset,
            id,
            tile_type,
        } => lookup(&loader, tileset, id, tile_type),
        Command::Export { tileset, out } => export(&loader, tileset, out),
        Command::Palette { tileset } => palette(&loader, tileset),
    }
}

fn load(loader: &TilesetLoader, path: &Path) -> Result<LoadedTileset> {
    loader
        .load(path)
        .with_context(|| format!("Failed to load tileset {}", path.display()))
}

fn inspect(loader: &TilesetLoader, path: PathBuf, json: bool) -> Result<()> {
    let loaded = load(loader, &path)?;
    let tileset = loaded.tileset();
    if json {
        println!("{}", serde_json::to_string_pretty(tileset)?);
        return Ok(());
    }

    println!(
        "Tileset '{}': {} tiles of {}x{} px, {}",
        tileset.name,
        tileset.tile_count,
        tileset.tile_width,
        tileset.tile_height,
        if tileset.is_collection() {
            "image collection".to_string()
        } else {
            format!("{} columns", tileset.columns)
        }
    );
    if let Some(atlas) = loaded.atlas_image_path() {
        println!("atlas  {}", atlas.display());
    }
    for tile in &tileset.tiles {
        let label = tile.tile_type.as_deref().unwrap_or("-");
        match &tile.image {
            Some(image) => println!(
                "{:>4}  {:<16} {}x{}  {}",
                tile.id,
                label,
                image.width,
                image.height,
                loaded.resolve(image).display()
            ),
            None => println!("{:>4}  {:<16} (no image)", tile.id, label),
        }
    }
    Ok(())
}

fn validate(mut policy: ValidationPolicy, path: PathBuf, check_images: bool) -> Result<()> {
    policy.check_images |= check_images;
    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read tileset file {}", path.display()))?;
    let tileset = parse_tsx(&data).with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut problems: Vec<String> = tileset
        .issues(&policy)
        .iter()
        .map(ToString::to_string)
        .collect();
    let loaded = LoadedTileset::new(&path, tileset);
    if policy.check_images {
        problems.extend(loaded.verify_images().iter().map(ToString::to_string));
    }

    if problems.is_empty() {
        println!(
            "{}: ok ({} tiles)",
            path.display(),
            loaded.tileset().tiles.len()
        );
        return Ok(());
    }
    for problem in &problems {
        println!("{}: {problem}", path.display());
    }
    bail!("{} problem(s) found in {}", problems.len(), path.display())
}

fn lookup(
    loader: &TilesetLoader,
    path: PathBuf,
    id: Option<u32>,
    tile_type: Option<String>,
) -> Result<()> {
    let loaded = load(loader, &path)?;
    let tile = match (id, tile_type.as_deref()) {
        (Some(id), _) => loaded
            .tile(id)
            .ok_or_else(|| anyhow!("no tile with id {id} in {}", path.display()))?,
        (None, Some(label)) => loaded
            .tileset()
            .tile_by_type(label)
            .ok_or_else(|| anyhow!("no tile of type '{label}' in {}", path.display()))?,
        (None, None) => bail!("either --id or --type is required"),
    };

    println!("id:     {}", tile.id);
    println!("type:   {}", tile.tile_type.as_deref().unwrap_or("-"));
    if let Some(image) = &tile.image {
        println!("source: {}", image.source);
        println!("size:   {}x{}", image.width, image.height);
        println!("path:   {}", loaded.resolve(image).display());
    }
    if let Some((column, row)) = loaded.tileset().grid_position(tile.id) {
        println!("cell:   column {column}, row {row}");
    }
    for property in &tile.properties {
        println!("prop:   {} = {}", property.name, property.value);
    }
    Ok(())
}

fn export(loader: &TilesetLoader, path: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let loaded = load(loader, &path)?;
    let xml = write_tsx(loaded.tileset());
    match out {
        Some(out) => {
            fs::write(&out, xml).with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
        None => print!("{xml}"),
    }
    Ok(())
}

fn palette(loader: &TilesetLoader, path: PathBuf) -> Result<()> {
    let loaded = load(loader, &path)?;
    let palette = ClimatePalette::from_loaded(&loaded)
        .with_context(|| format!("{} is not a climate tileset", path.display()))?;
    for (class, entry) in palette.iter() {
        println!(
            "{:<14} tile {:>3}  {}",
            class.label(),
            entry.tile_id,
            entry.image.display()
        );
    }
    Ok(())
}
