pub mod climate;
pub mod config;
pub mod error;
pub mod gid;
pub mod loader;
pub mod logging;
pub mod palette;
pub mod tileset;
pub mod tsx;

pub use climate::ClimateClass;
pub use config::ToolConfig;
pub use error::TilesetError;
pub use gid::{GlobalTileId, TilesetRef};
pub use loader::{ImageIssue, ImageOwner, LoadedTileset, TilesetLoader};
pub use palette::ClimatePalette;
pub use tileset::{TileDefinition, TileImage, Tileset, ValidationIssue, ValidationPolicy};
pub use tsx::{parse_tsx, write_tsx};
