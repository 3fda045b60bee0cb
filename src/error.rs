use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tileset parse error: {0}")]
    Parse(String),
    #[error("tileset validation error: {0}")]
    Validation(String),
    #[error("unknown climate class '{0}'")]
    UnknownClimate(String),
    #[error("tileset asset error: {0}")]
    Assets(String),
}

impl TilesetError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TilesetError::Io {
            path: path.into(),
            source,
        }
    }
}
