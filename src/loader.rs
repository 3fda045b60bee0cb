use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::error::TilesetError;
use crate::tileset::{TileDefinition, TileId, TileImage, Tileset, ValidationPolicy};
use crate::tsx::parse_tsx;

pub struct TilesetLoader {
    base_dir: PathBuf,
    policy: ValidationPolicy,
}

impl TilesetLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<LoadedTileset, TilesetError> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path).map_err(|err| TilesetError::io(&path, err))?;
        let tileset = parse_tsx(&data)?;
        tileset.validate(&self.policy)?;

        let loaded = LoadedTileset::new(path, tileset);
        if self.policy.check_images {
            loaded.check_images()?;
        }
        info!(
            name = %loaded.tileset.name,
            tiles = loaded.tileset.tiles.len(),
            path = %loaded.path.display(),
            "loaded tileset"
        );
        Ok(loaded)
    }
}

/// A parsed tileset together with the location its image paths are relative to.
#[derive(Debug, Clone)]
pub struct LoadedTileset {
    path: PathBuf,
    tileset: Tileset,
}

/// Which part of the tileset references an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOwner {
    Atlas,
    Tile(TileId),
}

impl fmt::Display for ImageOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageOwner::Atlas => f.write_str("atlas"),
            ImageOwner::Tile(id) => write!(f, "tile {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageIssue {
    Missing {
        owner: ImageOwner,
        path: PathBuf,
    },
    Unreadable {
        owner: ImageOwner,
        path: PathBuf,
        reason: String,
    },
    SizeMismatch {
        owner: ImageOwner,
        path: PathBuf,
        declared: (u32, u32),
        actual: (u32, u32),
    },
}

impl fmt::Display for ImageIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageIssue::Missing { owner, path } => {
                write!(f, "{owner}: image {} does not exist", path.display())
            }
            ImageIssue::Unreadable {
                owner,
                path,
                reason,
            } => write!(f, "{owner}: cannot read {}: {reason}", path.display()),
            ImageIssue::SizeMismatch {
                owner,
                path,
                declared,
                actual,
            } => write!(
                f,
                "{owner}: {} is {}x{}, declared {}x{}",
                path.display(),
                actual.0,
                actual.1,
                declared.0,
                declared.1
            ),
        }
    }
}

impl LoadedTileset {
    pub fn new(path: impl Into<PathBuf>, tileset: Tileset) -> Self {
        Self {
            path: path.into(),
            tileset,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    pub fn into_tileset(self) -> Tileset {
        self.tileset
    }

    /// Directory image sources are resolved against.
    pub fn asset_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn resolve(&self, image: &TileImage) -> PathBuf {
        self.asset_dir().join(&image.source)
    }

    pub fn tile(&self, id: TileId) -> Option<&TileDefinition> {
        self.tileset.tile(id)
    }

    pub fn image_path(&self, id: TileId) -> Option<PathBuf> {
        self.tileset
            .tile(id)
            .and_then(|tile| tile.image.as_ref())
            .map(|image| self.resolve(image))
    }

    pub fn image_path_for_type(&self, tile_type: &str) -> Option<PathBuf> {
        self.tileset
            .tile_by_type(tile_type)
            .and_then(|tile| tile.image.as_ref())
            .map(|image| self.resolve(image))
    }

    pub fn atlas_image_path(&self) -> Option<PathBuf> {
        self.tileset.image.as_ref().map(|image| self.resolve(image))
    }

    /// Checks every referenced image on disk against its declared size.
    pub fn verify_images(&self) -> Vec<ImageIssue> {
        let atlas = self
            .tileset
            .image
            .as_ref()
            .map(|image| (ImageOwner::Atlas, image));
        let tiles = self.tileset.tiles.iter().filter_map(|tile| {
            tile.image
                .as_ref()
                .map(|image| (ImageOwner::Tile(tile.id), image))
        });

        let issues: Vec<ImageIssue> = atlas
            .into_iter()
            .chain(tiles)
            .filter_map(|(owner, image)| self.verify_image(owner, image))
            .collect();
        for issue in &issues {
            warn!(tileset = %self.tileset.name, "{issue}");
        }
        issues
    }

    fn verify_image(&self, owner: ImageOwner, image: &TileImage) -> Option<ImageIssue> {
        let path = self.resolve(image);
        if !path.is_file() {
            return Some(ImageIssue::Missing { owner, path });
        }
        let declared = (image.width, image.height);
        match image::image_dimensions(&path) {
            // 0x0 means the size was never declared
            Ok(actual) if actual == declared || declared == (0, 0) => {
                debug!(%owner, path = %path.display(), "image ok");
                None
            }
            Ok(actual) => Some(ImageIssue::SizeMismatch {
                owner,
                path,
                declared,
                actual,
            }),
            Err(err) => Some(ImageIssue::Unreadable {
                owner,
                path,
                reason: err.to_string(),
            }),
        }
    }

    pub fn check_images(&self) -> Result<(), TilesetError> {
        let issues = self.verify_images();
        if issues.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        Err(TilesetError::Assets(messages.join("; ")))
    }
}
