use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::app::{Camera2D, Gravity, World};

use super::manifest::{LevelManifest, ManifestError};
use super::raster::{ImageHandle, RasterError};
use super::tilemap::{TileMap, TileMapError};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to load tile map {path}: {source}")]
    TileMap {
        path: PathBuf,
        #[source]
        source: TileMapError,
    },
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// A level stood up from its manifest. The colliders from the map's object
/// layer are already in the world passed to [`load_level`].
#[derive(Debug)]
pub struct Level {
    pub manifest: LevelManifest,
    pub tilemap: TileMap,
    pub background: Option<ImageHandle>,
    pub gravity: Gravity,
    pub camera: Camera2D,
}

pub fn load_level(
    assets_dir: &Path,
    manifest_path: &Path,
    world: &mut World,
) -> Result<Level, LevelError> {
    let manifest_path = assets_dir.join(manifest_path);
    let manifest = LevelManifest::read(&manifest_path)?;

    let background = manifest
        .background
        .as_ref()
        .map(|path| ImageHandle::open(&assets_dir.join(path)))
        .transpose()?;
    let tileset_image = manifest
        .tileset
        .as_ref()
        .map(|tileset| ImageHandle::open(&assets_dir.join(&tileset.image)))
        .transpose()?;

    // Images are decoded before the map so a missing sheet leaves the world
    // untouched.
    let map_path = assets_dir.join(&manifest.map);
    let map_error = |source: TileMapError| {
        warn!(path = %map_path.display(), error = %source, "tilemap_rejected");
        LevelError::TileMap {
            path: map_path.clone(),
            source,
        }
    };
    let mut tilemap = TileMap::load(
        &map_path,
        manifest.dimensions(),
        world,
        manifest.load_options(),
    )
    .map_err(map_error)?;

    if let (Some(tileset), Some(image)) = (&manifest.tileset, &tileset_image) {
        if let Err(source) = tilemap.create_tile_set(image, tileset.rows, tileset.columns) {
            for id in tilemap.colliders() {
                world.remove(*id);
            }
            return Err(map_error(source));
        }
    }

    let gravity = Gravity::new(manifest.gravity.strength).with_axis(manifest.gravity.axis);
    let camera = Camera2D::for_scene(
        manifest.viewport_size(),
        Some(&tilemap),
        background.as_ref(),
    );

    info!(
        manifest = %manifest_path.display(),
        colliders = tilemap.colliders().len(),
        world_width = camera.world_size().width,
        world_height = camera.world_size().height,
        "level_loaded"
    );

    Ok(Level {
        manifest,
        tilemap,
        background,
        gravity,
        camera,
    })
}
