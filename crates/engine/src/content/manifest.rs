use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::app::{PullAxis, Size2};

use super::tilemap::{LoadOptions, TileMapDimensions, MAX_MAP_TILES};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read level manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level manifest at {field}: {message}")]
    Parse { field: String, message: String },
    #[error("level manifest field {field} is invalid: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileSetManifest {
    pub image: PathBuf,
    pub rows: u32,
    pub columns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GravityManifest {
    pub strength: f32,
    #[serde(default)]
    pub axis: PullAxis,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewportManifest {
    pub width: f32,
    pub height: f32,
}

/// Everything needed to stand a level up: the map file and its grid, the
/// sheet its tiles are cut from, gravity, and the viewport size. Paths are
/// relative to the assets directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelManifest {
    pub map: PathBuf,
    pub map_width: u32,
    pub map_height: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub tileset: Option<TileSetManifest>,
    #[serde(default)]
    pub background: Option<PathBuf>,
    pub gravity: GravityManifest,
    pub viewport: ViewportManifest,
    #[serde(default)]
    pub validate_xml: bool,
}

impl LevelManifest {
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ManifestError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let manifest = match serde_path_to_error::deserialize::<_, LevelManifest>(&mut deserializer)
        {
            Ok(manifest) => manifest,
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                return Err(ManifestError::Parse {
                    field: if path.is_empty() { ".".to_string() } else { path },
                    message: source.to_string(),
                });
            }
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let map_sides = [self.map_width, self.map_height];
        if map_sides.iter().any(|&side| side == 0 || side > MAX_MAP_TILES) {
            return Err(ManifestError::Invalid {
                field: "map_width/map_height",
                message: format!(
                    "map must be between 1x1 and {MAX_MAP_TILES}x{MAX_MAP_TILES} tiles, got {}x{}",
                    self.map_width, self.map_height
                ),
            });
        }
        let whole_pixels =
            |side: f32| (1.0..=u32::MAX as f32).contains(&side) && side.fract() == 0.0;
        if !whole_pixels(self.tile_width) || !whole_pixels(self.tile_height) {
            return Err(ManifestError::Invalid {
                field: "tile_width/tile_height",
                message: format!(
                    "tiles must be whole pixels of at least 1x1, got {}x{}",
                    self.tile_width, self.tile_height
                ),
            });
        }
        if !self.gravity.strength.is_finite() {
            return Err(ManifestError::Invalid {
                field: "gravity.strength",
                message: "must be finite".to_string(),
            });
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ManifestError::Invalid {
                field: "viewport",
                message: format!(
                    "must be positive, got {}x{}",
                    self.viewport.width, self.viewport.height
                ),
            });
        }
        Ok(())
    }

    pub fn dimensions(&self) -> TileMapDimensions {
        TileMapDimensions {
            map_width: self.map_width,
            map_height: self.map_height,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            validate_xml: self.validate_xml,
        }
    }

    pub fn viewport_size(&self) -> Size2 {
        Size2::new(self.viewport.width, self.viewport.height)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const LEVEL_JSON: &str = r#"{
        "map": "maps/level1.tmx",
        "map_width": 32,
        "map_height": 32,
        "tile_width": 32,
        "tile_height": 32,
        "tileset": { "image": "tiles/tileset.png", "rows": 2, "columns": 2 },
        "gravity": { "strength": 2.0 },
        "viewport": { "width": 512, "height": 512 }
    }"#;

    #[test]
    fn parses_level_with_defaults() {
        let manifest = LevelManifest::from_json_str(LEVEL_JSON).expect("manifest");
        assert_eq!(manifest.map, PathBuf::from("maps/level1.tmx"));
        assert_eq!(manifest.gravity.axis, PullAxis::Vertical);
        assert!(!manifest.validate_xml);
        assert!(manifest.background.is_none());
        assert_eq!(manifest.viewport_size(), Size2::new(512.0, 512.0));
        assert_eq!(manifest.dimensions().map_height, 32);
    }

    #[test]
    fn parse_error_names_field_path() {
        let raw = LEVEL_JSON.replace(r#""rows": 2"#, r#""rows": "two""#);
        let err = LevelManifest::from_json_str(&raw).expect_err("bad rows");
        match err {
            ManifestError::Parse { field, .. } => assert_eq!(field, "tileset.rows"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let raw = LEVEL_JSON.replace(r#""map_width""#, r#""zoom": 2, "map_width""#);
        let err = LevelManifest::from_json_str(&raw).expect_err("unknown field");
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn zero_sized_map_is_invalid() {
        let raw = LEVEL_JSON.replace(r#""map_width": 32"#, r#""map_width": 0"#);
        let err = LevelManifest::from_json_str(&raw).expect_err("zero width");
        assert!(matches!(
            err,
            ManifestError::Invalid {
                field: "map_width/map_height",
                ..
            }
        ));
    }

    #[test]
    fn oversized_map_is_invalid() {
        let raw = LEVEL_JSON.replace(r#""map_width": 32"#, r#""map_width": 100000"#);
        let err = LevelManifest::from_json_str(&raw).expect_err("huge width");
        assert!(matches!(
            err,
            ManifestError::Invalid {
                field: "map_width/map_height",
                ..
            }
        ));
    }

    #[test]
    fn fractional_tile_size_is_invalid() {
        for (from, to) in [
            (r#""tile_width": 32"#, r#""tile_width": 32.5"#),
            (r#""tile_height": 32"#, r#""tile_height": 0.5"#),
        ] {
            let raw = LEVEL_JSON.replace(from, to);
            let err = LevelManifest::from_json_str(&raw).expect_err("fractional tile");
            assert!(matches!(
                err,
                ManifestError::Invalid {
                    field: "tile_width/tile_height",
                    ..
                }
            ));
        }
        let raw = LEVEL_JSON.replace(r#""tile_width": 32"#, r#""tile_width": 16.0"#);
        let manifest = LevelManifest::from_json_str(&raw).expect("whole float width");
        assert_eq!(manifest.tile_width, 16.0);
    }

    #[test]
    fn unknown_axis_names_the_field() {
        let raw = LEVEL_JSON.replace(
            r#""strength": 2.0"#,
            r#""strength": 2.0, "axis": "diagonal""#,
        );
        let err = LevelManifest::from_json_str(&raw).expect_err("bad axis");
        match err {
            ManifestError::Parse { field, .. } => assert_eq!(field, "gravity.axis"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn horizontal_axis_parses() {
        let raw = LEVEL_JSON.replace(
            r#""strength": 2.0"#,
            r#""strength": -1.5, "axis": "horizontal""#,
        );
        let manifest = LevelManifest::from_json_str(&raw).expect("manifest");
        assert_eq!(manifest.gravity.axis, PullAxis::Horizontal);
        assert_eq!(manifest.gravity.strength, -1.5);
    }

    #[test]
    fn read_missing_file_reports_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("missing.json");
        let err = LevelManifest::read(&path).expect_err("missing");
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
