use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::app::{Entity, EntityId, Rect, Size2, Vec2, World};

use super::raster::ImageHandle;
use super::tileset::{TileSet, TileSetError};
use super::validate::{validate_map_document, MapValidationError};

const DATA_OPEN_MARKER: &str = "<data";
const OBJECT_GROUP_OPEN_MARKER: &str = "<objectgroup";
const OBJECT_GROUP_CLOSE_MARKER: &str = "</objectgroup";

pub const MAX_MAP_TILES: u32 = 4096;

#[derive(Debug, Error)]
pub enum TileMapError {
    #[error("failed to read map source {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{map_width}x{map_height} map exceeds the {max}-tile limit per side")]
    MapTooLarge {
        map_width: u32,
        map_height: u32,
        max: u32,
    },
    #[error("map source has no line containing <data")]
    MissingDataMarker,
    #[error("expected {expected} tile rows after line {marker_line}, found {found}")]
    MissingDataRows {
        marker_line: usize,
        expected: u32,
        found: usize,
    },
    #[error("invalid tile token '{token}' at line {line}, column {column}")]
    InvalidTileToken {
        line: usize,
        column: usize,
        token: String,
    },
    #[error("tile row at line {line} has {found} columns; map width is {expected}")]
    TooManyColumns {
        line: usize,
        expected: u32,
        found: usize,
    },
    #[error("invalid object attribute '{token}' at line {line}")]
    InvalidObjectAttribute { line: usize, token: String },
    #[error("tile index {index} at row {row}, column {col} is outside the {tile_count}-tile set")]
    TileIndexOutOfRange {
        row: u32,
        col: u32,
        index: u32,
        tile_count: usize,
    },
    #[error("cell row {row}, column {col} is outside the {map_width}x{map_height} map")]
    CellOutOfBounds {
        row: u32,
        col: u32,
        map_width: u32,
        map_height: u32,
    },
    #[error(transparent)]
    TileSet(#[from] TileSetError),
    #[error("map validation failed: {0}")]
    Validation(#[from] MapValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMapDimensions {
    pub map_width: u32,
    pub map_height: u32,
    pub tile_width: f32,
    pub tile_height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub validate_xml: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileDraw {
    pub row: u32,
    pub col: u32,
    pub image: ImageHandle,
    pub position: Vec2,
}

/// Background tile grid plus the colliders synthesised from the map's
/// object layer. Cell values are 1-based tile-set indices; 0 is empty.
#[derive(Debug, Clone)]
pub struct TileMap {
    map_width: u32,
    map_height: u32,
    tile_width: f32,
    tile_height: f32,
    tiles: Vec<Vec<u32>>,
    tile_set: Option<TileSet>,
    colliders: Vec<EntityId>,
    source: PathBuf,
}

impl TileMap {
    /// Nothing is added to `world` unless both parse passes succeed.
    pub fn load(
        path: &Path,
        dimensions: TileMapDimensions,
        world: &mut World,
        options: LoadOptions,
    ) -> Result<Self, TileMapError> {
        let raw = fs::read_to_string(path).map_err(|source| TileMapError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path.to_path_buf(), &raw, dimensions, world, options)
    }

    pub fn from_source(
        source: PathBuf,
        raw: &str,
        dimensions: TileMapDimensions,
        world: &mut World,
        options: LoadOptions,
    ) -> Result<Self, TileMapError> {
        if options.validate_xml {
            validate_map_document(raw, dimensions.map_height)?;
        }

        let lines = raw.lines().collect::<Vec<_>>();
        let tiles = parse_tile_layer(&lines, dimensions.map_width, dimensions.map_height)?;
        let objects = parse_object_layer(&lines)?;

        let colliders = objects
            .into_iter()
            .map(|rect| world.spawn(Entity::solid(rect)))
            .collect::<Vec<_>>();

        info!(
            source = %source.display(),
            map_width = dimensions.map_width,
            map_height = dimensions.map_height,
            colliders = colliders.len(),
            "tilemap_loaded"
        );

        Ok(Self {
            map_width: dimensions.map_width,
            map_height: dimensions.map_height,
            tile_width: dimensions.tile_width,
            tile_height: dimensions.tile_height,
            tiles,
            tile_set: None,
            colliders,
            source,
        })
    }

    /// On error the previous tile set is kept.
    pub fn create_tile_set(
        &mut self,
        image: &ImageHandle,
        rows: u32,
        columns: u32,
    ) -> Result<(), TileMapError> {
        let tile_set = TileSet::slice(
            image,
            rows,
            columns,
            self.tile_width as u32,
            self.tile_height as u32,
        )?;
        check_tile_indices(&self.tiles, tile_set.len())?;
        debug!(tiles = tile_set.len(), rows, columns, "tileset_created");
        self.tile_set = Some(tile_set);
        Ok(())
    }

    pub fn map_width(&self) -> u32 {
        self.map_width
    }

    pub fn map_height(&self) -> u32 {
        self.map_height
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    pub fn pixel_size(&self) -> Size2 {
        Size2::new(
            self.map_width as f32 * self.tile_width,
            self.map_height as f32 * self.tile_height,
        )
    }

    pub fn tiles(&self) -> &[Vec<u32>] {
        &self.tiles
    }

    pub fn tile_at(&self, row: u32, col: u32) -> Option<u32> {
        self.tiles
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .copied()
    }

    pub fn tile_set(&self) -> Option<&TileSet> {
        self.tile_set.as_ref()
    }

    pub fn colliders(&self) -> &[EntityId] {
        &self.colliders
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn set_source(&mut self, source: PathBuf) {
        self.source = source;
    }

    pub fn set_tile_size(&mut self, tile_width: f32, tile_height: f32) {
        self.tile_width = tile_width;
        self.tile_height = tile_height;
    }

    pub fn set_tile(&mut self, row: u32, col: u32, value: u32) -> Result<(), TileMapError> {
        if row >= self.map_height || col >= self.map_width {
            return Err(TileMapError::CellOutOfBounds {
                row,
                col,
                map_width: self.map_width,
                map_height: self.map_height,
            });
        }
        if let Some(tile_set) = &self.tile_set {
            if value as usize > tile_set.len() {
                return Err(TileMapError::TileIndexOutOfRange {
                    row,
                    col,
                    index: value,
                    tile_count: tile_set.len(),
                });
            }
        }
        self.tiles[row as usize][col as usize] = value;
        Ok(())
    }

    pub fn resize(&mut self, map_width: u32, map_height: u32) {
        self.tiles.resize_with(map_height as usize, Vec::new);
        for row in &mut self.tiles {
            row.resize(map_width as usize, 0);
        }
        self.map_width = map_width;
        self.map_height = map_height;
    }

    pub fn draw_list(&self) -> Vec<TileDraw> {
        let Some(tile_set) = &self.tile_set else {
            return Vec::new();
        };
        let mut draws = Vec::new();
        for (row, cells) in self.tiles.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                let Some(image) = tile_set.get(value as usize - 1) else {
                    continue;
                };
                draws.push(TileDraw {
                    row: row as u32,
                    col: col as u32,
                    image: image.clone(),
                    position: Vec2::new(
                        col as f32 * self.tile_width,
                        row as f32 * self.tile_height,
                    ),
                });
            }
        }
        draws
    }
}

/// Short rows leave their trailing cells empty.
pub fn parse_tile_layer(
    lines: &[&str],
    map_width: u32,
    map_height: u32,
) -> Result<Vec<Vec<u32>>, TileMapError> {
    if map_width > MAX_MAP_TILES || map_height > MAX_MAP_TILES {
        return Err(TileMapError::MapTooLarge {
            map_width,
            map_height,
            max: MAX_MAP_TILES,
        });
    }
    let marker = lines
        .iter()
        .rposition(|line| line.contains(DATA_OPEN_MARKER))
        .ok_or(TileMapError::MissingDataMarker)?;

    let available = lines.len() - marker - 1;
    if available < map_height as usize {
        return Err(TileMapError::MissingDataRows {
            marker_line: marker + 1,
            expected: map_height,
            found: available,
        });
    }

    let mut tiles = Vec::with_capacity(map_height as usize);
    for (offset, line) in lines[marker + 1..=marker + map_height as usize]
        .iter()
        .enumerate()
    {
        let line_number = marker + offset + 2;
        let mut tokens = line.split(',').map(str::trim).collect::<Vec<_>>();
        // Rows end with a trailing comma except the last.
        while tokens.len() > 1 && tokens.last().is_some_and(|token| token.is_empty()) {
            tokens.pop();
        }
        if tokens.len() > map_width as usize {
            return Err(TileMapError::TooManyColumns {
                line: line_number,
                expected: map_width,
                found: tokens.len(),
            });
        }

        let mut row = vec![0; map_width as usize];
        for (col, token) in tokens.iter().enumerate() {
            row[col] = token
                .parse::<u32>()
                .map_err(|_| TileMapError::InvalidTileToken {
                    line: line_number,
                    column: col + 1,
                    token: (*token).to_string(),
                })?;
        }
        tiles.push(row);
    }
    Ok(tiles)
}

/// A rectangle is emitted as soon as x, y, width and height have all been
/// seen on one line. Nothing carries over between lines.
pub fn parse_object_layer(lines: &[&str]) -> Result<Vec<Rect>, TileMapError> {
    let start = lines
        .iter()
        .rposition(|line| line.contains(OBJECT_GROUP_OPEN_MARKER));
    let end = lines
        .iter()
        .rposition(|line| line.contains(OBJECT_GROUP_CLOSE_MARKER));
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(Vec::new());
    };
    if end <= start {
        return Ok(Vec::new());
    }

    let mut rects = Vec::new();
    for (index, line) in lines.iter().enumerate().take(end).skip(start + 1) {
        let mut pending = PendingObject::default();
        for token in line.split_whitespace() {
            if token.contains("x=") {
                pending.x = Some(parse_attribute(token, index + 1)?);
            }
            if token.contains("y=") {
                pending.y = Some(parse_attribute(token, index + 1)?);
            }
            if token.contains("width=") {
                pending.width = Some(parse_attribute(token, index + 1)?);
            }
            if token.contains("height=") {
                pending.height = Some(parse_attribute(token, index + 1)?);
            }
            if let Some(rect) = pending.take_complete() {
                rects.push(rect);
            }
        }
    }
    Ok(rects)
}

#[derive(Debug, Default)]
struct PendingObject {
    x: Option<f32>,
    y: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
}

impl PendingObject {
    fn take_complete(&mut self) -> Option<Rect> {
        let (Some(x), Some(y), Some(width), Some(height)) =
            (self.x, self.y, self.width, self.height)
        else {
            return None;
        };
        *self = Self::default();
        Some(Rect::new(x, y, width, height))
    }
}

fn parse_attribute(token: &str, line: usize) -> Result<f32, TileMapError> {
    let numeric = token
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect::<String>();
    numeric
        .parse::<f32>()
        .map_err(|_| TileMapError::InvalidObjectAttribute {
            line,
            token: token.to_string(),
        })
}

fn check_tile_indices(tiles: &[Vec<u32>], tile_count: usize) -> Result<(), TileMapError> {
    for (row, cells) in tiles.iter().enumerate() {
        for (col, &index) in cells.iter().enumerate() {
            if index as usize > tile_count {
                return Err(TileMapError::TileIndexOutOfRange {
                    row: row as u32,
                    col: col as u32,
                    index,
                    tile_count,
                });
            }
        }
    }
    Ok(())
}
