use thiserror::Error;

use super::raster::ImageHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileSetError {
    #[error("tile size must be non-zero, got {tile_width}x{tile_height}")]
    ZeroTileSize { tile_width: u32, tile_height: u32 },
    #[error("tile grid must have at least one row and column, got {rows}x{columns}")]
    EmptyGrid { rows: u32, columns: u32 },
    #[error(
        "{rows}x{columns} grid of {tile_width}x{tile_height} tiles does not fit in a \
         {image_width}x{image_height} image"
    )]
    GridExceedsImage {
        rows: u32,
        columns: u32,
        tile_width: u32,
        tile_height: u32,
        image_width: u32,
        image_height: u32,
    },
}

/// Sub-images cut from one tile sheet. Index `row * columns + col` holds the
/// tile at that grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSet {
    rows: u32,
    columns: u32,
    tiles: Vec<ImageHandle>,
}

impl TileSet {
    pub fn slice(
        image: &ImageHandle,
        rows: u32,
        columns: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, TileSetError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TileSetError::ZeroTileSize {
                tile_width,
                tile_height,
            });
        }
        if rows == 0 || columns == 0 {
            return Err(TileSetError::EmptyGrid { rows, columns });
        }
        let exceeds = || TileSetError::GridExceedsImage {
            rows,
            columns,
            tile_width,
            tile_height,
            image_width: image.width(),
            image_height: image.height(),
        };

        let fits = |count: u32, tile: u32, limit: u32| {
            count.checked_mul(tile).is_some_and(|span| span <= limit)
        };
        if !fits(columns, tile_width, image.width()) || !fits(rows, tile_height, image.height()) {
            return Err(exceeds());
        }

        // Bounded by the image area now that the grid is known to fit.
        let mut tiles = Vec::with_capacity(rows as usize * columns as usize);
        for row in 0..rows {
            for col in 0..columns {
                let (x, y) = (col * tile_width, row * tile_height);
                let tile = image
                    .crop(x, y, tile_width, tile_height)
                    .ok_or_else(exceeds)?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            rows,
            columns,
            tiles,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageHandle> {
        self.tiles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.tiles.iter()
    }
}
