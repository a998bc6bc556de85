mod level;
mod manifest;
mod raster;
mod tilemap;
mod tileset;
mod validate;

pub use level::{load_level, Level, LevelError};
pub use manifest::{
    GravityManifest, LevelManifest, ManifestError, TileSetManifest, ViewportManifest,
};
pub use raster::{ImageHandle, RasterError};
pub use tilemap::{
    parse_object_layer, parse_tile_layer, LoadOptions, TileDraw, TileMap, TileMapDimensions,
    TileMapError, MAX_MAP_TILES,
};
pub use tileset::{TileSet, TileSetError};
pub use validate::{validate_map_document, MapValidationError, SourceLocation, ValidationCode};
