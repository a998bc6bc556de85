use crate::content::{ImageHandle, TileMap};

use super::camera::Camera2D;
use super::geometry::{Size2, Vec2};
use super::input::InputSnapshot;
use super::world::World;

pub trait Scene {
    /// Runs one fixed-step tick. `input` holds the actions down for this tick.
    fn advance_one_tick(&mut self, input: &InputSnapshot);
    fn current_canvas(&self) -> CanvasView<'_>;
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Drawing surface settings owned by a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub viewport: Size2,
    pub background: Option<ImageHandle>,
}

impl Canvas {
    pub fn new(viewport: Size2) -> Self {
        Self {
            viewport,
            background: None,
        }
    }

    pub fn with_background(mut self, background: Option<ImageHandle>) -> Self {
        self.background = background;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DrawLayer {
    Background,
    Tiles,
    Entities,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub image: ImageHandle,
    pub screen: Vec2,
    pub size: Size2,
    pub layer: DrawLayer,
}

/// Read-only view of a scene for one presented frame.
#[derive(Debug, Clone, Copy)]
pub struct CanvasView<'a> {
    pub canvas: &'a Canvas,
    pub world: &'a World,
    pub camera: &'a Camera2D,
    pub tilemap: Option<&'a TileMap>,
}

impl<'a> CanvasView<'a> {
    /// Everything visible this frame in paint order, already shifted by the
    /// camera. Culling is left to the presenter.
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::new();

        if let Some(background) = &self.canvas.background {
            commands.push(DrawCommand {
                image: background.clone(),
                screen: self.camera.world_to_view(Vec2::ZERO),
                size: background.size(),
                layer: DrawLayer::Background,
            });
        }

        if let Some(tilemap) = self.tilemap {
            let tile_size = Size2::new(tilemap.tile_width(), tilemap.tile_height());
            commands.extend(tilemap.draw_list().into_iter().map(|tile| DrawCommand {
                image: tile.image,
                screen: self.camera.world_to_view(tile.position),
                size: tile_size,
                layer: DrawLayer::Tiles,
            }));
        }

        for entity in self.world.entities() {
            let Some(image) = entity.visual() else {
                continue;
            };
            commands.push(DrawCommand {
                image: image.clone(),
                screen: self.camera.world_to_view(entity.position()),
                size: entity.size(),
                layer: DrawLayer::Entities,
            });
        }

        commands
    }
}
