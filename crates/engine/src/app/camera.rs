use crate::content::{ImageHandle, TileMap};

use super::entity::{Entity, EntityId};
use super::geometry::{Rect, Size2, Vec2};
use super::world::World;

/// Picks the scrollable world size: the tile map's pixel size if there is a
/// map, otherwise the background image size, otherwise zero.
pub fn resolve_world_size(tilemap: Option<&TileMap>, background: Option<&ImageHandle>) -> Size2 {
    if let Some(tilemap) = tilemap {
        return tilemap.pixel_size();
    }
    if let Some(background) = background {
        return background.size();
    }
    Size2::ZERO
}

/// Viewport into the world. The visible area never leaves
/// `[0, world.width] x [0, world.height]`; an axis where the world is
/// smaller than the viewport is pinned to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    position: Vec2,
    viewport: Size2,
    world_size: Size2,
}

impl Camera2D {
    pub fn new(viewport: Size2) -> Self {
        Self::for_bounds(viewport, Size2::ZERO)
    }

    pub fn for_bounds(viewport: Size2, world_size: Size2) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
            world_size,
        }
    }

    pub fn for_scene(
        viewport: Size2,
        tilemap: Option<&TileMap>,
        background: Option<&ImageHandle>,
    ) -> Self {
        Self::for_bounds(viewport, resolve_world_size(tilemap, background))
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn viewport(&self) -> Size2 {
        self.viewport
    }

    pub fn world_size(&self) -> Size2 {
        self.world_size
    }

    pub fn set_viewport(&mut self, viewport: Size2) {
        self.viewport = viewport;
        self.reclamp();
    }

    pub fn set_world_size(&mut self, world_size: Size2) {
        self.world_size = world_size;
        self.reclamp();
    }

    pub fn view_rect(&self) -> Rect {
        Rect::from_parts(self.position, self.viewport)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(
            clamp_axis(x, self.world_size.width, self.viewport.width),
            clamp_axis(y, self.world_size.height, self.viewport.height),
        );
    }

    pub fn center(&mut self, entity: &Entity) {
        let x = entity.x() + entity.width() / 2.0 - self.viewport.width / 2.0;
        let y = entity.y() + entity.height() / 2.0 - self.viewport.height / 2.0;
        self.set_position(x, y);
    }

    pub fn center_on(&mut self, world: &World, id: EntityId) -> bool {
        match world.find(id) {
            Some(entity) => {
                self.center(entity);
                true
            }
            None => false,
        }
    }

    pub fn world_to_view(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x - self.position.x, world.y - self.position.y)
    }

    fn reclamp(&mut self) {
        self.set_position(self.position.x, self.position.y);
    }
}

fn clamp_axis(value: f32, world_extent: f32, viewport_extent: f32) -> f32 {
    if value < 0.0 || world_extent < viewport_extent {
        0.0
    } else if value > world_extent - viewport_extent {
        world_extent - viewport_extent
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    const VIEWPORTS: [(f32, f32); 4] = [(512.0, 512.0), (320.0, 240.0), (1.0, 1.0), (2048.0, 64.0)];
    const WORLDS: [(f32, f32); 5] = [
        (0.0, 0.0),
        (1024.0, 1024.0),
        (512.0, 100.0),
        (300.0, 4000.0),
        (2048.0, 64.0),
    ];
    const TARGETS: [(f32, f32); 6] = [
        (-500.0, -1.0),
        (0.0, 0.0),
        (169.0, 250.5),
        (600.0, 3000.0),
        (1e6, -1e6),
        (1023.0, 63.0),
    ];

    #[test]
    fn centring_example_clamps_negative_y() {
        let mut camera = Camera2D::for_bounds(Size2::new(512.0, 512.0), Size2::new(1024.0, 1024.0));
        let sun = Entity::new(Rect::new(400.0, 100.0, 50.0, 50.0));
        camera.center(&sun);
        assert_eq!(camera.position(), Vec2::new(169.0, 0.0));
    }

    #[test]
    fn set_position_clamps_to_far_edge() {
        let mut camera = Camera2D::for_bounds(Size2::new(512.0, 512.0), Size2::new(1024.0, 768.0));
        camera.set_position(900.0, 700.0);
        assert_eq!(camera.position(), Vec2::new(512.0, 256.0));
    }

    #[test]
    fn camera_stays_inside_world_for_all_combinations() {
        for (vw, vh) in VIEWPORTS {
            for (ww, wh) in WORLDS {
                for (x, y) in TARGETS {
                    let mut camera = Camera2D::for_bounds(Size2::new(vw, vh), Size2::new(ww, wh));
                    camera.set_position(x, y);
                    let position = camera.position();
                    for (value, world, view) in [(position.x, ww, vw), (position.y, wh, vh)] {
                        if world < view {
                            assert_eq!(value, 0.0, "world {world} < viewport {view}");
                        } else {
                            assert!(value >= 0.0);
                            assert!(value <= world - view);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn set_position_is_idempotent() {
        for (vw, vh) in VIEWPORTS {
            for (ww, wh) in WORLDS {
                for (x, y) in TARGETS {
                    let mut camera = Camera2D::for_bounds(Size2::new(vw, vh), Size2::new(ww, wh));
                    camera.set_position(x, y);
                    let once = camera.position();
                    camera.set_position(x, y);
                    assert_eq!(camera.position(), once);
                }
            }
        }
    }

    #[test]
    fn unset_world_pins_camera_to_origin() {
        let mut camera = Camera2D::new(Size2::new(512.0, 512.0));
        camera.set_position(100.0, 100.0);
        assert_eq!(camera.position(), Vec2::ZERO);

        camera.set_world_size(Size2::new(2000.0, 2000.0));
        camera.set_position(100.0, 100.0);
        assert_eq!(camera.position(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn shrinking_world_reclamps_current_position() {
        let mut camera = Camera2D::for_bounds(Size2::new(100.0, 100.0), Size2::new(1000.0, 1000.0));
        camera.set_position(800.0, 50.0);
        camera.set_world_size(Size2::new(500.0, 80.0));
        assert_eq!(camera.position(), Vec2::new(400.0, 0.0));
    }

    #[test]
    fn world_size_falls_back_to_background() {
        let background = ImageHandle::new(RgbaImage::from_pixel(640, 480, Rgba([0, 0, 0, 255])));
        assert_eq!(
            resolve_world_size(None, Some(&background)),
            Size2::new(640.0, 480.0)
        );
        assert_eq!(resolve_world_size(None, None), Size2::ZERO);
    }

    #[test]
    fn center_on_missing_entity_keeps_position() {
        let mut camera = Camera2D::for_bounds(Size2::new(10.0, 10.0), Size2::new(100.0, 100.0));
        camera.set_position(20.0, 30.0);
        let world = World::new();
        assert!(!camera.center_on(&world, EntityId(3)));
        assert_eq!(camera.position(), Vec2::new(20.0, 30.0));
    }

    #[test]
    fn world_to_view_subtracts_camera_offset() {
        let mut camera = Camera2D::for_bounds(Size2::new(10.0, 10.0), Size2::new(100.0, 100.0));
        camera.set_position(20.0, 30.0);
        assert_eq!(
            camera.world_to_view(Vec2::new(25.0, 31.0)),
            Vec2::new(5.0, 1.0)
        );
    }
}
