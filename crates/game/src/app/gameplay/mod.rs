use std::path::Path;

use engine::{
    load_level, Camera2D, Canvas, CanvasView, Entity, EntityId, Gravity, ImageHandle, InputAction,
    InputSnapshot, Level, LevelError, PhysicsKind, PullAxis, Rect, Scene, TileMap, Vec2, World,
};
use image::{Rgba, RgbaImage};
use tracing::{debug, info};

const PLAYER_SPAWN: Rect = Rect::new(400.0, 100.0, 50.0, 50.0);
const COMPANION_SPAWN: Rect = Rect::new(10.0, 100.0, 50.0, 50.0);
const PLAYER_GRAVITY_MULTIPLIER: f32 = -1.0;
const PLAYER_STEP: f32 = 5.0;

// Order matters next to a collider: each move sees the one before it.
const MOVES: [(InputAction, f32, f32); 4] = [
    (InputAction::MoveDown, 0.0, PLAYER_STEP),
    (InputAction::MoveRight, PLAYER_STEP, 0.0),
    (InputAction::MoveUp, 0.0, -PLAYER_STEP),
    (InputAction::MoveLeft, -PLAYER_STEP, 0.0),
];

pub(crate) struct DemoScene {
    world: World,
    tilemap: TileMap,
    gravity: Gravity,
    camera: Camera2D,
    canvas: Canvas,
    player: EntityId,
    ticks: u64,
    quit: bool,
}

impl DemoScene {
    pub(crate) fn load(assets_dir: &Path, manifest: &Path) -> Result<Self, LevelError> {
        let mut world = World::new();
        let level = load_level(assets_dir, manifest, &mut world)?;
        Ok(Self::from_level(level, world))
    }

    pub(crate) fn from_level(level: Level, mut world: World) -> Self {
        let player = world.spawn(
            Entity::with_visual_sized(PLAYER_SPAWN, block_sprite(Rgba([250, 200, 40, 255])))
                .with_physics(PhysicsKind::Solid)
                .with_gravity(PLAYER_GRAVITY_MULTIPLIER),
        );
        world.spawn(
            Entity::with_visual_sized(COMPANION_SPAWN, block_sprite(Rgba([240, 120, 30, 255])))
                .with_physics(PhysicsKind::Solid),
        );
        let canvas = Canvas::new(level.camera.viewport()).with_background(level.background);
        info!(
            entity_count = world.entity_count(),
            gravity_strength = level.gravity.strength(),
            "scene_loaded"
        );

        Self {
            world,
            tilemap: level.tilemap,
            gravity: level.gravity,
            camera: level.camera,
            canvas,
            player,
            ticks: 0,
            quit: false,
        }
    }

    pub(crate) fn player_position(&self) -> Vec2 {
        self.world
            .find(self.player)
            .map(Entity::position)
            .unwrap_or(Vec2::ZERO)
    }

    fn apply_moves(&mut self, input: &InputSnapshot) {
        for (action, dx, dy) in MOVES {
            if !input.is_down(action) {
                continue;
            }
            let outcome = self.world.move_checked(self.player, dx, dy);
            if !outcome.moved() {
                debug!(tick = self.ticks, action = ?action, "player_blocked");
            }
        }
    }

    fn apply_axis_toggles(&mut self, input: &InputSnapshot) {
        let axis = if input.is_down(InputAction::GravityHorizontal) {
            PullAxis::Horizontal
        } else if input.is_down(InputAction::GravityVertical) {
            PullAxis::Vertical
        } else {
            return;
        };
        if axis != self.gravity.axis() {
            self.gravity.set_axis(axis);
            info!(tick = self.ticks, axis = ?axis, "gravity_axis_changed");
        }
    }
}

impl Scene for DemoScene {
    fn advance_one_tick(&mut self, input: &InputSnapshot) {
        if input.is_down(InputAction::Quit) {
            self.quit = true;
            return;
        }
        self.camera.center_on(&self.world, self.player);
        self.gravity.pull(&mut self.world);
        self.apply_moves(input);
        self.apply_axis_toggles(input);
        self.ticks += 1;
    }

    fn current_canvas(&self) -> CanvasView<'_> {
        CanvasView {
            canvas: &self.canvas,
            world: &self.world,
            camera: &self.camera,
            tilemap: Some(&self.tilemap),
        }
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

fn block_sprite(color: Rgba<u8>) -> ImageHandle {
    ImageHandle::new(RgbaImage::from_pixel(
        PLAYER_SPAWN.width as u32,
        PLAYER_SPAWN.height as u32,
        color,
    ))
}
