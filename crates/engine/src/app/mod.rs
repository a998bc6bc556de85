mod camera;
mod entity;
mod geometry;
mod gravity;
mod input;
mod loop_runner;
mod scene;
mod world;

pub use camera::{resolve_world_size, Camera2D};
pub use entity::{Entity, EntityId, GravitySettings, PhysicsKind, DEFAULT_GRAVITY_MULTIPLIER};
pub use geometry::{Rect, Size2, Vec2};
pub use gravity::{Gravity, PullAxis, PullReport};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{
    run_headless, AppError, FixedStepClock, FrameSink, InputSource, LoopConfig, PresentError,
    RunSummary, StepPlan,
};
pub use scene::{Canvas, CanvasView, DrawCommand, DrawLayer, Scene};
pub use world::{EntityIdAllocator, MoveOutcome, World};
