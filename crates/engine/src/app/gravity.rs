use serde::Deserialize;
use tracing::trace;

use super::world::{MoveOutcome, World};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullAxis {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    pub moved: usize,
    pub blocked: usize,
}

/// Constant per-tick pull applied to every gravity-enabled entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    strength: f32,
    axis: PullAxis,
}

impl Gravity {
    pub fn new(strength: f32) -> Self {
        Self {
            strength,
            axis: PullAxis::default(),
        }
    }

    pub fn with_axis(mut self, axis: PullAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength;
    }

    pub fn axis(&self) -> PullAxis {
        self.axis
    }

    pub fn set_axis(&mut self, axis: PullAxis) {
        self.axis = axis;
    }

    /// Issues one checked move per gravity-enabled entity, in world order.
    /// Each move sees the positions left by the moves before it, so an
    /// entity earlier in the world can block a later one in the same pull.
    pub fn pull(&self, world: &mut World) -> PullReport {
        let mut report = PullReport::default();
        for id in world.ids() {
            let Some(entity) = world.find(id) else {
                continue;
            };
            let settings = entity.gravity();
            if !settings.enabled {
                continue;
            }
            let amount = self.strength * settings.multiplier;
            let outcome = match self.axis {
                PullAxis::Vertical => world.move_checked_y(id, amount),
                PullAxis::Horizontal => world.move_checked_x(id, amount),
            };
            match outcome {
                MoveOutcome::Moved => report.moved += 1,
                MoveOutcome::Blocked => report.blocked += 1,
                MoveOutcome::UnknownEntity => {}
            }
        }
        trace!(
            axis = ?self.axis,
            moved = report.moved,
            blocked = report.blocked,
            "gravity_pull"
        );
        report
    }
}
