use std::ops::Range;

use engine::{InputAction, InputSnapshot, InputSource};

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedInput {
    steps: Vec<(Range<u64>, InputAction)>,
}

impl ScriptedInput {
    pub(crate) fn hold(mut self, ticks: Range<u64>, action: InputAction) -> Self {
        self.steps.push((ticks, action));
        self
    }

    /// Walks right, flips gravity sideways, walks back, then restores it.
    pub(crate) fn demo() -> Self {
        Self::default()
            .hold(0..90, InputAction::MoveRight)
            .hold(90..150, InputAction::MoveDown)
            .hold(150..151, InputAction::GravityHorizontal)
            .hold(200..320, InputAction::MoveLeft)
            .hold(320..321, InputAction::GravityVertical)
            .hold(360..420, InputAction::MoveUp)
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> InputSnapshot {
        InputSnapshot::from_held(
            self.steps
                .iter()
                .filter(|(ticks, _)| ticks.contains(&tick))
                .map(|(_, action)| *action),
        )
    }
}
