use std::process::ExitCode;

use engine::{run_headless, CanvasView, DrawLayer, FrameSink, PresentError};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;

#[derive(Debug, Default)]
pub(crate) struct LogFrameSink {
    pub(crate) frames: u64,
}

impl FrameSink for LogFrameSink {
    fn present(&mut self, frame: &CanvasView<'_>) -> Result<(), PresentError> {
        let commands = frame.draw_list();
        let tiles = commands
            .iter()
            .filter(|command| command.layer == DrawLayer::Tiles)
            .count();
        let camera = frame.camera.position();
        debug!(
            frame = self.frames,
            draw_commands = commands.len(),
            tiles,
            camera_x = camera.x,
            camera_y = camera.y,
            "frame_presented"
        );
        self.frames += 1;
        Ok(())
    }
}

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let mut sink = LogFrameSink::default();
    match run_headless(&mut app.scene, &app.config, &mut app.input, &mut sink) {
        Ok(summary) => {
            let player = app.scene.player_position();
            info!(
                ticks = summary.ticks,
                frames = summary.frames,
                quit_requested = summary.quit_requested,
                player_x = player.x,
                player_y = player.y,
                "demo_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}
