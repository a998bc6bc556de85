use std::env;
use std::path::PathBuf;

use engine::{resolve_app_paths, AppError, LoopConfig, StartupError};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::DemoScene;
use super::script::ScriptedInput;

const LEVEL_ENV_VAR: &str = "STAGE2D_LEVEL";
const TICKS_ENV_VAR: &str = "STAGE2D_TICKS";
const DEFAULT_LEVEL: &str = "levels/level1.json";
const DEFAULT_TICKS: u64 = 600;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: DemoScene,
    pub(crate) input: ScriptedInput,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== stage2d demo startup ===");

    let paths = resolve_app_paths()?;
    let level = level_from_env()?;
    let ticks = parse_tick_limit(read_env(TICKS_ENV_VAR)?.as_deref())?;
    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        level = %level.display(),
        ticks,
        "startup"
    );

    let scene = DemoScene::load(&paths.assets_dir, &level)?;
    let config = LoopConfig {
        max_ticks: Some(ticks),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene,
        input: ScriptedInput::demo(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn read_env(var: &'static str) -> Result<Option<String>, StartupError> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn level_from_env() -> Result<PathBuf, StartupError> {
    Ok(read_env(LEVEL_ENV_VAR)?
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEVEL)))
}

fn parse_tick_limit(raw: Option<&str>) -> Result<u64, StartupError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(DEFAULT_TICKS);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(StartupError::InvalidSetting {
            var: TICKS_ENV_VAR,
            value: raw.to_string(),
            message: "must be at least 1".to_string(),
        }),
        Ok(ticks) => Ok(ticks),
        Err(err) => Err(StartupError::InvalidSetting {
            var: TICKS_ENV_VAR,
            value: raw.to_string(),
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_limit_defaults_when_unset_or_blank() {
        assert_eq!(parse_tick_limit(None).expect("unset"), DEFAULT_TICKS);
        assert_eq!(parse_tick_limit(Some("  ")).expect("blank"), DEFAULT_TICKS);
    }

    #[test]
    fn tick_limit_parses_trimmed_value() {
        assert_eq!(parse_tick_limit(Some(" 120 ")).expect("120"), 120);
    }

    #[test]
    fn tick_limit_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_tick_limit(Some("0")),
            Err(StartupError::InvalidSetting { var: TICKS_ENV_VAR, .. })
        ));
        assert!(matches!(
            parse_tick_limit(Some("lots")),
            Err(StartupError::InvalidSetting { .. })
        ));
    }
}
