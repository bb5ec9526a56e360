//! Headless level viewer
//!
//! Loads a level document, runs it for a fixed number of frames on the
//! headless backend, and logs what each frame produced.
//!
//! Usage: `level_viewer [config.toml|config.ron]`

use std::path::Path;

use level_engine::foundation::logging;
use level_engine::prelude::*;
use level_engine::render::RenderCall;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "level_viewer.toml";

/// Viewer failures
#[derive(Error, Debug)]
enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Level(#[from] LevelError),
}

struct ViewerApp {
    config: LevelEngineConfig,
    backend: HeadlessBackend,
}

impl ViewerApp {
    fn new(config: LevelEngineConfig) -> Self {
        Self {
            config,
            backend: HeadlessBackend::new(),
        }
    }

    fn run(&mut self) -> Result<(), ViewerError> {
        let registry = ControllerRegistry::with_builtins();
        let assets = DirectoryAssetIndex::new(&self.config.asset_search_paths);
        let qualifier = self.config.backend_qualifier(self.backend.name()).to_string();

        let mut level = SceneLoader::new(&registry, &assets)
            .with_backend(qualifier)
            .load_asset(&self.config.level)?;
        log::info!("Level '{}' has {} objects", self.config.level, level.len());

        level.set_active_camera(self.config.active_camera.map(CameraId));
        level.start(&mut self.backend)?;

        for frame in 0..self.config.frames {
            level.render(&mut self.backend)?;
            level.update(&mut self.backend)?;

            let calls = self.backend.take_calls();
            let draws = calls
                .iter()
                .filter(|call| matches!(call, RenderCall::Draw { .. }))
                .count();
            log::debug!(
                "Frame {frame}: {} lights, {} backend calls, {draws} blits",
                level.lights().len(),
                calls.len()
            );
        }

        level.end(&mut self.backend)?;
        log::info!("Ran {} frames", self.config.frames);
        Ok(())
    }
}

fn load_config() -> Result<LevelEngineConfig, ViewerError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(LevelEngineConfig::load_from_file(&path)?),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Ok(LevelEngineConfig::load_from_file(DEFAULT_CONFIG)?)
        }
        None => Ok(LevelEngineConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init();
            log::error!("{e}");
            return Err(e.into());
        }
    };
    logging::init_with_filter(&config.log_filter);

    log::info!("Starting level viewer");
    let mut app = ViewerApp::new(config);

    match app.run() {
        Ok(()) => {
            log::info!("Level viewer finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Level viewer failed: {e}");
            Err(e.into())
        }
    }
}
