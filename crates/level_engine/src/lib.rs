//! # Level Engine
//!
//! Scene description and controller lifecycle for a rendering engine.
//!
//! ## Features
//!
//! - **Declarative Levels**: XML documents describe named objects, their
//!   transforms, and the controllers attached to them
//! - **Controller Resolution**: short tags resolve to registered controller
//!   types, with backend-specific fallbacks
//! - **Frame Lifecycle**: start, render, update, and end passes with a
//!   pre/post bracket around each subtree
//! - **Cameras and Lights**: off-screen cameras with an active-camera
//!   composite, and per-frame light aggregation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use level_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ControllerRegistry::with_builtins();
//!     let assets = DirectoryAssetIndex::new(["resources"]);
//!     let mut backend = HeadlessBackend::new();
//!
//!     let mut level = SceneLoader::new(&registry, &assets)
//!         .with_backend(backend.name())
//!         .load_asset("levels/demo_level.xml")?;
//!
//!     level.set_active_camera(Some(CameraId(1)));
//!     level.start(&mut backend)?;
//!     level.render(&mut backend)?;
//!     level.update(&mut backend)?;
//!     level.end(&mut backend)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod level;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetData, AssetError, AssetIndex, DirectoryAssetIndex, MemoryAssetIndex},
        config::{Config, ConfigError, LevelEngineConfig},
        foundation::math::{Transform, Vec3},
        level::{
            CameraController, CameraId, Controller, ControllerContext, ControllerRegistry,
            ControllerType, FieldDescriptor, LevelError, LevelResult, LightController,
            SceneGraph, SceneLoader, SceneObject,
        },
        render::{HeadlessBackend, LightContribution, LightKind, RenderBackend},
    };
}
