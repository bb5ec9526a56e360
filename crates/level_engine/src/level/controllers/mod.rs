//! Built-in controllers
//!
//! These are registered by
//! [`ControllerRegistry::with_builtins`](super::ControllerRegistry::with_builtins)
//! and can be named in level documents by their short tags.

mod camera;
mod empty;
mod light;
mod rotator;

pub use camera::CameraController;
pub use empty::EmptyController;
pub use light::{LightController, LIGHT_KIND};
pub use rotator::RotatorController;
