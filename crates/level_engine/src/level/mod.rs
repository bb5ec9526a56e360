//! Level description and controller lifecycle
//!
//! A level is a tree of named [`SceneObject`]s, each carrying a transform and
//! an ordered list of [`Controller`]s. Levels are loaded from XML documents
//! by the [`SceneLoader`], which resolves controller tags through a
//! [`ControllerRegistry`] and converts field text with the typed value
//! loader in [`value`]. The resulting [`SceneGraph`] drives the
//! start/render/update/end lifecycle against a
//! [`RenderBackend`](crate::render::RenderBackend).

pub mod controller;
pub mod controllers;
pub mod error;
pub mod graph;
pub mod loader;
pub mod object;
pub mod registry;
pub mod value;

#[cfg(test)]
mod tests;

pub use controller::{
    Capabilities, Controller, ControllerContext, ControllerType, FieldDescriptor, Hook,
};
pub use controllers::{CameraController, EmptyController, LightController, RotatorController};
pub use error::{
    ConversionError, LevelError, LevelResult, ResolutionError, SchemaError, StateError,
};
pub use graph::{CameraId, FrameState, GraphState, SceneGraph};
pub use loader::SceneLoader;
pub use object::{ObjectId, SceneObject};
pub use registry::{ControllerEntry, ControllerRegistry, FieldInfo, DEFAULT_NAMESPACE};
pub use value::{load_value, EnumDescriptor, EnumValue, SemanticType, Value};
