//! Rendering collaborators
//!
//! The level core never talks to a graphics API directly. It sees a
//! [`RenderBackend`] that hands out off-screen [`RenderTarget`]s and
//! [`Drawable`] primitives, and tracks which shader program is bound.
//! The backend is passed explicitly into every operation that needs it.

pub mod headless;
pub mod lighting;

pub use headless::{HeadlessBackend, RenderCall};
pub use lighting::{LightContribution, LightKind, LightList};

use thiserror::Error;

/// Handle to a shader program owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Off-screen render target (framebuffer) owned by a single controller
pub trait RenderTarget {
    /// Make this target the destination of subsequent draws
    fn bind(&mut self) -> RenderResult<()>;

    /// Restore the default target as the draw destination
    fn unbind(&mut self) -> RenderResult<()>;

    /// Clear the target's color and depth contents
    fn clear(&mut self) -> RenderResult<()>;

    /// Make the target's color output the sampling source for the next draw
    fn bind_color_attachment(&mut self) -> RenderResult<()>;
}

/// Geometry that can be drawn with a shader program
pub trait Drawable {
    /// Bind the geometry and issue its draw call with `shader`
    fn bind_and_draw(&mut self, shader: ShaderHandle) -> RenderResult<()>;
}

/// The active rendering backend
pub trait RenderBackend {
    /// Backend qualifier, used to pick backend-specific controllers
    fn name(&self) -> &str;

    /// Create an off-screen render target sized to the output
    fn create_render_target(&mut self) -> RenderResult<Box<dyn RenderTarget>>;

    /// Create a quad covering the whole output in clip space
    fn create_fullscreen_quad(&mut self) -> RenderResult<Box<dyn Drawable>>;

    /// Built-in shader that copies a sampled texture to the output
    fn blit_shader(&self) -> ShaderHandle;

    /// Currently bound shader program, if any
    fn bound_shader(&self) -> Option<ShaderHandle>;

    /// Bind a shader program
    fn bind_shader(&mut self, shader: ShaderHandle) -> RenderResult<()>;

    /// Clear whatever target is currently bound
    fn clear(&mut self) -> RenderResult<()>;
}

/// Rendering errors reported by a backend
#[derive(Error, Debug)]
pub enum RenderError {
    /// Resource creation or management failed
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),
    
    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),
    
    /// A resource was used after it was released
    #[error("Resource {0} used after release")]
    Released(u32),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
