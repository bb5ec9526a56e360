//! Headless rendering backend
//!
//! Performs no GPU work. Every operation is appended to a shared call log so
//! frame protocols can be inspected after the fact, which is what the tests
//! and the headless viewer rely on.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Drawable, RenderBackend, RenderResult, RenderTarget, ShaderHandle};

/// One recorded backend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCall {
    /// A render target was created
    CreateTarget(u32),
    /// A render target was bound for drawing
    BindTarget(u32),
    /// A render target was unbound, restoring the default target
    UnbindTarget(u32),
    /// A render target was cleared
    ClearTarget(u32),
    /// A render target's color output was bound for sampling
    SampleTarget(u32),
    /// A render target was released
    ReleaseTarget(u32),
    /// A fullscreen quad was created
    CreateQuad(u32),
    /// A quad was drawn with a shader
    Draw {
        /// Drawable identifier
        drawable: u32,
        /// Shader used for the draw
        shader: ShaderHandle,
    },
    /// A fullscreen quad was released
    ReleaseQuad(u32),
    /// A shader program was bound
    BindShader(ShaderHandle),
    /// The currently bound target (`None` for the default one) was cleared
    Clear(Option<u32>),
}

#[derive(Debug, Default)]
struct HeadlessState {
    calls: Vec<RenderCall>,
    bound_target: Option<u32>,
    next_id: u32,
}

impl HeadlessState {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

type SharedState = Rc<RefCell<HeadlessState>>;

/// Rendering backend that records instead of drawing
#[derive(Debug)]
pub struct HeadlessBackend {
    name: String,
    state: SharedState,
    bound_shader: Option<ShaderHandle>,
}

impl HeadlessBackend {
    /// Backend qualifier reported by [`RenderBackend::name`]
    pub const NAME: &'static str = "Headless";

    /// Shader handle used for fullscreen blits
    pub const BLIT_SHADER: ShaderHandle = ShaderHandle(1);

    /// Create a backend reporting [`HeadlessBackend::NAME`]
    pub fn new() -> Self {
        Self::with_name(Self::NAME)
    }

    /// Create a backend reporting a custom qualifier
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: SharedState::default(),
            bound_shader: None,
        }
    }

    /// Snapshot of every call recorded so far
    pub fn calls(&self) -> Vec<RenderCall> {
        self.state.borrow().calls.clone()
    }

    /// Take the recorded calls, leaving the log empty
    pub fn take_calls(&self) -> Vec<RenderCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    /// Number of recorded draw calls
    pub fn draw_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, RenderCall::Draw { .. }))
            .count()
    }

    /// Target currently receiving draws, `None` for the default target
    pub fn bound_target(&self) -> Option<u32> {
        self.state.borrow().bound_target
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_render_target(&mut self) -> RenderResult<Box<dyn RenderTarget>> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.calls.push(RenderCall::CreateTarget(id));
        Ok(Box::new(HeadlessTarget {
            id,
            state: Rc::clone(&self.state),
        }))
    }

    fn create_fullscreen_quad(&mut self) -> RenderResult<Box<dyn Drawable>> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.calls.push(RenderCall::CreateQuad(id));
        Ok(Box::new(HeadlessQuad {
            id,
            state: Rc::clone(&self.state),
        }))
    }

    fn blit_shader(&self) -> ShaderHandle {
        Self::BLIT_SHADER
    }

    fn bound_shader(&self) -> Option<ShaderHandle> {
        self.bound_shader
    }

    fn bind_shader(&mut self, shader: ShaderHandle) -> RenderResult<()> {
        self.bound_shader = Some(shader);
        self.state.borrow_mut().calls.push(RenderCall::BindShader(shader));
        Ok(())
    }

    fn clear(&mut self) -> RenderResult<()> {
        let mut state = self.state.borrow_mut();
        let target = state.bound_target;
        state.calls.push(RenderCall::Clear(target));
        Ok(())
    }
}

struct HeadlessTarget {
    id: u32,
    state: SharedState,
}

impl HeadlessTarget {
    fn record(&self, call: RenderCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl RenderTarget for HeadlessTarget {
    fn bind(&mut self) -> RenderResult<()> {
        self.state.borrow_mut().bound_target = Some(self.id);
        self.record(RenderCall::BindTarget(self.id));
        Ok(())
    }

    fn unbind(&mut self) -> RenderResult<()> {
        self.state.borrow_mut().bound_target = None;
        self.record(RenderCall::UnbindTarget(self.id));
        Ok(())
    }

    fn clear(&mut self) -> RenderResult<()> {
        self.record(RenderCall::ClearTarget(self.id));
        Ok(())
    }

    fn bind_color_attachment(&mut self) -> RenderResult<()> {
        self.record(RenderCall::SampleTarget(self.id));
        Ok(())
    }
}

impl Drop for HeadlessTarget {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.bound_target == Some(self.id) {
            state.bound_target = None;
        }
        state.calls.push(RenderCall::ReleaseTarget(self.id));
    }
}

struct HeadlessQuad {
    id: u32,
    state: SharedState,
}

impl Drawable for HeadlessQuad {
    fn bind_and_draw(&mut self, shader: ShaderHandle) -> RenderResult<()> {
        self.state.borrow_mut().calls.push(RenderCall::Draw {
            drawable: self.id,
            shader,
        });
        Ok(())
    }
}

impl Drop for HeadlessQuad {
    fn drop(&mut self) {
        self.state.borrow_mut().calls.push(RenderCall::ReleaseQuad(self.id));
    }
}
