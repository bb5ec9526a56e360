//! Off-screen cameras
//!
//! A camera owns a render target and a fullscreen quad. Every frame it
//! captures its object's subtree into the target. The camera whose identity
//! matches the level's active camera then copies the target to the screen
//! with the backend's blit shader, restoring whatever shader was bound
//! before.

use std::fmt;

use crate::level::controller::{
    Capabilities, Controller, ControllerContext, ControllerType, FieldDescriptor,
};
use crate::level::error::{LevelResult, StateError};
use crate::level::graph::CameraId;
use crate::level::value::SemanticType;
use crate::render::{Drawable, RenderTarget};

/// Renders its subtree into a private target
#[derive(Default)]
pub struct CameraController {
    id: CameraId,
    target: Option<Box<dyn RenderTarget>>,
    quad: Option<Box<dyn Drawable>>,
}

impl CameraController {
    /// Uninitialized camera with identity `id`
    pub fn new(id: CameraId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Camera identity
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// Whether the init hook created the target and quad
    pub fn is_initialized(&self) -> bool {
        self.target.is_some() && self.quad.is_some()
    }

    fn composite(&mut self, ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        let blit = ctx.backend().blit_shader();
        let previous = ctx.backend().bound_shader();
        if previous != Some(blit) {
            ctx.backend().bind_shader(blit)?;
        }

        if let Some(target) = self.target.as_mut() {
            target.bind_color_attachment()?;
        }
        let quad = self
            .quad
            .as_mut()
            .ok_or(StateError::NotInitialized("Camera"))?;
        quad.bind_and_draw(blit)?;

        if let Some(previous) = previous.filter(|&shader| shader != blit) {
            ctx.backend().bind_shader(previous)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CameraController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraController")
            .field("id", &self.id)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Controller for CameraController {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::INIT
            | Capabilities::PRE_RENDER
            | Capabilities::POST_RENDER
            | Capabilities::DESTROY
    }

    fn on_init(&mut self, ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        let backend = ctx.backend();
        self.target = Some(backend.create_render_target()?);
        self.quad = Some(backend.create_fullscreen_quad()?);
        log::debug!("{} on '{}' initialized", self.id, ctx.object().name());
        Ok(())
    }

    fn pre_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        let target = self
            .target
            .as_mut()
            .ok_or(StateError::NotInitialized("Camera"))?;
        target.bind()?;
        target.clear()?;
        Ok(())
    }

    fn post_render(&mut self, ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        let target = self
            .target
            .as_mut()
            .ok_or(StateError::NotInitialized("Camera"))?;
        target.unbind()?;

        if ctx.active_camera() == Some(self.id) {
            self.composite(ctx)?;
        }
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        self.target = None;
        self.quad = None;
        Ok(())
    }
}

impl ControllerType for CameraController {
    const TYPE_NAME: &'static str = "Level.CameraController";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[FieldDescriptor {
        name: "Id",
        ty: SemanticType::U32,
        set: |camera, value| {
            camera.id = CameraId(value.into_u32()?);
            Ok(())
        },
    }];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::error::LevelError;
    use crate::level::{SceneGraph, SceneObject};
    use crate::render::{HeadlessBackend, RenderBackend, RenderCall, ShaderHandle};

    fn camera_graph(id: u32) -> SceneGraph {
        let mut graph = SceneGraph::new();
        graph
            .add_object(
                SceneObject::new("camera").with_controller(Box::new(CameraController::new(CameraId(id)))),
                None,
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_inactive_camera_never_blits() {
        let mut graph = camera_graph(1);
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        backend.take_calls();
        graph.render(&mut backend).unwrap();

        assert_eq!(
            backend.take_calls(),
            vec![
                RenderCall::BindTarget(1),
                RenderCall::ClearTarget(1),
                RenderCall::UnbindTarget(1),
            ]
        );
        assert_eq!(backend.draw_count(), 0);
    }

    #[test]
    fn test_active_camera_composites_and_restores_shader() {
        let mut graph = camera_graph(1);
        let mut backend = HeadlessBackend::new();
        let scene_shader = ShaderHandle(7);

        graph.start(&mut backend).unwrap();
        graph.set_active_camera(Some(CameraId(1)));
        backend.bind_shader(scene_shader).unwrap();
        backend.take_calls();
        graph.render(&mut backend).unwrap();

        assert_eq!(
            backend.take_calls(),
            vec![
                RenderCall::BindTarget(1),
                RenderCall::ClearTarget(1),
                RenderCall::UnbindTarget(1),
                RenderCall::BindShader(HeadlessBackend::BLIT_SHADER),
                RenderCall::SampleTarget(1),
                RenderCall::Draw {
                    drawable: 2,
                    shader: HeadlessBackend::BLIT_SHADER,
                },
                RenderCall::BindShader(scene_shader),
            ]
        );
        assert_eq!(backend.bound_shader(), Some(scene_shader));
    }

    #[test]
    fn test_blit_shader_already_bound_is_not_rebound() {
        let mut graph = camera_graph(4);
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        graph.set_active_camera(Some(CameraId(4)));
        backend.bind_shader(HeadlessBackend::BLIT_SHADER).unwrap();
        backend.take_calls();
        graph.render(&mut backend).unwrap();

        let calls = backend.take_calls();
        assert!(!calls.iter().any(|call| matches!(call, RenderCall::BindShader(_))));
        assert!(calls.contains(&RenderCall::Draw {
            drawable: 2,
            shader: HeadlessBackend::BLIT_SHADER,
        }));
        assert_eq!(backend.bound_shader(), Some(HeadlessBackend::BLIT_SHADER));
    }

    #[test]
    fn test_no_previous_shader_leaves_blit_bound() {
        let mut graph = camera_graph(2);
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        graph.set_active_camera(Some(CameraId(2)));
        graph.render(&mut backend).unwrap();

        assert_eq!(backend.draw_count(), 1);
        assert_eq!(backend.bound_shader(), Some(HeadlessBackend::BLIT_SHADER));
    }

    #[test]
    fn test_destroy_releases_resources() {
        let mut graph = camera_graph(1);
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        backend.take_calls();
        graph.end(&mut backend).unwrap();

        assert_eq!(
            backend.take_calls(),
            vec![RenderCall::ReleaseTarget(1), RenderCall::ReleaseQuad(2)]
        );
        assert!(!graph
            .find("camera")
            .and_then(SceneObject::controller::<CameraController>)
            .unwrap()
            .is_initialized());
    }

    #[test]
    fn test_render_before_init_reports_error() {
        let mut graph = SceneGraph::new();
        let id = graph.add_object(SceneObject::new("camera"), None).unwrap();
        let mut backend = HeadlessBackend::new();
        graph.start(&mut backend).unwrap();

        // attached after start, so init never ran
        graph.object_mut(id).unwrap().attach(Box::new(CameraController::new(CameraId(1))));
        let error = graph.render(&mut backend).unwrap_err();
        assert!(matches!(error, LevelError::State(StateError::NotInitialized(_))));
    }
}
