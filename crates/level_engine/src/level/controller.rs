//! Controllers: behavior attached to scene objects
//!
//! A controller is a unit of behavior attached to exactly one
//! [`SceneObject`]. It takes part in the frame lifecycle through hooks, and
//! it declares which hooks it cares about through [`Capabilities`].
//!
//! Controllers that can be named in level documents also implement
//! [`ControllerType`], which carries the fully-qualified type name and the
//! table of fields a document may populate.

use std::any::Any;

use bitflags::bitflags;
use slotmap::SlotMap;

use crate::render::{LightList, RenderBackend};

use super::error::{ConversionError, LevelResult};
use super::graph::{CameraId, FrameState};
use super::object::{ObjectId, SceneObject};
use super::value::{SemanticType, Value};

bitflags! {
    /// Lifecycle hooks a controller participates in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Runs once when the level starts
        const INIT = 1;
        /// Runs before the object's subtree renders
        const PRE_RENDER = 1 << 1;
        /// Runs while the object renders
        const RENDER = 1 << 2;
        /// Runs after the object's subtree rendered
        const POST_RENDER = 1 << 3;
        /// Runs once per update pass
        const UPDATE = 1 << 4;
        /// Runs once when the level ends
        const DESTROY = 1 << 5;
    }
}

/// One controller lifecycle hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// [`Controller::on_init`]
    Init,
    /// [`Controller::pre_render`]
    PreRender,
    /// [`Controller::on_render`]
    Render,
    /// [`Controller::post_render`]
    PostRender,
    /// [`Controller::on_update`]
    Update,
    /// [`Controller::on_destroy`]
    Destroy,
}

impl Hook {
    /// Capability a controller needs for this hook to be called
    pub fn capability(self) -> Capabilities {
        match self {
            Self::Init => Capabilities::INIT,
            Self::PreRender => Capabilities::PRE_RENDER,
            Self::Render => Capabilities::RENDER,
            Self::PostRender => Capabilities::POST_RENDER,
            Self::Update => Capabilities::UPDATE,
            Self::Destroy => Capabilities::DESTROY,
        }
    }
}

/// Upcast support for controller trait objects
pub trait AsAny: Any {
    /// View as [`Any`]
    fn as_any(&self) -> &dyn Any;
    /// View as mutable [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior attached to a scene object
///
/// Every hook defaults to doing nothing. Hooks run synchronously, in
/// attachment order, and only if [`Controller::capabilities`] includes the
/// matching flag.
pub trait Controller: AsAny + 'static {
    /// Fully-qualified type name, as registered
    fn type_name(&self) -> &'static str;

    /// Hooks this controller wants to receive
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    /// Called once when the level starts
    fn on_init(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        Ok(())
    }

    /// Called every frame before the object's subtree renders
    fn pre_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        Ok(())
    }

    /// Called every frame when the object renders
    fn on_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        Ok(())
    }

    /// Called every frame after the object's subtree rendered
    fn post_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        Ok(())
    }

    /// Called every update pass
    fn on_update(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        Ok(())
    }

    /// Called once when the level ends
    fn on_destroy(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        Ok(())
    }
}

impl dyn Controller {
    /// Downcast to a concrete controller type
    pub fn downcast_ref<T: Controller>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete controller type
    pub fn downcast_mut<T: Controller>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether this controller is a `T`
    pub fn is<T: Controller>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Call `hook` on `controller` if it declared the capability
pub(crate) fn invoke(
    controller: &mut dyn Controller,
    hook: Hook,
    ctx: &mut ControllerContext<'_>,
) -> LevelResult<()> {
    if !controller.capabilities().contains(hook.capability()) {
        return Ok(());
    }

    match hook {
        Hook::Init => controller.on_init(ctx),
        Hook::PreRender => controller.pre_render(ctx),
        Hook::Render => controller.on_render(ctx),
        Hook::PostRender => controller.post_render(ctx),
        Hook::Update => controller.on_update(ctx),
        Hook::Destroy => controller.on_destroy(ctx),
    }
}

/// Setter for one document-populated field
pub type FieldSetter<C> = fn(&mut C, Value) -> Result<(), ConversionError>;

/// A field a level document may populate: `(serialization name, type, setter)`
pub struct FieldDescriptor<C> {
    /// Element name in the level document
    pub name: &'static str,
    /// Semantic type the element text is loaded as
    pub ty: SemanticType,
    /// Stores the loaded value into the controller
    pub set: FieldSetter<C>,
}

/// A controller type that can be named in level documents
pub trait ControllerType: Controller + Sized {
    /// Fully-qualified, `.`-separated type name (e.g. `Level.LightController`)
    const TYPE_NAME: &'static str;

    /// Fields a document may populate
    const FIELDS: &'static [FieldDescriptor<Self>];
}

/// What a hook may see and touch while it runs
///
/// The context gives access to the owning object (and through it the rest of
/// the level), the per-frame shared state, and the render backend. While a
/// hook runs, the owning object's controller list is detached, so
/// [`SceneObject::controllers`] on the owning object is empty.
pub struct ControllerContext<'a> {
    object: ObjectId,
    objects: &'a mut SlotMap<ObjectId, SceneObject>,
    frame: &'a mut FrameState,
    backend: &'a mut dyn RenderBackend,
}

impl<'a> ControllerContext<'a> {
    pub(crate) fn new(
        object: ObjectId,
        objects: &'a mut SlotMap<ObjectId, SceneObject>,
        frame: &'a mut FrameState,
        backend: &'a mut dyn RenderBackend,
    ) -> Self {
        Self {
            object,
            objects,
            frame,
            backend,
        }
    }

    /// Handle of the owning object
    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    /// The owning object
    pub fn object(&self) -> &SceneObject {
        // The dispatcher only builds contexts for live objects
        &self.objects[self.object]
    }

    /// The owning object, mutably
    pub fn object_mut(&mut self) -> &mut SceneObject {
        &mut self.objects[self.object]
    }

    /// The owning object's parent, if it has one
    pub fn parent(&self) -> Option<&SceneObject> {
        self.object().parent().and_then(|parent| self.objects.get(parent))
    }

    /// Any object of the level by handle
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Any object of the level by name
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.values().find(|object| object.name() == name)
    }

    /// Lights collected so far this frame
    pub fn lights(&self) -> &LightList {
        &self.frame.lights
    }

    /// Lights collected so far this frame, mutably
    pub fn lights_mut(&mut self) -> &mut LightList {
        &mut self.frame.lights
    }

    /// Camera whose output reaches the screen
    pub fn active_camera(&self) -> Option<CameraId> {
        self.frame.active_camera
    }

    /// Make `camera` the active camera (last writer wins)
    pub fn set_active_camera(&mut self, camera: Option<CameraId>) {
        self.frame.active_camera = camera;
    }

    /// The active render backend
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }
}
