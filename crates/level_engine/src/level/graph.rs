//! Scene graph and frame lifecycle
//!
//! The [`SceneGraph`] owns every object of a level in an arena, keeps the
//! top-level objects in document order, and drives the lifecycle passes:
//! `start` once, then any interleaving of `render` and `update`, then `end`
//! once.
//!
//! Within a render pass each object runs its controllers' `pre_render` hooks,
//! then their `on_render` hooks, then renders its children, then runs the
//! `post_render` hooks. Cameras rely on that bracket to capture the subtree
//! into their own target. The other passes visit an object's controllers and
//! then its children.

use std::collections::HashMap;
use std::fmt;

use slotmap::SlotMap;

use crate::render::{LightContribution, LightList, RenderBackend};

use super::controller::{invoke, Controller, ControllerContext, Hook};
use super::error::{LevelResult, SchemaError, StateError};
use super::object::{ObjectId, SceneObject};

/// Identity of a camera, as declared in the level document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CameraId(pub u32);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera #{}", self.0)
    }
}

/// Lifecycle state of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphState {
    /// Loaded, not yet started
    #[default]
    Unstarted,
    /// Started, accepting render and update passes
    Running,
    /// Ended; no further passes are accepted
    Ended,
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstarted => "unstarted",
            Self::Running => "running",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// State shared by every controller during a frame
#[derive(Debug, Default)]
pub struct FrameState {
    pub(crate) lights: LightList,
    pub(crate) active_camera: Option<CameraId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Init,
    Render,
    Update,
    Destroy,
}

impl Pass {
    fn hook(self) -> Hook {
        match self {
            Self::Init => Hook::Init,
            Self::Render => Hook::Render,
            Self::Update => Hook::Update,
            Self::Destroy => Hook::Destroy,
        }
    }
}

/// A loaded level
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: SlotMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    names: HashMap<String, ObjectId>,
    frame: FrameState,
    state: GraphState,
}

impl SceneGraph {
    /// Empty, unstarted level
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `object` as a top-level object or as the last child of `parent`
    ///
    /// Names are unique across the whole level. Objects added while the level
    /// is running do not receive the init pass.
    pub fn add_object(
        &mut self,
        mut object: SceneObject,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, SchemaError> {
        if object.name().trim().is_empty() {
            return Err(SchemaError::MissingName);
        }
        if self.names.contains_key(object.name()) {
            return Err(SchemaError::DuplicateName(object.name().to_string()));
        }
        if let Some(parent) = parent {
            if !self.objects.contains_key(parent) {
                return Err(SchemaError::UnknownParent);
            }
            object.set_parent(parent);
        }

        let name = object.name().to_string();
        let id = self.objects.insert(object);
        self.names.insert(name, id);

        match parent.and_then(|parent| self.objects.get_mut(parent)) {
            Some(parent) => parent.push_child(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Handle of the object called `name`
    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    /// Object called `name`
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.get(name).and_then(|id| self.objects.get(id))
    }

    /// Object called `name`, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        let id = self.get(name)?;
        self.objects.get_mut(id)
    }

    /// Object by handle
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Object by handle, mutably
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    /// Whether an object called `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Top-level objects in document order
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Total number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the level has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every object, depth first, in document order
    pub fn iter(&self) -> DepthFirst<'_> {
        let mut stack = self.roots.clone();
        stack.reverse();
        DepthFirst { graph: self, stack }
    }

    /// Current lifecycle state
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// Camera whose output reaches the screen
    pub fn active_camera(&self) -> Option<CameraId> {
        self.frame.active_camera
    }

    /// Select the camera whose output reaches the screen
    pub fn set_active_camera(&mut self, camera: Option<CameraId>) {
        log::debug!("Active camera set to {camera:?}");
        self.frame.active_camera = camera;
    }

    /// Lights collected during the most recent render pass
    pub fn lights(&self) -> &[LightContribution] {
        self.frame.lights.as_slice()
    }

    /// Run the init pass
    pub fn start(&mut self, backend: &mut dyn RenderBackend) -> LevelResult<()> {
        if self.state != GraphState::Unstarted {
            return Err(StateError::AlreadyStarted(self.state).into());
        }

        log::info!("Starting level with {} objects on {}", self.len(), backend.name());
        self.state = GraphState::Running;
        self.run(Pass::Init, backend)
    }

    /// Run one render pass, rebuilding the light list from scratch
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> LevelResult<()> {
        self.require_running("render")?;
        log::trace!("Render pass");
        self.frame.lights.clear();
        self.run(Pass::Render, backend)
    }

    /// Run one update pass
    pub fn update(&mut self, backend: &mut dyn RenderBackend) -> LevelResult<()> {
        self.require_running("update")?;
        log::trace!("Update pass");
        self.run(Pass::Update, backend)
    }

    /// Run the destroy pass; the level accepts no further passes
    pub fn end(&mut self, backend: &mut dyn RenderBackend) -> LevelResult<()> {
        self.require_running("end")?;
        self.state = GraphState::Ended;
        log::info!("Ending level");
        self.run(Pass::Destroy, backend)
    }

    fn require_running(&self, operation: &'static str) -> Result<(), StateError> {
        if self.state == GraphState::Running {
            Ok(())
        } else {
            Err(StateError::NotRunning {
                operation,
                state: self.state,
            })
        }
    }

    fn run(&mut self, pass: Pass, backend: &mut dyn RenderBackend) -> LevelResult<()> {
        let roots = self.roots.clone();
        for id in roots {
            dispatch(&mut self.objects, &mut self.frame, backend, id, pass)?;
        }
        Ok(())
    }
}

/// Run `pass` over one object and its subtree
///
/// The object's controllers are detached for the duration so hooks can reach
/// the rest of the arena through the context, and are put back even when a
/// hook fails.
fn dispatch(
    objects: &mut SlotMap<ObjectId, SceneObject>,
    frame: &mut FrameState,
    backend: &mut dyn RenderBackend,
    id: ObjectId,
    pass: Pass,
) -> LevelResult<()> {
    let Some(object) = objects.get_mut(id) else {
        return Ok(());
    };
    let mut controllers = object.take_controllers();
    let children = object.children().to_vec();

    let result = visit(objects, frame, backend, id, pass, &mut controllers, &children);

    if let Some(object) = objects.get_mut(id) {
        object.restore_controllers(controllers);
    }
    result
}

fn visit(
    objects: &mut SlotMap<ObjectId, SceneObject>,
    frame: &mut FrameState,
    backend: &mut dyn RenderBackend,
    id: ObjectId,
    pass: Pass,
    controllers: &mut [Box<dyn Controller>],
    children: &[ObjectId],
) -> LevelResult<()> {
    if pass == Pass::Render {
        run_hooks(objects, frame, backend, id, controllers, Hook::PreRender)?;
    }
    run_hooks(objects, frame, backend, id, controllers, pass.hook())?;

    for &child in children {
        dispatch(objects, frame, backend, child, pass)?;
    }

    if pass == Pass::Render {
        run_hooks(objects, frame, backend, id, controllers, Hook::PostRender)?;
    }
    Ok(())
}

fn run_hooks(
    objects: &mut SlotMap<ObjectId, SceneObject>,
    frame: &mut FrameState,
    backend: &mut dyn RenderBackend,
    id: ObjectId,
    controllers: &mut [Box<dyn Controller>],
    hook: Hook,
) -> LevelResult<()> {
    for controller in controllers.iter_mut() {
        let mut ctx = ControllerContext::new(id, objects, frame, backend);
        invoke(controller.as_mut(), hook, &mut ctx)?;
    }
    Ok(())
}

/// Depth-first iterator over a [`SceneGraph`]
pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<ObjectId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (ObjectId, &'a SceneObject);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(object) = self.graph.objects.get(id) {
                self.stack.extend(object.children().iter().rev().copied());
                return Some((id, object));
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a SceneGraph {
    type Item = (ObjectId, &'a SceneObject);
    type IntoIter = DepthFirst<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::controller::Capabilities;
    use crate::level::error::LevelError;
    use crate::render::HeadlessBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        journal: Journal,
        fail_on: Option<Hook>,
    }

    impl Recorder {
        fn boxed(tag: &'static str, journal: &Journal) -> Box<dyn Controller> {
            Box::new(Self {
                tag,
                journal: Rc::clone(journal),
                fail_on: None,
            })
        }

        fn record(&self, hook: Hook) -> LevelResult<()> {
            self.journal.borrow_mut().push(format!("{}:{hook:?}", self.tag));
            if self.fail_on == Some(hook) {
                return Err(StateError::NotInitialized("Recorder").into());
            }
            Ok(())
        }
    }

    impl Controller for Recorder {
        fn type_name(&self) -> &'static str {
            "Tests.Recorder"
        }

        fn on_init(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            self.record(Hook::Init)
        }

        fn pre_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            self.record(Hook::PreRender)
        }

        fn on_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            self.record(Hook::Render)
        }

        fn post_render(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            self.record(Hook::PostRender)
        }

        fn on_update(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            self.record(Hook::Update)
        }

        fn on_destroy(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            self.record(Hook::Destroy)
        }
    }

    // parent (p1, p2) -> child (c)
    fn recorded_graph(journal: &Journal) -> SceneGraph {
        let mut graph = SceneGraph::new();
        let parent = graph
            .add_object(
                SceneObject::new("parent")
                    .with_controller(Recorder::boxed("p1", journal))
                    .with_controller(Recorder::boxed("p2", journal)),
                None,
            )
            .unwrap();
        graph
            .add_object(
                SceneObject::new("child").with_controller(Recorder::boxed("c", journal)),
                Some(parent),
            )
            .unwrap();
        graph
    }

    fn drain(journal: &Journal) -> Vec<String> {
        std::mem::take(&mut *journal.borrow_mut())
    }

    #[test]
    fn test_render_brackets_children() {
        let journal = Journal::default();
        let mut graph = recorded_graph(&journal);
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        drain(&journal);
        graph.render(&mut backend).unwrap();

        assert_eq!(
            drain(&journal),
            vec![
                "p1:PreRender",
                "p2:PreRender",
                "p1:Render",
                "p2:Render",
                "c:PreRender",
                "c:Render",
                "c:PostRender",
                "p1:PostRender",
                "p2:PostRender",
            ]
        );
    }

    #[test]
    fn test_init_update_destroy_visit_parent_first() {
        let journal = Journal::default();
        let mut graph = recorded_graph(&journal);
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        assert_eq!(drain(&journal), vec!["p1:Init", "p2:Init", "c:Init"]);

        graph.update(&mut backend).unwrap();
        assert_eq!(drain(&journal), vec!["p1:Update", "p2:Update", "c:Update"]);

        graph.end(&mut backend).unwrap();
        assert_eq!(drain(&journal), vec!["p1:Destroy", "p2:Destroy", "c:Destroy"]);
        assert_eq!(graph.state(), GraphState::Ended);
    }

    #[test]
    fn test_state_transitions_are_enforced() {
        let mut graph = SceneGraph::new();
        let mut backend = HeadlessBackend::new();

        let error = graph.render(&mut backend).unwrap_err();
        assert!(matches!(
            error,
            LevelError::State(StateError::NotRunning { operation: "render", state: GraphState::Unstarted })
        ));
        assert!(graph.end(&mut backend).is_err());

        graph.start(&mut backend).unwrap();
        assert!(matches!(
            graph.start(&mut backend),
            Err(LevelError::State(StateError::AlreadyStarted(GraphState::Running)))
        ));

        graph.end(&mut backend).unwrap();
        assert!(graph.update(&mut backend).is_err());
        assert!(graph.end(&mut backend).is_err());
        assert!(graph.start(&mut backend).is_err());
    }

    #[test]
    fn test_failing_hook_aborts_pass_and_keeps_controllers() {
        let journal = Journal::default();
        let mut graph = SceneGraph::new();
        graph
            .add_object(
                SceneObject::new("A").with_controller(Box::new(Recorder {
                    tag: "a",
                    journal: Rc::clone(&journal),
                    fail_on: Some(Hook::Update),
                })),
                None,
            )
            .unwrap();
        graph
            .add_object(SceneObject::new("B").with_controller(Recorder::boxed("b", &journal)), None)
            .unwrap();
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        drain(&journal);

        assert!(graph.update(&mut backend).is_err());
        assert_eq!(drain(&journal), vec!["a:Update"]);
        assert_eq!(graph.find("A").unwrap().controllers().len(), 1);
        assert_eq!(graph.state(), GraphState::Running);
    }

    #[test]
    fn test_names_are_unique_across_subtrees() {
        let mut graph = SceneGraph::new();
        let a = graph.add_object(SceneObject::new("A"), None).unwrap();
        graph.add_object(SceneObject::new("shared"), Some(a)).unwrap();
        let b = graph.add_object(SceneObject::new("B"), None).unwrap();

        let error = graph.add_object(SceneObject::new("shared"), Some(b)).unwrap_err();
        assert!(matches!(error, SchemaError::DuplicateName(name) if name == "shared"));
        assert!(graph.object(b).unwrap().children().is_empty());
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut other = SceneGraph::new();
        let foreign = other.add_object(SceneObject::new("X"), None).unwrap();
        other.add_object(SceneObject::new("Y"), None).unwrap();

        let mut graph = SceneGraph::new();
        let result = graph.add_object(SceneObject::new("Z"), Some(foreign));
        assert!(matches!(result, Err(SchemaError::UnknownParent)));
    }

    #[test]
    fn test_depth_first_order() {
        let mut graph = SceneGraph::new();
        let a = graph.add_object(SceneObject::new("A"), None).unwrap();
        let a1 = graph.add_object(SceneObject::new("A1"), Some(a)).unwrap();
        graph.add_object(SceneObject::new("A1a"), Some(a1)).unwrap();
        graph.add_object(SceneObject::new("A2"), Some(a)).unwrap();
        graph.add_object(SceneObject::new("B"), None).unwrap();

        let names: Vec<_> = graph.iter().map(|(_, object)| object.name()).collect();
        assert_eq!(names, vec!["A", "A1", "A1a", "A2", "B"]);
        assert_eq!(graph.roots().len(), 2);
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_objects_added_while_running_skip_init() {
        let journal = Journal::default();
        let mut graph = SceneGraph::new();
        let mut backend = HeadlessBackend::new();
        graph.start(&mut backend).unwrap();

        graph
            .add_object(SceneObject::new("late").with_controller(Recorder::boxed("l", &journal)), None)
            .unwrap();
        graph.update(&mut backend).unwrap();

        assert_eq!(drain(&journal), vec!["l:Update"]);
    }

    struct Silent;

    impl Controller for Silent {
        fn type_name(&self) -> &'static str {
            "Tests.Silent"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::empty()
        }

        fn on_update(&mut self, _ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
            Err(StateError::NotInitialized("Silent").into())
        }
    }

    #[test]
    fn test_controllers_without_capability_are_not_called() {
        let mut graph = SceneGraph::new();
        graph
            .add_object(SceneObject::new("A").with_controller(Box::new(Silent)), None)
            .unwrap();
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        graph.update(&mut backend).unwrap();
        graph.render(&mut backend).unwrap();
        graph.end(&mut backend).unwrap();
    }
}
