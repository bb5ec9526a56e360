//! Scene objects
//!
//! A [`SceneObject`] is a named node of the level tree. It owns a transform,
//! an ordered list of controllers, and the handles of its children. The
//! objects themselves live in the arena owned by
//! [`SceneGraph`](super::SceneGraph).

use std::fmt;

use crate::foundation::math::{Quat, Transform, Vec3};

use super::controller::Controller;

slotmap::new_key_type! {
    /// Handle to an object inside a [`SceneGraph`](super::SceneGraph)
    pub struct ObjectId;
}

/// A named node of the level tree
pub struct SceneObject {
    name: String,
    /// Local transform
    pub transform: Transform,
    controllers: Vec<Box<dyn Controller>>,
    children: Vec<ObjectId>,
    parent: Option<ObjectId>,
}

impl SceneObject {
    /// Create an object with an identity transform and no controllers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            controllers: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Builder-style transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder-style [`SceneObject::attach`]
    pub fn with_controller(mut self, controller: Box<dyn Controller>) -> Self {
        self.attach(controller);
        self
    }

    /// Attach a controller; hooks run in attachment order
    pub fn attach(&mut self, controller: Box<dyn Controller>) {
        self.controllers.push(controller);
    }

    /// Unique name within the level
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle, `None` for top-level objects
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Child handles in document order
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Attached controllers in attachment order
    pub fn controllers(&self) -> &[Box<dyn Controller>] {
        &self.controllers
    }

    /// First attached controller of type `T`
    pub fn controller<T: Controller>(&self) -> Option<&T> {
        self.controllers
            .iter()
            .find_map(|controller| controller.downcast_ref::<T>())
    }

    /// First attached controller of type `T`, mutably
    pub fn controller_mut<T: Controller>(&mut self) -> Option<&mut T> {
        self.controllers
            .iter_mut()
            .find_map(|controller| controller.downcast_mut::<T>())
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub(crate) fn set_parent(&mut self, parent: ObjectId) {
        self.parent = Some(parent);
    }

    pub(crate) fn push_child(&mut self, child: ObjectId) {
        self.children.push(child);
    }

    /// Detach the controller list for dispatch
    pub(crate) fn take_controllers(&mut self) -> Vec<Box<dyn Controller>> {
        std::mem::take(&mut self.controllers)
    }

    /// Put a detached controller list back, keeping any attached meanwhile
    pub(crate) fn restore_controllers(&mut self, mut controllers: Vec<Box<dyn Controller>>) {
        controllers.append(&mut self.controllers);
        self.controllers = controllers;
    }
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controllers: Vec<&str> = self
            .controllers
            .iter()
            .map(|controller| controller.type_name())
            .collect();

        f.debug_struct("SceneObject")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("controllers", &controllers)
            .field("children", &self.children)
            .field("parent", &self.parent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::controllers::{EmptyController, LightController};

    #[test]
    fn test_new_object_is_identity() {
        let object = SceneObject::new("A");
        assert_eq!(object.name(), "A");
        assert_eq!(object.position(), Vec3::zeros());
        assert_eq!(object.scale(), Vec3::new(1.0, 1.0, 1.0));
        assert!(object.controllers().is_empty());
        assert!(object.parent().is_none());
    }

    #[test]
    fn test_controller_lookup_by_type() {
        let object = SceneObject::new("A")
            .with_controller(Box::new(EmptyController))
            .with_controller(Box::new(LightController::default()));

        assert!(object.controller::<LightController>().is_some());
        assert!(object.controller::<EmptyController>().is_some());
        assert_eq!(object.controllers()[1].type_name(), "Level.LightController");
    }

    #[test]
    fn test_restore_keeps_controllers_attached_during_dispatch() {
        let mut object = SceneObject::new("A").with_controller(Box::new(EmptyController));
        let detached = object.take_controllers();
        assert!(object.controllers().is_empty());

        object.attach(Box::new(LightController::default()));
        object.restore_controllers(detached);

        let names: Vec<_> = object.controllers().iter().map(|c| c.type_name()).collect();
        assert_eq!(names, vec!["Level.EmptyController", "Level.LightController"]);
    }
}
