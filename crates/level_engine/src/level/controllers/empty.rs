use crate::level::controller::{Capabilities, Controller, ControllerType, FieldDescriptor};

/// Controller with no behavior, for marking objects in documents
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyController;

impl Controller for EmptyController {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

impl ControllerType for EmptyController {
    const TYPE_NAME: &'static str = "Level.EmptyController";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[];
}
