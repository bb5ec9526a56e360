//! Controller type registry and tag resolution
//!
//! Level documents name controllers by short tags (`Light`, `Camera`). The
//! registry maps those tags to concrete controller types using a fixed
//! candidate order, so a backend-specific variant can exist alongside the
//! generic one without the document having to know about it.

use std::collections::HashMap;

use super::controller::{Controller, ControllerType};
use super::controllers::{CameraController, EmptyController, LightController, RotatorController};
use super::error::{ConversionError, ResolutionError};
use super::value::{SemanticType, Value};

/// Namespace prepended to tags during resolution
pub const DEFAULT_NAMESPACE: &str = "Level";

/// A populatable field of a registered controller type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInfo {
    /// Element name in the level document
    pub name: &'static str,
    /// Semantic type the element text is loaded as
    pub ty: SemanticType,
    index: usize,
}

type Constructor = fn() -> Box<dyn Controller>;
type Assigner = fn(&mut dyn Controller, usize, Value) -> Result<(), ConversionError>;

/// Registration record for one controller type
pub struct ControllerEntry {
    type_name: &'static str,
    fields: Vec<FieldInfo>,
    construct: Option<Constructor>,
    assign: Assigner,
}

impl ControllerEntry {
    fn of<C: ControllerType>(construct: Option<Constructor>) -> Self {
        let fields = C::FIELDS
            .iter()
            .enumerate()
            .map(|(index, field)| FieldInfo {
                name: field.name,
                ty: field.ty,
                index,
            })
            .collect();

        Self {
            type_name: C::TYPE_NAME,
            fields,
            construct,
            assign: assign_field::<C>,
        }
    }

    /// Fully-qualified type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Populatable fields in declaration order
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Field whose serialization name is `name`
    pub fn field(&self, name: &str) -> Option<FieldInfo> {
        self.fields.iter().copied().find(|field| field.name == name)
    }

    /// Whether the type has a zero-argument constructor
    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    /// Create a default instance
    pub fn instantiate(&self) -> Result<Box<dyn Controller>, ResolutionError> {
        let construct = self.construct.ok_or_else(|| ResolutionError::NotConstructible {
            type_name: self.type_name.to_string(),
        })?;
        Ok(construct())
    }

    /// Store `value` into `field` of `controller`, which must be of this type
    pub fn assign(
        &self,
        controller: &mut dyn Controller,
        field: FieldInfo,
        value: Value,
    ) -> Result<(), ConversionError> {
        (self.assign)(controller, field.index, value)
    }
}

impl std::fmt::Debug for ControllerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerEntry")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("constructible", &self.construct.is_some())
            .finish()
    }
}

fn construct<C: ControllerType + Default>() -> Box<dyn Controller> {
    Box::new(C::default())
}

fn assign_field<C: ControllerType>(
    controller: &mut dyn Controller,
    index: usize,
    value: Value,
) -> Result<(), ConversionError> {
    let field = C::FIELDS
        .get(index)
        .ok_or_else(|| ConversionError::Unsupported(format!("field #{index} of {}", C::TYPE_NAME)))?;
    let actual = controller.type_name();
    let concrete = controller
        .downcast_mut::<C>()
        .ok_or_else(|| ConversionError::Unsupported(format!("{actual} as {}", C::TYPE_NAME)))?;
    (field.set)(concrete, value)
}

/// Maps fully-qualified names to controller types
#[derive(Debug)]
pub struct ControllerRegistry {
    namespace: String,
    entries: HashMap<&'static str, ControllerEntry>,
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerRegistry {
    /// Empty registry using [`DEFAULT_NAMESPACE`]
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    /// Empty registry resolving tags under `namespace`
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in controllers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register::<EmptyController>()
            .register::<CameraController>()
            .register::<LightController>()
            .register::<RotatorController>();
        registry
    }

    /// Register a constructible controller type
    ///
    /// Registering the same type name twice replaces the earlier entry.
    pub fn register<C: ControllerType + Default>(&mut self) -> &mut Self {
        self.insert(ControllerEntry::of::<C>(Some(construct::<C>)))
    }

    /// Register a type that can be resolved but not instantiated
    pub fn register_abstract<C: ControllerType>(&mut self) -> &mut Self {
        self.insert(ControllerEntry::of::<C>(None))
    }

    fn insert(&mut self, entry: ControllerEntry) -> &mut Self {
        log::debug!("Registered controller type {}", entry.type_name);
        if self.entries.insert(entry.type_name, entry).is_some() {
            log::warn!("Controller type registered twice; keeping the latest");
        }
        self
    }

    /// Namespace tags resolve under
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup by fully-qualified name
    pub fn get(&self, type_name: &str) -> Option<&ControllerEntry> {
        self.entries.get(type_name)
    }

    /// Names tried for `tag`, in resolution order
    ///
    /// 1. `tag` as written
    /// 2. `{ns}.{tag}Controller`
    /// 3. `{ns}.{tag}`
    /// 4. `{ns}.{backend}.{tag}Controller`
    /// 5. `{ns}.{backend}.{tag}`
    ///
    /// The backend candidates are only produced when a backend is given.
    pub fn candidates(&self, tag: &str, backend: Option<&str>) -> Vec<String> {
        let ns = &self.namespace;
        let mut names = vec![
            tag.to_string(),
            format!("{ns}.{tag}Controller"),
            format!("{ns}.{tag}"),
        ];
        if let Some(backend) = backend {
            names.push(format!("{ns}.{backend}.{tag}Controller"));
            names.push(format!("{ns}.{backend}.{tag}"));
        }
        names
    }

    /// First registered type among the candidates for `tag`
    pub fn resolve(
        &self,
        tag: &str,
        backend: Option<&str>,
    ) -> Result<&ControllerEntry, ResolutionError> {
        self.candidates(tag, backend)
            .iter()
            .find_map(|name| self.entries.get(name.as_str()))
            .ok_or_else(|| ResolutionError::UnknownController {
                tag: tag.to_string(),
                backend: backend.map(str::to_string),
            })
    }

    /// Resolve `tag` and create a default instance
    pub fn instantiate(
        &self,
        tag: &str,
        backend: Option<&str>,
    ) -> Result<Box<dyn Controller>, ResolutionError> {
        let entry = self.resolve(tag, backend)?;
        log::trace!("Resolved controller tag {tag} to {}", entry.type_name);
        entry.instantiate()
    }
}
