//! Level document loading
//!
//! Level documents are XML. The root element holds top-level `Object`
//! elements; each object carries a `Name`, optional `Position` and `Scale`
//! vectors, an optional `Controllers` section, and nested objects anywhere
//! inside it:
//!
//! ```xml
//! <Level>
//!   <Object>
//!     <Name>Lamp</Name>
//!     <Position>0,4,0</Position>
//!     <Controllers>
//!       <Light><Color>1,0.8,0.6</Color></Light>
//!     </Controllers>
//!     <Object><Name>Shade</Name></Object>
//!   </Object>
//! </Level>
//! ```

use roxmltree::{Document, Node};

use crate::assets::AssetIndex;
use crate::foundation::math::{Transform, Vec3};

use super::controller::Controller;
use super::error::{LevelResult, SchemaError};
use super::graph::SceneGraph;
use super::object::{ObjectId, SceneObject};
use super::registry::ControllerRegistry;
use super::value::{load_value, load_vec3};

const OBJECT: &str = "Object";
const NAME: &str = "Name";
const POSITION: &str = "Position";
const SCALE: &str = "Scale";
const CONTROLLERS: &str = "Controllers";

/// Builds a [`SceneGraph`] from a level document
pub struct SceneLoader<'a> {
    registry: &'a ControllerRegistry,
    assets: &'a dyn AssetIndex,
    backend: Option<String>,
}

impl<'a> SceneLoader<'a> {
    /// Loader resolving controllers through `registry` and assets through `assets`
    pub fn new(registry: &'a ControllerRegistry, assets: &'a dyn AssetIndex) -> Self {
        Self {
            registry,
            assets,
            backend: None,
        }
    }

    /// Also consider controllers specific to `backend` during resolution
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Backend qualifier in effect
    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    /// Load the level document stored under asset name `name`
    pub fn load_asset(&self, name: &str) -> LevelResult<SceneGraph> {
        let asset = self.assets.resolve(name)?;
        log::info!("Loading level '{}'", asset.name());
        self.load_bytes(asset.bytes())
    }

    /// Load a level document from raw bytes, which must be UTF-8
    pub fn load_bytes(&self, bytes: &[u8]) -> LevelResult<SceneGraph> {
        let text = std::str::from_utf8(bytes).map_err(|e| SchemaError::Encoding(e.to_string()))?;
        self.load_str(text)
    }

    /// Load a level document from text
    pub fn load_str(&self, text: &str) -> LevelResult<SceneGraph> {
        let document = Document::parse(text).map_err(SchemaError::from)?;
        let mut graph = SceneGraph::new();

        for element in child_elements(document.root_element()).filter(|node| is_tag(*node, OBJECT)) {
            self.load_object(&mut graph, element, None)?;
        }

        let controllers: usize = graph
            .iter()
            .map(|(_, object)| object.controllers().len())
            .sum();
        log::info!(
            "Loaded level: {} top-level objects, {} total, {controllers} controllers",
            graph.roots().len(),
            graph.len()
        );
        Ok(graph)
    }

    fn load_object(
        &self,
        graph: &mut SceneGraph,
        element: Node<'_, '_>,
        parent: Option<ObjectId>,
    ) -> LevelResult<ObjectId> {
        let mut controllers = Vec::new();
        if let Some(section) = child_elements(element).find(|node| is_tag(*node, CONTROLLERS)) {
            for declaration in child_elements(section) {
                controllers.push(self.load_controller(declaration)?);
            }
        }

        let name = child_elements(element)
            .find(|node| is_tag(*node, NAME))
            .map(inner_text)
            .filter(|name| !name.trim().is_empty())
            .ok_or(SchemaError::MissingName)?;
        if graph.contains(&name) {
            return Err(SchemaError::DuplicateName(name).into());
        }

        let position = read_vector(element, POSITION, &name)?.unwrap_or_else(Vec3::zeros);
        let scale = read_vector(element, SCALE, &name)?.unwrap_or_else(|| Vec3::new(1.0, 1.0, 1.0));

        let mut object = SceneObject::new(name)
            .with_transform(Transform::from_position_scale(position, scale));
        for controller in controllers {
            object.attach(controller);
        }
        let id = graph.add_object(object, parent)?;

        for nested in nested_objects(element) {
            self.load_object(graph, nested, Some(id))?;
        }
        Ok(id)
    }

    fn load_controller(&self, declaration: Node<'_, '_>) -> LevelResult<Box<dyn Controller>> {
        let tag = declaration.tag_name().name();
        let entry = self.registry.resolve(tag, self.backend())?;
        let mut controller = entry.instantiate()?;

        for element in child_elements(declaration) {
            let field_name = element.tag_name().name();
            let field = entry.field(field_name).ok_or_else(|| SchemaError::FieldNotFound {
                controller: entry.type_name().to_string(),
                field: field_name.to_string(),
            })?;
            let invalid = |source| SchemaError::InvalidField {
                controller: entry.type_name().to_string(),
                field: field_name.to_string(),
                source,
            };

            let value = load_value(field.ty, &inner_text(element), self.assets).map_err(invalid)?;
            entry
                .assign(controller.as_mut(), field, value)
                .map_err(invalid)?;
        }

        log::debug!("Created {} from <{tag}>", entry.type_name());
        Ok(controller)
    }
}

fn is_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.tag_name().name() == tag
}

fn child_elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// Concatenated text of every descendant text node
fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect()
}

fn read_vector(
    element: Node<'_, '_>,
    tag: &'static str,
    object: &str,
) -> Result<Option<Vec3>, SchemaError> {
    child_elements(element)
        .find(|node| is_tag(*node, tag))
        .map(|node| {
            load_vec3(&inner_text(node)).map_err(|source| SchemaError::InvalidTransform {
                object: object.to_string(),
                element: tag,
                source,
            })
        })
        .transpose()
}

/// `Object` elements nested anywhere below `element`, excluding deeper ones
///
/// The search stops at each `Object` it finds, which owns everything below
/// it, and never enters a `Controllers` section.
fn nested_objects<'a, 'input>(element: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut found = Vec::new();
    collect_nested(element, &mut found);
    found
}

fn collect_nested<'a, 'input>(node: Node<'a, 'input>, found: &mut Vec<Node<'a, 'input>>) {
    for child in child_elements(node) {
        match child.tag_name().name() {
            OBJECT => found.push(child),
            CONTROLLERS => {}
            _ => collect_nested(child, found),
        }
    }
}
