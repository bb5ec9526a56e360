//! Level error taxonomy
//!
//! Every failure in loading or running a level is unrecoverable at the point
//! it is detected. Errors propagate to the caller, who abandons the level.

use thiserror::Error;

use crate::assets::AssetError;
use crate::render::RenderError;

use super::graph::GraphState;
use super::value::SemanticType;

/// Text could not be turned into a typed value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The target type cannot be loaded from levels
    #[error("Cannot load {0} from levels")]
    Unsupported(String),

    /// Malformed or out-of-range number
    #[error("Invalid {ty} value '{text}': {reason}")]
    InvalidNumber {
        /// Target numeric type
        ty: SemanticType,
        /// Offending text
        text: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Vector text with the wrong number of components
    #[error("Expected {expected} components for {ty}, found {found} in '{text}'")]
    WrongArity {
        /// Target vector type
        ty: SemanticType,
        /// Components required by the target type
        expected: usize,
        /// Components present in the text
        found: usize,
        /// Offending text
        text: String,
    },

    /// Name not declared by the target enumeration
    #[error("'{member}' is not a member of {enumeration}")]
    UnknownEnumMember {
        /// Enumeration name
        enumeration: &'static str,
        /// Offending member name
        member: String,
    },

    /// Asset name unknown to the asset index
    #[error("Asset '{0}' could not be resolved")]
    AssetNotFound(String),
}

/// A declarative tag could not be turned into a controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No registered type matches the tag
    #[error("Couldn't find controller {tag}")]
    UnknownController {
        /// Tag as written in the document
        tag: String,
        /// Backend qualifier in effect during resolution
        backend: Option<String>,
    },

    /// The matching type has no zero-argument constructor
    #[error("Controller type {type_name} has no zero-argument constructor")]
    NotConstructible {
        /// Fully-qualified name of the resolved type
        type_name: String,
    },
}

/// The document violates the level schema
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document is not well-formed
    #[error("Malformed level document: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document bytes are not UTF-8
    #[error("Level document is not valid UTF-8: {0}")]
    Encoding(String),

    /// An object has no `Name` element
    #[error("All objects need unique names")]
    MissingName,

    /// Two objects share a name
    #[error("All objects need *unique* names: '{0}' is declared twice")]
    DuplicateName(String),

    /// A controller declaration names a field the controller does not have
    #[error("Controller {controller} has no field named {field}")]
    FieldNotFound {
        /// Fully-qualified controller type name
        controller: String,
        /// Field element name
        field: String,
    },

    /// A controller field value could not be converted
    #[error("Invalid value for {controller}.{field}: {source}")]
    InvalidField {
        /// Fully-qualified controller type name
        controller: String,
        /// Field element name
        field: String,
        /// Underlying conversion failure
        #[source]
        source: ConversionError,
    },

    /// A `Position` or `Scale` element could not be converted
    #[error("Invalid {element} for object '{object}': {source}")]
    InvalidTransform {
        /// Object name
        object: String,
        /// Element name
        element: &'static str,
        /// Underlying conversion failure
        #[source]
        source: ConversionError,
    },

    /// A parent handle does not belong to this graph
    #[error("Parent object does not exist in this level")]
    UnknownParent,
}

/// A lifecycle operation ran outside its valid state window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// `Start` is only valid on an unstarted level
    #[error("Level cannot start while {0}")]
    AlreadyStarted(GraphState),

    /// Render, Update, and End require a running level
    #[error("Level cannot {operation} while {state}")]
    NotRunning {
        /// Attempted operation
        operation: &'static str,
        /// State the level was in
        state: GraphState,
    },

    /// A controller drew before its init hook ran
    #[error("{0} must initialize before draw")]
    NotInitialized(&'static str),
}

/// Any failure from loading or running a level
#[derive(Error, Debug)]
pub enum LevelError {
    /// Value conversion failure
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Controller resolution failure
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Schema violation
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Lifecycle violation
    #[error(transparent)]
    State(#[from] StateError),

    /// Asset index failure
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Render backend failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for level operations
pub type LevelResult<T> = Result<T, LevelError>;
