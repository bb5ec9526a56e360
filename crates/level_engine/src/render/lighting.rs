//! Per-frame light aggregation
//!
//! Light controllers append a [`LightContribution`] to the shared
//! [`LightList`] during the pre-render step; the shading pass reads the list
//! after every light of the frame has been collected. The list is reset at
//! the start of each render pass.

use crate::foundation::math::Vec3;

/// Kind of light a light controller contributes
///
/// Only point lights exist today. New kinds are added as variants here and
/// as matching arms in the light controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum LightKind {
    /// Omnidirectional light emitted from a point
    #[default]
    Point,
}

impl LightKind {
    /// Member names as they appear in level documents, in declaration order
    pub const MEMBERS: &'static [&'static str] = &["Point"];

    /// Look a light kind up by its document name (case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(Self::Point),
            _ => None,
        }
    }
}

/// One light's contribution to the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct LightContribution {
    /// Light kind
    pub kind: LightKind,
    /// World position of the emitting object
    pub position: Vec3,
    /// Light color
    pub color: Vec3,
}

impl LightContribution {
    /// Create a point light contribution
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            color,
        }
    }
}

/// Lights collected for the frame being rendered
#[derive(Debug, Default, Clone)]
pub struct LightList {
    lights: Vec<LightContribution>,
}

impl LightList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contribution
    pub fn push(&mut self, light: LightContribution) {
        self.lights.push(light);
    }

    /// Drop every contribution, ready for the next frame
    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// All contributions, in the order they were added
    pub fn as_slice(&self) -> &[LightContribution] {
        &self.lights
    }

    /// Contributions of one kind
    pub fn of_kind(&self, kind: LightKind) -> impl Iterator<Item = &LightContribution> {
        self.lights.iter().filter(move |light| light.kind == kind)
    }

    /// Number of contributions
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no light has contributed yet
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}
