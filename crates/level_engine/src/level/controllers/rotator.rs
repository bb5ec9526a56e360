//! Constant spin

use crate::foundation::math::Vec3;
use crate::level::controller::{
    Capabilities, Controller, ControllerContext, ControllerType, FieldDescriptor,
};
use crate::level::error::LevelResult;
use crate::level::value::SemanticType;

/// Rotates its object by a fixed Euler step, in degrees, every update
#[derive(Debug, Default, Clone)]
pub struct RotatorController {
    degrees: Vec3,
}

impl RotatorController {
    /// Rotator stepping by `degrees` per update
    pub fn new(degrees: Vec3) -> Self {
        Self { degrees }
    }

    /// Per-update rotation step in degrees
    pub fn degrees(&self) -> Vec3 {
        self.degrees
    }
}

impl Controller for RotatorController {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn on_update(&mut self, ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        ctx.object_mut().transform.rotate_degrees(self.degrees);
        Ok(())
    }
}

impl ControllerType for RotatorController {
    const TYPE_NAME: &'static str = "Level.RotatorController";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[FieldDescriptor {
        name: "Degrees",
        ty: SemanticType::Vec3,
        set: |rotator, value| {
            rotator.degrees = value.into_vec3()?;
            Ok(())
        },
    }];
}
