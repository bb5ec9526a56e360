//! Light sources
//!
//! A light controller does not draw anything. Each frame it reports its
//! object's position and its color to the shared light list, before any
//! geometry of the frame is shaded.

use crate::foundation::math::Vec3;
use crate::level::controller::{
    Capabilities, Controller, ControllerContext, ControllerType, FieldDescriptor,
};
use crate::level::error::{ConversionError, LevelResult};
use crate::level::value::{EnumDescriptor, SemanticType};
use crate::render::{LightContribution, LightKind};

/// Document description of [`LightKind`]
pub const LIGHT_KIND: EnumDescriptor = EnumDescriptor {
    name: "LightKind",
    members: LightKind::MEMBERS,
};

/// Contributes a light to every frame
#[derive(Debug, Clone, PartialEq)]
pub struct LightController {
    kind: LightKind,
    color: Vec3,
}

impl Default for LightController {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            color: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl LightController {
    /// Light of `kind` with `color`
    pub fn new(kind: LightKind, color: Vec3) -> Self {
        Self { kind, color }
    }

    /// Light kind
    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Light color
    pub fn color(&self) -> Vec3 {
        self.color
    }
}

impl Controller for LightController {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::PRE_RENDER
    }

    fn pre_render(&mut self, ctx: &mut ControllerContext<'_>) -> LevelResult<()> {
        let position = ctx.object().position();
        let contribution = match self.kind {
            LightKind::Point => LightContribution::point(position, self.color),
        };
        ctx.lights_mut().push(contribution);
        Ok(())
    }
}

impl ControllerType for LightController {
    const TYPE_NAME: &'static str = "Level.LightController";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            name: "Type",
            ty: SemanticType::Enum(&LIGHT_KIND),
            set: |light, value| {
                let member = value.into_enum()?.member;
                light.kind = LightKind::from_name(member).ok_or_else(|| {
                    ConversionError::UnknownEnumMember {
                        enumeration: LIGHT_KIND.name,
                        member: member.to_string(),
                    }
                })?;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "Color",
            ty: SemanticType::Vec3,
            set: |light, value| {
                light.color = value.into_vec3()?;
                Ok(())
            },
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{SceneGraph, SceneObject};
    use crate::foundation::math::Transform;
    use crate::render::HeadlessBackend;

    #[test]
    fn test_defaults_to_white_point_light() {
        let light = LightController::default();
        assert_eq!(light.kind(), LightKind::Point);
        assert_eq!(light.color(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_contributes_object_position_each_frame() {
        let mut graph = SceneGraph::new();
        graph
            .add_object(
                SceneObject::new("lamp")
                    .with_transform(Transform::from_position_scale(
                        Vec3::new(1.0, 2.0, 3.0),
                        Vec3::new(1.0, 1.0, 1.0),
                    ))
                    .with_controller(Box::new(LightController::new(
                        LightKind::Point,
                        Vec3::new(1.0, 0.0, 0.0),
                    ))),
                None,
            )
            .unwrap();
        let mut backend = HeadlessBackend::new();

        graph.start(&mut backend).unwrap();
        graph.render(&mut backend).unwrap();
        graph.render(&mut backend).unwrap();

        assert_eq!(
            graph.lights(),
            &[LightContribution::point(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.0, 0.0))]
        );
    }
}
