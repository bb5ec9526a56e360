//! Math types
//!
//! Vector and orientation types used by scene objects and controller fields,
//! all single precision over nalgebra.

use nalgebra::{Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// Unit quaternion used for orientations
pub type Quat = Unit<Quaternion<f32>>;

/// Local placement of a scene object
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Offset from the parent
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Origin, no rotation, unit scale
    pub fn identity() -> Self {
        Self::default()
    }

    /// Transform with the given position and scale and no rotation
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Self::default()
        }
    }

    /// Apply an Euler step (roll, pitch, yaw in degrees) after the current rotation
    pub fn rotate_degrees(&mut self, degrees: Vec3) {
        let step = Quat::from_euler_angles(
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
        self.rotation *= step;
    }
}
