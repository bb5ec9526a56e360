//! Typed values for controller fields
//!
//! Level documents carry every value as text. [`load_value`] turns that text
//! into a [`Value`] according to the [`SemanticType`] a controller field
//! declares. Loading is pure: the same type and text always give the same
//! result.

use std::fmt;

use crate::assets::{AssetData, AssetIndex};
use crate::foundation::math::{Vec2, Vec3, Vec4};

use super::error::ConversionError;

/// Static description of an enumeration usable in level documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Enumeration name, for diagnostics
    pub name: &'static str,
    /// Member names in declaration order
    pub members: &'static [&'static str],
}

/// Declared type of a controller field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// Signed 8-bit integer
    I8,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 64-bit integer
    U64,
    /// Single-precision float
    F32,
    /// Double-precision float
    F64,
    /// Verbatim text
    String,
    /// Two comma-separated floats
    Vec2,
    /// Three comma-separated floats
    Vec3,
    /// Four comma-separated floats
    Vec4,
    /// Member of an enumeration, by name
    Enum(&'static EnumDescriptor),
    /// Named asset, resolved through the asset index
    Asset,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8 => f.write_str("i8"),
            Self::U8 => f.write_str("u8"),
            Self::I16 => f.write_str("i16"),
            Self::U16 => f.write_str("u16"),
            Self::I32 => f.write_str("i32"),
            Self::U32 => f.write_str("u32"),
            Self::I64 => f.write_str("i64"),
            Self::U64 => f.write_str("u64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::String => f.write_str("string"),
            Self::Vec2 => f.write_str("Vector2"),
            Self::Vec3 => f.write_str("Vector3"),
            Self::Vec4 => f.write_str("Vector4"),
            Self::Enum(descriptor) => write!(f, "enum {}", descriptor.name),
            Self::Asset => f.write_str("asset"),
        }
    }
}

/// Selected member of an enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    /// Enumeration name
    pub enumeration: &'static str,
    /// Member name as declared
    pub member: &'static str,
    /// Member position in declaration order
    pub index: usize,
}

/// A loaded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Any signed integer width
    Int(i64),
    /// Any unsigned integer width
    UInt(u64),
    /// Either float width
    Float(f64),
    /// Text
    String(String),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// Enumeration member
    Enum(EnumValue),
    /// Resolved asset
    Asset(AssetData),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "signed integer",
            Self::UInt(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Vec2(_) => "Vector2",
            Self::Vec3(_) => "Vector3",
            Self::Vec4(_) => "Vector4",
            Self::Enum(_) => "enum",
            Self::Asset(_) => "asset",
        }
    }

    fn mismatch(&self, target: &str) -> ConversionError {
        ConversionError::Unsupported(format!("{} as {}", self.kind(), target))
    }

    /// Unsigned 32-bit view of an integer value
    pub fn into_u32(self) -> Result<u32, ConversionError> {
        match self {
            Self::UInt(v) => u32::try_from(v).map_err(|_| self.mismatch("u32")),
            Self::Int(v) => u32::try_from(v).map_err(|_| self.mismatch("u32")),
            other => Err(other.mismatch("u32")),
        }
    }

    /// Signed 64-bit view of an integer value
    pub fn into_i64(self) -> Result<i64, ConversionError> {
        match self {
            Self::Int(v) => Ok(v),
            Self::UInt(v) => i64::try_from(v).map_err(|_| self.mismatch("i64")),
            other => Err(other.mismatch("i64")),
        }
    }

    /// Float value
    pub fn into_f64(self) -> Result<f64, ConversionError> {
        match self {
            Self::Float(v) => Ok(v),
            other => Err(other.mismatch("float")),
        }
    }

    /// Text value
    pub fn into_string(self) -> Result<String, ConversionError> {
        match self {
            Self::String(v) => Ok(v),
            other => Err(other.mismatch("string")),
        }
    }

    /// 2-component vector value
    pub fn into_vec2(self) -> Result<Vec2, ConversionError> {
        match self {
            Self::Vec2(v) => Ok(v),
            other => Err(other.mismatch("Vector2")),
        }
    }

    /// 3-component vector value
    pub fn into_vec3(self) -> Result<Vec3, ConversionError> {
        match self {
            Self::Vec3(v) => Ok(v),
            other => Err(other.mismatch("Vector3")),
        }
    }

    /// 4-component vector value
    pub fn into_vec4(self) -> Result<Vec4, ConversionError> {
        match self {
            Self::Vec4(v) => Ok(v),
            other => Err(other.mismatch("Vector4")),
        }
    }

    /// Enumeration member value
    pub fn into_enum(self) -> Result<EnumValue, ConversionError> {
        match self {
            Self::Enum(v) => Ok(v),
            other => Err(other.mismatch("enum")),
        }
    }

    /// Asset value
    pub fn into_asset(self) -> Result<AssetData, ConversionError> {
        match self {
            Self::Asset(v) => Ok(v),
            other => Err(other.mismatch("asset")),
        }
    }
}

/// Writes the same textual grammar [`load_value`] reads
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Vec2(v) => write!(f, "{},{}", v.x, v.y),
            Self::Vec3(v) => write!(f, "{},{},{}", v.x, v.y, v.z),
            Self::Vec4(v) => write!(f, "{},{},{},{}", v.x, v.y, v.z, v.w),
            Self::Enum(v) => f.write_str(v.member),
            Self::Asset(v) => f.write_str(v.name()),
        }
    }
}

macro_rules! parse_int {
    ($text:expr, $ty:expr, $int:ty, $variant:ident) => {
        $text
            .trim()
            .parse::<$int>()
            .map(|v| Value::$variant(v.into()))
            .map_err(|e| invalid_number($ty, $text, &e))
    };
}

fn invalid_number(ty: SemanticType, text: &str, reason: &dyn fmt::Display) -> ConversionError {
    ConversionError::InvalidNumber {
        ty,
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_f32(ty: SemanticType, text: &str) -> Result<f32, ConversionError> {
    text.trim().parse::<f32>().map_err(|e| invalid_number(ty, text, &e))
}

fn parse_components<const N: usize>(ty: SemanticType, text: &str) -> Result<[f32; N], ConversionError> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != N {
        return Err(ConversionError::WrongArity {
            ty,
            expected: N,
            found: parts.len(),
            text: text.to_string(),
        });
    }

    let mut components = [0.0; N];
    for (component, part) in components.iter_mut().zip(parts) {
        *component = parse_f32(ty, part)?;
    }
    Ok(components)
}

/// Load a typed value from its textual form
///
/// # Arguments
/// * `ty` - Declared semantic type of the destination field
/// * `text` - Text content from the level document
/// * `assets` - Index used to resolve [`SemanticType::Asset`] names
pub fn load_value(ty: SemanticType, text: &str, assets: &dyn AssetIndex) -> Result<Value, ConversionError> {
    match ty {
        SemanticType::I8 => parse_int!(text, ty, i8, Int),
        SemanticType::U8 => parse_int!(text, ty, u8, UInt),
        SemanticType::I16 => parse_int!(text, ty, i16, Int),
        SemanticType::U16 => parse_int!(text, ty, u16, UInt),
        SemanticType::I32 => parse_int!(text, ty, i32, Int),
        SemanticType::U32 => parse_int!(text, ty, u32, UInt),
        SemanticType::I64 => parse_int!(text, ty, i64, Int),
        SemanticType::U64 => parse_int!(text, ty, u64, UInt),
        SemanticType::F32 => parse_f32(ty, text).map(|v| Value::Float(f64::from(v))),
        SemanticType::F64 => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid_number(ty, text, &e)),
        SemanticType::String => Ok(Value::String(text.to_string())),
        SemanticType::Vec2 => parse_components::<2>(ty, text).map(|[x, y]| Value::Vec2(Vec2::new(x, y))),
        SemanticType::Vec3 => parse_components::<3>(ty, text).map(|[x, y, z]| Value::Vec3(Vec3::new(x, y, z))),
        SemanticType::Vec4 => {
            parse_components::<4>(ty, text).map(|[x, y, z, w]| Value::Vec4(Vec4::new(x, y, z, w)))
        }
        SemanticType::Enum(descriptor) => {
            let member = text.trim();
            descriptor
                .members
                .iter()
                .position(|candidate| *candidate == member)
                .map(|index| {
                    Value::Enum(EnumValue {
                        enumeration: descriptor.name,
                        member: descriptor.members[index],
                        index,
                    })
                })
                .ok_or_else(|| ConversionError::UnknownEnumMember {
                    enumeration: descriptor.name,
                    member: member.to_string(),
                })
        }
        SemanticType::Asset => assets
            .resolve(text.trim())
            .map(Value::Asset)
            .map_err(|_| ConversionError::AssetNotFound(text.trim().to_string())),
    }
}

/// Load a 3-component vector, the path used for object transforms
pub fn load_vec3(text: &str) -> Result<Vec3, ConversionError> {
    let [x, y, z] = parse_components::<3>(SemanticType::Vec3, text)?;
    Ok(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetIndex;
    use approx::assert_relative_eq;

    static COLORS: EnumDescriptor = EnumDescriptor {
        name: "Color",
        members: &["Red", "Green"],
    };

    fn load(ty: SemanticType, text: &str) -> Result<Value, ConversionError> {
        load_value(ty, text, &MemoryAssetIndex::new())
    }

    #[test]
    fn test_integer_widths_respect_range() {
        assert_eq!(load(SemanticType::U8, "255").unwrap(), Value::UInt(255));
        assert!(matches!(load(SemanticType::U8, "256"), Err(ConversionError::InvalidNumber { .. })));
        assert_eq!(load(SemanticType::I16, "-32768").unwrap(), Value::Int(-32768));
        assert!(matches!(load(SemanticType::U32, "-1"), Err(ConversionError::InvalidNumber { .. })));
        assert_eq!(load(SemanticType::U64, " 18446744073709551615 ").unwrap(), Value::UInt(u64::MAX));
        assert!(matches!(load(SemanticType::I32, "twelve"), Err(ConversionError::InvalidNumber { .. })));
    }

    #[test]
    fn test_floats_parse_at_target_width() {
        let value = load(SemanticType::F32, "0.5").unwrap().into_f64().unwrap();
        assert_relative_eq!(value, 0.5);
        let value = load(SemanticType::F64, "1e-300").unwrap().into_f64().unwrap();
        assert_relative_eq!(value, 1e-300);
        assert!(load(SemanticType::F32, "1.0.0").is_err());
    }

    #[test]
    fn test_vector_arity_is_exact() {
        let value = load(SemanticType::Vec3, "1, 2.5, -3").unwrap();
        assert_eq!(value, Value::Vec3(Vec3::new(1.0, 2.5, -3.0)));

        for text in ["1,2", "1,2,3,4"] {
            match load(SemanticType::Vec3, text) {
                Err(ConversionError::WrongArity { expected: 3, found, .. }) => assert_ne!(found, 3),
                other => panic!("expected arity error for '{text}', got {other:?}"),
            }
        }
        assert!(load(SemanticType::Vec2, "1,x").is_err());
        assert!(load(SemanticType::Vec4, "1,2,3,4").is_ok());
    }

    #[test]
    fn test_vec3_text_round_trips() {
        for original in ["0,0,0", "1,0,0", "0.1,-2.75,1000000", "3.4028235e38,-1.5e-7,42"] {
            let first = load(SemanticType::Vec3, original).unwrap();
            let reparsed = load(SemanticType::Vec3, &first.to_string()).unwrap();
            assert_eq!(first, reparsed, "round trip of '{original}'");
        }
    }

    #[test]
    fn test_enum_lookup_is_case_sensitive() {
        let ty = SemanticType::Enum(&COLORS);
        let value = load(ty, "Green").unwrap().into_enum().unwrap();
        assert_eq!(value.member, "Green");
        assert_eq!(value.index, 1);

        assert_eq!(
            load(ty, "green"),
            Err(ConversionError::UnknownEnumMember {
                enumeration: "Color",
                member: "green".to_string(),
            })
        );
    }

    #[test]
    fn test_assets_resolve_through_the_index() {
        let assets = MemoryAssetIndex::new().with("/meshes/cube.obj", b"v 0 0 0".to_vec());

        let value = load_value(SemanticType::Asset, "/meshes/cube.obj", &assets).unwrap();
        assert_eq!(value.into_asset().unwrap().bytes(), b"v 0 0 0");
        assert_eq!(
            load_value(SemanticType::Asset, "/meshes/sphere.obj", &assets),
            Err(ConversionError::AssetNotFound("/meshes/sphere.obj".to_string()))
        );
    }

    #[test]
    fn test_strings_are_verbatim() {
        assert_eq!(load(SemanticType::String, " padded ").unwrap(), Value::String(" padded ".to_string()));
    }

    #[test]
    fn test_value_accessors_reject_mismatches() {
        assert_eq!(Value::UInt(7).into_u32().unwrap(), 7);
        assert!(Value::UInt(u64::MAX).into_u32().is_err());
        assert!(matches!(
            Value::String("x".to_string()).into_vec3(),
            Err(ConversionError::Unsupported(_))
        ));
    }
}
