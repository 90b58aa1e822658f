// api/value.rs
//
// Dynamically typed payload carried by every named-property read and write.
// The dispatcher decides per property which variants it accepts.

use glam::{Vec2, Vec3, Vec4};
use crate::api::types::NodeId;
use crate::components::model::Model;
use crate::components::texture::Texture;
use crate::core::collision::ColliderShape;
use crate::extensions::easing::{lerp, lerp_vec2, lerp_vec3, lerp_vec4};

/// A property value. `None` is the explicit empty value that clears
/// resources (model, texture, collider) or destroys a node when used as parent.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// Flattened sequence of 2- or 3-tuples (compatibility call shape).
    Floats(Vec<f32>),
    Str(String),
    Node(NodeId),
    Model(Model),
    Texture(Texture),
    Collider(ColliderShape),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Vec2(_) => "vec2",
            Value::Vec3(_) => "vec3",
            Value::Vec4(_) => "vec4",
            Value::Floats(_) => "floats",
            Value::Str(_) => "string",
            Value::Node(_) => "node",
            Value::Model(_) => "model",
            Value::Texture(_) => "texture",
            Value::Collider(_) => "collider",
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::Float(v) => Some(v),
            Value::Int(v) => Some(v as f32),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Float(v) => Some(v as i32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            Value::Int(v) => Some(v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Value::Vec2(v) => Some(*v),
            Value::Floats(f) if f.len() == 2 => Some(Vec2::new(f[0], f[1])),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(*v),
            Value::Floats(f) if f.len() == 3 => Some(Vec3::new(f[0], f[1], f[2])),
            _ => None,
        }
    }

    /// Read a color. A 3-component value gets an opaque alpha.
    pub fn as_color(&self) -> Option<Vec4> {
        match self {
            Value::Vec4(v) => Some(*v),
            Value::Vec3(v) => Some(v.extend(1.0)),
            Value::Floats(f) if f.len() == 4 => Some(Vec4::new(f[0], f[1], f[2], f[3])),
            Value::Floats(f) if f.len() == 3 => Some(Vec4::new(f[0], f[1], f[2], 1.0)),
            _ => None,
        }
    }

    /// Flatten any numeric value into its components.
    pub fn components(&self) -> Option<Vec<f32>> {
        match self {
            Value::Float(v) => Some(vec![*v]),
            Value::Int(v) => Some(vec![*v as f32]),
            Value::Vec2(v) => Some(v.to_array().to_vec()),
            Value::Vec3(v) => Some(v.to_array().to_vec()),
            Value::Vec4(v) => Some(v.to_array().to_vec()),
            Value::Floats(f) => Some(f.clone()),
            _ => None,
        }
    }

    /// Linearly interpolate towards `to`. Returns `None` when the two values
    /// have no common numeric shape.
    pub fn lerp(&self, to: &Value, t: f32) -> Option<Value> {
        match (self, to) {
            (Value::Vec2(a), Value::Vec2(b)) => Some(Value::Vec2(lerp_vec2(*a, *b, t))),
            (Value::Vec3(a), Value::Vec3(b)) => Some(Value::Vec3(lerp_vec3(*a, *b, t))),
            (Value::Vec4(a), Value::Vec4(b)) => Some(Value::Vec4(lerp_vec4(*a, *b, t))),
            (Value::Vec4(a), Value::Vec3(b)) => {
                Some(Value::Vec4(lerp_vec4(*a, b.extend(1.0), t)))
            }
            (Value::Floats(a), Value::Floats(b)) if a.len() == b.len() => Some(Value::Floats(
                a.iter().zip(b).map(|(a, b)| lerp(*a, *b, t)).collect(),
            )),
            _ => {
                let a = self.as_f32()?;
                let b = to.as_f32()?;
                Some(Value::Float(lerp(a, b, t)))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v as f32)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Vec2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vec3(v)
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Value::Vec4(v)
    }
}

impl From<[f32; 2]> for Value {
    fn from(v: [f32; 2]) -> Self {
        Value::Vec2(Vec2::from(v))
    }
}

impl From<[f32; 3]> for Value {
    fn from(v: [f32; 3]) -> Self {
        Value::Vec3(Vec3::from(v))
    }
}

impl From<[f32; 4]> for Value {
    fn from(v: [f32; 4]) -> Self {
        Value::Vec4(Vec4::from(v))
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::Floats(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Value::Node(v)
    }
}

impl From<Option<NodeId>> for Value {
    fn from(v: Option<NodeId>) -> Self {
        v.map_or(Value::None, Value::Node)
    }
}

impl From<Model> for Value {
    fn from(v: Model) -> Self {
        Value::Model(v)
    }
}

impl From<Texture> for Value {
    fn from(v: Texture) -> Self {
        Value::Texture(v)
    }
}

impl From<ColliderShape> for Value {
    fn from(v: ColliderShape) -> Self {
        Value::Collider(v)
    }
}
