//! Value types and the tagged JSON codec
//!
//! Every value is serialized to a JSON payload, scalars included; the tag
//! records the value's original type so the decoder can rebuild the exact
//! variant that was stored.

use std::fmt;

use crate::error::{Error, Result};

/// Tag recording the original type of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    Float,
    Bool,
    String,
    Json,
}

impl TypeTag {
    /// Wire form of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Json => "json",
        }
    }

    /// Parse a stored tag back; anything outside the five known tags fails
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "bool" => Ok(TypeTag::Bool),
            "string" => Ok(TypeTag::String),
            "json" => Ok(TypeTag::Json),
            other => Err(Error::UnknownTag(other.to_string())),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held by the store
///
/// The variants are ordered by classification priority: text first, then
/// booleans ahead of the numeric kinds, structured values last.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value
    String(String),

    /// Boolean value (never tagged as an integer)
    Bool(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// Arbitrarily nested structured value
    Json(serde_json::Value),
}

impl Value {
    /// Tag for this value's kind
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::String(_) => TypeTag::String,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Json(_) => TypeTag::Json,
        }
    }

    /// Encode to a (payload, tag) pair
    ///
    /// Scalars pass through the same JSON encoder as structured values, so
    /// the tag is metadata about the original type, not the encoding.
    pub fn encode(&self) -> Result<(String, TypeTag)> {
        let payload = match self {
            Value::String(s) => serde_json::to_string(s)?,
            Value::Bool(b) => serde_json::to_string(b)?,
            Value::Int(i) => serde_json::to_string(i)?,
            Value::Float(f) => serde_json::to_string(f)?,
            Value::Json(v) => serde_json::to_string(v)?,
        };
        Ok((payload, self.tag()))
    }

    /// Decode a payload under its declared tag
    pub fn decode(payload: &str, tag: TypeTag) -> Result<Value> {
        let decode_err = |source| Error::Decode { tag, source };
        let value = match tag {
            TypeTag::Int => Value::Int(serde_json::from_str(payload).map_err(decode_err)?),
            TypeTag::Float => Value::Float(serde_json::from_str(payload).map_err(decode_err)?),
            TypeTag::Bool => Value::Bool(serde_json::from_str(payload).map_err(decode_err)?),
            TypeTag::String => Value::String(serde_json::from_str(payload).map_err(decode_err)?),
            TypeTag::Json => Value::Json(serde_json::from_str(payload).map_err(decode_err)?),
        };
        Ok(value)
    }

    /// Try to get as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}
