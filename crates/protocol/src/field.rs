//! Field values
//!
//! A field is the measured value itself, as opposed to a tag which only
//! labels the measurement.

use std::fmt;

/// Typed field value
///
/// Mirrors the value types of the influx line protocol that collectors
/// produce and sinks write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit float (`1.5`)
    Float(f64),
    /// Signed integer (`42i`)
    Int(i64),
    /// Unsigned integer (`42u`)
    UInt(u64),
    /// Boolean (`true`)
    Bool(bool),
    /// String (`"text"`)
    String(String),
}

impl FieldValue {
    /// Numeric view of the value, if it has one
    ///
    /// Integers are widened to `f64`; booleans and strings are not numeric.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Bool(_) | Self::String(_) => None,
        }
    }

    /// Short type name for diagnostics
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}
