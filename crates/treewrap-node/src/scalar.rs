//! [`Scalar`] — the closed set of primitive payloads an adapter can
//! recognize natively.
//!
//! Adapters never see arbitrary user types. A value that wants the native
//! fast path lowers itself to one of these payloads; the adapter's
//! recognition table maps the payload (encode side) or a [`ScalarTag`]
//! (decode side) to its own representation.

/// A primitive payload handed to the adapter's recognition table.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent / null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer (distinct so values above `i64::MAX` survive).
    UInt(u64),
    /// Floating-point number.
    Float(f64),
    /// String.
    Str(String),
    /// Binary data.
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Type identity of this payload.
    pub fn tag(&self) -> ScalarTag {
        match self {
            Scalar::Null => ScalarTag::Null,
            Scalar::Bool(_) => ScalarTag::Bool,
            Scalar::Int(_) => ScalarTag::Int,
            Scalar::UInt(_) => ScalarTag::UInt,
            Scalar::Float(_) => ScalarTag::Float,
            Scalar::Str(_) => ScalarTag::Str,
            Scalar::Bytes(_) => ScalarTag::Bytes,
        }
    }
}

/// Fieldless mirror of [`Scalar`]; the type identity a decoding target
/// announces so the adapter can run its conversion table without inspecting
/// user types at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    Null,
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Bytes,
}

impl ScalarTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarTag::Null => "null",
            ScalarTag::Bool => "bool",
            ScalarTag::Int => "int",
            ScalarTag::UInt => "uint",
            ScalarTag::Float => "float",
            ScalarTag::Str => "string",
            ScalarTag::Bytes => "bytes",
        }
    }
}
