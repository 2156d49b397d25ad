use crate::{Error, Result};

use jiff::Timestamp;
use uuid::Uuid;

/// A literal value bound into a compiled SQL statement.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit floating point
    F64(f64),

    /// String value
    String(String),

    /// An array of bytes
    Bytes(Vec<u8>),

    /// 128-bit universally unique identifier
    Uuid(Uuid),

    /// An instant in time
    Timestamp(Timestamp),

    /// Null value
    #[default]
    Null,

    /// A sequence of values, bound as a unit (`IN` operands, `BETWEEN`
    /// pairs). Drivers expand a sequence bound to a single placeholder into
    /// one placeholder per element.
    List(Vec<Value>),
}

impl Value {
    /// The variant name, used in conversion errors.
    pub fn variant(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Uuid(_) => "Uuid",
            Value::Timestamp(_) => "Timestamp",
            Value::Null => "Null",
            Value::List(_) => "List",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Value::I64(v) => Ok(*v),
            _ => Err(Error::type_conversion(self.variant(), "i64")),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Value::F64(v) => Ok(*v),
            Value::I64(v) => Ok(*v as f64),
            _ => Err(Error::type_conversion(self.variant(), "f64")),
        }
    }

    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            Value::I64(v) => Ok(*v != 0),
            _ => Err(Error::type_conversion(self.variant(), "bool")),
        }
    }

    pub fn to_text(&self) -> Result<String> {
        match self {
            Value::String(v) => Ok(v.clone()),
            _ => Err(Error::type_conversion(self.variant(), "String")),
        }
    }

    /// Converts a textual or native uuid value.
    pub fn to_uuid(&self) -> Result<Uuid> {
        match self {
            Value::Uuid(v) => Ok(*v),
            Value::String(v) => v
                .parse()
                .map_err(|_| Error::type_conversion(self.variant(), "Uuid")),
            _ => Err(Error::type_conversion(self.variant(), "Uuid")),
        }
    }

    pub fn to_uuid_opt(&self) -> Result<Option<Uuid>> {
        match self {
            Value::Null => Ok(None),
            other => other.to_uuid().map(Some),
        }
    }

    /// Converts a textual (RFC 3339) or native timestamp value.
    pub fn to_timestamp(&self) -> Result<Timestamp> {
        match self {
            Value::Timestamp(v) => Ok(*v),
            Value::String(v) => v
                .parse()
                .map_err(|_| Error::type_conversion(self.variant(), "Timestamp")),
            _ => Err(Error::type_conversion(self.variant(), "Timestamp")),
        }
    }

    pub fn to_timestamp_opt(&self) -> Result<Option<Timestamp>> {
        match self {
            Value::Null => Ok(None),
            other => other.to_timestamp().map(Some),
        }
    }
}

macro_rules! impl_value_from {
    ( $( $variant:ident: $( $ty:ty ),+ ;)* ) => {
        $( $(
            impl From<$ty> for Value {
                fn from(src: $ty) -> Value {
                    Value::$variant(src.into())
                }
            }
        )+ )*
    };
}

// `u8` stays out of the scalar conversions so the generic sequence
// conversion below cannot claim `Vec<u8>`; byte columns construct
// `Value::Bytes` explicitly.
impl_value_from! {
    Bool: bool;
    I64: i64, i32, i16, i8, u32, u16;
    F64: f64;
    String: String, &str;
    Uuid: Uuid;
    Timestamp: Timestamp;
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(src: Option<T>) -> Value {
        match src {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(src: Vec<T>) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(src: [T; N]) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}
