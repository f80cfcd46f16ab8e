//! Scalar values carried by labels, forms and projection fields.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LetxbeError;

/// A scalar value: boolean, integer, float or string.
///
/// Absent values are represented as `Option<Value>::None` (JSON `null`).
/// Deserialization never coerces between variants, so `true` and `1` stay
/// distinct and compare unequal.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Returns the name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric value of an integer or a float. Booleans are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Asserts that two values are equal, refusing to equate a boolean with a number.
///
/// Integers and floats compare numerically (`1 == 1.0`), but `true != 1`
/// and `false != 0`.
pub fn assert_equal_typed(left: &Value, right: &Value) -> Result<(), LetxbeError> {
    let mismatch = || LetxbeError::ValueMismatch {
        left: left.to_string(),
        right: right.to_string(),
    };

    let equal = match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Bool(_), _) | (_, Value::Bool(_)) => return Err(mismatch()),
        (Value::Str(a), Value::Str(b)) => a == b,
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    };

    if equal {
        Ok(())
    } else {
        Err(mismatch())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl Visitor<'_> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean, an integer, a float or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                i64::try_from(v)
                    .map(Value::Int)
                    .map_err(|_| E::custom(format!("integer {} is out of range", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::Str(v))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_json_types() {
        assert_eq!(serde_json::from_str::<Value>("true").unwrap(), Value::Bool(true));
        assert_eq!(serde_json::from_str::<Value>("1").unwrap(), Value::Int(1));
        assert_eq!(serde_json::from_str::<Value>("1.2").unwrap(), Value::Float(1.2));
        assert_eq!(
            serde_json::from_str::<Value>("\"dkqshf\"").unwrap(),
            Value::Str("dkqshf".into())
        );
    }

    #[test]
    fn test_null_is_not_a_value() {
        assert!(serde_json::from_str::<Value>("null").is_err());
        assert_eq!(serde_json::from_str::<Option<Value>>("null").unwrap(), None);
    }

    #[test]
    fn test_nested_structures_are_rejected() {
        assert!(serde_json::from_str::<Value>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Value>("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_assert_equal_typed_accepts_same_values() {
        for (a, b) in [
            (Value::from("test"), Value::from("test")),
            (Value::Int(0), Value::Int(0)),
            (Value::Bool(false), Value::Bool(false)),
            (Value::Int(1), Value::Int(1)),
            (Value::Bool(true), Value::Bool(true)),
            (Value::Int(1), Value::Float(1.0)),
        ] {
            assert!(assert_equal_typed(&a, &b).is_ok(), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_assert_equal_typed_rejects_bool_number_mix() {
        for (a, b) in [
            (Value::from("test"), Value::Int(1)),
            (Value::Int(0), Value::Bool(false)),
            (Value::Bool(false), Value::from("")),
            (Value::Bool(true), Value::Int(1)),
            (Value::Bool(true), Value::from("un texte")),
        ] {
            assert!(assert_equal_typed(&a, &b).is_err(), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_bool_and_int_are_never_equal() {
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Bool(false), Value::Int(0));
    }
}
