//! Attribute codec
//!
//! Converts the OTLP typed-value union into a normalized tagged value for
//! storage and back into JSON for read-side reconstruction. Decoding is
//! permissive: a value with no recognized shape becomes the explicit
//! `Str("")` fallback rather than failing the attribute.

use serde_json::{Value as JsonValue, json};

use super::wire::AnyValue;
use crate::data::types::AttrKind;

/// Normalized attribute value, one variant per supported wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Array(Vec<AttributeValue>),
}

/// Column form of an attribute value: the kind tag plus exactly one
/// populated value column. Arrays are persisted as JSON text.
#[derive(Debug, Clone)]
pub struct StorageParts {
    pub kind: AttrKind,
    pub text: Option<String>,
    pub int: Option<i64>,
    pub double: Option<f64>,
    pub boolean: Option<bool>,
}

impl AttributeValue {
    /// Decode a wire value; absent or unrecognized shapes yield the fallback.
    pub fn decode(value: Option<&AnyValue>) -> Self {
        let Some(value) = value else {
            return Self::Str(String::new());
        };
        if let Some(s) = &value.string_value {
            Self::Str(s.clone())
        } else if let Some(i) = value.int_value {
            Self::Int(i)
        } else if let Some(d) = value.double_value {
            Self::Double(d)
        } else if let Some(b) = value.bool_value {
            Self::Bool(b)
        } else if let Some(arr) = &value.array_value {
            Self::Array(arr.values.iter().map(|v| Self::decode(Some(v))).collect())
        } else {
            Self::Str(String::new())
        }
    }

    pub fn kind(&self) -> AttrKind {
        match self {
            Self::Str(_) => AttrKind::String,
            Self::Int(_) => AttrKind::Int,
            Self::Double(_) => AttrKind::Double,
            Self::Bool(_) => AttrKind::Bool,
            Self::Array(_) => AttrKind::Array,
        }
    }

    /// JSON form, used to rebuild key→value maps for API responses.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Str(s) => json!(s),
            Self::Int(i) => json!(i),
            Self::Double(d) => json!(d),
            Self::Bool(b) => json!(b),
            Self::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::Str(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            _ => Self::Str(String::new()),
        }
    }

    pub fn storage_parts(&self) -> StorageParts {
        let mut parts = StorageParts {
            kind: self.kind(),
            text: None,
            int: None,
            double: None,
            boolean: None,
        };
        match self {
            Self::Str(s) => parts.text = Some(s.clone()),
            Self::Int(i) => parts.int = Some(*i),
            Self::Double(d) => parts.double = Some(*d),
            Self::Bool(b) => parts.boolean = Some(*b),
            Self::Array(_) => parts.text = Some(self.to_json().to_string()),
        }
        parts
    }

    /// Rebuild from persisted columns; the inverse of `storage_parts`.
    pub fn from_storage(
        kind: AttrKind,
        text: Option<String>,
        int: Option<i64>,
        double: Option<f64>,
        boolean: Option<bool>,
    ) -> Self {
        match kind {
            AttrKind::String => Self::Str(text.unwrap_or_default()),
            AttrKind::Int => Self::Int(int.unwrap_or_default()),
            AttrKind::Double => Self::Double(double.unwrap_or_default()),
            AttrKind::Bool => Self::Bool(boolean.unwrap_or_default()),
            AttrKind::Array => {
                let parsed = text
                    .as_deref()
                    .and_then(|t| serde_json::from_str::<JsonValue>(t).ok())
                    .unwrap_or(JsonValue::Array(Vec::new()));
                Self::from_json(&parsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otlp::wire::ArrayValue;

    fn wire_string(s: &str) -> AnyValue {
        AnyValue {
            string_value: Some(s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_each_shape() {
        assert_eq!(
            AttributeValue::decode(Some(&wire_string("hi"))),
            AttributeValue::Str("hi".to_string())
        );
        assert_eq!(
            AttributeValue::decode(Some(&AnyValue {
                int_value: Some(7),
                ..Default::default()
            })),
            AttributeValue::Int(7)
        );
        assert_eq!(
            AttributeValue::decode(Some(&AnyValue {
                double_value: Some(0.5),
                ..Default::default()
            })),
            AttributeValue::Double(0.5)
        );
        assert_eq!(
            AttributeValue::decode(Some(&AnyValue {
                bool_value: Some(true),
                ..Default::default()
            })),
            AttributeValue::Bool(true)
        );
    }

    #[test]
    fn test_decode_array() {
        let value = AnyValue {
            array_value: Some(ArrayValue {
                values: vec![
                    wire_string("a"),
                    AnyValue {
                        int_value: Some(2),
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        };
        assert_eq!(
            AttributeValue::decode(Some(&value)),
            AttributeValue::Array(vec![
                AttributeValue::Str("a".to_string()),
                AttributeValue::Int(2)
            ])
        );
    }

    #[test]
    fn test_decode_fallback_on_empty_union() {
        // Missing value and an unrecognized shape both hit the fallback.
        assert_eq!(
            AttributeValue::decode(None),
            AttributeValue::Str(String::new())
        );
        assert_eq!(
            AttributeValue::decode(Some(&AnyValue::default())),
            AttributeValue::Str(String::new())
        );
    }

    #[test]
    fn test_storage_parts_populates_single_column() {
        let parts = AttributeValue::Int(42).storage_parts();
        assert_eq!(parts.kind, AttrKind::Int);
        assert_eq!(parts.int, Some(42));
        assert!(parts.text.is_none());
        assert!(parts.double.is_none());
        assert!(parts.boolean.is_none());
    }

    #[test]
    fn test_array_storage_is_json_text() {
        let value = AttributeValue::Array(vec![
            AttributeValue::Str("x".to_string()),
            AttributeValue::Bool(false),
        ]);
        let parts = value.storage_parts();
        assert_eq!(parts.kind, AttrKind::Array);
        assert_eq!(parts.text.as_deref(), Some(r#"["x",false]"#));
    }

    #[test]
    fn test_storage_roundtrip() {
        let values = vec![
            AttributeValue::Str("svc".to_string()),
            AttributeValue::Int(-3),
            AttributeValue::Double(2.25),
            AttributeValue::Bool(true),
            AttributeValue::Array(vec![AttributeValue::Int(1), AttributeValue::Int(2)]),
        ];
        for value in values {
            let parts = value.storage_parts();
            let rebuilt = AttributeValue::from_storage(
                parts.kind,
                parts.text,
                parts.int,
                parts.double,
                parts.boolean,
            );
            assert_eq!(rebuilt, value);
        }
    }

    #[test]
    fn test_to_json_reconstruction() {
        assert_eq!(
            AttributeValue::Array(vec![
                AttributeValue::Str("a".to_string()),
                AttributeValue::Double(1.5)
            ])
            .to_json(),
            serde_json::json!(["a", 1.5])
        );
    }
}
