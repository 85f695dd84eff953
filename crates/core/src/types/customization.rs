//! Line-item customization.
//!
//! A customization is whatever the diner picked on top of the base dish
//! ("large", `{"spice": "hot", "extras": ["cheese"]}`, or nothing at all).
//! Backends echo it back in whatever shape they stored it, so three shapes
//! are accepted and compared structurally:
//!
//! | JSON            | Variant                    |
//! |-----------------|----------------------------|
//! | `null` / absent | [`Customization::None`]       |
//! | string          | [`Customization::Raw`]        |
//! | object          | [`Customization::Structured`] |
//!
//! Two customizations are equal when their canonical JSON values are equal:
//! `None` is the empty object, a `Raw` string is parsed as JSON when it is
//! valid JSON (so `"{}"` equals `None`), and object key order is ignored.

use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Wire encoding of an empty customization.
pub const EMPTY_WIRE: &str = "{}";

/// A diner's customization of a menu item.
#[derive(Debug, Clone, Default)]
pub enum Customization {
    /// No customization.
    #[default]
    None,
    /// An opaque string, kept byte-for-byte as received.
    Raw(String),
    /// Ordered key-value pairs.
    Structured(Vec<(String, Value)>),
}

impl Customization {
    /// Build a structured customization from key-value pairs, keeping their order.
    #[must_use]
    pub fn structured<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Structured(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this customization carries no choices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.canonical() {
            Value::Object(map) => map.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Canonical JSON value used for structural equality.
    #[must_use]
    pub fn canonical(&self) -> Value {
        match self {
            Self::None => Value::Object(Map::new()),
            Self::Raw(raw) if raw.trim().is_empty() => Value::Object(Map::new()),
            Self::Raw(raw) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
            Self::Structured(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
        }
    }

    /// Encode for a request body.
    ///
    /// Empty customizations encode as the literal `"{}"`. Structured values
    /// encode as JSON text with keys in insertion order. Raw strings are sent
    /// back exactly as received.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::None => EMPTY_WIRE.to_owned(),
            Self::Raw(raw) if raw.trim().is_empty() => EMPTY_WIRE.to_owned(),
            Self::Raw(raw) => raw.clone(),
            Self::Structured(pairs) if pairs.is_empty() => EMPTY_WIRE.to_owned(),
            Self::Structured(_) => {
                serde_json::to_string(self).unwrap_or_else(|_| EMPTY_WIRE.to_owned())
            }
        }
    }
}

impl PartialEq for Customization {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Raw(a), Self::Raw(b)) if a == b => true,
            _ => self.canonical() == other.canonical(),
        }
    }
}

impl Eq for Customization {}

impl fmt::Display for Customization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Raw(raw) => f.write_str(raw),
            Self::Structured(pairs) => {
                let rendered = pairs
                    .iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => format!("{k}: {s}"),
                        other => format!("{k}: {other}"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                f.write_str(&rendered)
            }
        }
    }
}

/// Parses user input: empty input is [`Customization::None`], valid JSON is
/// read the same way a backend payload would be, anything else is kept raw.
impl FromStr for Customization {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::None);
        }
        Ok(serde_json::from_str(trimmed).unwrap_or_else(|_| Self::Raw(s.to_owned())))
    }
}

impl Serialize for Customization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_none(),
            Self::Raw(raw) => serializer.serialize_str(raw),
            Self::Structured(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Customization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CustomizationVisitor)
    }
}

struct CustomizationVisitor;

impl<'de> Visitor<'de> for CustomizationVisitor {
    type Value = Customization;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a string, or an object")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Customization::None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Customization::None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Customization::Raw(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Customization::Raw(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Customization::Raw(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Customization::Raw(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Customization::Raw(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Customization::Raw(v.to_string()))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::new();
        while let Some(value) = seq.next_element::<Value>()? {
            values.push(value);
        }
        Ok(Customization::Raw(Value::Array(values).to_string()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            pairs.push((key, value));
        }
        Ok(Customization::Structured(pairs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_shapes_are_equal() {
        assert_eq!(Customization::None, Customization::Raw("{}".to_string()));
        assert_eq!(Customization::None, Customization::Structured(vec![]));
        assert_eq!(Customization::None, Customization::Raw(String::new()));
        assert!(Customization::Raw("{}".to_string()).is_empty());
    }

    #[test]
    fn test_key_order_does_not_affect_equality() {
        let a = Customization::structured([("size", json!("large")), ("spice", json!("hot"))]);
        let b = Customization::structured([("spice", json!("hot")), ("size", json!("large"))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_raw_json_equals_structured() {
        let raw = Customization::Raw(r#"{"size":"large"}"#.to_string());
        let structured = Customization::structured([("size", json!("large"))]);
        assert_eq!(raw, structured);
    }

    #[test]
    fn test_different_values_are_not_equal() {
        let a = Customization::structured([("size", json!("large"))]);
        let b = Customization::structured([("size", json!("small"))]);
        assert_ne!(a, b);
        assert_ne!(a, Customization::None);
        assert_ne!(
            Customization::Raw("large".to_string()),
            Customization::Raw("small".to_string())
        );
    }

    #[test]
    fn test_wire_encoding() {
        assert_eq!(Customization::None.to_wire(), "{}");
        assert_eq!(Customization::Structured(vec![]).to_wire(), "{}");
        assert_eq!(
            Customization::structured([("spice", json!("hot")), ("size", json!("large"))])
                .to_wire(),
            r#"{"spice":"hot","size":"large"}"#
        );
        // Raw strings go back exactly as received
        let raw = r#"{ "size" : "large" }"#;
        assert_eq!(Customization::Raw(raw.to_string()).to_wire(), raw);
    }

    #[test]
    fn test_deserialize_shapes() {
        let none: Customization = serde_json::from_str("null").unwrap();
        assert!(matches!(none, Customization::None));

        let raw: Customization = serde_json::from_str(r#""{\"a\":1}""#).unwrap();
        assert!(matches!(raw, Customization::Raw(ref s) if s == r#"{"a":1}"#));

        let structured: Customization =
            serde_json::from_str(r#"{"z": 1, "a": [1, 2]}"#).unwrap();
        match structured {
            Customization::Structured(pairs) => {
                let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["z", "a"]);
            }
            other => panic!("expected structured, got {other:?}"),
        }
    }

    #[test]
    fn test_from_str() {
        assert!(matches!(
            "".parse::<Customization>().unwrap(),
            Customization::None
        ));
        assert!(matches!(
            r#"{"size":"large"}"#.parse::<Customization>().unwrap(),
            Customization::Structured(_)
        ));
        assert!(matches!(
            "extra cheese".parse::<Customization>().unwrap(),
            Customization::Raw(ref s) if s == "extra cheese"
        ));
    }

    #[test]
    fn test_display() {
        let c = Customization::structured([("size", json!("large")), ("qty", json!(2))]);
        assert_eq!(c.to_string(), "size: large, qty: 2");
    }
}
