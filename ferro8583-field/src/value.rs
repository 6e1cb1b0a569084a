/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Neutral field values for data binding.
//!
//! A [`Value`] is the intermediate shape between application records and
//! field instances: primitives bind scalars, composites bind tag-keyed maps,
//! and multiple-occurrences fields bind lists of maps. Callers either build
//! values explicitly or go through the serde adapters on
//! [`Field`](crate::Field).

/// Neutral value bound to or extracted from a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text scalar (String, Hex, and Track 2 fields).
    String(String),
    /// Integer scalar (Numeric fields).
    Int(i64),
    /// Raw byte scalar (Binary fields).
    Bytes(Vec<u8>),
    /// Tag-keyed subfield values (Composite fields). Entry order is
    /// irrelevant on input; extraction emits tag sort order.
    Map(Vec<(String, Value)>),
    /// One map per occurrence (MultipleOccurrences fields).
    List(Vec<Value>),
}

impl Value {
    /// Returns the shape name used in bind mismatch diagnostics.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Bytes(_) => "bytes",
            Self::Map(_) => "map",
            Self::List(_) => "list",
        }
    }

    /// Returns the string scalar, if this is a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer scalar, if this is an `Int` value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the byte scalar, if this is a `Bytes` value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the subfield entries, if this is a `Map` value.
    #[must_use]
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the occurrence values, if this is a `List` value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a subfield value by tag, if this is a `Map` value.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// Builds a [`Value::Map`] from `(tag, value)` pairs.
pub fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(tag, value)| (tag.to_string(), value))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::String("x".into()).kind(), "string");
        assert_eq!(Value::Int(1).kind(), "int");
        assert_eq!(Value::Bytes(vec![]).kind(), "bytes");
        assert_eq!(Value::Map(vec![]).kind(), "map");
        assert_eq!(Value::List(vec![]).kind(), "list");
    }

    #[test]
    fn test_map_lookup() {
        let value = map([("1", "AB".into()), ("3", 12.into())]);
        assert_eq!(value.get("1").and_then(Value::as_str), Some("AB"));
        assert_eq!(value.get("3").and_then(Value::as_int), Some(12));
        assert!(value.get("9").is_none());
    }
}
