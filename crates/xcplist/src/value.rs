//! The restricted plist value model.
//!
//! Only three node kinds exist: strings, dictionaries and arrays. Every other
//! plist scalar (integers, reals, dates, data, booleans) is either coerced to a
//! string on the way in or rejected; see [`crate::coerce`] and [`crate::decoder`].

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Ordered string-keyed mapping. Iteration follows insertion order, which the
/// encoder relies on for stable, diff-friendly output.
///
/// Equality ignores order (`IndexMap`'s `PartialEq`), so two dictionaries with
/// the same entries compare equal however they were built.
pub type Dictionary = IndexMap<String, PlistValue>;

/// A node in a plist tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(String),
    Dictionary(Dictionary),
    Array(Vec<PlistValue>),
}

impl PlistValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            PlistValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_dictionary(self) -> Option<Dictionary> {
        match self {
            PlistValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PlistValue::String(_) => "string",
            PlistValue::Dictionary(_) => "dict",
            PlistValue::Array(_) => "array",
        }
    }
}

impl From<&str> for PlistValue {
    fn from(s: &str) -> Self {
        PlistValue::String(s.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(s: String) -> Self {
        PlistValue::String(s)
    }
}

impl From<Dictionary> for PlistValue {
    fn from(d: Dictionary) -> Self {
        PlistValue::Dictionary(d)
    }
}

impl From<Vec<PlistValue>> for PlistValue {
    fn from(a: Vec<PlistValue>) -> Self {
        PlistValue::Array(a)
    }
}

impl Serialize for PlistValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PlistValue::String(s) => serializer.serialize_str(s),
            PlistValue::Dictionary(d) => {
                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (k, v) in d {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            PlistValue::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for v in a {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_equality_ignores_order() {
        let mut a = Dictionary::new();
        a.insert("x".into(), "1".into());
        a.insert("y".into(), "2".into());
        let mut b = Dictionary::new();
        b.insert("y".into(), "2".into());
        b.insert("x".into(), "1".into());
        assert_eq!(a, b);
        assert_ne!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    }

    #[test]
    fn serializes_as_plain_json() {
        let mut d = Dictionary::new();
        d.insert("name".into(), "App".into());
        d.insert(
            "files".into(),
            PlistValue::Array(vec!["a.m".into(), PlistValue::Dictionary(Dictionary::new())]),
        );
        let json = serde_json::to_string(&PlistValue::Dictionary(d)).unwrap();
        assert_eq!(json, r#"{"name":"App","files":["a.m",{}]}"#);
    }
}
