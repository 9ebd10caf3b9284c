//! Value coercion: normalizes caller-supplied data into the restricted plist model.
//!
//! Coercion is expressed as a small closed set of conversion traits, one per
//! accepted input category:
//!
//! - [`ToPlistDictionary`]: anything that can become the root dictionary
//! - [`ToPlistValue`]: strings, booleans, numbers, sequences, maps
//! - [`ToPlistKey`]: anything with a string form usable as a dictionary key
//! - [`ToPlistPath`]: path-like inputs for `read_plist` / `write_plist`
//!
//! Rules applied recursively:
//!
//! - Strings pass through. `OsStr` input must be valid UTF-8.
//! - Booleans become `"1"` / `"0"` (there is no boolean node in the model).
//! - Numbers become their decimal string form.
//! - Keys use their string form, so `1` becomes `"1"`. When two source keys
//!   coerce to the same string, the later one wins.
//! - `serde_json::Value::Null` has no string form and fails.
//!
//! Every failure is an [`XcplistError::Type`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, XcplistError};
use crate::value::{Dictionary, PlistValue};

/// Conversion into a single plist node.
pub trait ToPlistValue {
    fn to_plist_value(&self) -> Result<PlistValue>;
}

/// Conversion into a dictionary key.
pub trait ToPlistKey {
    fn to_plist_key(&self) -> Result<String>;
}

/// Conversion into a root dictionary.
pub trait ToPlistDictionary {
    fn to_plist_dictionary(&self) -> Result<Dictionary>;
}

/// Conversion into a filesystem path.
pub trait ToPlistPath {
    fn to_plist_path(&self) -> Result<PathBuf>;
}

/// Coerce a root input into a [`Dictionary`].
pub fn coerce_root<T: ToPlistDictionary + ?Sized>(input: &T) -> Result<Dictionary> {
    input.to_plist_dictionary()
}

/// Coerce any supported input into a [`PlistValue`].
pub fn coerce_value<T: ToPlistValue + ?Sized>(input: &T) -> Result<PlistValue> {
    input.to_plist_value()
}

/// Coerce a path-like input into a [`PathBuf`].
pub fn coerce_path<P: ToPlistPath + ?Sized>(input: &P) -> Result<PathBuf> {
    input.to_plist_path()
}

/// Structural conversion of an arbitrary `Serialize` type into a dictionary.
///
/// The value is first rendered as a `serde_json::Value`; it must come out as an
/// object, otherwise the conversion fails.
pub fn from_serialize<T: Serialize + ?Sized>(input: &T) -> Result<Dictionary> {
    let value = serde_json::to_value(input)
        .map_err(|e| XcplistError::type_error(format!("cannot convert to a dictionary: {e}")))?;
    value.to_plist_dictionary()
}

/// Wraps any [`Display`] type so it coerces through its string form, as a value
/// or as a key.
#[derive(Debug, Clone, Copy)]
pub struct Stringify<T>(pub T);

impl<T: Display> ToPlistValue for Stringify<T> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(PlistValue::String(self.0.to_string()))
    }
}

impl<T: Display> ToPlistKey for Stringify<T> {
    fn to_plist_key(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

fn os_str_to_string(s: &OsStr) -> Result<String> {
    s.to_str()
        .map(str::to_string)
        .ok_or_else(|| XcplistError::type_error(format!("{s:?} is not valid UTF-8 text")))
}

fn collect_dictionary<'a, K, V, I>(entries: I) -> Result<Dictionary>
where
    K: ToPlistKey + ?Sized + 'a,
    V: ToPlistValue + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut dict = Dictionary::new();
    for (k, v) in entries {
        let key = k.to_plist_key()?;
        let value = v.to_plist_value()?;
        dict.insert(key, value);
    }
    Ok(dict)
}

// ---------------------------------------------------------------------------
// ToPlistValue
// ---------------------------------------------------------------------------

impl<T: ToPlistValue + ?Sized> ToPlistValue for &T {
    fn to_plist_value(&self) -> Result<PlistValue> {
        (**self).to_plist_value()
    }
}

impl<T: ToPlistValue + ?Sized> ToPlistValue for Box<T> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        (**self).to_plist_value()
    }
}

impl ToPlistValue for str {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(PlistValue::String(self.to_string()))
    }
}

impl ToPlistValue for String {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(PlistValue::String(self.clone()))
    }
}

impl ToPlistValue for Cow<'_, str> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(PlistValue::String(self.to_string()))
    }
}

impl ToPlistValue for char {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(PlistValue::String(self.to_string()))
    }
}

impl ToPlistValue for bool {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(PlistValue::String(if *self { "1" } else { "0" }.to_string()))
    }
}

impl ToPlistValue for OsStr {
    fn to_plist_value(&self) -> Result<PlistValue> {
        os_str_to_string(self).map(PlistValue::String)
    }
}

impl ToPlistValue for OsString {
    fn to_plist_value(&self) -> Result<PlistValue> {
        os_str_to_string(self).map(PlistValue::String)
    }
}

macro_rules! display_scalars {
    ($($t:ty),*) => {
        $(
            impl ToPlistValue for $t {
                fn to_plist_value(&self) -> Result<PlistValue> {
                    Ok(PlistValue::String(self.to_string()))
                }
            }

            impl ToPlistKey for $t {
                fn to_plist_key(&self) -> Result<String> {
                    Ok(self.to_string())
                }
            }
        )*
    };
}

display_scalars!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: ToPlistValue> ToPlistValue for [T] {
    fn to_plist_value(&self) -> Result<PlistValue> {
        self.iter()
            .map(ToPlistValue::to_plist_value)
            .collect::<Result<Vec<_>>>()
            .map(PlistValue::Array)
    }
}

impl<T: ToPlistValue, const N: usize> ToPlistValue for [T; N] {
    fn to_plist_value(&self) -> Result<PlistValue> {
        self.as_slice().to_plist_value()
    }
}

impl<T: ToPlistValue> ToPlistValue for Vec<T> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        self.as_slice().to_plist_value()
    }
}

impl<K: ToPlistKey, V: ToPlistValue, S: BuildHasher> ToPlistValue for HashMap<K, V, S> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        self.to_plist_dictionary().map(PlistValue::Dictionary)
    }
}

impl<K: ToPlistKey, V: ToPlistValue> ToPlistValue for BTreeMap<K, V> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        self.to_plist_dictionary().map(PlistValue::Dictionary)
    }
}

impl<K: ToPlistKey, V: ToPlistValue, S: BuildHasher> ToPlistValue for IndexMap<K, V, S> {
    fn to_plist_value(&self) -> Result<PlistValue> {
        self.to_plist_dictionary().map(PlistValue::Dictionary)
    }
}

impl ToPlistValue for PlistValue {
    fn to_plist_value(&self) -> Result<PlistValue> {
        Ok(self.clone())
    }
}

impl ToPlistValue for serde_json::Value {
    fn to_plist_value(&self) -> Result<PlistValue> {
        use serde_json::Value;
        match self {
            Value::Null => Err(XcplistError::type_error(
                "null has no plist representation",
            )),
            Value::Bool(b) => b.to_plist_value(),
            Value::Number(n) => Ok(PlistValue::String(n.to_string())),
            Value::String(s) => Ok(PlistValue::String(s.clone())),
            Value::Array(items) => items.as_slice().to_plist_value(),
            Value::Object(map) => map.to_plist_dictionary().map(PlistValue::Dictionary),
        }
    }
}

// ---------------------------------------------------------------------------
// ToPlistKey
// ---------------------------------------------------------------------------

impl<T: ToPlistKey + ?Sized> ToPlistKey for &T {
    fn to_plist_key(&self) -> Result<String> {
        (**self).to_plist_key()
    }
}

impl ToPlistKey for str {
    fn to_plist_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToPlistKey for String {
    fn to_plist_key(&self) -> Result<String> {
        Ok(self.clone())
    }
}

impl ToPlistKey for Cow<'_, str> {
    fn to_plist_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToPlistKey for char {
    fn to_plist_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToPlistKey for bool {
    fn to_plist_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl ToPlistKey for OsStr {
    fn to_plist_key(&self) -> Result<String> {
        os_str_to_string(self)
    }
}

impl ToPlistKey for OsString {
    fn to_plist_key(&self) -> Result<String> {
        os_str_to_string(self)
    }
}

impl ToPlistKey for serde_json::Value {
    fn to_plist_key(&self) -> Result<String> {
        use serde_json::Value;
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(XcplistError::type_error(format!(
                "{other} cannot be used as a dictionary key"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ToPlistDictionary
// ---------------------------------------------------------------------------

impl<T: ToPlistDictionary + ?Sized> ToPlistDictionary for &T {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        (**self).to_plist_dictionary()
    }
}

impl<K: ToPlistKey, V: ToPlistValue, S: BuildHasher> ToPlistDictionary for HashMap<K, V, S> {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        collect_dictionary(self.iter())
    }
}

impl<K: ToPlistKey, V: ToPlistValue> ToPlistDictionary for BTreeMap<K, V> {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        collect_dictionary(self.iter())
    }
}

impl<K: ToPlistKey, V: ToPlistValue, S: BuildHasher> ToPlistDictionary for IndexMap<K, V, S> {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        collect_dictionary(self.iter())
    }
}

impl<K: ToPlistKey, V: ToPlistValue> ToPlistDictionary for [(K, V)] {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        collect_dictionary(self.iter().map(|(k, v)| (k, v)))
    }
}

impl<K: ToPlistKey, V: ToPlistValue, const N: usize> ToPlistDictionary for [(K, V); N] {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        self.as_slice().to_plist_dictionary()
    }
}

impl<K: ToPlistKey, V: ToPlistValue> ToPlistDictionary for Vec<(K, V)> {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        self.as_slice().to_plist_dictionary()
    }
}

impl ToPlistDictionary for serde_json::Map<String, serde_json::Value> {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        collect_dictionary(self.iter())
    }
}

impl ToPlistDictionary for serde_json::Value {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        match self {
            serde_json::Value::Object(map) => map.to_plist_dictionary(),
            other => Err(XcplistError::type_error(format!(
                "expected a dictionary-like root, got {other}"
            ))),
        }
    }
}

impl ToPlistDictionary for PlistValue {
    fn to_plist_dictionary(&self) -> Result<Dictionary> {
        match self {
            PlistValue::Dictionary(d) => Ok(d.clone()),
            other => Err(XcplistError::type_error(format!(
                "expected a dictionary-like root, got {}",
                other.kind_name()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ToPlistPath
// ---------------------------------------------------------------------------

fn non_empty_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(XcplistError::type_error("empty path"));
    }
    Ok(path.to_path_buf())
}

impl<T: ToPlistPath + ?Sized> ToPlistPath for &T {
    fn to_plist_path(&self) -> Result<PathBuf> {
        (**self).to_plist_path()
    }
}

impl ToPlistPath for Path {
    fn to_plist_path(&self) -> Result<PathBuf> {
        non_empty_path(self)
    }
}

impl ToPlistPath for PathBuf {
    fn to_plist_path(&self) -> Result<PathBuf> {
        non_empty_path(self)
    }
}

impl ToPlistPath for str {
    fn to_plist_path(&self) -> Result<PathBuf> {
        non_empty_path(Path::new(self))
    }
}

impl ToPlistPath for String {
    fn to_plist_path(&self) -> Result<PathBuf> {
        non_empty_path(Path::new(self))
    }
}

impl ToPlistPath for OsStr {
    fn to_plist_path(&self) -> Result<PathBuf> {
        non_empty_path(Path::new(self))
    }
}

impl ToPlistPath for OsString {
    fn to_plist_path(&self) -> Result<PathBuf> {
        non_empty_path(Path::new(self))
    }
}

impl ToPlistPath for serde_json::Value {
    fn to_plist_path(&self) -> Result<PathBuf> {
        match self {
            serde_json::Value::String(s) => s.to_plist_path(),
            other => Err(XcplistError::type_error(format!(
                "{other} cannot be used as a path"
            ))),
        }
    }
}
