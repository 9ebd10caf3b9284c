//! Plist decoder: turns XML or old-style ASCII plist bytes into a [`Dictionary`].
//!
//! The dialect is sniffed from the first significant byte:
//!
//! - `<`: XML plist (`<dict>`, `<key>`, `<string>`, `<array>`), parsed with xml-rs
//! - `bplist` magic: binary plist, rejected as unsupported
//! - anything else: ASCII/"NeXT" plist (`{ key = value; }`, `( a, b )`), the
//!   dialect of legacy `project.pbxproj` files
//!
//! # Accepted subset
//!
//! Only strings, dictionaries and arrays are accepted. Any other plist type
//! (`<integer>`, `<real>`, `<true/>`, `<date>`, `<data>`, ASCII `<hex>` data)
//! anywhere in the tree is an [`XcplistError::Type`], not a parse error. The
//! top-level value must be a dictionary.
//!
//! # Duplicate keys
//!
//! When a dictionary repeats a key, the last value wins and the key keeps the
//! position of its first occurrence.

mod ascii_plist;
mod xml_plist;

use crate::error::{Result, XcplistError};
use crate::value::{Dictionary, PlistValue};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const BINARY_MAGIC: &[u8] = b"bplist";

/// Input dialects recognized by [`sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Xml,
    Ascii,
    Binary,
}

/// Guess the dialect of a plist document from its leading bytes.
pub fn sniff(bytes: &[u8]) -> Dialect {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.starts_with(BINARY_MAGIC) {
        return Dialect::Binary;
    }
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => Dialect::Xml,
        _ => Dialect::Ascii,
    }
}

/// Decode plist bytes in either text dialect.
pub fn decode(bytes: &[u8]) -> Result<Dictionary> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let value = match sniff(bytes) {
        Dialect::Binary => {
            return Err(XcplistError::parse(1, "binary plists are not supported"));
        }
        Dialect::Xml => xml_plist::parse(as_text(bytes)?.as_bytes())?,
        Dialect::Ascii => ascii_plist::parse(as_text(bytes)?)?,
    };
    match value {
        PlistValue::Dictionary(dict) => Ok(dict),
        other => Err(XcplistError::type_error(format!(
            "top-level plist value must be a dict, found {}",
            other.kind_name()
        ))),
    }
}

/// Both text dialects must be UTF-8; anything else is a type error, not a parse error.
fn as_text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| XcplistError::type_error(format!("plist is not valid UTF-8 text: {e}")))
}

/// Decode a plist document that is already text.
pub fn decode_str(text: &str) -> Result<Dictionary> {
    decode(text.as_bytes())
}
