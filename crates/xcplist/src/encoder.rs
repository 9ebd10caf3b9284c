//! XML plist encoder: converts a [`Dictionary`] into Xcode's canonical XML layout.
//!
//! The output is byte-stable and matches what Xcode itself writes:
//!
//! - **Fixed prolog**: XML declaration, Apple DOCTYPE and `<plist version="1.0">`
//! - **Tab indentation**: one `\t` per nesting level, the root `<dict>` at column 0
//! - **Insertion order**: dictionary keys are emitted in the order they were inserted
//! - **Minimal escaping**: only `&`, `<` and `>` are replaced with entities
//! - **Self-closed empties**: `<dict/>` and `<array/>`
//! - **Trailing newline** after `</plist>`
//!
//! # Example
//! ```
//! use xcplist::{encode_to_string, Dictionary};
//! let mut dict = Dictionary::new();
//! dict.insert("archiveVersion".into(), "1.0".into());
//! let xml = encode_to_string(&dict);
//! assert!(xml.contains("\t<key>archiveVersion</key>\n\t<string>1.0</string>\n"));
//! ```

use crate::error::{Result, XcplistError};
use crate::value::{Dictionary, PlistValue};

const PROLOG: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
);

const EPILOG: &str = "</plist>\n";

/// Check that every key and string in `dict` can be represented in XML 1.0.
///
/// [`encode`] itself does not check; a control character such as U+0001 would
/// produce a file that no XML reader accepts.
pub fn check_encodable(dict: &Dictionary) -> Result<()> {
    for (key, value) in dict {
        check_text(key)?;
        check_value(value)?;
    }
    Ok(())
}

fn check_value(value: &PlistValue) -> Result<()> {
    match value {
        PlistValue::String(s) => check_text(s),
        PlistValue::Dictionary(dict) => check_encodable(dict),
        PlistValue::Array(items) => items.iter().try_for_each(check_value),
    }
}

fn check_text(s: &str) -> Result<()> {
    match s.chars().find(|&c| !is_xml_char(c)) {
        None => Ok(()),
        Some(c) => Err(XcplistError::type_error(format!(
            "U+{:04X} cannot be stored in an XML plist (in {s:?})",
            c as u32
        ))),
    }
}

/// XML 1.0 `Char` production. Surrogates cannot occur in a `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Encode a dictionary as UTF-8 XML plist bytes.
pub fn encode(dict: &Dictionary) -> Vec<u8> {
    encode_to_string(dict).into_bytes()
}

/// Encode a dictionary as an XML plist document.
pub fn encode_to_string(dict: &Dictionary) -> String {
    let mut out = String::with_capacity(PROLOG.len() + EPILOG.len() + 64);
    out.push_str(PROLOG);
    encode_dictionary(dict, 0, &mut out);
    out.push_str(EPILOG);
    out
}

/// Dispatch a node to its element writer. Every node ends with a newline.
fn encode_value(value: &PlistValue, depth: usize, out: &mut String) {
    match value {
        PlistValue::String(s) => {
            push_indent(depth, out);
            out.push_str("<string>");
            push_escaped(s, out);
            out.push_str("</string>\n");
        }
        PlistValue::Dictionary(dict) => encode_dictionary(dict, depth, out),
        PlistValue::Array(items) => encode_array(items, depth, out),
    }
}

fn encode_dictionary(dict: &Dictionary, depth: usize, out: &mut String) {
    push_indent(depth, out);
    if dict.is_empty() {
        out.push_str("<dict/>\n");
        return;
    }
    out.push_str("<dict>\n");
    for (key, value) in dict {
        push_indent(depth + 1, out);
        out.push_str("<key>");
        push_escaped(key, out);
        out.push_str("</key>\n");
        encode_value(value, depth + 1, out);
    }
    push_indent(depth, out);
    out.push_str("</dict>\n");
}

fn encode_array(items: &[PlistValue], depth: usize, out: &mut String) {
    push_indent(depth, out);
    if items.is_empty() {
        out.push_str("<array/>\n");
        return;
    }
    out.push_str("<array>\n");
    for item in items {
        encode_value(item, depth + 1, out);
    }
    push_indent(depth, out);
    out.push_str("</array>\n");
}

/// Character data escaping. Quotes are left alone, as Xcode does.
fn push_escaped(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters_only() {
        let mut out = String::new();
        push_escaped(r#"a < b && c > "d" 'e'"#, &mut out);
        assert_eq!(out, r#"a &lt; b &amp;&amp; c &gt; "d" 'e'"#);
    }

    #[test]
    fn control_characters_are_not_encodable() {
        for bad in ["a\u{1}b", "\u{0}", "\u{B}", "\u{1F}", "\u{FFFE}", "\u{FFFF}"] {
            let mut dict = Dictionary::new();
            dict.insert("k".into(), PlistValue::Array(vec![bad.into()]));
            assert!(check_encodable(&dict).is_err(), "{bad:?} should be rejected");

            let mut keyed = Dictionary::new();
            keyed.insert(bad.to_string(), "v".into());
            assert!(check_encodable(&keyed).is_err(), "{bad:?} key should be rejected");
        }
    }

    #[test]
    fn whitespace_and_astral_characters_are_encodable() {
        let mut dict = Dictionary::new();
        dict.insert("k".into(), "tab\there\nline\r 😀 \u{FFFD} \u{E000}".into());
        assert!(check_encodable(&dict).is_ok());
    }

    #[test]
    fn indent_is_tabs() {
        let mut out = String::new();
        push_indent(3, &mut out);
        assert_eq!(out, "\t\t\t");
    }
}
