//! XML dialect, driven by xml-rs pull events.
//!
//! Open elements are kept on an explicit stack of [`Frame`]s; a finished node is
//! attached to whatever frame is underneath it.

use ::xml::common::Position;
use ::xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::error::{Result, XcplistError};
use crate::value::{Dictionary, PlistValue};

enum Frame {
    Plist(Option<PlistValue>),
    Dict {
        dict: Dictionary,
        pending_key: Option<String>,
    },
    Array(Vec<PlistValue>),
    Key(String),
    String(String),
}

const DISALLOWED: &[&str] = &["integer", "real", "true", "false", "date", "data"];

pub(super) fn parse(bytes: &[u8]) -> Result<PlistValue> {
    let mut reader = ParserConfig::new()
        .trim_whitespace(false)
        .whitespace_to_characters(true)
        .cdata_to_characters(true)
        .coalesce_characters(true)
        .ignore_comments(true)
        .create_reader(bytes);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<PlistValue> = None;

    loop {
        let event = reader
            .next()
            .map_err(|e| XcplistError::parse(e.position().row as usize + 1, e.to_string()))?;
        let line = current_line(&reader);

        match event {
            XmlEvent::StartElement { name, .. } => {
                let tag = name.local_name;
                if matches!(stack.last(), Some(Frame::Key(_) | Frame::String(_))) {
                    return Err(XcplistError::parse(
                        line,
                        format!("unexpected <{tag}> inside a text element"),
                    ));
                }
                if stack.is_empty() && root.is_some() {
                    return Err(XcplistError::parse(
                        line,
                        format!("unexpected <{tag}> after the top-level value"),
                    ));
                }
                match tag.as_str() {
                    "plist" if stack.is_empty() => stack.push(Frame::Plist(None)),
                    "dict" => stack.push(Frame::Dict {
                        dict: Dictionary::new(),
                        pending_key: None,
                    }),
                    "array" => stack.push(Frame::Array(Vec::new())),
                    "string" => stack.push(Frame::String(String::new())),
                    "key" => match stack.last() {
                        Some(Frame::Dict {
                            pending_key: None, ..
                        }) => stack.push(Frame::Key(String::new())),
                        Some(Frame::Dict {
                            pending_key: Some(key),
                            ..
                        }) => {
                            return Err(XcplistError::parse(
                                line,
                                format!("key {key:?} has no value"),
                            ));
                        }
                        _ => {
                            return Err(XcplistError::parse(line, "<key> outside of a <dict>"));
                        }
                    },
                    t if DISALLOWED.contains(&t) => {
                        return Err(XcplistError::type_error(format!(
                            "disallowed plist value type <{t}> at line {line}; \
                             only string, dict and array are supported"
                        )));
                    }
                    t => {
                        return Err(XcplistError::parse(line, format!("unknown element <{t}>")));
                    }
                }
            }
            XmlEvent::EndElement { .. } => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| XcplistError::parse(line, "unbalanced closing tag"))?;
                match frame {
                    Frame::Key(key) => match stack.last_mut() {
                        Some(Frame::Dict { pending_key, .. }) => *pending_key = Some(key),
                        _ => return Err(XcplistError::parse(line, "<key> outside of a <dict>")),
                    },
                    Frame::String(s) => attach(&mut stack, &mut root, PlistValue::String(s), line)?,
                    Frame::Array(items) => {
                        attach(&mut stack, &mut root, PlistValue::Array(items), line)?
                    }
                    Frame::Dict { dict, pending_key } => {
                        if let Some(key) = pending_key {
                            return Err(XcplistError::parse(
                                line,
                                format!("key {key:?} has no value"),
                            ));
                        }
                        attach(&mut stack, &mut root, PlistValue::Dictionary(dict), line)?;
                    }
                    Frame::Plist(value) => {
                        let value = value
                            .ok_or_else(|| XcplistError::parse(line, "<plist> has no value"))?;
                        root = Some(value);
                    }
                }
            }
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                match stack.last_mut() {
                    Some(Frame::Key(buf)) | Some(Frame::String(buf)) => buf.push_str(&text),
                    _ if text.trim().is_empty() => {}
                    _ => {
                        return Err(XcplistError::parse(
                            line,
                            format!("unexpected text {:?}", text.trim()),
                        ));
                    }
                }
            }
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }

    root.ok_or_else(|| XcplistError::parse(1, "document contains no plist value"))
}

/// Attach a finished node to its parent frame, or make it the document root.
fn attach(
    stack: &mut [Frame],
    root: &mut Option<PlistValue>,
    value: PlistValue,
    line: usize,
) -> Result<()> {
    match stack.last_mut() {
        None => {
            *root = Some(value);
            Ok(())
        }
        Some(Frame::Plist(slot)) => {
            if slot.is_some() {
                return Err(XcplistError::parse(line, "<plist> holds more than one value"));
            }
            *slot = Some(value);
            Ok(())
        }
        Some(Frame::Dict { dict, pending_key }) => match pending_key.take() {
            Some(key) => {
                dict.insert(key, value);
                Ok(())
            }
            None => Err(XcplistError::parse(
                line,
                format!("<{}> in a <dict> without a preceding <key>", value.kind_name()),
            )),
        },
        Some(Frame::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(Frame::Key(_) | Frame::String(_)) => Err(XcplistError::parse(
            line,
            "element nested inside a text element",
        )),
    }
}

fn current_line<R: std::io::Read>(reader: &EventReader<R>) -> usize {
    reader.position().row as usize + 1
}
