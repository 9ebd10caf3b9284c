//! Old-style ASCII ("NeXT") dialect, as used by `project.pbxproj`.
//!
//! ```text
//! // !$*UTF8*$!
//! {
//!     archiveVersion = 1;
//!     objects = {
//!         1D6058900D05DD3D006BFB54 /* Release */ = {
//!             isa = XCBuildConfiguration;
//!             name = "Release";
//!         };
//!     };
//!     files = ( a.m, "b c.m", );
//! }
//! ```
//!
//! Hand-written recursive descent over the source text. Line numbers are
//! tracked for error messages.

use crate::error::{Result, XcplistError};
use crate::value::{Dictionary, PlistValue};

pub(super) fn parse(text: &str) -> Result<PlistValue> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    if parser.peek().is_none() {
        return Err(XcplistError::parse(parser.line, "empty document"));
    }
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if let Some(c) = parser.peek() {
        return Err(XcplistError::parse(
            parser.line,
            format!("unexpected {c:?} after the top-level value"),
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src, pos: 0, line: 1 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> XcplistError {
        XcplistError::parse(self.line, message)
    }

    fn expect(&mut self, want: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.error(format!("expected {want:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {want:?}, found end of input"))),
        }
    }

    /// Skip whitespace, `// line` comments and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if rest.starts_with("/*") {
                let start_line = self.line;
                self.bump();
                self.bump();
                loop {
                    if self.rest().starts_with("*/") {
                        self.bump();
                        self.bump();
                        break;
                    }
                    if self.bump().is_none() {
                        return Err(XcplistError::parse(start_line, "unterminated comment"));
                    }
                }
            } else if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn parse_value(&mut self) -> Result<PlistValue> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.parse_dictionary().map(PlistValue::Dictionary),
            Some('(') => self.parse_array().map(PlistValue::Array),
            Some('<') => Err(XcplistError::type_error(format!(
                "disallowed plist value type <data> at line {}; \
                 only string, dict and array are supported",
                self.line
            ))),
            Some(c) if c == '"' || is_unquoted_char(c) => self.parse_string().map(PlistValue::String),
            Some(c) => Err(self.error(format!("unexpected {c:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dictionary(&mut self) -> Result<Dictionary> {
        self.expect('{')?;
        let mut dict = Dictionary::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(dict);
                }
                Some(c) if c == '"' || is_unquoted_char(c) => {}
                Some(c) => return Err(self.error(format!("expected a key, found {c:?}"))),
                None => return Err(self.error("unterminated dictionary")),
            }
            let key = self.parse_string()?;
            self.skip_trivia()?;
            self.expect('=')?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(';')?;
            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<Vec<PlistValue>> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.bump();
                return Ok(items);
            }
            if self.peek().is_none() {
                return Err(self.error("unterminated array"));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.bump() {
                Some(',') => {}
                Some(')') => return Ok(items),
                Some(c) => return Err(self.error(format!("expected ',' or ')', found {c:?}"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        if self.peek() == Some('"') {
            return self.parse_quoted();
        }
        let start = self.pos;
        while self.peek().is_some_and(is_unquoted_char) {
            self.bump();
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let start_line = self.line;
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => self.parse_escape(&mut out)?,
                Some(c) => out.push(c),
                None => return Err(XcplistError::parse(start_line, "unterminated string")),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape sequence"))?;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'U' | 'u' => {
                let unit = self.take_digits(16, 4);
                if (0xD800..0xDC00).contains(&unit) && self.rest().starts_with("\\U") {
                    self.bump();
                    self.bump();
                    let low = self.take_digits(16, 4);
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error(format!(
                            "high surrogate U+{unit:04X} followed by U+{low:04X}, not a low surrogate"
                        )));
                    }
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    out.push(self.scalar(combined)?);
                } else {
                    out.push(self.scalar(unit)?);
                }
            }
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(self.scalar(value)?);
            }
            other => out.push(other),
        }
        Ok(())
    }

    /// Consume up to `max` digits in `radix`, returning their value.
    fn take_digits(&mut self, radix: u32, max: usize) -> u32 {
        let mut value = 0;
        for _ in 0..max {
            match self.peek().and_then(|d| d.to_digit(radix)) {
                Some(d) => {
                    value = value * radix + d;
                    self.bump();
                }
                None => break,
            }
        }
        value
    }

    fn scalar(&self, value: u32) -> Result<char> {
        char::from_u32(value)
            .ok_or_else(|| self.error(format!("invalid character escape U+{value:04X}")))
    }
}

/// Characters allowed in an unquoted string.
fn is_unquoted_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '/' | ':' | '.' | '-')
}
