//! Locator codec: converts locator components to filesystem-safe path
//! segments and back.
//!
//! # Segment Grammar
//!
//! - Int: `-?[0-9]+`, e.g. `0`, `-3`
//! - Float: `~` + shortest round-trip representation, e.g. `~1.5`, `~1e-7`.
//!   Negative zero is written as `~0.0`.
//! - Id: `@` + escaped body, e.g. `@cAb12XyZ90`
//! - Seq: `[a,b,...]`, Set: `<a,b,...>`, Map: `{key=value,...}`
//! - Str: `[A-Za-z0-9_+-]` pass through, every other byte becomes `%XX`.
//!   A leading digit or `-` is always escaped so strings never read as
//!   integers. The empty string is a bare `%`.
//!
//! Encoded segments never start with `.`, and any segment containing `.`
//! starts with `~`, `[`, `<` or `{`. File names of the form `name.ext` with a
//! letter-initial `name` can therefore never collide with a child directory.

use std::fmt::Write;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::locator::{Loc, Locator};

lazy_static! {
    static ref INT_TOKEN: Regex = Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap();
}

const EMPTY_STRING: &str = "%";

/// Separator used when joining the segments of a locator suffix into a
/// single document key.
pub const SUFFIX_SEPARATOR: char = '/';

fn is_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'+' || byte == b'-'
}

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b',' | b'=' | b']' | b'>' | b'}')
}

fn escape_into(s: &str, guard_leading: bool, out: &mut String) {
    if s.is_empty() {
        out.push_str(EMPTY_STRING);
        return;
    }
    for (i, &byte) in s.as_bytes().iter().enumerate() {
        let numeric_start = i == 0 && guard_leading && (byte.is_ascii_digit() || byte == b'-');
        if is_safe(byte) && !numeric_start {
            out.push(byte as char);
        } else {
            // Writing to a String cannot fail.
            let _ = write!(out, "%{:02X}", byte);
        }
    }
}

fn encode_into(loc: &Loc, out: &mut String) {
    match loc {
        Loc::Str(s) => escape_into(s, true, out),
        Loc::Int(i) => {
            let _ = write!(out, "{}", i);
        }
        Loc::Float(f) => {
            // -0.0 == 0.0, so both share one segment.
            let f = if *f == 0.0 { 0.0 } else { *f };
            let _ = write!(out, "~{:?}", f);
        }
        Loc::Id(id) => {
            out.push('@');
            escape_into(id, false, out);
        }
        Loc::Seq(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_into(item, out);
            }
            out.push(']');
        }
        Loc::Set(items) => {
            let mut encoded: Vec<String> = items.iter().map(encode).collect();
            encoded.sort();
            encoded.dedup();
            out.push('<');
            out.push_str(&encoded.join(","));
            out.push('>');
        }
        Loc::Map(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                escape_into(key, true, out);
                out.push('=');
                encode_into(value, out);
            }
            out.push('}');
        }
    }
}

/// Encode one locator component as a path segment.
///
/// # Example
///
/// ```rust
/// use locfs_core::{codec, Loc};
///
/// assert_eq!(codec::encode(&Loc::from("sto-3g")), "sto-3g");
/// assert_eq!(codec::encode(&Loc::from(2)), "2");
/// assert_eq!(codec::encode(&Loc::from("2")), "%32");
/// assert_eq!(codec::encode(&Loc::from(vec![vec![0], vec![0, 0]])), "[[0],[0,0]]");
/// ```
pub fn encode(loc: &Loc) -> String {
    let mut out = String::new();
    encode_into(loc, &mut out);
    out
}

/// Decode a path segment produced by [`encode`].
///
/// Fails with [`Error::PathIntegrity`] if the segment is malformed or is not
/// the canonical encoding of the value it decodes to.
pub fn decode(segment: &str) -> Result<Loc> {
    let mut parser = Parser {
        segment,
        bytes: segment.as_bytes(),
        pos: 0,
    };
    let loc = parser.value()?;
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing characters"));
    }

    let reencoded = encode(&loc);
    if reencoded != segment {
        return Err(Error::integrity(
            segment,
            format!("non-canonical encoding (canonical form is '{}')", reencoded),
        ));
    }
    Ok(loc)
}

/// Encode every component of a locator.
pub fn encode_locator(locator: &Locator) -> Vec<String> {
    locator.iter().map(encode).collect()
}

/// Decode a sequence of segments into a locator.
pub fn decode_segments<S: AsRef<str>>(segments: &[S]) -> Result<Locator> {
    segments.iter().map(|s| decode(s.as_ref())).collect()
}

/// Encode a locator suffix as a single key, segments joined by `/`.
pub fn encode_suffix(locator: &Locator) -> String {
    encode_locator(locator).join(&SUFFIX_SEPARATOR.to_string())
}

/// Inverse of [`encode_suffix`]. The empty key is the empty locator.
pub fn decode_suffix(key: &str) -> Result<Locator> {
    if key.is_empty() {
        return Ok(Locator::root());
    }
    let segments: Vec<&str> = key.split(SUFFIX_SEPARATOR).collect();
    decode_segments(&segments)
}

struct Parser<'a> {
    segment: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> Error {
        Error::integrity(self.segment, format!("{} at byte {}", message, self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    /// Advance to the next delimiter and return the bytes passed over.
    fn token(&mut self) -> &str {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if is_delimiter(byte) {
                break;
            }
            self.pos += 1;
        }
        &self.segment[start..self.pos]
    }

    fn value(&mut self) -> Result<Loc> {
        match self.peek() {
            None => Err(self.error("unexpected end of segment")),
            Some(b'[') => {
                self.pos += 1;
                Ok(Loc::Seq(self.items(b']')?))
            }
            Some(b'<') => {
                self.pos += 1;
                Ok(Loc::Set(self.items(b'>')?))
            }
            Some(b'{') => {
                self.pos += 1;
                self.map()
            }
            Some(b'~') => {
                self.pos += 1;
                let token = self.token().to_string();
                token
                    .parse::<f64>()
                    .map(Loc::Float)
                    .map_err(|e| self.error(&format!("invalid float '{}': {}", token, e)))
            }
            Some(b'@') => {
                self.pos += 1;
                let token = self.token().to_string();
                Ok(Loc::Id(self.unescape(&token)?))
            }
            Some(byte) if byte.is_ascii_digit() || byte == b'-' => {
                let token = self.token().to_string();
                if !INT_TOKEN.is_match(&token) {
                    return Err(self.error(&format!("invalid integer '{}'", token)));
                }
                token
                    .parse::<i64>()
                    .map(Loc::Int)
                    .map_err(|e| self.error(&format!("invalid integer '{}': {}", token, e)))
            }
            Some(_) => {
                let token = self.token().to_string();
                Ok(Loc::Str(self.unescape(&token)?))
            }
        }
    }

    fn items(&mut self, close: u8) -> Result<Vec<Loc>> {
        let mut items = Vec::new();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.value()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(byte) if byte == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.error(&format!("expected ',' or '{}'", close as char))),
            }
        }
    }

    fn map(&mut self) -> Result<Loc> {
        let mut map = std::collections::BTreeMap::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Loc::Map(map));
        }
        loop {
            let key_token = self.token().to_string();
            let key = self.unescape(&key_token)?;
            self.expect(b'=')?;
            let value = self.value()?;
            map.insert(key, value);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Loc::Map(map));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn unescape(&self, token: &str) -> Result<String> {
        if token == EMPTY_STRING {
            return Ok(String::new());
        }
        if token.is_empty() {
            return Err(self.error("empty token"));
        }

        let raw = token.as_bytes();
        let mut bytes = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            match raw[i] {
                b'%' => {
                    let hex = token
                        .get(i + 1..i + 3)
                        .ok_or_else(|| self.error("truncated escape"))?;
                    let byte = u8::from_str_radix(hex, 16)
                        .map_err(|_| self.error(&format!("invalid escape '%{}'", hex)))?;
                    bytes.push(byte);
                    i += 3;
                }
                byte if is_safe(byte) => {
                    bytes.push(byte);
                    i += 1;
                }
                byte => {
                    return Err(self.error(&format!("unsafe character '{}'", byte as char)));
                }
            }
        }
        String::from_utf8(bytes).map_err(|_| self.error("escaped bytes are not valid UTF-8"))
    }
}
