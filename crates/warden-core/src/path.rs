//! # Path Compiler
//!
//! Compiles the dotted/bracketed path syntax into a [`SchemaPath`]: an
//! ordered list of `(symbol, separator)` segments.
//!
//! ## Grammar
//!
//! ```text
//! path      := "" | segment+
//! segment   := symbol separator
//! symbol    := [A-Za-z0-9_]+
//! separator := "[]." | "[]" | "." | ""
//! ```
//!
//! | Separator | Kind | Meaning |
//! |-----------|------|---------|
//! | `""`   | [`SeparatorKind::Leaf`] | final scalar-or-opaque value |
//! | `"."`  | [`SeparatorKind::Object`] | descend into a map |
//! | `"[]"` | [`SeparatorKind::FlatList`] | final list of non-containers |
//! | `"[]."`| [`SeparatorKind::ObjectList`] | list of maps, descend per element |
//!
//! Every non-final segment must be `Object` or `ObjectList`; the final
//! segment must be `Leaf` or `FlatList`. The empty string is the root path.
//!
//! The scanner is strict: every byte of the input must be consumed by the
//! grammar. There is no escaping, so symbols can never contain `.`, `[`
//! or `]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathSyntaxError;

/// How a segment connects to what follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeparatorKind {
    /// `""` — final scalar-or-opaque leaf.
    Leaf,
    /// `"."` — descend into a map.
    Object,
    /// `"[]"` — final flat list of non-container values.
    FlatList,
    /// `"[]."` — list of maps; descend once per element.
    ObjectList,
}

impl SeparatorKind {
    /// The separator as written in path syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leaf => "",
            Self::Object => ".",
            Self::FlatList => "[]",
            Self::ObjectList => "[].",
        }
    }

    /// Returns true for the kinds allowed only in final position.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Leaf | Self::FlatList)
    }
}

impl fmt::Display for SeparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(symbol, separator)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    symbol: String,
    kind: SeparatorKind,
}

impl Segment {
    /// The key this segment looks up.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// How this segment connects to the next.
    pub fn kind(&self) -> SeparatorKind {
        self.kind
    }
}

/// A compiled path.
///
/// The only constructors go through the compiler, so a `SchemaPath` always
/// satisfies the grammar and the segment-position rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaPath {
    raw: String,
    segments: Vec<Segment>,
}

impl SchemaPath {
    /// The zero-segment path that addresses the root value itself.
    pub fn root() -> Self {
        Self {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    /// Compile a path string.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError`] if the string is not a valid path.
    pub fn compile(path: &str) -> Result<Self, PathSyntaxError> {
        Self::compile_named(path, "")
    }

    /// Compile a path string, tagging any error with a debug name.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError`] when:
    /// - a byte is not consumed by the grammar (leading, trailing, or
    ///   interleaved garbage, including doubled separators);
    /// - a non-final segment ends in `"[]"` or has no separator;
    /// - the final segment ends in `"."` or `"[]."`.
    pub fn compile_named(path: &str, name: &str) -> Result<Self, PathSyntaxError> {
        let fail = |position: usize, reason: String| PathSyntaxError {
            path: path.to_string(),
            name: name.to_string(),
            position,
            reason,
        };

        let scanned = scan(path).map_err(|(position, reason)| fail(position, reason))?;

        let last = scanned.len().saturating_sub(1);
        for (i, (offset, segment)) in scanned.iter().enumerate() {
            if i < last && segment.kind.is_terminal() {
                return Err(fail(
                    *offset,
                    format!(
                        "segment \"{}{}\" must be followed by \".\" or \"[].\" to continue the path",
                        segment.symbol, segment.kind
                    ),
                ));
            }
            if i == last && !segment.kind.is_terminal() {
                return Err(fail(
                    path.len(),
                    format!("path cannot end with \"{}\"", segment.kind),
                ));
            }
        }

        Ok(Self {
            raw: path.to_string(),
            segments: scanned.into_iter().map(|(_, segment)| segment).collect(),
        })
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The compiled segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Check a path without running it against data.
///
/// # Errors
///
/// Returns [`PathSyntaxError`] if the path does not compile.
pub fn test_path(path: &str, name: &str) -> Result<(), PathSyntaxError> {
    SchemaPath::compile_named(path, name).map(|_| ())
}

fn is_symbol_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split a path into segments, remembering where each one starts.
fn scan(path: &str) -> Result<Vec<(usize, Segment)>, (usize, String)> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && is_symbol_byte(bytes[pos]) {
            pos += 1;
        }
        if pos == start {
            return Err((pos, format!("expected a symbol, found {}", describe(path, pos))));
        }
        let symbol = &path[start..pos];

        let rest = &path[pos..];
        let kind = if rest.starts_with("[].") {
            SeparatorKind::ObjectList
        } else if rest.starts_with("[]") {
            SeparatorKind::FlatList
        } else if rest.starts_with('.') {
            SeparatorKind::Object
        } else if rest.is_empty() {
            SeparatorKind::Leaf
        } else {
            return Err((
                pos,
                format!(
                    "unexpected {} after symbol \"{symbol}\"",
                    describe(path, pos)
                ),
            ));
        };
        pos += kind.as_str().len();

        segments.push((
            start,
            Segment {
                symbol: symbol.to_string(),
                kind,
            },
        ));
    }

    Ok(segments)
}

fn describe(path: &str, pos: usize) -> String {
    match path[pos..].chars().next() {
        Some(c) => format!("{c:?}"),
        None => "end of path".to_string(),
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", segment.symbol, segment.kind)?;
        }
        Ok(())
    }
}

impl FromStr for SchemaPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl Serialize for SchemaPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for SchemaPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::compile(&raw).map_err(serde::de::Error::custom)
    }
}
