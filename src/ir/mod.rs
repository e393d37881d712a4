//! Intermediate representations of the artifacts a lint run inspects.
//!
//! Parsers in `crate::parser` produce these. Detectors only ever see the IR,
//! never the underlying parser types, which keeps the rule engine independent
//! of quick-xml, tree-sitter and the class-file decoder.

pub mod bytecode;
pub mod syntax;
pub mod xml;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use bytecode::ClassArtifact;
pub use syntax::SyntaxTree;
pub use xml::XmlDocument;

/// A point in a source file.
///
/// `line` and `column` are 1-based; `offset` is the 0-based byte offset.
/// A position of all zeros means "no position known".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset
            .cmp(&other.offset)
            .then_with(|| self.line.cmp(&other.line))
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// A span in a file, optionally chained to a related location
/// (for example "first defined here" for a duplicate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub start: Position,
    pub end: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Box<Location>>,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, start: Position, end: Position) -> Self {
        Self {
            file: file.into(),
            start,
            end,
            message: None,
            secondary: None,
        }
    }

    /// A location covering a whole file with no span.
    pub fn file_only(file: impl Into<PathBuf>) -> Self {
        Self::new(file, Position::default(), Position::default())
    }

    /// A location on a single line with no column information.
    pub fn line(file: impl Into<PathBuf>, line: usize) -> Self {
        let pos = Position::new(line, 0, 0);
        Self::new(file, pos, pos)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_secondary(mut self, secondary: Location) -> Self {
        self.secondary = Some(Box::new(secondary));
        self
    }

    pub fn has_position(&self) -> bool {
        self.start.line > 0
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .cmp(&other.file)
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.secondary.cmp(&other.secondary))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        Position::new(line_idx + 1, offset - self.line_starts[line_idx] + 1, offset)
    }

    pub fn location(&self, file: &Path, start: usize, end: usize) -> Location {
        Location::new(file, self.position(start), self.position(end))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Raw text of an artifact, for whole-file scanners.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub path: PathBuf,
    pub content: String,
    pub lines: LineIndex,
}

impl SourceText {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let lines = LineIndex::new(&content);
        Self {
            path: path.into(),
            content,
            lines,
        }
    }

    pub fn location(&self, start: usize, end: usize) -> Location {
        self.lines.location(&self.path, start, end)
    }
}

/// A parsed artifact, ready for dispatch.
#[derive(Debug)]
pub enum ParsedArtifact {
    Xml(XmlDocument),
    Syntax(SyntaxTree),
    Class(ClassArtifact),
    /// No structured representation; only whole-file scanners apply.
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.position(0), Position::new(1, 1, 0));
        assert_eq!(index.position(3), Position::new(2, 1, 3));
        assert_eq!(index.position(4), Position::new(2, 2, 4));
        assert_eq!(index.position(7), Position::new(4, 1, 7));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn line_index_clamps_past_end() {
        let index = LineIndex::new("abc");
        assert_eq!(index.position(99), Position::new(1, 4, 3));
    }

    #[test]
    fn locations_order_by_file_then_offset() {
        let a = Location::new("a.xml", Position::new(3, 1, 40), Position::new(3, 5, 44));
        let b = Location::new("a.xml", Position::new(1, 1, 0), Position::new(1, 5, 4));
        let c = Location::new("b.xml", Position::new(1, 1, 0), Position::new(1, 5, 4));
        let mut locations = vec![c.clone(), a.clone(), b.clone()];
        locations.sort();
        assert_eq!(locations, vec![b, a, c]);
    }
}
