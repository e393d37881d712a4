pub mod class_file;
#[cfg(feature = "java")]
pub mod java;
pub mod xml;

use std::path::Path;

use crate::error::Result;
use crate::ir::{ParsedArtifact, SourceText};
use crate::project::Artifact;
use crate::rules::Scope;

/// Deepest element, syntax or annotation nesting a parser accepts. Deeper
/// artifacts are rejected as malformed.
pub const MAX_NESTING: usize = 256;

/// Artifact parser. Each parser turns raw file content into the IR its
/// detectors traverse.
pub trait ArtifactParser: Send + Sync {
    fn parse(&self, path: &Path, content: &[u8]) -> Result<ParsedArtifact>;
}

pub struct XmlParser;

impl ArtifactParser for XmlParser {
    fn parse(&self, path: &Path, content: &[u8]) -> Result<ParsedArtifact> {
        let text = String::from_utf8_lossy(content);
        xml::parse(path, &text).map(ParsedArtifact::Xml)
    }
}

#[cfg(feature = "java")]
pub struct JavaParser;

#[cfg(feature = "java")]
impl ArtifactParser for JavaParser {
    fn parse(&self, path: &Path, content: &[u8]) -> Result<ParsedArtifact> {
        let text = String::from_utf8_lossy(content);
        java::parse(path, &text).map(ParsedArtifact::Syntax)
    }
}

pub struct ClassFileParser;

impl ArtifactParser for ClassFileParser {
    fn parse(&self, path: &Path, content: &[u8]) -> Result<ParsedArtifact> {
        class_file::parse(path, content).map(ParsedArtifact::Class)
    }
}

/// Get the structural parser for a scope, if it has one.
pub fn parser_for_scope(scope: Scope) -> Option<Box<dyn ArtifactParser>> {
    match scope {
        Scope::Manifest | Scope::ResourceFile => Some(Box::new(XmlParser)),
        #[cfg(feature = "java")]
        Scope::JavaFile => Some(Box::new(JavaParser)),
        Scope::ClassFile => Some(Box::new(ClassFileParser)),
        _ => None,
    }
}

/// Whether the raw content of this scope is text worth handing to
/// whole-file scanners.
fn is_textual(scope: Scope) -> bool {
    !matches!(
        scope,
        Scope::ClassFile | Scope::JavaLibraries | Scope::BinaryResource
    )
}

/// Read and parse one artifact. Scopes without a parser yield
/// `ParsedArtifact::Text`.
pub fn parse_artifact(artifact: &Artifact) -> Result<(ParsedArtifact, SourceText)> {
    let content = std::fs::read(&artifact.path)?;
    let source = if is_textual(artifact.scope) {
        SourceText::new(&artifact.path, String::from_utf8_lossy(&content).into_owned())
    } else {
        SourceText::new(&artifact.path, String::new())
    };
    let parsed = match parser_for_scope(artifact.scope) {
        Some(parser) => parser.parse(&artifact.path, &content)?,
        None => ParsedArtifact::Text,
    };
    Ok((parsed, source))
}
