use std::path::{Path, PathBuf};

use super::Location;

/// Index of a node within its `SyntaxTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// The node kinds detectors can select on.
///
/// Source constructs without a dedicated kind are kept as `Other` so that
/// call arguments and initializers always have a node to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Class,
    Method,
    Constructor,
    Field,
    LocalVariable,
    Parameter,
    MethodCall,
    ConstructorCall,
    Literal,
    Reference,
    Unary,
    Parenthesized,
    Other,
}

impl NodeKind {
    /// Declarations that can carry annotations.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Method
                | Self::Constructor
                | Self::Field
                | Self::LocalVariable
                | Self::Parameter
        )
    }

    /// Declarations whose annotations do not survive compilation to class files.
    pub fn is_local_declaration(self) -> bool {
        matches!(self, Self::LocalVariable | Self::Parameter)
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Null,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    /// Name as written, e.g. `SuppressLint` or `android.annotation.SuppressLint`.
    pub name: String,
    /// String literal values, whether given directly, as an array, or as `value = ...`.
    pub values: Vec<String>,
    pub location: Location,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Declared name, called method name, constructed type, referenced
    /// identifier, or unary operator.
    pub name: Option<String>,
    /// Call receiver or qualifier text (`webview` in `webview.load()`).
    pub receiver: Option<String>,
    /// Declared type of a variable, field or parameter; full type text of
    /// a constructor call including type arguments.
    pub type_name: Option<String>,
    pub arguments: Vec<NodeId>,
    pub initializer: Option<NodeId>,
    /// Super class followed by implemented interfaces, as written.
    pub supertypes: Vec<String>,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub literal: Option<Literal>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub location: Location,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, location: Location) -> Self {
        Self {
            kind,
            name: None,
            receiver: None,
            type_name: None,
            arguments: Vec::new(),
            initializer: None,
            supertypes: Vec::new(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            literal: None,
            parent: None,
            children: Vec::new(),
            location,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// A parsed source file, stored as an arena of nodes rooted at a `File` node.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub path: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<String>,
    source: String,
    nodes: Vec<SyntaxNode>,
    /// `//noinspection` comments: (line, text after the marker).
    suppress_comments: Vec<(usize, String)>,
}

impl SyntaxTree {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: None,
            imports: Vec::new(),
            source: source.into(),
            nodes: Vec::new(),
            suppress_comments: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Source text covered by a node.
    pub fn text(&self, id: NodeId) -> &str {
        let loc = &self.nodes[id.0].location;
        self.source
            .get(loc.start.offset..loc.end.offset)
            .unwrap_or("")
    }

    /// The node itself followed by its ancestors up to the file node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        std::iter::successors(Some(id), move |cur| self.nodes[cur.0].parent)
            .map(move |i| (i, &self.nodes[i.0]))
    }

    /// Nearest strict ancestor of the given kind.
    pub fn enclosing(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id)
            .skip(1)
            .find(|(_, n)| n.kind == kind)
            .map(|(i, _)| i)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes[id.0]
            .children
            .iter()
            .map(move |&c| (c, &self.nodes[c.0]))
            .filter(move |(_, n)| n.kind == kind)
    }

    /// Append a node under `parent` (or as the root when `None`).
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        node.children.clear();
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn add_suppress_comment(&mut self, line: usize, text: impl Into<String>) {
        self.suppress_comments.push((line, text.into()));
    }

    /// `//noinspection` text on the given line, if any.
    pub fn suppress_comment_at(&self, line: usize) -> Option<&str> {
        self.suppress_comments
            .iter()
            .find(|(l, _)| *l == line)
            .map(|(_, text)| text.as_str())
    }

    pub fn has_suppress_comments(&self) -> bool {
        !self.suppress_comments.is_empty()
    }

    /// Best-effort qualification of a type name through the file's imports.
    ///
    /// Returns `None` when the name cannot be pinned to a single class
    /// (no single-type import matches and the name is unqualified).
    pub fn qualify(&self, type_name: &str) -> Option<String> {
        let name = strip_type_arguments(type_name);
        if name.contains('.') {
            return Some(name.to_string());
        }
        self.imports
            .iter()
            .find(|import| import.rsplit('.').next() == Some(name) && !import.ends_with('*'))
            .cloned()
    }
}

/// Last segment of a dotted name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `Map<String, List<Foo>>[]` → `Map`.
pub fn strip_type_arguments(type_name: &str) -> &str {
    let end = type_name
        .find(|c: char| c == '<' || c == '[')
        .unwrap_or(type_name.len());
    type_name[..end].trim()
}
