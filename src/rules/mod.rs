pub mod builtin;
pub mod context;
pub mod dispatch;
pub mod driver;
pub mod finding;
pub mod issue;
pub mod policy;
pub mod registry;
pub mod scope;
pub mod sink;
pub mod suppress;
pub mod symbols;

use crate::ir::bytecode::ClassArtifact;
use crate::ir::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::ir::xml::{ElementId, XmlDocument};
use crate::ir::SourceText;

pub use context::{Anchor, LintContext, Scratch};
pub use driver::{Driver, RunOptions, RunOutcome};
pub use finding::Finding;
pub use issue::{Category, Implementation, Issue, Severity};
pub use registry::IssueRegistry;
pub use scope::{Scope, ScopeSet};
pub use sink::ReportSink;
pub use symbols::{ProjectSymbols, SymbolResolver};

/// Reported when an artifact cannot be parsed.
pub static PARSER_ERROR: Issue = Issue::new(
    "ParserError",
    "Parser Errors",
    "Lint will ignore any files that contain fatal parsing errors. These may \
     contain other errors, or contain code which affects issues in other files.",
    Category::Lint,
    10,
    Severity::Error,
    ScopeSet::all(),
);

/// Reported when a detector fails while analysing a file.
pub static LINT_ERROR: Issue = Issue::new(
    "LintError",
    "Lint Failure",
    "This issue type represents a problem running lint itself. Examples include \
     failure to find bytecode for source files (which means certain detectors \
     could not be run), parsing errors in lint configuration files, etc.\n\n\
     These errors are not errors in your own code, but they are shown to make \
     it clear that some checks were not completed.",
    Category::Lint,
    10,
    Severity::Error,
    ScopeSet::all(),
);

/// Issues the framework itself reports, registered ahead of any detector.
pub fn framework_issues() -> [&'static Issue; 2] {
    [&PARSER_ERROR, &LINT_ERROR]
}

/// Names matched by a selector-carrying capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    Names(Vec<String>),
}

impl Selector {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::All
        } else {
            Self::Names(names)
        }
    }

    pub fn is_all(&self) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.is_empty(),
        }
    }
}

/// What a detector wants to be called for. Empty name lists match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// `visit_document` once per XML file.
    Document,
    /// `visit_element` / `visit_element_after` for matching tags.
    Elements(Selector),
    /// `visit_attribute` for matching attribute local names.
    Attributes(Selector),
    /// `visit_node` for matching syntax node kinds.
    SyntaxNodes(Vec<NodeKind>),
    /// `visit_method_call` for calls to methods with these simple names.
    MethodCalls(Vec<String>),
    /// `visit_constructor_call` for these constructed types.
    ConstructorCalls(Vec<String>),
    /// `visit_class` for classes extending these fully qualified types.
    SuperClasses(Vec<String>),
    /// `check_call` for bytecode invocations of matching method names.
    BytecodeCalls(Selector),
    /// `scan_file` once per file in scope.
    WholeFile,
    /// Needs every file of the project; skipped in single-file runs.
    WholeProject,
}

/// Returned by visit callbacks to steer the rest of the traversal for the
/// calling detector only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalControl {
    #[default]
    Continue,
    /// No callbacks for this node's descendants.
    SkipChildren,
    /// No more visit callbacks for this file; `after_check_file` still runs.
    StopFile,
}

/// A lint rule. Implementations are stateless; per-file and per-project
/// state lives in the context's scratch slots.
#[allow(unused_variables)]
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Issues this detector may report.
    fn issues(&self) -> Vec<&'static Issue>;

    fn capabilities(&self) -> Vec<Capability>;

    /// Union of the scopes of this detector's issues.
    fn scope(&self) -> ScopeSet {
        self.issues()
            .iter()
            .fold(ScopeSet::empty(), |acc, issue| acc | issue.scope())
    }

    fn before_check_project(&self, ctx: &mut LintContext<'_>) {}

    fn after_check_project(&self, ctx: &mut LintContext<'_>) {}

    fn before_check_file(&self, ctx: &mut LintContext<'_>) {}

    fn after_check_file(&self, ctx: &mut LintContext<'_>) {}

    fn visit_document(&self, ctx: &mut LintContext<'_>, doc: &XmlDocument) -> TraversalControl {
        TraversalControl::Continue
    }

    fn visit_element(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
    ) -> TraversalControl {
        TraversalControl::Continue
    }

    fn visit_element_after(&self, ctx: &mut LintContext<'_>, doc: &XmlDocument, element: ElementId) {}

    fn visit_attribute(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
        attribute: usize,
    ) -> TraversalControl {
        TraversalControl::Continue
    }

    fn visit_node(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        node: NodeId,
    ) -> TraversalControl {
        TraversalControl::Continue
    }

    fn visit_method_call(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        call: NodeId,
    ) -> TraversalControl {
        TraversalControl::Continue
    }

    fn visit_constructor_call(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        call: NodeId,
    ) -> TraversalControl {
        TraversalControl::Continue
    }

    /// Called for a class whose super type chain contains `super_class`.
    fn visit_class(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        class: NodeId,
        super_class: &str,
    ) -> TraversalControl {
        TraversalControl::Continue
    }

    fn check_call(
        &self,
        ctx: &mut LintContext<'_>,
        class: &ClassArtifact,
        method: usize,
        call: usize,
    ) {
    }

    fn scan_file(&self, ctx: &mut LintContext<'_>, source: &SourceText) {}
}
