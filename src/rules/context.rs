use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::policy::Policy;
use super::registry::IssueRegistry;
use super::sink::ReportSink;
use super::suppress::{SuppressTarget, SuppressionResolver};
use super::symbols::SymbolResolver;
use super::{Finding, Issue, Scope};
use crate::ir::syntax::NodeId;
use crate::ir::xml::ElementId;
use crate::ir::{Location, ParsedArtifact, SourceText};
use crate::project::Project;

/// Type-indexed scratch storage for detector state.
///
/// Each type gets one slot, created with `Default` on first access.
#[derive(Default)]
pub struct Scratch {
    slots: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Scratch {
    pub fn get<T: Default + Send + 'static>(&mut self) -> &mut T {
        self.slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
            .expect("scratch slot is keyed by its TypeId")
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl std::fmt::Debug for Scratch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scratch")
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// What a reported finding is attached to, for suppression lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Element(ElementId),
    Node(NodeId),
    Method(usize),
    Field(usize),
    Class,
    /// The file as a whole; only configuration can suppress it.
    File,
}

/// State shared by every callback of one run.
pub(crate) struct RunState<'a> {
    pub project: &'a Project,
    pub registry: &'a IssueRegistry,
    pub symbols: &'a dyn SymbolResolver,
    pub suppressions: &'a SuppressionResolver,
    pub policy: &'a Policy,
    pub sink: &'a ReportSink,
    pub project_states: &'a [Mutex<Scratch>],
    pub crashes: &'a AtomicUsize,
}

impl RunState<'_> {
    /// Report a framework diagnostic. Only configuration can silence these.
    pub fn report_internal(&self, issue: &'static Issue, location: Location, message: String) {
        if self
            .suppressions
            .is_suppressed(issue, &location.file, &SuppressTarget::None)
        {
            return;
        }
        let severity = self.policy.effective_severity(issue.id, issue.severity);
        self.sink
            .report(Finding::new(issue, severity, location, message));
    }

    pub fn next_crash(&self) -> usize {
        self.crashes.fetch_add(1, Ordering::SeqCst)
    }
}

/// The file currently being traversed.
#[derive(Clone, Copy)]
pub(crate) struct FileView<'a> {
    pub path: &'a Path,
    pub scope: Scope,
    pub artifact: &'a ParsedArtifact,
    pub source: &'a SourceText,
}

/// Everything a detector callback may look at or write to.
pub struct LintContext<'a> {
    detector: &'static str,
    run: &'a RunState<'a>,
    file: Option<FileView<'a>>,
    file_state: &'a mut Scratch,
    project_state: &'a Mutex<Scratch>,
}

impl<'a> LintContext<'a> {
    pub(crate) fn new(
        detector: &'static str,
        run: &'a RunState<'a>,
        file: Option<FileView<'a>>,
        file_state: &'a mut Scratch,
        project_state: &'a Mutex<Scratch>,
    ) -> Self {
        Self {
            detector,
            run,
            file,
            file_state,
            project_state,
        }
    }

    /// Path of the file being checked; `None` in project-level hooks.
    pub fn path(&self) -> Option<&'a Path> {
        self.file.map(|f| f.path)
    }

    pub fn scope(&self) -> Option<Scope> {
        self.file.map(|f| f.scope)
    }

    pub fn source(&self) -> Option<&'a SourceText> {
        self.file.map(|f| f.source)
    }

    pub fn project(&self) -> &'a Project {
        self.run.project
    }

    pub fn registry(&self) -> &'a IssueRegistry {
        self.run.registry
    }

    pub fn symbols(&self) -> &'a dyn SymbolResolver {
        self.run.symbols
    }

    pub fn is_enabled(&self, issue: &Issue) -> bool {
        self.run.policy.is_enabled(issue)
    }

    /// This detector's state for the current file, fresh for every file.
    pub fn file_state<T: Default + Send + 'static>(&mut self) -> &mut T {
        self.file_state.get::<T>()
    }

    /// This detector's state for the whole run.
    pub fn with_project_state<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default + Send + 'static,
    {
        let mut guard = self
            .project_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(guard.get::<T>())
    }

    pub fn is_suppressed(&self, issue: &Issue, anchor: Anchor, file: &Path) -> bool {
        let target = self.target(anchor);
        self.run.suppressions.is_suppressed(issue, file, &target)
    }

    /// Report an issue unless suppressed. Returns whether a finding was recorded.
    pub fn report(
        &self,
        issue: &'static Issue,
        anchor: Anchor,
        location: Location,
        message: impl Into<String>,
    ) -> bool {
        match self.finding(issue, anchor, location, message.into()) {
            Some(finding) => self.run.sink.report(finding),
            None => false,
        }
    }

    /// Like `report`, but at most one finding of this issue per file.
    pub fn report_once_per_file(
        &self,
        issue: &'static Issue,
        anchor: Anchor,
        location: Location,
        message: impl Into<String>,
    ) -> bool {
        match self.finding(issue, anchor, location, message.into()) {
            Some(finding) => self.run.sink.report_once_per_file(finding),
            None => false,
        }
    }

    fn finding(
        &self,
        issue: &'static Issue,
        anchor: Anchor,
        location: Location,
        message: String,
    ) -> Option<Finding> {
        if !self.run.registry.contains(issue) {
            tracing::warn!(
                detector = self.detector,
                issue = issue.id,
                "detector reported an unregistered issue"
            );
            return None;
        }
        if self.is_suppressed(issue, anchor, &location.file) {
            tracing::trace!(issue = issue.id, file = %location.file.display(), "suppressed");
            return None;
        }
        let severity = self.run.policy.effective_severity(issue.id, issue.severity);
        Some(Finding::new(issue, severity, location, message))
    }

    fn target(&self, anchor: Anchor) -> SuppressTarget<'a> {
        let Some(artifact) = self.file.map(|f| f.artifact) else {
            return SuppressTarget::None;
        };
        match (anchor, artifact) {
            (Anchor::Element(element), ParsedArtifact::Xml(doc)) => {
                SuppressTarget::Xml { doc, element }
            }
            (Anchor::Node(node), ParsedArtifact::Syntax(tree)) => {
                SuppressTarget::Syntax { tree, node }
            }
            (Anchor::Method(method), ParsedArtifact::Class(class)) => SuppressTarget::Bytecode {
                class,
                method: Some(method),
                field: None,
            },
            (Anchor::Field(field), ParsedArtifact::Class(class)) => SuppressTarget::Bytecode {
                class,
                method: None,
                field: Some(field),
            },
            (Anchor::Class, ParsedArtifact::Class(class)) => SuppressTarget::Bytecode {
                class,
                method: None,
                field: None,
            },
            _ => SuppressTarget::None,
        }
    }

    /// Location of a call instruction, mapped to the Java source when the
    /// project contains it.
    pub fn call_location(
        &self,
        class: &crate::ir::ClassArtifact,
        method: usize,
        call: usize,
    ) -> Location {
        let line = class
            .methods
            .get(method)
            .and_then(|m| m.calls.get(call).and_then(|c| c.line).or(m.first_line));
        let file = self
            .run
            .project
            .source_for_class(class)
            .unwrap_or(&class.path);
        match line {
            Some(line) => Location::line(file, line),
            None => Location::file_only(file),
        }
    }
}
