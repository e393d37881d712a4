//! Routes traversal events to the detectors that asked for them.
//!
//! Each artifact is walked once. At every node the interested detectors
//! are looked up by key, merged, and called in registration order.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use super::context::{FileView, LintContext, RunState, Scratch};
use super::symbols::qualified_class_name;
use super::{Capability, Detector, ScopeSet, Selector, TraversalControl, LINT_ERROR};
use crate::error::{LintError, Result};
use crate::ir::syntax::{simple_name, strip_type_arguments, NodeId, NodeKind, SyntaxTree};
use crate::ir::xml::{ElementId, XmlDocument};
use crate::ir::{ClassArtifact, Location, ParsedArtifact};

/// At most this many detector failures are turned into findings per run.
pub const MAX_REPORTED_CRASHES: usize = 20;

/// Detector indices keyed by name, plus the wildcard subscribers.
#[derive(Debug, Default)]
struct NameIndex {
    by_name: HashMap<String, Vec<usize>>,
    /// Qualified selectors keyed by their simple name, for names that could
    /// not be qualified at the use site.
    by_simple_name: HashMap<String, Vec<usize>>,
    wildcard: Vec<usize>,
}

impl NameIndex {
    fn add(&mut self, names: &[String], detector: usize) {
        if names.is_empty() {
            self.wildcard.push(detector);
            return;
        }
        for name in names {
            self.by_name.entry(name.clone()).or_default().push(detector);
            if name.contains('.') {
                self.by_simple_name
                    .entry(simple_name(name).to_string())
                    .or_default()
                    .push(detector);
            }
        }
    }

    fn add_selector(&mut self, selector: &Selector, detector: usize) {
        match selector {
            Selector::All => self.wildcard.push(detector),
            Selector::Names(names) => self.add(names, detector),
        }
    }

    /// Detectors subscribed to any of `keys`, ascending and without repeats.
    fn lookup(&self, keys: &[&str], unresolved: Option<&str>) -> Vec<usize> {
        let mut found = self.wildcard.clone();
        for key in keys {
            if let Some(ids) = self.by_name.get(*key) {
                found.extend_from_slice(ids);
            }
        }
        if let Some(ids) = unresolved.and_then(|name| self.by_simple_name.get(name)) {
            found.extend_from_slice(ids);
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Which detectors want which callbacks, built once per driver.
#[derive(Debug, Default)]
pub struct VisitorRegistry {
    document: Vec<usize>,
    elements: NameIndex,
    attributes: NameIndex,
    node_kinds: HashMap<NodeKind, Vec<usize>>,
    all_nodes: Vec<usize>,
    method_calls: NameIndex,
    constructor_calls: NameIndex,
    super_classes: HashMap<String, Vec<usize>>,
    super_simple_names: HashMap<String, Vec<(usize, String)>>,
    bytecode_calls: NameIndex,
    whole_file: Vec<usize>,
    whole_project: Vec<bool>,
}

impl VisitorRegistry {
    /// Index every detector's capabilities. Fails if a capability can never
    /// fire because the detector's scope excludes the artifacts it needs.
    pub fn build(detectors: &[Box<dyn Detector>]) -> Result<Self> {
        let mut registry = Self {
            whole_project: vec![false; detectors.len()],
            ..Self::default()
        };

        for (index, detector) in detectors.iter().enumerate() {
            let scope = detector.scope();
            for capability in detector.capabilities() {
                check_scope(detector.name(), scope, &capability)?;
                match capability {
                    Capability::Document => registry.document.push(index),
                    Capability::Elements(selector) => {
                        registry.elements.add_selector(&selector, index)
                    }
                    Capability::Attributes(selector) => {
                        registry.attributes.add_selector(&selector, index)
                    }
                    Capability::SyntaxNodes(kinds) if kinds.is_empty() => {
                        registry.all_nodes.push(index)
                    }
                    Capability::SyntaxNodes(kinds) => {
                        for kind in kinds {
                            registry.node_kinds.entry(kind).or_default().push(index);
                        }
                    }
                    Capability::MethodCalls(names) => registry.method_calls.add(&names, index),
                    Capability::ConstructorCalls(names) => {
                        registry.constructor_calls.add(&names, index)
                    }
                    Capability::SuperClasses(names) => {
                        for name in names {
                            registry
                                .super_simple_names
                                .entry(simple_name(&name).to_string())
                                .or_default()
                                .push((index, name.clone()));
                            registry.super_classes.entry(name).or_default().push(index);
                        }
                    }
                    Capability::BytecodeCalls(selector) => {
                        registry.bytecode_calls.add_selector(&selector, index)
                    }
                    Capability::WholeFile => registry.whole_file.push(index),
                    Capability::WholeProject => registry.whole_project[index] = true,
                }
            }
        }
        tracing::debug!(detectors = detectors.len(), "built visitor registry");
        Ok(registry)
    }

    pub fn needs_whole_project(&self, detector: usize) -> bool {
        self.whole_project.get(detector).copied().unwrap_or(false)
    }

    fn node_subscribers(&self, kind: NodeKind) -> Vec<usize> {
        let mut found = self.all_nodes.clone();
        if let Some(ids) = self.node_kinds.get(&kind) {
            found.extend_from_slice(ids);
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    /// For each subscribed detector, the first registered super class found
    /// in `chain` (nearest first).
    fn super_class_subscribers(&self, chain: &[String]) -> Vec<(usize, String)> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for ancestor in chain {
            let mut hits: Vec<(usize, String)> = self
                .super_classes
                .get(ancestor)
                .into_iter()
                .flatten()
                .map(|&i| (i, ancestor.clone()))
                .collect();
            if !ancestor.contains('.') {
                hits.extend(self.super_simple_names.get(ancestor).into_iter().flatten().cloned());
            }
            for (index, name) in hits {
                if !found.iter().any(|(i, _)| *i == index) {
                    found.push((index, name));
                }
            }
        }
        found.sort_by_key(|(i, _)| *i);
        found
    }
}

fn check_scope(detector: &str, scope: ScopeSet, capability: &Capability) -> Result<()> {
    let (needed, what) = match capability {
        Capability::Document | Capability::Elements(_) | Capability::Attributes(_) => (
            ScopeSet::XML,
            "XML callbacks need MANIFEST, RESOURCE_FILE or ALL_RESOURCE_FILES",
        ),
        Capability::SyntaxNodes(_)
        | Capability::MethodCalls(_)
        | Capability::ConstructorCalls(_)
        | Capability::SuperClasses(_) => (ScopeSet::JAVA_FILE, "source callbacks need JAVA_FILE"),
        Capability::BytecodeCalls(_) => (
            ScopeSet::BYTECODE,
            "bytecode callbacks need CLASS_FILE or JAVA_LIBRARIES",
        ),
        Capability::WholeFile | Capability::WholeProject => return Ok(()),
    };
    if scope.intersects(needed) {
        Ok(())
    } else {
        Err(LintError::ScopeMismatch {
            detector: detector.to_string(),
            message: format!("{what}, declared scope is {scope}"),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    stopped: bool,
    /// Depth of the node that asked to skip its children.
    skip_below: Option<usize>,
}

impl Cursor {
    fn is_active(&self, depth: usize) -> bool {
        !self.stopped && self.skip_below.map_or(true, |s| depth <= s)
    }

    fn apply(&mut self, control: TraversalControl, depth: usize) {
        match control {
            TraversalControl::Continue => {}
            TraversalControl::SkipChildren => {
                if self.skip_below.is_none() {
                    self.skip_below = Some(depth);
                }
            }
            TraversalControl::StopFile => self.stopped = true,
        }
    }

    fn leave(&mut self, depth: usize) {
        if self.skip_below == Some(depth) {
            self.skip_below = None;
        }
    }
}

/// Run `f` for one detector, containing any panic.
pub(crate) fn guarded<R>(
    run: &RunState<'_>,
    detector: &dyn Detector,
    callback: &'static str,
    file: &Path,
    f: impl FnOnce() -> R,
) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => Some(result),
        Err(payload) => {
            report_crash(run, detector.name(), callback, file, payload.as_ref());
            None
        }
    }
}

fn report_crash(
    run: &RunState<'_>,
    detector: &str,
    callback: &str,
    file: &Path,
    payload: &(dyn Any + Send),
) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into());
    let count = run.next_crash();
    tracing::error!(
        detector,
        callback,
        file = %file.display(),
        "detector panicked: {message}"
    );
    if count < MAX_REPORTED_CRASHES {
        run.report_internal(
            &LINT_ERROR,
            Location::file_only(file),
            format!(
                "Unexpected failure during lint analysis of {} (this is a bug in the \
                 {detector} detector): {message} in {callback}",
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ),
        );
    }
}

/// One traversal of one file.
pub(crate) struct FileDispatch<'d, 'a> {
    visitors: &'d VisitorRegistry,
    detectors: &'d [Box<dyn Detector>],
    run: &'a RunState<'a>,
    view: FileView<'a>,
    applicable: Vec<bool>,
    cursors: Vec<Cursor>,
    states: Vec<Scratch>,
}

impl<'d, 'a> FileDispatch<'d, 'a> {
    pub fn new(
        visitors: &'d VisitorRegistry,
        detectors: &'d [Box<dyn Detector>],
        run: &'a RunState<'a>,
        view: FileView<'a>,
        applicable: Vec<bool>,
    ) -> Self {
        let n = detectors.len();
        Self {
            visitors,
            detectors,
            run,
            view,
            applicable,
            cursors: vec![Cursor::default(); n],
            states: (0..n).map(|_| Scratch::default()).collect(),
        }
    }

    /// `before_check_file`, the walk, whole-file scans, then `after_check_file`.
    pub fn run(mut self) {
        let all: Vec<usize> = (0..self.detectors.len())
            .filter(|&i| self.applicable[i])
            .collect();
        for &i in &all {
            self.call(i, "before_check_file", |d, ctx| d.before_check_file(ctx));
        }

        let artifact = self.view.artifact;
        match artifact {
            ParsedArtifact::Xml(doc) => self.walk_document(doc),
            ParsedArtifact::Syntax(tree) => {
                if let Some(root) = tree.root() {
                    self.walk_node(tree, root, 0);
                }
            }
            ParsedArtifact::Class(class) => self.walk_class(class),
            ParsedArtifact::Text => {}
        }

        let source = self.view.source;
        for i in self.select(self.visitors.whole_file.clone(), 0) {
            self.call(i, "scan_file", |d, ctx| d.scan_file(ctx, source));
        }

        for &i in &all {
            self.call(i, "after_check_file", |d, ctx| d.after_check_file(ctx));
        }
    }

    fn call<R>(
        &mut self,
        index: usize,
        callback: &'static str,
        f: impl FnOnce(&dyn Detector, &mut LintContext<'_>) -> R,
    ) -> Option<R> {
        let detectors = self.detectors;
        let detector = detectors[index].as_ref();
        let mut ctx = LintContext::new(
            detector.name(),
            self.run,
            Some(self.view),
            &mut self.states[index],
            &self.run.project_states[index],
        );
        guarded(self.run, detector, callback, self.view.path, || {
            f(detector, &mut ctx)
        })
    }

    /// Call a visit callback and record the traversal decision it returns.
    fn visit(
        &mut self,
        index: usize,
        depth: usize,
        callback: &'static str,
        f: impl FnOnce(&dyn Detector, &mut LintContext<'_>) -> TraversalControl,
    ) {
        if let Some(control) = self.call(index, callback, f) {
            self.cursors[index].apply(control, depth);
        }
    }

    fn select(&self, candidates: Vec<usize>, depth: usize) -> Vec<usize> {
        candidates
            .into_iter()
            .filter(|&i| self.applicable[i] && self.cursors[i].is_active(depth))
            .collect()
    }

    fn leave(&mut self, depth: usize) {
        for cursor in &mut self.cursors {
            cursor.leave(depth);
        }
    }

    fn walk_document(&mut self, doc: &XmlDocument) {
        for i in self.select(self.visitors.document.clone(), 0) {
            self.visit(i, 0, "visit_document", |d, ctx| d.visit_document(ctx, doc));
        }
        if let Some(root) = doc.root() {
            self.walk_element(doc, root, 1);
        }
    }

    fn walk_element(&mut self, doc: &XmlDocument, id: ElementId, depth: usize) {
        let element = doc.element(id);
        let matched = self.select(
            self.visitors
                .elements
                .lookup(&[element.tag.as_str(), element.local_name.as_str()], None),
            depth,
        );
        for &i in &matched {
            self.visit(i, depth, "visit_element", |d, ctx| {
                d.visit_element(ctx, doc, id)
            });
        }

        for (index, attribute) in element.attributes.iter().enumerate() {
            let subscribers = self
                .visitors
                .attributes
                .lookup(&[attribute.local_name.as_str()], None);
            for i in self.select(subscribers, depth) {
                self.visit(i, depth, "visit_attribute", |d, ctx| {
                    d.visit_attribute(ctx, doc, id, index)
                });
            }
        }

        for &child in &element.children {
            self.walk_element(doc, child, depth + 1);
        }

        for i in self.select(matched, depth) {
            self.call(i, "visit_element_after", |d, ctx| {
                d.visit_element_after(ctx, doc, id)
            });
        }
        self.leave(depth);
    }

    fn walk_node(&mut self, tree: &SyntaxTree, id: NodeId, depth: usize) {
        let node = tree.node(id);

        for i in self.select(self.visitors.node_subscribers(node.kind), depth) {
            self.visit(i, depth, "visit_node", |d, ctx| d.visit_node(ctx, tree, id));
        }

        match node.kind {
            NodeKind::MethodCall => {
                let subscribers = self.visitors.method_calls.lookup(&[node.name()], None);
                for i in self.select(subscribers, depth) {
                    self.visit(i, depth, "visit_method_call", |d, ctx| {
                        d.visit_method_call(ctx, tree, id)
                    });
                }
            }
            NodeKind::ConstructorCall => {
                let written = strip_type_arguments(node.type_name.as_deref().unwrap_or(""));
                let qualified = tree.qualify(written);
                let mut keys = vec![written];
                keys.extend(qualified.as_deref());
                let unresolved = qualified.is_none().then_some(written);
                let subscribers = self.visitors.constructor_calls.lookup(&keys, unresolved);
                for i in self.select(subscribers, depth) {
                    self.visit(i, depth, "visit_constructor_call", |d, ctx| {
                        d.visit_constructor_call(ctx, tree, id)
                    });
                }
            }
            NodeKind::Class if !self.visitors.super_classes.is_empty() => {
                let chain = self
                    .run
                    .symbols
                    .all_super_types(&qualified_class_name(tree, id));
                for (i, super_class) in self.visitors.super_class_subscribers(&chain) {
                    if self.applicable[i] && self.cursors[i].is_active(depth) {
                        self.visit(i, depth, "visit_class", |d, ctx| {
                            d.visit_class(ctx, tree, id, &super_class)
                        });
                    }
                }
            }
            _ => {}
        }

        for &child in &node.children {
            self.walk_node(tree, child, depth + 1);
        }
        self.leave(depth);
    }

    fn walk_class(&mut self, class: &ClassArtifact) {
        for (m, method) in class.methods.iter().enumerate() {
            for (c, call) in method.calls.iter().enumerate() {
                let subscribers = self.visitors.bytecode_calls.lookup(&[call.name.as_str()], None);
                for i in self.select(subscribers, 0) {
                    self.call(i, "check_call", |d, ctx| d.check_call(ctx, class, m, c));
                }
            }
        }
    }
}
