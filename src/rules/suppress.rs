use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::Pattern;

use super::policy::Policy;
use super::{Issue, ScopeSet};
use crate::error::{LintError, Result};
use crate::ir::bytecode::BytecodeAnnotation;
use crate::ir::syntax::{NodeId, SyntaxTree};
use crate::ir::xml::{ElementId, XmlDocument, TOOLS_URI};
use crate::ir::ClassArtifact;

const ANDROID_LINT_PREFIX: &str = "AndroidLint";
const SUPPRESS_ALL: &str = "all";

/// The node a finding is anchored to, for walking in-source directives.
#[derive(Debug, Clone, Copy)]
pub enum SuppressTarget<'a> {
    Xml {
        doc: &'a XmlDocument,
        element: ElementId,
    },
    Syntax {
        tree: &'a SyntaxTree,
        node: NodeId,
    },
    Bytecode {
        class: &'a ClassArtifact,
        method: Option<usize>,
        field: Option<usize>,
    },
    /// No node; only project configuration applies.
    None,
}

/// Decides whether a would-be finding is silenced.
///
/// Two sources are consulted: the project policy (disabled issues and
/// `ignore_paths` globs) and directives in the artifact itself, walked
/// outward from the anchor node.
#[derive(Debug)]
pub struct SuppressionResolver {
    policy: Policy,
    root: PathBuf,
    ignore_paths: HashMap<String, Vec<Pattern>>,
}

impl SuppressionResolver {
    pub fn new(policy: &Policy, root: &Path) -> Result<Self> {
        let mut ignore_paths = HashMap::new();
        for (id, globs) in &policy.ignore_paths {
            let patterns = globs
                .iter()
                .map(|g| {
                    Pattern::new(g).map_err(|e| {
                        LintError::Config(format!("invalid ignore_paths glob '{g}' for {id}: {e}"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ignore_paths.insert(id.to_lowercase(), patterns);
        }
        Ok(Self {
            policy: policy.clone(),
            root: root.to_path_buf(),
            ignore_paths,
        })
    }

    pub fn is_suppressed(&self, issue: &Issue, file: &Path, target: &SuppressTarget<'_>) -> bool {
        if !self.policy.is_enabled(issue) || self.is_path_ignored(issue, file) {
            return true;
        }
        match *target {
            SuppressTarget::Xml { doc, element } => self.is_suppressed_in_xml(issue, doc, element),
            SuppressTarget::Syntax { tree, node } => {
                self.is_suppressed_in_source(issue, tree, node)
            }
            SuppressTarget::Bytecode {
                class,
                method,
                field,
            } => is_suppressed_in_class(issue, class, method, field),
            SuppressTarget::None => false,
        }
    }

    fn is_path_ignored(&self, issue: &Issue, file: &Path) -> bool {
        if self.ignore_paths.is_empty() {
            return false;
        }
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        [issue.id.to_lowercase(), SUPPRESS_ALL.to_string()]
            .iter()
            .filter_map(|key| self.ignore_paths.get(key))
            .flatten()
            .any(|pattern| pattern.matches_path(relative))
    }

    fn is_suppressed_in_xml(&self, issue: &Issue, doc: &XmlDocument, element: ElementId) -> bool {
        doc.ancestors(element).any(|(_, el)| {
            let by_attribute = el
                .attribute(Some(TOOLS_URI), "ignore")
                .is_some_and(|attr| id_list_matches(&attr.value, issue.id));
            by_attribute
                || (self.policy.check_comments
                    && el.leading_comments.iter().any(|c| {
                        c.trim()
                            .strip_prefix("suppress ")
                            .is_some_and(|ids| comment_ids_match(ids, issue.id))
                    }))
        })
    }

    fn is_suppressed_in_source(&self, issue: &Issue, tree: &SyntaxTree, node: NodeId) -> bool {
        let survives_compilation = issue.scope().contains(ScopeSet::CLASS_FILE);
        for (_, n) in tree.ancestors(node) {
            if n.kind.is_declaration() {
                // Annotations on locals are dropped by the compiler, so an
                // issue that is also checked in class files cannot honour them.
                let honoured = !(survives_compilation && n.kind.is_local_declaration());
                if honoured
                    && n.annotations.iter().any(|a| {
                        is_suppress_annotation(&a.name)
                            && a.values.iter().any(|v| id_list_matches(v, issue.id))
                    })
                {
                    return true;
                }
            }
            if self.policy.check_comments && tree.has_suppress_comments() {
                let line = n.location.start.line;
                if line > 1
                    && tree
                        .suppress_comment_at(line - 1)
                        .is_some_and(|ids| comment_ids_match(ids, issue.id))
                {
                    return true;
                }
            }
        }
        false
    }
}

fn is_suppressed_in_class(
    issue: &Issue,
    class: &ClassArtifact,
    method: Option<usize>,
    field: Option<usize>,
) -> bool {
    let method_annotations = method
        .and_then(|m| class.methods.get(m))
        .map(|m| m.annotations.as_slice())
        .unwrap_or_default();
    let field_annotations = field
        .and_then(|f| class.fields.get(f))
        .map(|f| f.annotations.as_slice())
        .unwrap_or_default();
    [
        method_annotations,
        field_annotations,
        class.annotations.as_slice(),
    ]
    .into_iter()
    .flatten()
    .any(|a| is_bytecode_suppression(a, issue.id))
}

fn is_bytecode_suppression(annotation: &BytecodeAnnotation, issue_id: &str) -> bool {
    annotation.descriptor.ends_with("/SuppressLint;")
        && annotation.values.iter().any(|v| id_list_matches(v, issue_id))
}

fn is_suppress_annotation(name: &str) -> bool {
    matches!(
        name,
        "SuppressLint"
            | "android.annotation.SuppressLint"
            | "SuppressWarnings"
            | "java.lang.SuppressWarnings"
    )
}

/// Whether a single directive id names the issue.
pub fn id_matches(candidate: &str, issue_id: &str) -> bool {
    let candidate = candidate.trim();
    candidate.eq_ignore_ascii_case(SUPPRESS_ALL)
        || candidate.eq_ignore_ascii_case(issue_id)
        || candidate
            .strip_prefix(ANDROID_LINT_PREFIX)
            .is_some_and(|rest| rest.eq_ignore_ascii_case(issue_id))
}

/// Whether a comma-separated directive list names the issue.
pub fn id_list_matches(list: &str, issue_id: &str) -> bool {
    list.split(',').any(|id| id_matches(id, issue_id))
}

fn comment_ids_match(ids: &str, issue_id: &str) -> bool {
    ids.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .any(|id| id_matches(id, issue_id))
}
