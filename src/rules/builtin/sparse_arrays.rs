use crate::ir::syntax::{simple_name, NodeId, NodeKind, SyntaxTree};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Severity,
    TraversalControl,
};

pub static USE_SPARSE_ARRAYS: Issue = Issue::new(
    "UseSparseArrays",
    "HashMap can be replaced with SparseArray",
    "For maps where the keys are of type integer, it's typically more efficient to \
     use the Android `SparseArray` API. This check identifies scenarios where you \
     might want to consider using `SparseArray` instead of `HashMap` for better \
     performance.\n\n\
     This is **particularly** useful when the value types are primitives like ints, \
     where you can use `SparseIntArray` and avoid auto-boxing the values from `int` \
     to `Integer`.",
    Category::Performance,
    4,
    Severity::Warning,
    ScopeSet::JAVA_FILE,
);

/// Top-level type arguments of `Map<K, V>`; empty for raw types and `<>`.
fn type_arguments(type_name: &str) -> Vec<&str> {
    let (Some(open), Some(close)) = (type_name.find('<'), type_name.rfind('>')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    let inner = &type_name[open + 1..close];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    args.retain(|a| !a.is_empty());
    args
}

fn suggestion(key: &str, value: &str) -> Option<String> {
    match (simple_name(key), simple_name(value)) {
        ("Integer", "Boolean") => Some("new SparseBooleanArray(...)".into()),
        ("Integer", "Integer") => Some("new SparseIntArray(...)".into()),
        ("Integer", _) => Some(format!("new SparseArray<{value}>(...)")),
        ("Long", _) => Some(format!("new LongSparseArray<{value}>(...)")),
        _ => None,
    }
}

/// UseSparseArrays: `HashMap`s keyed by `Integer` or `Long`.
pub struct SparseArrayDetector;

impl Detector for SparseArrayDetector {
    fn name(&self) -> &'static str {
        "SparseArrayDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&USE_SPARSE_ARRAYS]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::ConstructorCalls(vec!["java.util.HashMap".into()])]
    }

    fn visit_constructor_call(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        call: NodeId,
    ) -> TraversalControl {
        let node = tree.node(call);
        let mut args = type_arguments(node.type_name.as_deref().unwrap_or(""));
        // Diamond: take the arguments from the declaration being initialized.
        if args.is_empty() {
            if let Some(parent) = node.parent.map(|p| tree.node(p)) {
                let declares = matches!(parent.kind, NodeKind::LocalVariable | NodeKind::Field)
                    && parent.initializer == Some(call);
                if declares {
                    args = type_arguments(parent.type_name.as_deref().unwrap_or(""));
                }
            }
        }
        let [key, value] = args.as_slice() else {
            return TraversalControl::Continue;
        };
        if let Some(replacement) = suggestion(key, value) {
            ctx.report(
                &USE_SPARSE_ARRAYS,
                Anchor::Node(call),
                node.location.clone(),
                format!("Use `{replacement}` instead for better performance"),
            );
        }
        TraversalControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::harness::{lint, messages};
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_nested_type_arguments() {
        assert_eq!(
            type_arguments("HashMap<Integer, Map<String, List<Foo>>>"),
            vec!["Integer", "Map<String, List<Foo>>"]
        );
        assert!(type_arguments("HashMap<>").is_empty());
        assert!(type_arguments("HashMap").is_empty());
    }

    #[test]
    fn integer_and_long_keys_reported() {
        let source = r#"package com.example;
import java.util.HashMap;
import java.util.Map;
public class Cache {
    private final Map<Integer, String> names = new HashMap<>();
    void fill() {
        Map<Integer, Boolean> flags = new HashMap<Integer, Boolean>();
        HashMap<Integer, Integer> counts = new HashMap<>();
        Map<Long, String> ids = new java.util.HashMap<Long, String>();
        Map<String, String> plain = new HashMap<>();
    }
}
"#;
        let found = messages(
            &lint(&[("src/com/example/Cache.java", source)]),
            "UseSparseArrays",
        );
        assert_eq!(
            found,
            vec![
                "Use `new SparseArray<String>(...)` instead for better performance",
                "Use `new SparseBooleanArray(...)` instead for better performance",
                "Use `new SparseIntArray(...)` instead for better performance",
                "Use `new LongSparseArray<String>(...)` instead for better performance",
            ]
        );
    }

    #[test]
    fn wildcard_import_matches_by_simple_name() {
        let source = "package a;\nimport java.util.*;\nclass A { Object m = new HashMap<Integer, Integer>(); }\n";
        let found = messages(&lint(&[("src/a/A.java", source)]), "UseSparseArrays");
        assert_eq!(found.len(), 1);
    }
}
