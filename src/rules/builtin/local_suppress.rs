use crate::ir::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Severity,
    TraversalControl,
};

pub static LOCAL_SUPPRESS: Issue = Issue::new(
    "LocalSuppress",
    "@SuppressLint on invalid element",
    "The `@SuppressAnnotation` is used to suppress Lint warnings in Java files. \
     However, while many lint checks analyzes the Java source code, where they can \
     find annotations on (for example) local variables, some checks are analyzing \
     the `.class` files. And in class files, annotations only appear on classes, \
     fields and methods. Annotations placed on local variables disappear. If you \
     attempt to suppress a lint error for a class-file based lint check, the \
     suppress annotation not work. You must move the annotation out to the \
     surrounding method.",
    Category::Correctness,
    3,
    Severity::Error,
    ScopeSet::JAVA_FILE,
);

fn is_suppress_lint(name: &str) -> bool {
    matches!(name, "SuppressLint" | "android.annotation.SuppressLint")
}

/// LocalSuppress: `@SuppressLint` on locals for checks that only see class files.
pub struct LocalSuppressDetector;

impl Detector for LocalSuppressDetector {
    fn name(&self) -> &'static str {
        "LocalSuppressDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&LOCAL_SUPPRESS]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::SyntaxNodes(vec![
            NodeKind::LocalVariable,
            NodeKind::Parameter,
        ])]
    }

    fn visit_node(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        node: NodeId,
    ) -> TraversalControl {
        let registry = ctx.registry();
        for annotation in &tree.node(node).annotations {
            if !is_suppress_lint(&annotation.name) {
                continue;
            }
            let ids = annotation
                .values
                .iter()
                .flat_map(|v| v.split(','))
                .map(str::trim);
            for id in ids {
                let Some(issue) = registry.lookup_ignore_case(id) else {
                    continue;
                };
                if issue.scope().contains(ScopeSet::CLASS_FILE) {
                    ctx.report(
                        &LOCAL_SUPPRESS,
                        Anchor::Node(node),
                        annotation.location.clone(),
                        format!(
                            "The `@SuppressLint` annotation cannot be used on a local variable \
                             with the lint check '{}': move out to the surrounding method",
                            issue.id
                        ),
                    );
                }
            }
        }
        TraversalControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::builtin::harness::{lint, messages};
    use pretty_assertions::assert_eq;

    #[test]
    fn class_file_checks_cannot_be_suppressed_locally() {
        let source = r#"package com.example;
import android.annotation.SuppressLint;
import android.graphics.Canvas;
public class Painter {
    void paint(@SuppressLint("wrongcall") Canvas canvas) {
        @SuppressLint("WrongCall") int a = 1, b = 2;
        @SuppressLint({"HardcodedText", "UnknownId"}) String label = "x";
        @SuppressWarnings("WrongCall") int c = 3;
    }
}
"#;
        let found = messages(&lint(&[("src/com/example/Painter.java", source)]), "LocalSuppress");
        let expected = "The `@SuppressLint` annotation cannot be used on a local variable with \
                        the lint check 'WrongCall': move out to the surrounding method";
        assert_eq!(found, vec![expected, expected]);
    }
}
