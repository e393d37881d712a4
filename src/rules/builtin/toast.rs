use crate::ir::syntax::{Literal, NodeId, NodeKind, SyntaxTree};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Severity,
    TraversalControl,
};

pub static SHOW_TOAST: Issue = Issue::new(
    "ShowToast",
    "Toast created but not shown",
    "`Toast.makeText()` creates a `Toast` but does **not** show it. You must call \
     `show()` on the resulting object to actually make the `Toast` appear.",
    Category::Correctness,
    6,
    Severity::Warning,
    ScopeSet::JAVA_FILE,
);

const TOAST_RECEIVERS: &[&str] = &["Toast", "android.widget.Toast"];

/// `Toast.LENGTH_SHORT` and `Toast.LENGTH_LONG`.
const VALID_DURATIONS: &[i64] = &[0, 1];

/// ShowToast: `Toast.makeText` results that are never shown, and custom durations.
pub struct ToastDetector;

impl Detector for ToastDetector {
    fn name(&self) -> &'static str {
        "ToastDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&SHOW_TOAST]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::MethodCalls(vec!["makeText".into()])]
    }

    fn visit_method_call(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        call: NodeId,
    ) -> TraversalControl {
        let node = tree.node(call);
        if !node
            .receiver
            .as_deref()
            .is_some_and(|r| TOAST_RECEIVERS.contains(&r))
        {
            return TraversalControl::Continue;
        }

        if let Some(&duration) = node.arguments.get(2) {
            if let Some(Literal::Int(value)) = ctx.symbols().evaluate(tree, duration) {
                if !VALID_DURATIONS.contains(&value) {
                    ctx.report(
                        &SHOW_TOAST,
                        Anchor::Node(duration),
                        tree.node(duration).location.clone(),
                        "Expected duration `Toast.LENGTH_SHORT` or `Toast.LENGTH_LONG`, a \
                         custom duration value is not supported",
                    );
                }
            }
        }

        if !is_shown(tree, call) {
            ctx.report(
                &SHOW_TOAST,
                Anchor::Node(call),
                node.location.clone(),
                "Toast created but not shown: did you forget to call `show()` ?",
            );
        }
        TraversalControl::Continue
    }
}

/// Whether the toast built by `call` is shown, returned, or handed off.
fn is_shown(tree: &SyntaxTree, call: NodeId) -> bool {
    let Some(parent_id) = tree.node(call).parent else {
        return false;
    };
    let parent = tree.node(parent_id);
    match parent.kind {
        NodeKind::MethodCall | NodeKind::ConstructorCall if parent.arguments.contains(&call) => {
            true
        }
        NodeKind::MethodCall => parent.name() == "show",
        NodeKind::LocalVariable | NodeKind::Field if parent.initializer == Some(call) => {
            shown_later(tree, call, parent.name())
        }
        _ => {
            let offset = tree.node(call).location.start.offset;
            let before = tree.source().get(..offset).unwrap_or("").trim_end();
            if before.ends_with("return") {
                return true;
            }
            match assigned_variable(before) {
                Some(variable) => shown_later(tree, call, variable),
                None => false,
            }
        }
    }
}

/// Name assigned to when `before` ends in `name =`.
fn assigned_variable(before: &str) -> Option<&str> {
    let lhs = before.strip_suffix('=')?;
    if lhs.ends_with(['=', '!', '<', '>']) {
        return None;
    }
    let name = lhs
        .trim_end()
        .rsplit(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .next()?;
    (!name.is_empty()).then_some(name)
}

/// A `variable.show()` call in the method (or class, for fields) around `call`.
fn shown_later(tree: &SyntaxTree, call: NodeId, variable: &str) -> bool {
    let scope = tree
        .enclosing(call, NodeKind::Method)
        .or_else(|| tree.enclosing(call, NodeKind::Constructor))
        .or_else(|| tree.enclosing(call, NodeKind::Class));
    let Some(scope) = scope else {
        return false;
    };
    tree.nodes().any(|(id, n)| {
        n.kind == NodeKind::MethodCall
            && n.name() == "show"
            && n
                .receiver
                .as_deref()
                .is_some_and(|r| r.strip_prefix("this.").unwrap_or(r) == variable)
            && tree.ancestors(id).any(|(a, _)| a == scope)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::harness::{lint, messages};
    use pretty_assertions::assert_eq;

    const NOT_SHOWN: &str = "Toast created but not shown: did you forget to call `show()` ?";

    fn check(body: &str) -> Vec<String> {
        let source = format!(
            "package com.example;\n\
             import android.content.Context;\n\
             import android.widget.Toast;\n\
             public class Notifier {{\n\
                 private Toast pending;\n\
                 Toast notify(Context ctx) {{\n\
                     {body}\n\
                 }}\n\
             }}\n"
        );
        messages(
            &lint(&[("src/com/example/Notifier.java", &source)]),
            "ShowToast",
        )
    }

    #[test]
    fn chained_show_and_returned_toasts_pass() {
        assert!(check("Toast.makeText(ctx, \"hi\", Toast.LENGTH_SHORT).show(); return null;").is_empty());
        assert!(check("return Toast.makeText(ctx, \"hi\", Toast.LENGTH_LONG);").is_empty());
        assert!(check("Toast t = Toast.makeText(ctx, \"hi\", 0);\nt.show(); return t;").is_empty());
        assert!(check("pending = Toast.makeText(ctx, \"hi\", 1);\nthis.pending.show(); return null;").is_empty());
        assert!(check("keep(Toast.makeText(ctx, \"hi\", 1)); return null;").is_empty());
    }

    #[test]
    fn toast_never_shown() {
        assert_eq!(
            check("Toast.makeText(ctx, \"hi\", Toast.LENGTH_SHORT); return null;"),
            vec![NOT_SHOWN]
        );
        assert_eq!(
            check("Toast t = Toast.makeText(ctx, \"hi\", Toast.LENGTH_SHORT);\nreturn null;"),
            vec![NOT_SHOWN]
        );
        assert_eq!(
            check("pending = Toast.makeText(ctx, \"hi\", 1); return null;"),
            vec![NOT_SHOWN]
        );
    }

    #[test]
    fn custom_duration_reported() {
        let found = check("Toast.makeText(ctx, \"hi\", 5000).show(); return null;");
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("Expected duration"));
    }

    #[test]
    fn other_receivers_ignored() {
        assert!(check("factory.makeText(ctx, \"hi\", 9); return null;").is_empty());
    }

    #[test]
    fn assignment_target_extraction() {
        assert_eq!(assigned_variable("  toast ="), Some("toast"));
        assert_eq!(assigned_variable("this.toast ="), Some("toast"));
        assert_eq!(assigned_variable("if (a =="), None);
        assert_eq!(assigned_variable("foo("), None);
    }
}
