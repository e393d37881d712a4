use crate::ir::syntax::{Literal, NodeId, SyntaxTree};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Severity,
    TraversalControl,
};

pub static SET_JAVASCRIPT_ENABLED: Issue = Issue::new(
    "SetJavaScriptEnabled",
    "Using `setJavaScriptEnabled`",
    "Your code should not invoke `setJavaScriptEnabled` if you are not sure that \
     your app really requires JavaScript support.",
    Category::Security,
    6,
    Severity::Warning,
    ScopeSet::JAVA_FILE,
)
.with_more_info(&["https://developer.android.com/guide/practices/security.html"]);

/// SetJavaScriptEnabled: `setJavaScriptEnabled(true)` on web view settings.
pub struct SetJavaScriptEnabledDetector;

impl Detector for SetJavaScriptEnabledDetector {
    fn name(&self) -> &'static str {
        "SetJavaScriptEnabledDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&SET_JAVASCRIPT_ENABLED]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::MethodCalls(vec!["setJavaScriptEnabled".into()])]
    }

    fn visit_method_call(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        call: NodeId,
    ) -> TraversalControl {
        let node = tree.node(call);
        let [argument] = node.arguments.as_slice() else {
            return TraversalControl::Continue;
        };
        if ctx.symbols().evaluate(tree, *argument) == Some(Literal::Bool(true)) {
            ctx.report(
                &SET_JAVASCRIPT_ENABLED,
                Anchor::Node(call),
                node.location.clone(),
                "Using `setJavaScriptEnabled` can introduce XSS vulnerabilities into your \
                 application, review carefully.",
            );
        }
        TraversalControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::builtin::harness::{lint, messages};

    fn check(body: &str) -> Vec<String> {
        let source = format!(
            "package com.example;\n\
             import android.webkit.WebView;\n\
             public class Browser {{\n\
                 static final boolean JS = true;\n\
                 void setup(WebView webview) {{\n\
                     {body}\n\
                 }}\n\
             }}\n"
        );
        messages(
            &lint(&[("src/com/example/Browser.java", &source)]),
            "SetJavaScriptEnabled",
        )
    }

    #[test]
    fn literal_true_reported() {
        let found = check("webview.getSettings().setJavaScriptEnabled(true);");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("XSS vulnerabilities"));
    }

    #[test]
    fn false_and_unknown_values_ignored() {
        assert!(check("webview.getSettings().setJavaScriptEnabled(false);").is_empty());
        assert!(check("webview.getSettings().setJavaScriptEnabled(!JS);").is_empty());
        assert!(check("webview.getSettings().setJavaScriptEnabled(isTrusted());").is_empty());
    }

    #[test]
    fn folded_constants_reported() {
        assert_eq!(check("webview.getSettings().setJavaScriptEnabled(JS);").len(), 1);
        assert_eq!(
            check("final boolean on = Boolean.TRUE; webview.getSettings().setJavaScriptEnabled(on);")
                .len(),
            1
        );
    }

    #[test]
    fn shadowing_parameters_and_locals_not_folded() {
        let source = "package com.example;\n\
             import android.webkit.WebView;\n\
             public class Browser {\n\
                 static final boolean JS = true;\n\
                 void param(WebView webview, boolean JS) {\n\
                     webview.getSettings().setJavaScriptEnabled(JS);\n\
                 }\n\
                 void local(WebView webview) {\n\
                     boolean JS = false;\n\
                     webview.getSettings().setJavaScriptEnabled(JS);\n\
                 }\n\
                 void finalLocal(WebView webview) {\n\
                     final boolean JS = false;\n\
                     webview.getSettings().setJavaScriptEnabled(JS);\n\
                 }\n\
                 void loop(WebView webview, boolean[] flags) {\n\
                     for (boolean JS : flags) { webview.getSettings().setJavaScriptEnabled(JS); }\n\
                 }\n\
                 void lambda(WebView webview) {\n\
                     each(JS -> webview.getSettings().setJavaScriptEnabled(JS));\n\
                 }\n\
                 void field(WebView webview) {\n\
                     webview.getSettings().setJavaScriptEnabled(JS);\n\
                 }\n\
             }\n";
        let findings = lint(&[("src/com/example/Browser.java", source)]);
        let found: Vec<_> = findings
            .iter()
            .filter(|f| f.issue_id == "SetJavaScriptEnabled")
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location.start.line, 23);
    }

    #[test]
    fn noinspection_comment_suppresses() {
        let found = check(
            "//noinspection SetJavaScriptEnabled\n\
             webview.getSettings().setJavaScriptEnabled(true);",
        );
        assert!(found.is_empty());
    }
}
