use crate::ir::syntax::{simple_name, strip_type_arguments, NodeId, NodeKind, SyntaxTree};
use crate::rules::symbols::qualified_class_name;
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Severity,
    TraversalControl,
};

pub static VIEW_CONSTRUCTOR: Issue = Issue::new(
    "ViewConstructor",
    "Missing View constructors for XML inflation",
    "Some layout tools (such as the Android layout editor) need to find a \
     constructor with one of the following signatures:\n\
     * `View(Context context)`\n\
     * `View(Context context, AttributeSet attrs)`\n\
     * `View(Context context, AttributeSet attrs, int defStyle)`\n\n\
     If your custom view needs to perform initialization which does not apply when \
     used in a layout editor, you can surround the given code with a check to see \
     if `View#isInEditMode()` is false, since that method will return `false` at \
     runtime but true within a user interface editor.",
    Category::Usability,
    3,
    Severity::Warning,
    ScopeSet::JAVA_FILE,
);

const TOOL_CONSTRUCTORS: &[&[&str]] = &[
    &["Context"],
    &["Context", "AttributeSet"],
    &["Context", "AttributeSet", "int"],
];

/// Simple type names of a constructor's parameters, in order.
fn parameter_types(tree: &SyntaxTree, constructor: NodeId) -> Vec<&str> {
    tree.node(constructor)
        .children
        .iter()
        .map(|&c| tree.node(c))
        .map_while(|n| (n.kind == NodeKind::Parameter).then_some(n))
        .map(|n| simple_name(strip_type_arguments(n.type_name.as_deref().unwrap_or(""))))
        .collect()
}

/// ViewConstructor: custom views the layout editor cannot instantiate.
pub struct ViewConstructorDetector;

impl Detector for ViewConstructorDetector {
    fn name(&self) -> &'static str {
        "ViewConstructorDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&VIEW_CONSTRUCTOR]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::SuperClasses(vec!["android.view.View".into()])]
    }

    fn visit_class(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        class: NodeId,
        _super_class: &str,
    ) -> TraversalControl {
        let node = tree.node(class);
        if node.has_modifier("abstract") || !node.has_modifier("public") {
            return TraversalControl::Continue;
        }
        let nested = tree.enclosing(class, NodeKind::Class).is_some();
        if nested && !node.has_modifier("static") {
            return TraversalControl::Continue;
        }

        let has_tool_constructor = tree
            .children_of_kind(class, NodeKind::Constructor)
            .any(|(ctor, _)| {
                let types = parameter_types(tree, ctor);
                TOOL_CONSTRUCTORS.iter().any(|sig| *sig == types.as_slice())
            });
        if !has_tool_constructor {
            let name = qualified_class_name(tree, class);
            ctx.report(
                &VIEW_CONSTRUCTOR,
                Anchor::Node(class),
                node.location.clone(),
                format!(
                    "Custom view `{}` is missing constructor used by tools: `(Context)` or \
                     `(Context,AttributeSet)` or `(Context,AttributeSet,int)`",
                    simple_name(&name)
                ),
            );
        }
        TraversalControl::Continue
    }
}
