//! Type hierarchy and constant lookup for detectors.
//!
//! The resolver is deliberately shallow: it knows the classes declared in
//! the project, a handful of framework classes, and can fold simple
//! constant expressions. Anything else resolves to `None` and detectors
//! treat that as "don't know, don't report".

use std::collections::{HashMap, HashSet, VecDeque};

use once_cell::sync::Lazy;

use crate::ir::syntax::{simple_name, strip_type_arguments, Literal, NodeId, NodeKind, SyntaxTree};
use crate::ir::ClassArtifact;

const MAX_EVAL_DEPTH: usize = 8;
const MAX_HIERARCHY: usize = 64;

pub trait SymbolResolver: Send + Sync {
    /// Direct super class and interfaces of a fully qualified class.
    fn super_types(&self, class: &str) -> Option<Vec<String>>;

    /// Constant value of an expression node, if it can be folded.
    fn evaluate(&self, tree: &SyntaxTree, node: NodeId) -> Option<Literal>;

    /// All transitive super types, nearest first.
    fn all_super_types(&self, class: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<String> = self.super_types(class).unwrap_or_default().into();
        while let Some(next) = queue.pop_front() {
            if result.len() >= MAX_HIERARCHY || !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.super_types(&next).unwrap_or_default());
            result.push(next);
        }
        result
    }

    fn is_subclass_of(&self, class: &str, super_class: &str) -> bool {
        class == super_class || self.all_super_types(class).iter().any(|s| s == super_class)
    }
}

/// Framework classes that project code commonly extends.
static FRAMEWORK_SUPER_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("android.view.ViewGroup", "android.view.View"),
        ("android.widget.TextView", "android.view.View"),
        ("android.widget.ImageView", "android.view.View"),
        ("android.widget.ProgressBar", "android.view.View"),
        ("android.view.SurfaceView", "android.view.View"),
        ("android.widget.Button", "android.widget.TextView"),
        ("android.widget.EditText", "android.widget.TextView"),
        ("android.widget.ImageButton", "android.widget.ImageView"),
        ("android.widget.LinearLayout", "android.view.ViewGroup"),
        ("android.widget.FrameLayout", "android.view.ViewGroup"),
        ("android.widget.RelativeLayout", "android.view.ViewGroup"),
        ("android.widget.AdapterView", "android.view.ViewGroup"),
        ("android.widget.ScrollView", "android.widget.FrameLayout"),
        ("android.widget.ListView", "android.widget.AbsListView"),
        ("android.widget.AbsListView", "android.widget.AdapterView"),
        ("android.webkit.WebView", "android.widget.AbsoluteLayout"),
        ("android.widget.AbsoluteLayout", "android.view.ViewGroup"),
        ("android.app.ListActivity", "android.app.Activity"),
        ("android.app.Activity", "android.view.ContextThemeWrapper"),
        ("androidx.activity.ComponentActivity", "android.app.Activity"),
        (
            "androidx.fragment.app.FragmentActivity",
            "androidx.activity.ComponentActivity",
        ),
        (
            "androidx.appcompat.app.AppCompatActivity",
            "androidx.fragment.app.FragmentActivity",
        ),
    ])
});

/// Symbols of one project, built once per run from every parsed artifact.
#[derive(Debug, Default)]
pub struct ProjectSymbols {
    super_types: HashMap<String, Vec<String>>,
}

impl ProjectSymbols {
    pub fn build<'a>(
        trees: impl IntoIterator<Item = &'a SyntaxTree>,
        classes: impl IntoIterator<Item = &'a ClassArtifact>,
    ) -> Self {
        let trees: Vec<&SyntaxTree> = trees.into_iter().collect();

        let declared: HashSet<String> = trees
            .iter()
            .flat_map(|tree| {
                tree.nodes()
                    .filter(|(_, n)| n.kind == NodeKind::Class)
                    .map(|(id, _)| qualified_class_name(tree, id))
            })
            .collect();

        let mut super_types = HashMap::new();
        for tree in &trees {
            for (id, node) in tree.nodes().filter(|(_, n)| n.kind == NodeKind::Class) {
                let resolved = node
                    .supertypes
                    .iter()
                    .map(|s| resolve_type_name(tree, s, &declared))
                    .collect();
                super_types.insert(qualified_class_name(tree, id), resolved);
            }
        }
        for class in classes {
            super_types
                .entry(class.name.clone())
                .or_insert_with(|| class.supertypes());
        }

        tracing::debug!(classes = super_types.len(), "built project symbols");
        Self { super_types }
    }

    pub fn len(&self) -> usize {
        self.super_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.super_types.is_empty()
    }
}

impl SymbolResolver for ProjectSymbols {
    fn super_types(&self, class: &str) -> Option<Vec<String>> {
        if let Some(found) = self.super_types.get(class) {
            return Some(found.clone());
        }
        FRAMEWORK_SUPER_TYPES
            .get(class)
            .map(|s| vec![(*s).to_string()])
    }

    fn evaluate(&self, tree: &SyntaxTree, node: NodeId) -> Option<Literal> {
        evaluate(tree, node, 0)
    }
}

/// Fully qualified name of a class declaration, nested classes joined with `.`.
pub fn qualified_class_name(tree: &SyntaxTree, class: NodeId) -> String {
    let mut names: Vec<&str> = tree
        .ancestors(class)
        .filter(|(_, n)| n.kind == NodeKind::Class)
        .map(|(_, n)| n.name())
        .collect();
    names.reverse();
    match &tree.package {
        Some(pkg) => format!("{pkg}.{}", names.join(".")),
        None => names.join("."),
    }
}

/// Qualify a type name as written in `tree`, or return it unchanged when
/// no import or project class pins it down.
pub fn resolve_type_name(tree: &SyntaxTree, written: &str, declared: &HashSet<String>) -> String {
    if let Some(qualified) = tree.qualify(written) {
        return qualified;
    }
    let name = strip_type_arguments(written);
    let same_package = match &tree.package {
        Some(pkg) => format!("{pkg}.{name}"),
        None => name.to_string(),
    };
    if declared.contains(&same_package) {
        return same_package;
    }
    tree.imports
        .iter()
        .filter_map(|import| import.strip_suffix(".*"))
        .map(|pkg| format!("{pkg}.{name}"))
        .find(|candidate| {
            declared.contains(candidate) || FRAMEWORK_SUPER_TYPES.contains_key(candidate.as_str())
        })
        .unwrap_or_else(|| name.to_string())
}

fn evaluate(tree: &SyntaxTree, id: NodeId, depth: usize) -> Option<Literal> {
    if depth > MAX_EVAL_DEPTH {
        return None;
    }
    let node = tree.node(id);
    match node.kind {
        NodeKind::Literal => node.literal.clone(),
        NodeKind::Parenthesized => {
            let inner = *node.children.first()?;
            evaluate(tree, inner, depth + 1)
        }
        NodeKind::Unary => {
            let operand = evaluate(tree, *node.children.first()?, depth + 1)?;
            match (node.name(), operand) {
                ("!", Literal::Bool(b)) => Some(Literal::Bool(!b)),
                ("-", Literal::Int(i)) => i.checked_neg().map(Literal::Int),
                ("-", Literal::Float(f)) => Some(Literal::Float(-f)),
                ("+", lit @ (Literal::Int(_) | Literal::Float(_))) => Some(lit),
                _ => None,
            }
        }
        NodeKind::Reference => evaluate_reference(tree, id, depth),
        _ => None,
    }
}

fn evaluate_reference(tree: &SyntaxTree, id: NodeId, depth: usize) -> Option<Literal> {
    let node = tree.node(id);
    let name = node.name();
    if let Some(receiver) = node.receiver.as_deref() {
        if simple_name(receiver) == "Boolean" {
            return match name {
                "TRUE" => Some(Literal::Bool(true)),
                "FALSE" => Some(Literal::Bool(false)),
                _ => None,
            };
        }
    }

    // Parameters and locals shadow fields. Only a final local folds.
    if node.receiver.is_none() {
        if let Some(binding) = local_binding(tree, id, name) {
            let local = tree.node(binding);
            if local.kind != NodeKind::LocalVariable || !local.has_modifier("final") {
                return None;
            }
            return evaluate(tree, local.initializer?, depth + 1);
        }
    }

    // A static final field of a class in this file.
    let (_, field) = tree.nodes().find(|(field_id, n)| {
        n.kind == NodeKind::Field
            && n.name() == name
            && n.has_modifier("static")
            && n.has_modifier("final")
            && node.receiver.as_deref().map_or(true, |r| {
                tree.enclosing(*field_id, NodeKind::Class)
                    .is_some_and(|c| tree.node(c).name() == simple_name(r))
            })
    })?;
    evaluate(tree, field.initializer?, depth + 1)
}

/// Innermost method, constructor or class around `id`: the region whose
/// parameters and locals can be in scope at `id`.
fn binding_region(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id)
        .skip(1)
        .find(|(_, n)| {
            matches!(
                n.kind,
                NodeKind::Method | NodeKind::Constructor | NodeKind::Class
            )
        })
        .map(|(i, _)| i)
}

/// The parameter or local named `name` visible at `id`: any parameter of
/// the region, otherwise the latest local declared before `id`.
fn local_binding(tree: &SyntaxTree, id: NodeId, name: &str) -> Option<NodeId> {
    let region = binding_region(tree, id)?;
    let offset = tree.node(id).location.start.offset;
    let mut nearest: Option<NodeId> = None;
    for (candidate, n) in tree.nodes() {
        if n.name() != name || binding_region(tree, candidate) != Some(region) {
            continue;
        }
        match n.kind {
            NodeKind::Parameter => return Some(candidate),
            NodeKind::LocalVariable if n.location.start.offset < offset => {
                let later = nearest.map_or(true, |prev| {
                    tree.node(prev).location.start.offset <= n.location.start.offset
                });
                if later {
                    nearest = Some(candidate);
                }
            }
            _ => {}
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::syntax::SyntaxNode;
    use crate::ir::Location;

    fn node(kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(kind, Location::file_only("A.java"))
    }

    fn class(tree: &mut SyntaxTree, parent: NodeId, name: &str, supers: &[&str]) -> NodeId {
        let mut n = node(NodeKind::Class).named(name);
        n.supertypes = supers.iter().map(|s| s.to_string()).collect();
        tree.add_node(Some(parent), n)
    }

    #[test]
    fn resolves_transitive_hierarchy_through_imports() {
        let mut tree = SyntaxTree::new("MyView.java", "");
        tree.package = Some("com.example".into());
        tree.imports.push("android.widget.LinearLayout".into());
        let file = tree.add_node(None, node(NodeKind::File));
        class(&mut tree, file, "MyView", &["LinearLayout"]);
        class(&mut tree, file, "Fancy", &["MyView"]);

        let symbols = ProjectSymbols::build([&tree], []);
        let chain = symbols.all_super_types("com.example.Fancy");
        assert_eq!(
            chain,
            vec![
                "com.example.MyView",
                "android.widget.LinearLayout",
                "android.view.ViewGroup",
                "android.view.View",
            ]
        );
        assert!(symbols.is_subclass_of("com.example.Fancy", "android.view.View"));
    }

    #[test]
    fn unresolved_super_type_kept_as_written() {
        let mut tree = SyntaxTree::new("A.java", "");
        let file = tree.add_node(None, node(NodeKind::File));
        class(&mut tree, file, "A", &["Activity"]);
        let symbols = ProjectSymbols::build([&tree], []);
        assert_eq!(symbols.super_types("A"), Some(vec!["Activity".to_string()]));
    }

    #[test]
    fn class_files_contribute_hierarchy() {
        let mut class = ClassArtifact::new("A.class", "com.example.A");
        class.super_name = Some("android.app.Activity".into());
        let symbols = ProjectSymbols::build([], [&class]);
        assert!(symbols.is_subclass_of("com.example.A", "android.app.Activity"));
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let mut tree = SyntaxTree::new("A.java", "");
        let file = tree.add_node(None, node(NodeKind::File));
        class(&mut tree, file, "A", &["B"]);
        class(&mut tree, file, "B", &["A"]);
        let symbols = ProjectSymbols::build([&tree], []);
        assert_eq!(symbols.all_super_types("A"), vec!["B", "A"]);
    }

    #[test]
    fn folds_static_final_and_negation() {
        let mut tree = SyntaxTree::new("A.java", "");
        let file = tree.add_node(None, node(NodeKind::File));
        let a = class(&mut tree, file, "A", &[]);
        let mut field = node(NodeKind::Field).named("ENABLED");
        field.modifiers = vec!["static".into(), "final".into()];
        let field = tree.add_node(Some(a), field);
        let mut lit = node(NodeKind::Literal);
        lit.literal = Some(Literal::Bool(true));
        let lit = tree.add_node(Some(field), lit);
        tree.node_mut(field).initializer = Some(lit);

        let mut not = node(NodeKind::Unary);
        not.name = Some("!".into());
        let not = tree.add_node(Some(a), not);
        tree.add_node(Some(not), node(NodeKind::Reference).named("ENABLED"));

        let symbols = ProjectSymbols::default();
        assert_eq!(symbols.evaluate(&tree, not), Some(Literal::Bool(false)));

        let unknown = tree.add_node(Some(a), node(NodeKind::Reference).named("other"));
        assert_eq!(symbols.evaluate(&tree, unknown), None);
    }
}
