use std::cell::RefCell;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::error::{LintError, Result};
use crate::ir::syntax::{
    strip_type_arguments, Annotation, Literal, NodeId, NodeKind, SyntaxNode, SyntaxTree,
};
use crate::ir::{LineIndex, Location};

use super::MAX_NESTING;

thread_local! {
    static JAVA_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// `//noinspection Id1,Id2` or `/* noinspection Id */`.
static NOINSPECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?://+|/\*+)\s*noinspection\s+([A-Za-z0-9_,\s]+)").expect("valid regex")
});

const CLASS_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Subtrees that never contribute nodes of their own.
const OPAQUE_KINDS: &[&str] = &[
    "line_comment",
    "block_comment",
    "modifiers",
    "annotation",
    "marker_annotation",
    "type_arguments",
    "type_parameters",
];

/// Parse a Java compilation unit into a `SyntaxTree`.
///
/// Files with syntax errors, or nested deeper than `MAX_NESTING`, are
/// rejected rather than half-analyzed.
pub fn parse(path: &Path, content: &str) -> Result<SyntaxTree> {
    let tree = JAVA_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let mut parser = Parser::new();
            parser
                .set_language(&tree_sitter_java::LANGUAGE.into())
                .map_err(|e| LintError::parse(path, format!("Failed to load Java grammar: {e}")))?;
            *slot = Some(parser);
        }
        slot.as_mut()
            .and_then(|parser| parser.parse(content, None))
            .ok_or_else(|| LintError::parse(path, "tree-sitter failed to parse Java"))
    })?;

    let root = tree.root_node();
    let lines = LineIndex::new(content);
    if exceeds_nesting(root) {
        return Err(LintError::parse(
            path,
            format!("syntax nested deeper than {MAX_NESTING} levels"),
        ));
    }
    if root.has_error() {
        let line = first_error(root)
            .map(|n| n.start_position().row + 1)
            .unwrap_or(1);
        return Err(LintError::parse(path, format!("syntax error at line {line}")));
    }

    let mut builder = Builder {
        tree: SyntaxTree::new(path, content),
        source: content.as_bytes(),
        lines,
    };
    let file = builder.add(None, NodeKind::File, root);
    builder.collect_comments(root);
    for child in named_children(root) {
        builder.visit(child, file);
    }
    Ok(builder.tree)
}

/// Whether any node sits deeper than `MAX_NESTING`. Walks with a cursor so
/// the check itself never recurses.
fn exceeds_nesting(root: Node<'_>) -> bool {
    let mut cursor = root.walk();
    let mut depth = 0usize;
    loop {
        if cursor.goto_first_child() {
            depth += 1;
            if depth > MAX_NESTING {
                return true;
            }
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
            depth -= 1;
        }
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

fn named_children(node: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    (0..node.named_child_count()).filter_map(move |i| node.named_child(i))
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).find(|c| c.kind() == kind)
}

fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

struct Builder<'s> {
    tree: SyntaxTree,
    source: &'s [u8],
    lines: LineIndex,
}

impl Builder<'_> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source).unwrap_or("").to_string()
    }

    fn location(&self, node: Node<'_>) -> Location {
        self.lines
            .location(self.tree.path(), node.start_byte(), node.end_byte())
    }

    fn add(&mut self, parent: Option<NodeId>, kind: NodeKind, node: Node<'_>) -> NodeId {
        let location = self.location(node);
        self.tree.add_node(parent, SyntaxNode::new(kind, location))
    }

    fn collect_comments(&mut self, node: Node<'_>) {
        if is_comment(node) {
            let text = self.text(node);
            if let Some(ids) = NOINSPECTION.captures(&text).and_then(|c| c.get(1)) {
                let line = node.end_position().row + 1;
                self.tree.add_suppress_comment(line, ids.as_str().trim());
            }
            return;
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.collect_comments(child);
            }
        }
    }

    /// Statement position: mapped constructs get a node, everything else
    /// is transparent and its children attach to `parent`.
    fn visit(&mut self, node: Node<'_>, parent: NodeId) {
        if OPAQUE_KINDS.contains(&node.kind()) || self.header(node) {
            return;
        }
        if self.mapped(node, parent).is_none() {
            for child in named_children(node) {
                self.visit(child, parent);
            }
        }
    }

    /// Package and import declarations. Returns whether `node` was one.
    fn header(&mut self, node: Node<'_>) -> bool {
        match node.kind() {
            "package_declaration" => {
                self.tree.package = named_children(node)
                    .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
                    .map(|c| self.text(c));
                true
            }
            "import_declaration" => {
                let text = self.text(node);
                let import = text
                    .trim_start_matches("import")
                    .trim()
                    .trim_start_matches("static ")
                    .trim_end_matches(';')
                    .split_whitespace()
                    .collect::<String>();
                self.tree.imports.push(import);
                true
            }
            _ => false,
        }
    }

    /// Expression position: always yields a node, `Other` when unmapped.
    fn expression(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        if let Some(id) = self.mapped(node, parent) {
            return id;
        }
        let id = self.add(Some(parent), NodeKind::Other, node);
        for child in named_children(node) {
            self.visit(child, id);
        }
        id
    }

    fn mapped(&mut self, node: Node<'_>, parent: NodeId) -> Option<NodeId> {
        let kind = node.kind();
        let id = match kind {
            k if CLASS_KINDS.contains(&k) => self.class(node, parent),
            "method_declaration" | "constructor_declaration" => self.method(node, parent),
            "field_declaration" | "local_variable_declaration" | "constant_declaration" => {
                self.variables(node, parent)?
            }
            "formal_parameter" | "spread_parameter" | "catch_formal_parameter" => {
                self.parameter(node, parent)
            }
            "lambda_expression" => self.lambda(node, parent),
            "catch_clause" => {
                let id = self.add(Some(parent), NodeKind::Other, node);
                for child in named_children(node) {
                    self.visit(child, id);
                }
                id
            }
            "enhanced_for_statement" => self.loop_variable(node, parent),
            "resource" => self.resource(node, parent)?,
            "method_invocation" => self.method_call(node, parent),
            "object_creation_expression" => self.constructor_call(node, parent),
            "identifier" => {
                let name = self.text(node);
                let id = self.add(Some(parent), NodeKind::Reference, node);
                self.tree.node_mut(id).name = Some(name);
                id
            }
            "field_access" => {
                let id = self.add(Some(parent), NodeKind::Reference, node);
                let name = node.child_by_field_name("field").map(|f| self.text(f));
                let receiver = node.child_by_field_name("object");
                let receiver_text = receiver.map(|r| self.text(r));
                if let Some(object) = receiver {
                    self.expression(object, id);
                }
                let n = self.tree.node_mut(id);
                n.name = name;
                n.receiver = receiver_text;
                id
            }
            "unary_expression" => {
                let id = self.add(Some(parent), NodeKind::Unary, node);
                let operator = node.child_by_field_name("operator").map(|o| self.text(o));
                self.tree.node_mut(id).name = operator;
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.expression(operand, id);
                }
                id
            }
            "parenthesized_expression" => {
                let id = self.add(Some(parent), NodeKind::Parenthesized, node);
                if let Some(inner) = named_children(node).find(|c| !is_comment(*c)) {
                    self.expression(inner, id);
                }
                id
            }
            _ => {
                let literal = parse_literal(kind, &self.text(node))?;
                let id = self.add(Some(parent), NodeKind::Literal, node);
                self.tree.node_mut(id).literal = literal;
                id
            }
        };
        Some(id)
    }

    fn class(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), NodeKind::Class, node);
        let name = node.child_by_field_name("name").map(|n| self.text(n));

        let mut supertypes = Vec::new();
        if let Some(superclass) = child_of_kind(node, "superclass") {
            supertypes.extend(named_children(superclass).map(|t| self.text(t)));
        }
        for list_kind in ["super_interfaces", "extends_interfaces"] {
            if let Some(list) = child_of_kind(node, list_kind) {
                for type_list in named_children(list) {
                    supertypes.extend(named_children(type_list).map(|t| self.text(t)));
                }
            }
        }

        let (modifiers, annotations) = self.modifiers(node);
        let n = self.tree.node_mut(id);
        n.name = name;
        n.supertypes = supertypes;
        n.modifiers = modifiers;
        n.annotations = annotations;

        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                self.visit(member, id);
            }
        }
        id
    }

    fn method(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let kind = if node.kind() == "constructor_declaration" {
            NodeKind::Constructor
        } else {
            NodeKind::Method
        };
        let id = self.add(Some(parent), kind, node);
        let name = node.child_by_field_name("name").map(|n| self.text(n));
        let return_type = node.child_by_field_name("type").map(|t| self.text(t));
        let (modifiers, annotations) = self.modifiers(node);
        let n = self.tree.node_mut(id);
        n.name = name;
        n.type_name = return_type;
        n.modifiers = modifiers;
        n.annotations = annotations;

        if let Some(params) = node.child_by_field_name("parameters") {
            for param in named_children(params) {
                self.visit(param, id);
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, id);
        }
        id
    }

    /// One node per declarator. Returns the first.
    fn variables(&mut self, node: Node<'_>, parent: NodeId) -> Option<NodeId> {
        let kind = if node.kind() == "local_variable_declaration" {
            NodeKind::LocalVariable
        } else {
            NodeKind::Field
        };
        let declared_type = node.child_by_field_name("type").map(|t| self.text(t));
        let (modifiers, annotations) = self.modifiers(node);

        let mut first = None;
        for declarator in named_children(node).filter(|c| c.kind() == "variable_declarator") {
            let id = self.add(Some(parent), kind, node);
            let name = declarator.child_by_field_name("name").map(|n| self.text(n));
            let initializer = declarator
                .child_by_field_name("value")
                .map(|value| self.expression(value, id));
            let n = self.tree.node_mut(id);
            n.name = name;
            n.type_name = declared_type.clone();
            n.modifiers = modifiers.clone();
            n.annotations = annotations.clone();
            n.initializer = initializer;
            first.get_or_insert(id);
        }
        first
    }

    fn parameter(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), NodeKind::Parameter, node);
        let name = node
            .child_by_field_name("name")
            .or_else(|| {
                child_of_kind(node, "variable_declarator")
                    .and_then(|d| d.child_by_field_name("name"))
            })
            .map(|n| self.text(n));
        let declared_type = node
            .child_by_field_name("type")
            .or_else(|| {
                named_children(node)
                    .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"))
            })
            .map(|t| self.text(t));
        let (modifiers, annotations) = self.modifiers(node);
        let n = self.tree.node_mut(id);
        n.name = name;
        n.type_name = declared_type;
        n.modifiers = modifiers;
        n.annotations = annotations;
        id
    }

    /// The lambda itself is an `Other` node; its parameters hang off it.
    fn lambda(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), NodeKind::Other, node);
        if let Some(params) = node.child_by_field_name("parameters") {
            match params.kind() {
                "identifier" => {
                    self.inferred_parameter(params, id);
                }
                "inferred_parameters" => {
                    for param in named_children(params) {
                        self.inferred_parameter(param, id);
                    }
                }
                _ => {
                    for param in named_children(params) {
                        self.visit(param, id);
                    }
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, id);
        }
        id
    }

    fn inferred_parameter(&mut self, ident: Node<'_>, parent: NodeId) -> NodeId {
        let name = self.text(ident);
        let id = self.add(Some(parent), NodeKind::Parameter, ident);
        self.tree.node_mut(id).name = Some(name);
        id
    }

    /// `for (T x : xs)`. The loop body stays attached to `parent`.
    fn loop_variable(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), NodeKind::LocalVariable, node);
        let name = node.child_by_field_name("name").map(|n| self.text(n));
        let declared_type = node.child_by_field_name("type").map(|t| self.text(t));
        let (modifiers, annotations) = self.modifiers(node);
        let n = self.tree.node_mut(id);
        n.name = name;
        n.type_name = declared_type;
        n.modifiers = modifiers;
        n.annotations = annotations;
        for field in ["value", "body"] {
            if let Some(child) = node.child_by_field_name(field) {
                self.visit(child, parent);
            }
        }
        id
    }

    /// A try-with-resources declaration. Resources naming an existing
    /// variable declare nothing.
    fn resource(&mut self, node: Node<'_>, parent: NodeId) -> Option<NodeId> {
        let name = node.child_by_field_name("name").map(|n| self.text(n))?;
        let id = self.add(Some(parent), NodeKind::LocalVariable, node);
        let declared_type = node.child_by_field_name("type").map(|t| self.text(t));
        let (mut modifiers, annotations) = self.modifiers(node);
        if !modifiers.iter().any(|m| m == "final") {
            modifiers.push("final".into());
        }
        let initializer = node
            .child_by_field_name("value")
            .map(|value| self.expression(value, id));
        let n = self.tree.node_mut(id);
        n.name = Some(name);
        n.type_name = declared_type;
        n.modifiers = modifiers;
        n.annotations = annotations;
        n.initializer = initializer;
        Some(id)
    }

    fn method_call(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), NodeKind::MethodCall, node);
        let name = node.child_by_field_name("name").map(|n| self.text(n));
        let object = node.child_by_field_name("object");
        let receiver = object.map(|o| self.text(o));
        if let Some(object) = object {
            self.expression(object, id);
        }
        let arguments = self.arguments(node, id);
        let n = self.tree.node_mut(id);
        n.name = name;
        n.receiver = receiver;
        n.arguments = arguments;
        id
    }

    fn constructor_call(&mut self, node: Node<'_>, parent: NodeId) -> NodeId {
        let id = self.add(Some(parent), NodeKind::ConstructorCall, node);
        let written = node.child_by_field_name("type").map(|t| self.text(t));
        let arguments = self.arguments(node, id);
        if let Some(body) = child_of_kind(node, "class_body") {
            for member in named_children(body) {
                self.visit(member, id);
            }
        }
        let n = self.tree.node_mut(id);
        n.name = written
            .as_deref()
            .map(|t| strip_type_arguments(t).to_string());
        n.type_name = written;
        n.arguments = arguments;
        id
    }

    fn arguments(&mut self, node: Node<'_>, call: NodeId) -> Vec<NodeId> {
        let Some(list) = node.child_by_field_name("arguments") else {
            return Vec::new();
        };
        named_children(list)
            .filter(|c| !is_comment(*c))
            .map(|arg| self.expression(arg, call))
            .collect()
    }

    fn modifiers(&self, node: Node<'_>) -> (Vec<String>, Vec<Annotation>) {
        let mut modifiers = Vec::new();
        let mut annotations = Vec::new();
        let Some(list) = child_of_kind(node, "modifiers") else {
            return (modifiers, annotations);
        };
        for i in 0..list.child_count() {
            let Some(child) = list.child(i) else { continue };
            match child.kind() {
                "annotation" | "marker_annotation" => annotations.push(self.annotation(child)),
                _ if is_comment(child) => {}
                _ => modifiers.push(self.text(child)),
            }
        }
        (modifiers, annotations)
    }

    fn annotation(&self, node: Node<'_>) -> Annotation {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let mut values = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            for arg in named_children(args) {
                if arg.kind() == "element_value_pair" {
                    let is_value = arg
                        .child_by_field_name("key")
                        .is_some_and(|k| self.text(k) == "value");
                    if let (true, Some(value)) = (is_value, arg.child_by_field_name("value")) {
                        self.string_values(value, &mut values);
                    }
                } else {
                    self.string_values(arg, &mut values);
                }
            }
        }
        Annotation {
            name,
            values,
            location: self.location(node),
        }
    }

    fn string_values(&self, node: Node<'_>, out: &mut Vec<String>) {
        match node.kind() {
            "string_literal" => {
                if let Some(Literal::String(s)) = string_literal(&self.text(node)) {
                    out.push(s);
                }
            }
            "element_value_array_initializer" => {
                for element in named_children(node) {
                    self.string_values(element, out);
                }
            }
            _ => {}
        }
    }
}

/// Parse a literal node's text. Returns `None` for non-literal kinds and
/// `Some(None)` for literals whose value cannot be represented.
fn parse_literal(kind: &str, text: &str) -> Option<Option<Literal>> {
    let literal = match kind {
        "true" => Some(Literal::Bool(true)),
        "false" => Some(Literal::Bool(false)),
        "null_literal" => Some(Literal::Null),
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal" => integer_literal(text).map(Literal::Int),
        "decimal_floating_point_literal" | "hex_floating_point_literal" => text
            .replace('_', "")
            .trim_end_matches(['f', 'F', 'd', 'D'])
            .parse::<f64>()
            .ok()
            .map(Literal::Float),
        "character_literal" => {
            let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
            unescape(inner).chars().next().map(Literal::Char)
        }
        "string_literal" => string_literal(text),
        "text_block" => {
            let inner = text.strip_prefix("\"\"\"")?.strip_suffix("\"\"\"")?;
            let body = inner.split_once('\n').map_or("", |(_, rest)| rest);
            Some(Literal::String(unescape(body)))
        }
        _ => return None,
    };
    Some(literal)
}

fn string_literal(text: &str) -> Option<Literal> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    Some(Literal::String(unescape(inner)))
}

fn integer_literal(text: &str) -> Option<i64> {
    let digits = text.replace('_', "");
    let digits = digits.trim_end_matches(['l', 'L']);
    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x").or(digits.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = digits.strip_prefix("0b").or(digits.strip_prefix("0B")) {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    // Hex and binary literals may use the sign bit.
    u64::from_str_radix(body, radix).ok().map(|v| v as i64)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                {
                    out.push(decoded);
                }
            }
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) if value * 8 + next <= 0o377 => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"package com.example.app;

import android.annotation.SuppressLint;
import android.webkit.WebView;
import java.util.*;

public class MainActivity extends Activity implements Runnable, Callback {
    private static final boolean DEBUG = !true;
    private int a = 1, b = 0x10;

    @SuppressLint({"SetJavaScriptEnabled", "ShowToast"})
    public void onCreate(final Bundle state) {
        //noinspection HardcodedText
        final String title = "Hi\tthere";
        WebView view = new WebView(this);
        view.getSettings().setJavaScriptEnabled((DEBUG));
        Map<Integer, String> m = new HashMap<Integer, String>();
    }

    static class Inner {
        Inner() {}
    }
}
"#;

    fn parse_source() -> SyntaxTree {
        parse(Path::new("MainActivity.java"), SOURCE).unwrap()
    }

    fn find<'t>(tree: &'t SyntaxTree, kind: NodeKind, name: &str) -> (NodeId, &'t SyntaxNode) {
        tree.nodes()
            .find(|(_, n)| n.kind == kind && n.name() == name)
            .unwrap_or_else(|| panic!("no {kind:?} named {name}"))
    }

    #[test]
    fn records_package_and_imports() {
        let tree = parse_source();
        assert_eq!(tree.package.as_deref(), Some("com.example.app"));
        assert_eq!(
            tree.imports,
            vec![
                "android.annotation.SuppressLint",
                "android.webkit.WebView",
                "java.util.*"
            ]
        );
    }

    #[test]
    fn maps_class_hierarchy_and_members() {
        let tree = parse_source();
        let (class_id, class) = find(&tree, NodeKind::Class, "MainActivity");
        assert_eq!(class.supertypes, vec!["Activity", "Runnable", "Callback"]);
        assert!(class.has_modifier("public"));

        let (_, debug) = find(&tree, NodeKind::Field, "DEBUG");
        assert!(debug.has_modifier("static") && debug.has_modifier("final"));
        let init = debug.initializer.unwrap();
        assert_eq!(tree.node(init).kind, NodeKind::Unary);
        assert_eq!(tree.node(init).name(), "!");

        let (_, b) = find(&tree, NodeKind::Field, "b");
        assert_eq!(
            tree.node(b.initializer.unwrap()).literal,
            Some(Literal::Int(16))
        );

        let (inner, _) = find(&tree, NodeKind::Class, "Inner");
        assert_eq!(tree.enclosing(inner, NodeKind::Class), Some(class_id));
        let (ctor, _) = find(&tree, NodeKind::Constructor, "Inner");
        assert_eq!(tree.enclosing(ctor, NodeKind::Class), Some(inner));
    }

    #[test]
    fn reads_annotation_values_and_parameters() {
        let tree = parse_source();
        let (method, node) = find(&tree, NodeKind::Method, "onCreate");
        assert_eq!(node.annotations.len(), 1);
        assert_eq!(node.annotations[0].name, "SuppressLint");
        assert_eq!(
            node.annotations[0].values,
            vec!["SetJavaScriptEnabled", "ShowToast"]
        );
        let (_, param) = find(&tree, NodeKind::Parameter, "state");
        assert_eq!(param.type_name.as_deref(), Some("Bundle"));
        assert!(param.has_modifier("final"));
        assert_eq!(param.parent, Some(method));
    }

    #[test]
    fn maps_calls_with_receivers_and_arguments() {
        let tree = parse_source();
        let (_, call) = find(&tree, NodeKind::MethodCall, "setJavaScriptEnabled");
        assert_eq!(call.receiver.as_deref(), Some("view.getSettings()"));
        assert_eq!(call.arguments.len(), 1);
        assert_eq!(tree.node(call.arguments[0]).kind, NodeKind::Parenthesized);
        let (_, inner_call) = find(&tree, NodeKind::MethodCall, "getSettings");
        assert_eq!(inner_call.receiver.as_deref(), Some("view"));

        let (_, ctor) = find(&tree, NodeKind::ConstructorCall, "HashMap");
        assert_eq!(ctor.type_name.as_deref(), Some("HashMap<Integer, String>"));
        let (_, webview) = find(&tree, NodeKind::ConstructorCall, "WebView");
        assert_eq!(webview.arguments.len(), 1);
    }

    #[test]
    fn decodes_string_literals_and_comments() {
        let tree = parse_source();
        let (_, title) = find(&tree, NodeKind::LocalVariable, "title");
        assert_eq!(
            tree.node(title.initializer.unwrap()).literal,
            Some(Literal::String("Hi\tthere".into()))
        );
        assert_eq!(tree.suppress_comment_at(13), Some("HardcodedText"));
    }

    #[test]
    fn scoped_bindings_become_declarations() {
        let tree = parse(
            Path::new("A.java"),
            "class A {\n\
             void f(java.util.List<String> items) {\n\
                 for (final String item : items) { use(item); }\n\
                 try (Reader in = open()) { run(v -> v.go(), (a, b) -> a); }\n\
                 catch (IOException e) { log(e); }\n\
             }\n\
             }\n",
        )
        .unwrap();
        let (_, item) = find(&tree, NodeKind::LocalVariable, "item");
        assert!(item.has_modifier("final"));
        assert_eq!(item.type_name.as_deref(), Some("String"));
        let (_, input) = find(&tree, NodeKind::LocalVariable, "in");
        assert!(input.has_modifier("final"));
        assert!(input.initializer.is_some());
        for name in ["v", "a", "b", "e"] {
            find(&tree, NodeKind::Parameter, name);
        }
        let (method, _) = find(&tree, NodeKind::Method, "f");
        let direct: Vec<_> = tree
            .children_of_kind(method, NodeKind::Parameter)
            .map(|(_, n)| n.name().to_string())
            .collect();
        assert_eq!(direct, vec!["items"]);
    }

    #[test]
    fn block_noinspection_comment() {
        let tree = parse(
            Path::new("A.java"),
            "class A {\n    /* noinspection ShowToast, SetJavaScriptEnabled */\n    void f() {}\n    // plain comment\n    void g() {}\n}\n",
        )
        .unwrap();
        assert_eq!(
            tree.suppress_comment_at(2),
            Some("ShowToast, SetJavaScriptEnabled")
        );
        assert_eq!(tree.suppress_comment_at(4), None);
    }

    #[test]
    fn over_deep_expressions_rejected() {
        let deep = format!(
            "class A {{ int x = {}1{}; }}",
            "(".repeat(2_000),
            ")".repeat(2_000)
        );
        let err = parse(Path::new("A.java"), &deep).unwrap_err();
        assert!(err.to_string().contains("nested deeper"), "{err}");

        let shallow = format!("class A {{ int x = {}1{}; }}", "(".repeat(20), ")".repeat(20));
        assert!(parse(Path::new("A.java"), &shallow).is_ok());
    }

    #[test]
    fn syntax_errors_rejected() {
        let result = parse(Path::new("Bad.java"), "class Bad { void f( { }");
        assert!(matches!(result, Err(LintError::Parse { .. })));
    }

    #[test]
    fn integer_radixes() {
        assert_eq!(integer_literal("1_000L"), Some(1000));
        assert_eq!(integer_literal("0b101"), Some(5));
        assert_eq!(integer_literal("017"), Some(15));
        assert_eq!(integer_literal("0"), Some(0));
        assert_eq!(integer_literal("0xFFFFFFFFFFFFFFFF"), Some(-1));
    }

    #[test]
    fn unescapes_java_escapes() {
        assert_eq!(unescape(r#"a\"b\\cA\101"#), "a\"b\\cAA");
    }
}
