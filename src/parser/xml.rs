use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{LintError, Result};
use crate::ir::xml::{ElementId, XmlAttribute, XmlDocument, XmlElement};
use crate::ir::LineIndex;

use super::MAX_NESTING;

struct OpenElement {
    id: ElementId,
    tag: String,
    /// Length of the namespace stack before this element's declarations.
    namespaces_len: usize,
}

/// Namespace bindings in scope: (prefix, uri). The empty prefix is the
/// default element namespace.
type Namespaces = Vec<(String, String)>;

/// Parse an XML resource or manifest into an element arena.
///
/// Mismatched or unclosed tags, content after the root element, a missing
/// root and nesting deeper than `MAX_NESTING` are errors.
pub fn parse(path: &Path, text: &str) -> Result<XmlDocument> {
    let lines = LineIndex::new(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut doc = XmlDocument::new(path);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut namespaces: Namespaces = Vec::new();
    let mut pending_comments: Vec<String> = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            let at = lines.position(reader.buffer_position() as usize);
            LintError::parse(path, format!("line {}: {e}", at.line))
        })?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if stack.is_empty() && doc.root().is_some() {
                    let at = lines.position(start);
                    return Err(LintError::parse(
                        path,
                        format!("line {}: content after the root element", at.line),
                    ));
                }
                if stack.len() >= MAX_NESTING {
                    let at = lines.position(start);
                    return Err(LintError::parse(
                        path,
                        format!(
                            "line {}: elements nested deeper than {MAX_NESTING} levels",
                            at.line
                        ),
                    ));
                }
                let namespaces_len = namespaces.len();
                let element = build_element(
                    path,
                    text,
                    &lines,
                    e,
                    (start, end),
                    stack.last().map(|o| o.id),
                    &mut namespaces,
                    std::mem::take(&mut pending_comments),
                )?;
                let tag = element.tag.clone();
                let id = doc.push_element(element);
                if matches!(event, Event::Start(_)) {
                    stack.push(OpenElement {
                        id,
                        tag,
                        namespaces_len,
                    });
                } else {
                    namespaces.truncate(namespaces_len);
                }
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let at = lines.position(start);
                let open = stack.pop().ok_or_else(|| {
                    LintError::parse(path, format!("line {}: unexpected </{name}>", at.line))
                })?;
                if open.tag != name {
                    return Err(LintError::parse(
                        path,
                        format!("line {}: expected </{}>, found </{name}>", at.line, open.tag),
                    ));
                }
                namespaces.truncate(open.namespaces_len);
                pending_comments.clear();
            }
            Event::Comment(ref c) => {
                pending_comments.push(String::from_utf8_lossy(c).into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(LintError::parse(
            path,
            format!("unclosed element <{}>", open.tag),
        ));
    }
    if doc.root().is_none() {
        return Err(LintError::parse(path, "no root element"));
    }
    Ok(doc)
}

#[allow(clippy::too_many_arguments)]
fn build_element(
    path: &Path,
    text: &str,
    lines: &LineIndex,
    start_tag: &BytesStart<'_>,
    (start, end): (usize, usize),
    parent: Option<ElementId>,
    namespaces: &mut Namespaces,
    leading_comments: Vec<String>,
) -> Result<XmlElement> {
    let tag = String::from_utf8_lossy(start_tag.name().as_ref()).into_owned();
    let (prefix, local_name) = split_name(&tag);

    let mut raw_attributes = Vec::new();
    for attr in start_tag.attributes() {
        let attr = attr.map_err(|e| LintError::parse(path, format!("{tag}: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = quick_xml::escape::unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or(raw);
        if key == "xmlns" {
            namespaces.push((String::new(), value.clone()));
        } else if let Some(declared) = key.strip_prefix("xmlns:") {
            namespaces.push((declared.to_string(), value.clone()));
        }
        raw_attributes.push((key, value));
    }

    let tag_text = text.get(start..end).unwrap_or("");
    let tag_location = lines.location(path, start, end);
    let mut cursor = 0;
    let attributes = raw_attributes
        .into_iter()
        .map(|(name, value)| {
            let (attr_prefix, attr_local) = split_name(&name);
            let namespace = attr_prefix
                .filter(|p| *p != "xmlns")
                .and_then(|p| resolve(namespaces, p));
            let location = match attribute_span(tag_text, cursor, &name) {
                Some((from, to)) => {
                    cursor = to;
                    lines.location(path, start + from, start + to)
                }
                None => tag_location.clone(),
            };
            XmlAttribute {
                prefix: attr_prefix.map(str::to_string),
                local_name: attr_local.to_string(),
                namespace,
                value,
                location,
                name,
            }
        })
        .collect();

    Ok(XmlElement {
        namespace: resolve(namespaces, prefix.unwrap_or("")),
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
        attributes,
        parent,
        children: Vec::new(),
        location: tag_location,
        leading_comments,
        tag,
    })
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn resolve(namespaces: &Namespaces, prefix: &str) -> Option<String> {
    namespaces
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

/// Span of `key="value"` within a start tag, searching from `from`.
fn attribute_span(tag_text: &str, from: usize, key: &str) -> Option<(usize, usize)> {
    let mut search = from;
    loop {
        let at = search + tag_text.get(search..)?.find(key)?;
        let after_key = at + key.len();
        let preceded_by_space = tag_text[..at].ends_with(char::is_whitespace);
        let rest = tag_text[after_key..].trim_start();
        if preceded_by_space && rest.starts_with('=') {
            let value = rest[1..].trim_start();
            let quote_at = tag_text.len() - value.len();
            let quote = value.chars().next()?;
            let close = tag_text[quote_at + 1..].find(quote)? + quote_at + 1;
            return Some((at, close + 1));
        }
        search = after_key;
    }
}
