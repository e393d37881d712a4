use crate::ir::SourceText;
use crate::rules::{Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Severity};

pub static PROPERTY_ESCAPE: Issue = Issue::new(
    "PropertyEscape",
    "Incorrect property escapes",
    "All backslashes and colons in .property files must be escaped with a \
     backslash (\\). This means that when writing a Windows path, you must \
     escape the file separators, so the path \\My\\Files should be written as \
     `key=\\\\My\\\\Files.`",
    Category::Correctness,
    5,
    Severity::Error,
    ScopeSet::PROPERTY,
);

/// Characters that may follow a backslash in a property value.
const VALID_ESCAPES: &[char] = &['\\', ':', '=', 't', 'n', 'r', 'f', 'u', ' ', '#', '!'];

/// Byte range of the value on a `key=value` / `key: value` / `key value` line.
fn value_span(line: &str) -> Option<(usize, usize)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
        return None;
    }
    let start = line.len() - trimmed.len();

    let mut chars = line[start..].char_indices().peekable();
    let mut key_end = line.len();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' | ' ' | '\t' => {
                key_end = start + i;
                break;
            }
            _ => {}
        }
    }

    let rest = &line[key_end..];
    let after_ws = rest.trim_start_matches([' ', '\t']);
    let after_sep = after_ws
        .strip_prefix(['=', ':'])
        .unwrap_or(after_ws)
        .trim_start_matches([' ', '\t']);
    let value_start = line.len() - after_sep.len();
    let value_end = line.trim_end_matches('\r').len();
    (value_start < value_end).then_some((value_start, value_end))
}

/// Whether a value has a stray backslash escape, or an unescaped drive
/// separator in a value that uses backslashes.
fn needs_escaping(value: &str) -> bool {
    if !value.contains('\\') {
        return false;
    }
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                // Trailing backslash continues the value on the next line.
                None => return false,
                Some(next) if VALID_ESCAPES.contains(&next) => {}
                Some(_) => return true,
            },
            ':' => return true,
            _ => {}
        }
    }
    false
}

/// The value with every file and drive separator escaped once.
fn escaped(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('\\' | ':')) => {
                out.push('\\');
                out.extend(chars.next());
            }
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            _ => out.push(c),
        }
    }
    out
}

/// PropertyEscape: Windows paths written into `.properties` without escaping.
pub struct PropertyEscapeDetector;

impl Detector for PropertyEscapeDetector {
    fn name(&self) -> &'static str {
        "PropertyEscapeDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&PROPERTY_ESCAPE]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::WholeFile]
    }

    fn scan_file(&self, ctx: &mut LintContext<'_>, source: &SourceText) {
        let mut offset = 0;
        for line in source.content.split_inclusive('\n') {
            let text = line.trim_end_matches('\n');
            if let Some((start, end)) = value_span(text) {
                let value = &text[start..end];
                if needs_escaping(value) {
                    ctx.report(
                        &PROPERTY_ESCAPE,
                        Anchor::File,
                        source.location(offset + start, offset + end),
                        format!(
                            "Windows file separators (`\\`) and drive letter separators \
                             (':') must be escaped (`\\\\`) in property files; use `{}`",
                            escaped(value)
                        ),
                    );
                }
            }
            offset += line.len();
        }
    }
}
