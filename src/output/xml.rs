use quick_xml::escape::escape;

use super::ReportTarget;
use crate::ir::Location;
use crate::rules::{Finding, Severity};

/// Version of the `<issues>` report layout.
const FORMAT_VERSION: u32 = 4;

/// Render findings in the `<issues format="4">` layout IDE and CI
/// integrations read.
pub fn render(findings: &[Finding], target: &ReportTarget<'_>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<issues format=\"{FORMAT_VERSION}\" by=\"droidlint {}\">\n",
        env!("CARGO_PKG_VERSION")
    ));

    for finding in findings {
        out.push_str("\n    <issue\n");
        attribute(&mut out, 8, "id", &finding.issue_id);
        attribute(&mut out, 8, "severity", severity_name(finding.severity));
        attribute(&mut out, 8, "message", &finding.message);
        attribute(&mut out, 8, "category", &finding.category.to_string());
        attribute(&mut out, 8, "priority", &finding.priority.to_string());
        attribute(&mut out, 8, "summary", &finding.title);
        if let Some(issue) = target.registry.lookup(&finding.issue_id) {
            attribute(&mut out, 8, "explanation", issue.explanation);
            if !issue.more_info.is_empty() {
                attribute(&mut out, 8, "url", &issue.more_info.join(","));
            }
        }
        out.truncate(out.trim_end().len());
        out.push_str(">\n");

        let mut next = Some(&finding.location);
        while let Some(location) = next {
            write_location(&mut out, target, location);
            next = location.secondary.as_deref();
        }
        out.push_str("    </issue>\n");
    }

    out.push_str("\n</issues>\n");
    out
}

fn write_location(out: &mut String, target: &ReportTarget<'_>, location: &Location) {
    out.push_str("        <location\n");
    attribute(out, 12, "file", &target.uri(&location.file));
    if location.has_position() {
        attribute(out, 12, "line", &location.start.line.to_string());
        if location.start.column > 0 {
            attribute(out, 12, "column", &location.start.column.to_string());
        }
    }
    if let Some(message) = &location.message {
        attribute(out, 12, "message", message);
    }
    out.truncate(out.trim_end().len());
    out.push_str("/>\n");
}

fn attribute(out: &mut String, indent: usize, name: &str, value: &str) {
    out.push_str(&" ".repeat(indent));
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push_str("\"\n");
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal => "Fatal",
        Severity::Error => "Error",
        Severity::Warning => "Warning",
        Severity::Informational => "Information",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;
    use crate::parser::xml::parse;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn issues_report_is_well_formed() {
        let registry = fixtures::registry();
        let target = ReportTarget {
            name: "proj",
            root: Path::new("/proj"),
            registry: &registry,
        };
        let out = render(&fixtures::findings(), &target);
        assert!(out.starts_with("<?xml"));

        let doc = parse(Path::new("report.xml"), &out).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.element(root).tag, "issues");
        assert_eq!(
            doc.element(root).attribute(None, "format").unwrap().value,
            "4"
        );

        let issues: Vec<_> = doc.children(root).collect();
        assert_eq!(issues.len(), 2);
        let (dup_id, dup) = issues[1];
        assert_eq!(dup.attribute(None, "id").unwrap().value, "DuplicateIds");
        assert_eq!(dup.attribute(None, "severity").unwrap().value, "Fatal");

        let locations: Vec<_> = doc.children(dup_id).map(|(_, l)| l).collect();
        assert_eq!(locations.len(), 2);
        assert_eq!(
            locations[0].attribute(None, "file").unwrap().value,
            "res/layout/main.xml"
        );
        assert_eq!(locations[0].attribute(None, "line").unwrap().value, "7");
        assert_eq!(
            locations[1].attribute(None, "message").unwrap().value,
            "`@+id/ok` originally defined here"
        );
    }
}
