use super::ReportTarget;
use crate::ir::Location;
use crate::rules::policy::PolicyVerdict;
use crate::rules::{Finding, Severity};

/// Render findings as console output, grouped by severity then file path.
pub fn render(findings: &[Finding], verdict: &PolicyVerdict, target: &ReportTarget<'_>) -> String {
    let mut output = String::new();

    if findings.is_empty() {
        output.push_str("\n  No issues found.\n\n");
        return output;
    }

    // Most severe first; the input is already in file/offset order within a severity.
    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity));

    output.push_str(&format!("\n  {} issue(s) found:\n\n", findings.len()));

    for finding in &sorted {
        let severity_tag = match finding.severity {
            Severity::Fatal => "[FATAL]  ",
            Severity::Error => "[ERROR]  ",
            Severity::Warning => "[WARNING]",
            Severity::Informational => "[INFO]   ",
        };

        output.push_str(&format!(
            "  {} {} {}\n",
            severity_tag, finding.issue_id, finding.message
        ));
        output.push_str(&format!(
            "            at {}\n",
            position(target, &finding.location)
        ));
        if let Some(secondary) = finding.secondary() {
            output.push_str(&format!(
                "            also {}",
                position(target, secondary)
            ));
            if let Some(message) = &secondary.message {
                output.push_str(&format!(": {message}"));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n\n",
        status,
        verdict.fail_threshold,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}

fn position(target: &ReportTarget<'_>, location: &Location) -> String {
    let file = target.relative(&location.file);
    match (location.start.line, location.start.column) {
        (0, _) => file.display().to_string(),
        (line, 0) => format!("{}:{line}", file.display()),
        (line, column) => format!("{}:{line}:{column}", file.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;
    use std::path::Path;

    #[test]
    fn fatal_first_with_relative_paths() {
        let registry = fixtures::registry();
        let target = ReportTarget {
            name: "proj",
            root: Path::new("/proj"),
            registry: &registry,
        };
        let findings = fixtures::findings();
        let out = render(&findings, &fixtures::verdict(&findings), &target);

        let fatal = out.find("[FATAL]").unwrap();
        let warning = out.find("[WARNING]").unwrap();
        assert!(fatal < warning);
        assert!(out.contains("at res/layout/main.xml:7:9"));
        assert!(out.contains("also res/layout/main.xml:4:9: `@+id/ok` originally defined here"));
        assert!(out.contains("Result: FAIL (threshold: error, highest: fatal)"));
    }

    #[test]
    fn empty_report() {
        let registry = fixtures::registry();
        let target = ReportTarget {
            name: "proj",
            root: Path::new("/proj"),
            registry: &registry,
        };
        let out = render(&[], &fixtures::verdict(&[]), &target);
        assert!(out.contains("No issues found."));
    }
}
