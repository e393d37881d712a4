use std::collections::BTreeSet;

use crate::error::Result;
use crate::ir::Location;
use crate::rules::{Finding, Severity};

use super::ReportTarget;

use serde_json::{json, Value};

/// Render findings as SARIF 2.1.0.
///
/// Produces a self-contained SARIF log compatible with GitHub Code Scanning
/// and other SARIF consumers. Rule metadata comes from the issue registry;
/// paths are relative to the project root (`%SRCROOT%`).
pub fn render(findings: &[Finding], target: &ReportTarget<'_>) -> Result<String> {
    let ids: Vec<&str> = findings
        .iter()
        .map(|f| f.issue_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rules: Vec<Value> = ids
        .iter()
        .map(|id| match target.registry.lookup(id) {
            Some(issue) => {
                let mut rule = json!({
                    "id": issue.id,
                    "name": issue.id,
                    "shortDescription": { "text": issue.title },
                    "fullDescription": { "text": issue.explanation },
                    "defaultConfiguration": {
                        "level": severity_to_sarif_level(issue.severity),
                        "rank": issue.priority as f64 * 10.0,
                    },
                    "properties": {
                        "tags": [issue.category.to_string()],
                    },
                });
                if let Some(uri) = issue.more_info.first() {
                    rule["helpUri"] = json!(uri);
                }
                rule
            }
            None => json!({ "id": id }),
        })
        .collect();

    let results: Vec<Value> = findings
        .iter()
        .map(|f| {
            let rule_index = ids.iter().position(|id| *id == f.issue_id);
            let mut result = json!({
                "ruleId": f.issue_id,
                "ruleIndex": rule_index,
                "level": severity_to_sarif_level(f.severity),
                "message": { "text": f.message },
                "locations": [location(target, &f.location)],
                "partialFingerprints": {
                    "droidlintFingerprint/v1": f.fingerprint,
                },
            });
            if let Some(secondary) = f.secondary() {
                let mut related = location(target, secondary);
                related["id"] = json!(1);
                if let Some(message) = &secondary.message {
                    related["message"] = json!({ "text": message });
                }
                result["relatedLocations"] = json!([related]);
            }
            result
        })
        .collect();

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "droidlint",
                    "informationUri": env!("CARGO_PKG_REPOSITORY"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "originalUriBaseIds": {
                "%SRCROOT%": {
                    "uri": format!("file://{}/", target.root.display()),
                },
            },
            "invocations": [{
                "executionSuccessful": true,
                "endTimeUtc": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            }],
            "results": results,
            "automationDetails": {
                "id": format!("droidlint/{}/", target.name),
                "guid": uuid::Uuid::new_v4().to_string(),
            },
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn location(target: &ReportTarget<'_>, loc: &Location) -> Value {
    let mut physical = json!({
        "artifactLocation": {
            "uri": target.uri(&loc.file),
            "uriBaseId": "%SRCROOT%",
        },
    });
    if loc.has_position() {
        let mut region = json!({ "startLine": loc.start.line });
        if loc.start.column > 0 {
            region["startColumn"] = json!(loc.start.column);
        }
        if loc.end.line >= loc.start.line && loc.end.column > 0 {
            region["endLine"] = json!(loc.end.line);
            region["endColumn"] = json!(loc.end.column);
        }
        physical["region"] = region;
    }
    json!({ "physicalLocation": physical })
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal | Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Informational => "note",
    }
}
