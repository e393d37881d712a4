use crate::error::Result;
use crate::rules::policy::PolicyVerdict;
use crate::rules::Finding;

use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    findings: &'a [Finding],
    verdict: &'a PolicyVerdict,
}

/// Render findings as a JSON report.
pub fn render(findings: &[Finding], verdict: &PolicyVerdict) -> Result<String> {
    let report = JsonReport { findings, verdict };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn findings_and_verdict_serialized() {
        let findings = fixtures::findings();
        let out = render(&findings, &fixtures::verdict(&findings)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["findings"][1]["issue_id"], "DuplicateIds");
        assert_eq!(value["findings"][1]["severity"], "fatal");
        assert_eq!(
            value["findings"][1]["location"]["secondary"]["start"]["line"],
            4
        );
        assert_eq!(value["verdict"]["pass"], false);
    }
}
