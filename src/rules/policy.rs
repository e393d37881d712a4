use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Finding, Issue, Severity};

/// Policy verdict: the final pass/fail decision after applying the
/// disable list and severity overrides to raw findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_findings: usize,
    pub effective_findings: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
}

/// Project policy loaded from the `[policy]` table of `.droidlint.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the run.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Issue ids to turn off entirely. `all` turns off every issue not
    /// listed in `enable`.
    #[serde(default)]
    pub disable: HashSet<String>,
    /// Issue ids to turn on, including those disabled by default.
    #[serde(default)]
    pub enable: HashSet<String>,
    /// Per-issue severity overrides.
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
    /// Per-issue path globs, relative to the project root, where the issue
    /// is not reported. The key `all` applies to every issue.
    #[serde(default)]
    pub ignore_paths: HashMap<String, Vec<String>>,
    /// Honour `<!--suppress -->` and `//noinspection` comments.
    #[serde(default = "default_true")]
    pub check_comments: bool,
    /// Report every warning as an error.
    #[serde(default)]
    pub warnings_as_errors: bool,
}

fn default_fail_on() -> Severity {
    Severity::Error
}

fn default_true() -> bool {
    true
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: Severity::Error,
            disable: HashSet::new(),
            enable: HashSet::new(),
            overrides: HashMap::new(),
            ignore_paths: HashMap::new(),
            check_comments: true,
            warnings_as_errors: false,
        }
    }
}

impl Policy {
    /// Whether an issue should be checked at all. Ids in `enable`,
    /// `disable` and `overrides` match case-insensitively.
    pub fn is_enabled(&self, issue: &Issue) -> bool {
        if contains_id(&self.enable, issue.id) {
            return true;
        }
        if contains_id(&self.disable, issue.id) || contains_id(&self.disable, "all") {
            return false;
        }
        issue.enabled_by_default
    }

    pub fn is_id_enabled(&self, issue_id: &str) -> bool {
        contains_id(&self.enable, issue_id)
            || !(contains_id(&self.disable, issue_id) || contains_id(&self.disable, "all"))
    }

    /// Severity a finding of this issue is reported with.
    pub fn effective_severity(&self, issue_id: &str, default: Severity) -> Severity {
        let severity = self
            .overrides
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(issue_id))
            .map(|(_, severity)| *severity)
            .unwrap_or(default);
        if self.warnings_as_errors && severity == Severity::Warning {
            Severity::Error
        } else {
            severity
        }
    }

    /// Evaluate findings against this policy and produce a verdict.
    pub fn evaluate(&self, findings: &[Finding]) -> PolicyVerdict {
        let effective: Vec<Severity> = findings
            .iter()
            .filter(|f| self.is_id_enabled(&f.issue_id))
            .map(|f| self.effective_severity(&f.issue_id, f.severity))
            .collect();

        let highest = effective.iter().copied().max();
        let failed = effective.iter().any(|&sev| sev >= self.fail_on);

        PolicyVerdict {
            pass: !failed,
            total_findings: findings.len(),
            effective_findings: effective.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
        }
    }

    /// Filter findings: remove disabled issues, apply overrides.
    pub fn apply(&self, findings: &[Finding]) -> Vec<Finding> {
        findings
            .iter()
            .filter(|f| self.is_id_enabled(&f.issue_id))
            .map(|f| {
                let mut f = f.clone();
                f.severity = self.effective_severity(&f.issue_id, f.severity);
                f
            })
            .collect()
    }
}

fn contains_id(ids: &HashSet<String>, issue_id: &str) -> bool {
    ids.iter().any(|id| id.eq_ignore_ascii_case(issue_id))
}
