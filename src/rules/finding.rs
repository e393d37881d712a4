use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::issue::{Category, Issue, Severity};
use crate::ir::Location;

/// One reported instance of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Issue identifier (e.g., "ScrollViewCount").
    pub issue_id: String,
    /// Issue title.
    pub title: String,
    /// Effective severity after configuration overrides.
    pub severity: Severity,
    pub category: Category,
    pub priority: u8,
    /// Human-readable description of this instance.
    pub message: String,
    /// Primary location; may chain a secondary location.
    pub location: Location,
    /// Stable hash of issue id, file and message.
    pub fingerprint: String,
}

impl Finding {
    pub fn new(issue: &Issue, severity: Severity, location: Location, message: String) -> Self {
        let fingerprint = fingerprint(issue.id, &location, &message);
        Self {
            issue_id: issue.id.to_string(),
            title: issue.title.to_string(),
            severity,
            category: issue.category,
            priority: issue.priority,
            message,
            location,
            fingerprint,
        }
    }

    pub fn secondary(&self) -> Option<&Location> {
        self.location.secondary.as_deref()
    }
}

fn fingerprint(issue_id: &str, location: &Location, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(issue_id.as_bytes());
    hasher.update([0]);
    hasher.update(location.file.to_string_lossy().as_bytes());
    hasher.update([0]);
    hasher.update(message.as_bytes());
    hex::encode(hasher.finalize())
}
