use serde::{Deserialize, Serialize};

use super::scope::ScopeSet;

/// Registered metadata for one kind of finding.
///
/// Issues are declared as `static` items next to the detector that reports
/// them and are never mutated.
#[derive(Debug, Serialize)]
pub struct Issue {
    /// Stable identifier used in suppressions and configuration.
    pub id: &'static str,
    pub title: &'static str,
    pub explanation: &'static str,
    pub category: Category,
    /// 1 (lowest) to 10 (highest).
    pub priority: u8,
    pub severity: Severity,
    pub implementation: Implementation,
    pub enabled_by_default: bool,
    pub more_info: &'static [&'static str],
}

impl Issue {
    pub const fn new(
        id: &'static str,
        title: &'static str,
        explanation: &'static str,
        category: Category,
        priority: u8,
        severity: Severity,
        scope: ScopeSet,
    ) -> Self {
        Self {
            id,
            title,
            explanation,
            category,
            priority,
            severity,
            implementation: Implementation { scope },
            enabled_by_default: true,
            more_info: &[],
        }
    }

    pub const fn disabled_by_default(self) -> Self {
        Self {
            enabled_by_default: false,
            ..self
        }
    }

    pub const fn with_more_info(self, urls: &'static [&'static str]) -> Self {
        Self {
            more_info: urls,
            ..self
        }
    }

    pub fn scope(&self) -> ScopeSet {
        self.implementation.scope
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Issue {}

/// Where an issue's detector runs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Implementation {
    pub scope: ScopeSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Informational,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "information" | "informational" => Some(Self::Informational),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Informational => write!(f, "informational"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Diagnostics about the lint run itself.
    Lint,
    Correctness,
    Security,
    Performance,
    Usability,
    Accessibility,
    Internationalization,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lint => write!(f, "Lint"),
            Self::Correctness => write!(f, "Correctness"),
            Self::Security => write!(f, "Security"),
            Self::Performance => write!(f, "Performance"),
            Self::Usability => write!(f, "Usability"),
            Self::Accessibility => write!(f, "Accessibility"),
            Self::Internationalization => write!(f, "Internationalization"),
        }
    }
}
