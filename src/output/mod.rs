pub mod console;
pub mod json;
pub mod sarif;
pub mod xml;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::policy::PolicyVerdict;
use crate::rules::{Finding, IssueRegistry};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Sarif,
    Xml,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

/// What a report describes: the project and the issues that were checked.
#[derive(Clone, Copy)]
pub struct ReportTarget<'a> {
    pub name: &'a str,
    pub root: &'a Path,
    pub registry: &'a IssueRegistry,
}

impl ReportTarget<'_> {
    /// `path` relative to the project root when it lies under it.
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Relative path with `/` separators, for URIs and XML reports.
    pub fn uri(&self, path: &Path) -> String {
        self.relative(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Render findings into the specified format.
pub fn render(
    findings: &[Finding],
    verdict: &PolicyVerdict,
    format: OutputFormat,
    target: &ReportTarget<'_>,
) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(findings, verdict, target)),
        OutputFormat::Json => json::render(findings, verdict),
        OutputFormat::Sarif => sarif::render(findings, target),
        OutputFormat::Xml => Ok(xml::render(findings, target)),
    }
}
