//! droidlint: Android lint rule engine.
//!
//! Discovers the artifacts of an Android project (manifest, XML resources,
//! Java sources, class files, property files), parses each one once, and
//! dispatches traversal events to the detectors that asked for them.
//! Findings are filtered through suppressions and configuration, then
//! rendered as console text, JSON, SARIF or the lint XML report.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use droidlint::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./my-app"), &options).unwrap();
//! println!("Pass: {}, Findings: {}", report.verdict.pass, report.findings.len());
//! ```

pub mod config;
pub mod error;
pub mod ir;
pub mod output;
pub mod parser;
pub mod project;
pub mod rules;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use config::Config;
use error::Result;
use output::{OutputFormat, ReportTarget};
use project::DiscoverOptions;
use rules::policy::PolicyVerdict;
use rules::{Driver, Finding, IssueRegistry, RunOptions};

/// Options for a scan invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.droidlint.toml` in the project root).
    pub config_path: Option<PathBuf>,
    /// CLI override for fail_on threshold.
    pub fail_on_override: Option<rules::Severity>,
    /// Check only these files; project-wide detectors are skipped.
    pub files: Vec<PathBuf>,
    /// Parse and check files in parallel.
    pub parallel: bool,
    /// Stop starting new files after this long.
    pub timeout: Option<Duration>,
}

/// Complete scan report.
#[derive(Debug)]
pub struct ScanReport {
    pub project_name: String,
    pub root: PathBuf,
    pub findings: Vec<Finding>,
    pub verdict: PolicyVerdict,
    pub files_checked: usize,
    /// Some files were skipped because the timeout elapsed.
    pub timed_out: bool,
    /// Detector failures during the run.
    pub crashes: usize,
    /// Every issue that was checked, for rendering rule metadata.
    pub registry: Arc<IssueRegistry>,
}

/// Run a complete scan: discover, parse, dispatch, evaluate policy.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let root = if path.is_file() {
        path.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        path.to_path_buf()
    };

    // Load config
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| root.join(config::CONFIG_FILE));
    let mut config = Config::load(&config_path)?;

    // Apply CLI override
    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }

    let project = project::discover(path, &DiscoverOptions::default())?;
    tracing::info!(
        project = %project.name,
        artifacts = project.artifacts.len(),
        "scanning project"
    );

    let detectors = rules::builtin::all_detectors(&config)?;
    let registry = Arc::new(IssueRegistry::for_detectors(&detectors)?);
    let driver = Driver::new(Arc::clone(&registry), detectors, &config)?;

    let run_options = RunOptions {
        parallel: options.parallel,
        deadline: options.timeout.map(|t| Instant::now() + t),
        files: options.files.clone(),
    };
    let outcome = driver.run(&project, &run_options)?;

    // Apply policy (disabled issues, overrides)
    let findings = config.policy.apply(&outcome.findings);
    let verdict = config.policy.evaluate(&findings);

    Ok(ScanReport {
        project_name: project.name,
        root: project.root,
        findings,
        verdict,
        files_checked: outcome.files_checked,
        timed_out: outcome.timed_out,
        crashes: outcome.crashes,
        registry,
    })
}

/// Render a scan report in the specified format.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> Result<String> {
    let target = ReportTarget {
        name: &report.project_name,
        root: &report.root,
        registry: &report.registry,
    };
    output::render(&report.findings, &report.verdict, format, &target)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::fs;

    fn issue_ids(report: &ScanReport) -> BTreeSet<&str> {
        report.findings.iter().map(|f| f.issue_id.as_str()).collect()
    }

    #[test]
    fn clean_app_zero_findings() {
        let report = scan(Path::new("tests/fixtures/clean_app"), &ScanOptions::default()).unwrap();
        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert!(report.verdict.pass);
        assert_eq!(report.files_checked, 3);
    }

    #[test]
    fn sample_app_issues_detected() {
        let report = scan(Path::new("tests/fixtures/sample_app"), &ScanOptions::default()).unwrap();
        assert_eq!(
            issue_ids(&report),
            BTreeSet::from([
                "ContentDescription",
                "DuplicateIds",
                "HardcodedText",
                "ManifestTypo",
                "PropertyEscape",
                "Registered",
                "ScrollViewCount",
                "SetJavaScriptEnabled",
                "ShowToast",
            ])
        );
        assert!(!report.verdict.pass);
        assert_eq!(report.crashes, 0);
        assert!(!report.timed_out);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let sequential =
            scan(Path::new("tests/fixtures/sample_app"), &ScanOptions::default()).unwrap();
        let parallel = scan(
            Path::new("tests/fixtures/sample_app"),
            &ScanOptions {
                parallel: true,
                ..ScanOptions::default()
            },
        )
        .unwrap();
        assert_eq!(sequential.findings, parallel.findings);
    }

    #[test]
    fn single_file_mode_skips_project_detectors() {
        let root = Path::new("tests/fixtures/sample_app");
        let options = ScanOptions {
            files: vec![root.join("src/com/example/app/SettingsActivity.java")],
            ..ScanOptions::default()
        };
        let report = scan(root, &options).unwrap();
        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert_eq!(report.files_checked, 1);
    }

    #[test]
    fn config_disables_and_overrides() {
        let dir = tempfile::Builder::new().prefix("app").tempdir().unwrap();
        fs::create_dir_all(dir.path().join("res/layout")).unwrap();
        fs::write(
            dir.path().join("res/layout/main.xml"),
            r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <ImageView/>
    <Button android:text="Go"/>
</LinearLayout>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(config::CONFIG_FILE),
            "[policy]\ndisable = [\"ContentDescription\"]\n\n[policy.overrides]\nHardcodedText = \"error\"\n",
        )
        .unwrap();

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(issue_ids(&report), BTreeSet::from(["HardcodedText"]));
        assert_eq!(report.findings[0].severity, rules::Severity::Error);
        assert!(!report.verdict.pass);

        let lenient = ScanOptions {
            fail_on_override: Some(rules::Severity::Fatal),
            ..ScanOptions::default()
        };
        assert!(scan(dir.path(), &lenient).unwrap().verdict.pass);
    }

    #[test]
    fn malformed_xml_reported_as_parser_error() {
        let dir = tempfile::Builder::new().prefix("app").tempdir().unwrap();
        fs::create_dir_all(dir.path().join("res/layout")).unwrap();
        fs::write(dir.path().join("res/layout/broken.xml"), "<LinearLayout><TextView>").unwrap();
        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(issue_ids(&report), BTreeSet::from(["ParserError"]));
        assert_eq!(report.files_checked, 0);
    }

    #[test]
    fn deeply_nested_layout_reported_not_fatal() {
        let dir = tempfile::Builder::new().prefix("app").tempdir().unwrap();
        fs::create_dir_all(dir.path().join("res/layout")).unwrap();
        fs::write(
            dir.path().join("res/layout/deep.xml"),
            format!("{}{}", "<a>".repeat(100_000), "</a>".repeat(100_000)),
        )
        .unwrap();
        fs::write(
            dir.path().join("res/layout/main.xml"),
            r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"><ImageView/></LinearLayout>"#,
        )
        .unwrap();

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(
            issue_ids(&report),
            BTreeSet::from(["ContentDescription", "ParserError"])
        );
        assert_eq!(report.files_checked, 1);
    }

    #[test]
    fn renders_every_format() {
        let report = scan(Path::new("tests/fixtures/sample_app"), &ScanOptions::default()).unwrap();
        for format in [
            OutputFormat::Console,
            OutputFormat::Json,
            OutputFormat::Sarif,
            OutputFormat::Xml,
        ] {
            let out = render_report(&report, format).unwrap();
            assert!(out.contains("ScrollViewCount"), "{format:?}");
        }
        let sarif = render_report(&report, OutputFormat::Sarif).unwrap();
        assert!(sarif.contains("\"uri\": \"res/layout/activity_main.xml\""));
    }
}
