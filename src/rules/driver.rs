use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rayon::prelude::*;

use super::context::{FileView, LintContext, RunState, Scratch};
use super::dispatch::{guarded, FileDispatch, VisitorRegistry};
use super::policy::Policy;
use super::registry::IssueRegistry;
use super::sink::ReportSink;
use super::suppress::SuppressionResolver;
use super::symbols::ProjectSymbols;
use super::{Detector, Finding, PARSER_ERROR};
use crate::config::Config;
use crate::error::{LintError, Result};
use crate::ir::{Location, ParsedArtifact, SourceText};
use crate::parser;
use crate::project::{Artifact, Project};

/// Options for one `Driver::run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Parse and check files on the rayon pool.
    pub parallel: bool,
    /// Files not started by this instant are skipped.
    pub deadline: Option<Instant>,
    /// Restrict the run to these files. Detectors that need the whole
    /// project are skipped when this is non-empty.
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub findings: Vec<Finding>,
    pub files_checked: usize,
    pub timed_out: bool,
    /// Detector panics, including those beyond the reporting cap.
    pub crashes: usize,
}

struct ParsedFile<'p> {
    artifact: &'p Artifact,
    parsed: std::result::Result<ParsedArtifact, String>,
    source: SourceText,
}

/// Runs a fixed set of detectors over projects.
pub struct Driver {
    registry: Arc<IssueRegistry>,
    detectors: Vec<Box<dyn Detector>>,
    visitors: VisitorRegistry,
    policy: Policy,
    /// Detectors with at least one enabled issue.
    enabled: Vec<bool>,
}

impl Driver {
    pub fn new(
        registry: Arc<IssueRegistry>,
        detectors: Vec<Box<dyn Detector>>,
        config: &Config,
    ) -> Result<Self> {
        for detector in &detectors {
            for issue in detector.issues() {
                if !registry.contains(issue) {
                    return Err(LintError::InvalidIssue {
                        id: issue.id.into(),
                        message: format!("reported by {} but not registered", detector.name()),
                    });
                }
            }
        }
        let visitors = VisitorRegistry::build(&detectors)?;
        let enabled = detectors
            .iter()
            .map(|d| d.issues().iter().any(|i| config.policy.is_enabled(i)))
            .collect();
        Ok(Self {
            registry,
            detectors,
            visitors,
            policy: config.policy.clone(),
            enabled,
        })
    }

    /// Check a project: parse, project hooks, per-file traversals, then
    /// drain the sorted findings.
    pub fn run(&self, project: &Project, options: &RunOptions) -> Result<RunOutcome> {
        let single_file = !options.files.is_empty();
        let artifacts: Vec<&Artifact> = project
            .artifacts
            .iter()
            .filter(|a| !single_file || options.files.iter().any(|f| same_file(f, &a.path)))
            .collect();

        let active: Vec<bool> = self
            .detectors
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let project_wide =
                    d.scope().needs_whole_project() || self.visitors.needs_whole_project(i);
                if single_file && project_wide && self.enabled[i] {
                    tracing::debug!(detector = d.name(), "skipped in single-file mode");
                }
                self.enabled[i] && !(single_file && project_wide)
            })
            .collect();

        let files: Vec<ParsedFile<'_>> = if options.parallel {
            artifacts.par_iter().map(|a| parse(a)).collect()
        } else {
            artifacts.iter().map(|a| parse(a)).collect()
        };

        let symbols = ProjectSymbols::build(
            files.iter().filter_map(|f| match &f.parsed {
                Ok(ParsedArtifact::Syntax(tree)) => Some(tree),
                _ => None,
            }),
            files.iter().filter_map(|f| match &f.parsed {
                Ok(ParsedArtifact::Class(class)) => Some(class),
                _ => None,
            }),
        );
        let suppressions = SuppressionResolver::new(&self.policy, &project.root)?;
        let sink = ReportSink::new();
        let crashes = AtomicUsize::new(0);
        let project_states: Vec<Mutex<Scratch>> =
            self.detectors.iter().map(|_| Mutex::default()).collect();
        let run = RunState {
            project,
            registry: &self.registry,
            symbols: &symbols,
            suppressions: &suppressions,
            policy: &self.policy,
            sink: &sink,
            project_states: &project_states,
            crashes: &crashes,
        };

        for file in &files {
            if let Err(message) = &file.parsed {
                tracing::warn!(file = %file.artifact.path.display(), "parse failed: {message}");
                run.report_internal(
                    &PARSER_ERROR,
                    Location::file_only(&file.artifact.path),
                    message.clone(),
                );
            }
        }

        self.project_hook(&run, &active, "before_check_project", |d, ctx| {
            d.before_check_project(ctx)
        });

        let files_checked = AtomicUsize::new(0);
        let timed_out = AtomicBool::new(false);
        let check = |file: &ParsedFile<'_>| {
            let Ok(parsed) = &file.parsed else {
                return;
            };
            if options.deadline.is_some_and(|d| Instant::now() >= d) {
                if !timed_out.swap(true, Ordering::SeqCst) {
                    tracing::warn!("deadline reached, skipping remaining files");
                }
                return;
            }
            let scope = file.artifact.scope;
            let applicable = self
                .detectors
                .iter()
                .enumerate()
                .map(|(i, d)| active[i] && d.scope().applies_to(scope))
                .collect();
            let view = FileView {
                path: &file.artifact.path,
                scope,
                artifact: parsed,
                source: &file.source,
            };
            tracing::trace!(file = %view.path.display(), %scope, "checking file");
            FileDispatch::new(&self.visitors, &self.detectors, &run, view, applicable).run();
            files_checked.fetch_add(1, Ordering::Relaxed);
        };
        if options.parallel {
            files.par_iter().for_each(check);
        } else {
            files.iter().for_each(check);
        }

        self.project_hook(&run, &active, "after_check_project", |d, ctx| {
            d.after_check_project(ctx)
        });

        let findings = sink.drain();
        tracing::debug!(
            findings = findings.len(),
            files = files_checked.load(Ordering::Relaxed),
            "run complete"
        );
        Ok(RunOutcome {
            findings,
            files_checked: files_checked.into_inner(),
            timed_out: timed_out.into_inner(),
            crashes: crashes.into_inner(),
        })
    }

    fn project_hook(
        &self,
        run: &RunState<'_>,
        active: &[bool],
        callback: &'static str,
        f: impl Fn(&dyn Detector, &mut LintContext<'_>),
    ) {
        for (i, detector) in self.detectors.iter().enumerate() {
            if !active[i] {
                continue;
            }
            let detector = detector.as_ref();
            let mut scratch = Scratch::default();
            let mut ctx = LintContext::new(
                detector.name(),
                run,
                None,
                &mut scratch,
                &run.project_states[i],
            );
            guarded(run, detector, callback, &run.project.root, || {
                f(detector, &mut ctx)
            });
        }
    }
}

fn parse(artifact: &Artifact) -> ParsedFile<'_> {
    match parser::parse_artifact(artifact) {
        Ok((parsed, source)) => ParsedFile {
            artifact,
            parsed: Ok(parsed),
            source,
        },
        Err(e) => {
            let message = match e {
                LintError::Parse { message, .. } => message,
                other => other.to_string(),
            };
            ParsedFile {
                artifact,
                parsed: Err(message),
                source: SourceText::new(&artifact.path, ""),
            }
        }
    }
}

fn same_file(wanted: &Path, path: &Path) -> bool {
    if wanted == path || path.ends_with(wanted) {
        return true;
    }
    match (wanted.canonicalize(), path.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::xml::ElementId;
    use crate::ir::XmlDocument;
    use crate::project::{discover, DiscoverOptions};
    use crate::rules::{
        Anchor, Capability, Category, Issue, ScopeSet, Selector, Severity, TraversalControl,
        LINT_ERROR,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::fs;

    static ELEMENT_SEEN: Issue = Issue::new(
        "ElementSeen",
        "Element seen",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::RESOURCE_FILE,
    );

    static EVENT_LOG: Issue = Issue::new(
        "EventLog",
        "Event log",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::RESOURCE_FILE,
    );

    static PROJECT_WIDE: Issue = Issue::new(
        "ProjectWide",
        "Project wide",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::ALL_RESOURCE_FILES,
    );

    /// Reports every element it sees; skips below `skip`, stops at `stop`.
    struct Recorder {
        skip: &'static str,
        stop: &'static str,
    }

    impl Detector for Recorder {
        fn name(&self) -> &'static str {
            "Recorder"
        }
        fn issues(&self) -> Vec<&'static Issue> {
            vec![&ELEMENT_SEEN]
        }
        fn capabilities(&self) -> Vec<Capability> {
            vec![Capability::Elements(Selector::All)]
        }
        fn visit_element(
            &self,
            ctx: &mut LintContext<'_>,
            doc: &XmlDocument,
            element: ElementId,
        ) -> TraversalControl {
            let el = doc.element(element);
            ctx.report(
                &ELEMENT_SEEN,
                Anchor::Element(element),
                el.location.clone(),
                el.tag.clone(),
            );
            if el.tag == self.skip {
                TraversalControl::SkipChildren
            } else if el.tag == self.stop {
                TraversalControl::StopFile
            } else {
                TraversalControl::Continue
            }
        }
    }

    /// Panics on `Bomb` elements.
    struct Fragile;

    impl Detector for Fragile {
        fn name(&self) -> &'static str {
            "Fragile"
        }
        fn issues(&self) -> Vec<&'static Issue> {
            vec![&EVENT_LOG]
        }
        fn capabilities(&self) -> Vec<Capability> {
            vec![Capability::Elements(Selector::names(["Bomb"]))]
        }
        fn visit_element(
            &self,
            _ctx: &mut LintContext<'_>,
            _doc: &XmlDocument,
            _element: ElementId,
        ) -> TraversalControl {
            panic!("boom");
        }
    }

    /// Logs callback order into per-file state and reports it at the end.
    struct Sequencer;

    #[derive(Default)]
    struct Events(Vec<String>);

    impl Detector for Sequencer {
        fn name(&self) -> &'static str {
            "Sequencer"
        }
        fn issues(&self) -> Vec<&'static Issue> {
            vec![&EVENT_LOG]
        }
        fn capabilities(&self) -> Vec<Capability> {
            vec![
                Capability::Document,
                Capability::Elements(Selector::names(["LinearLayout", "Button"])),
                Capability::Attributes(Selector::names(["text"])),
            ]
        }
        fn before_check_file(&self, ctx: &mut LintContext<'_>) {
            ctx.file_state::<Events>().0.push("begin".into());
        }
        fn visit_document(&self, ctx: &mut LintContext<'_>, _doc: &XmlDocument) -> TraversalControl {
            ctx.file_state::<Events>().0.push("document".into());
            TraversalControl::Continue
        }
        fn visit_element(
            &self,
            ctx: &mut LintContext<'_>,
            doc: &XmlDocument,
            element: ElementId,
        ) -> TraversalControl {
            let tag = doc.element(element).tag.clone();
            ctx.file_state::<Events>().0.push(format!("<{tag}>"));
            TraversalControl::Continue
        }
        fn visit_attribute(
            &self,
            ctx: &mut LintContext<'_>,
            doc: &XmlDocument,
            element: ElementId,
            attribute: usize,
        ) -> TraversalControl {
            let name = doc.element(element).attributes[attribute].local_name.clone();
            ctx.file_state::<Events>().0.push(format!("@{name}"));
            TraversalControl::Continue
        }
        fn visit_element_after(&self, ctx: &mut LintContext<'_>, doc: &XmlDocument, element: ElementId) {
            let tag = doc.element(element).tag.clone();
            ctx.file_state::<Events>().0.push(format!("</{tag}>"));
        }
        fn after_check_file(&self, ctx: &mut LintContext<'_>) {
            let events = std::mem::take(&mut ctx.file_state::<Events>().0);
            let path = ctx.path().unwrap_or(Path::new("")).to_path_buf();
            ctx.report(&EVENT_LOG, Anchor::File, Location::file_only(path), events.join(" "));
        }
    }

    /// Counts files across the project.
    struct Counter;

    #[derive(Default)]
    struct Count(usize);

    impl Detector for Counter {
        fn name(&self) -> &'static str {
            "Counter"
        }
        fn issues(&self) -> Vec<&'static Issue> {
            vec![&PROJECT_WIDE]
        }
        fn capabilities(&self) -> Vec<Capability> {
            vec![Capability::Document]
        }
        fn visit_document(&self, ctx: &mut LintContext<'_>, _doc: &XmlDocument) -> TraversalControl {
            ctx.with_project_state(|count: &mut Count| count.0 += 1);
            TraversalControl::Continue
        }
        fn after_check_project(&self, ctx: &mut LintContext<'_>) {
            let count = ctx.with_project_state(|count: &mut Count| count.0);
            let root = ctx.project().root.clone();
            ctx.report(
                &PROJECT_WIDE,
                Anchor::File,
                Location::file_only(root),
                format!("{count} layouts"),
            );
        }
    }

    static TAGGED_A: Issue = Issue::new(
        "TaggedA",
        "Tagged by A",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::RESOURCE_FILE,
    );

    static TAGGED_B: Issue = Issue::new(
        "TaggedB",
        "Tagged by B",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::RESOURCE_FILE,
    );

    /// Reports every element matching `tags` and logs the visit to a
    /// shared log.
    struct Tagger {
        label: &'static str,
        issue: &'static Issue,
        tags: &'static [&'static str],
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Tagger {
        fn boxed(
            label: &'static str,
            issue: &'static Issue,
            tags: &'static [&'static str],
            log: &Arc<Mutex<Vec<String>>>,
        ) -> Box<dyn Detector> {
            Box::new(Self {
                label,
                issue,
                tags,
                log: Arc::clone(log),
            })
        }
    }

    impl Detector for Tagger {
        fn name(&self) -> &'static str {
            self.label
        }
        fn issues(&self) -> Vec<&'static Issue> {
            vec![self.issue]
        }
        fn capabilities(&self) -> Vec<Capability> {
            vec![Capability::Elements(Selector::names(self.tags.iter().copied()))]
        }
        fn visit_element(
            &self,
            ctx: &mut LintContext<'_>,
            doc: &XmlDocument,
            element: ElementId,
        ) -> TraversalControl {
            let el = doc.element(element);
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, el.tag));
            ctx.report(
                self.issue,
                Anchor::Element(element),
                el.location.clone(),
                el.tag.clone(),
            );
            TraversalControl::Continue
        }
    }

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, Project) {
        let dir = tempfile::Builder::new().prefix("proj").tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let project = discover(dir.path(), &DiscoverOptions::default()).unwrap();
        (dir, project)
    }

    fn driver(detectors: Vec<Box<dyn Detector>>, config: &Config) -> Driver {
        let registry = Arc::new(IssueRegistry::for_detectors(&detectors).unwrap());
        Driver::new(registry, detectors, config).unwrap()
    }

    fn messages(findings: &[Finding], id: &str) -> Vec<String> {
        findings
            .iter()
            .filter(|f| f.issue_id == id)
            .map(|f| f.message.clone())
            .collect()
    }

    const NESTED: &str = r#"<LinearLayout>
    <FrameLayout>
        <TextView/>
    </FrameLayout>
    <Button/>
    <Stop/>
    <After/>
</LinearLayout>
"#;

    #[test]
    fn skip_children_and_stop_file() {
        let (_dir, project) = project(&[("res/layout/main.xml", NESTED)]);
        let driver = driver(
            vec![Box::new(Recorder {
                skip: "FrameLayout",
                stop: "Stop",
            })],
            &Config::default(),
        );
        let outcome = driver.run(&project, &RunOptions::default()).unwrap();
        assert_eq!(
            messages(&outcome.findings, "ElementSeen"),
            vec!["LinearLayout", "FrameLayout", "Button", "Stop"]
        );
        assert_eq!(outcome.files_checked, 1);
    }

    #[test]
    fn callbacks_follow_document_order() {
        let (_dir, project) = project(&[(
            "res/layout/main.xml",
            r#"<LinearLayout><Button text="a" id="b"/><TextView text="c"/></LinearLayout>"#,
        )]);
        let driver = driver(vec![Box::new(Sequencer)], &Config::default());
        let outcome = driver.run(&project, &RunOptions::default()).unwrap();
        assert_eq!(
            messages(&outcome.findings, "EventLog"),
            vec!["begin document <LinearLayout> <Button> @text </Button> @text </LinearLayout>"]
        );
    }

    #[test]
    fn disjoint_detectors_report_union_of_findings() {
        let (_dir, project) = project(&[(
            "res/layout/main.xml",
            "<LinearLayout><ImageView/><Button/><ScrollView><TextView/></ScrollView></LinearLayout>",
        )]);
        let log = Arc::new(Mutex::new(Vec::new()));
        let run = |detectors: Vec<Box<dyn Detector>>| -> BTreeSet<(String, String, usize)> {
            driver(detectors, &Config::default())
                .run(&project, &RunOptions::default())
                .unwrap()
                .findings
                .into_iter()
                .map(|f| (f.issue_id, f.message, f.location.start.offset))
                .collect()
        };

        let a = run(vec![Tagger::boxed("A", &TAGGED_A, &["ImageView", "ScrollView"], &log)]);
        let b = run(vec![Tagger::boxed("B", &TAGGED_B, &["Button", "TextView"], &log)]);
        let both = run(vec![
            Tagger::boxed("A", &TAGGED_A, &["ImageView", "ScrollView"], &log),
            Tagger::boxed("B", &TAGGED_B, &["Button", "TextView"], &log),
        ]);

        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert_eq!(both, a.union(&b).cloned().collect());
    }

    #[test]
    fn shared_tag_dispatched_in_registration_order() {
        let (_dir, project) = project(&[(
            "res/layout/main.xml",
            "<LinearLayout><Button/><Button/></LinearLayout>",
        )]);
        let orders: [(&'static str, &'static Issue, &'static str, &'static Issue); 2] = [
            ("A", &TAGGED_A, "B", &TAGGED_B),
            ("B", &TAGGED_B, "A", &TAGGED_A),
        ];
        for (first, first_issue, second, second_issue) in orders {
            let log = Arc::new(Mutex::new(Vec::new()));
            let driver = driver(
                vec![
                    Tagger::boxed(first, first_issue, &["Button"], &log),
                    Tagger::boxed(second, second_issue, &["Button", "LinearLayout"], &log),
                ],
                &Config::default(),
            );
            driver.run(&project, &RunOptions::default()).unwrap();
            assert_eq!(
                *log.lock().unwrap(),
                vec![
                    format!("{second}:LinearLayout"),
                    format!("{first}:Button"),
                    format!("{second}:Button"),
                    format!("{first}:Button"),
                    format!("{second}:Button"),
                ]
            );
        }
    }

    #[test]
    fn panicking_detector_is_contained() {
        let (_dir, project) = project(&[(
            "res/layout/main.xml",
            "<LinearLayout><Bomb/><TextView/></LinearLayout>",
        )]);
        let driver = driver(
            vec![
                Box::new(Fragile),
                Box::new(Recorder {
                    skip: "",
                    stop: "",
                }),
            ],
            &Config::default(),
        );
        let outcome = driver.run(&project, &RunOptions::default()).unwrap();
        assert_eq!(outcome.crashes, 1);
        assert_eq!(
            messages(&outcome.findings, "ElementSeen"),
            vec!["LinearLayout", "Bomb", "TextView"]
        );
        let crash = messages(&outcome.findings, LINT_ERROR.id);
        assert_eq!(crash.len(), 1);
        assert!(crash[0].contains("Fragile"));
        assert!(crash[0].contains("boom"));
    }

    #[test]
    fn malformed_file_reports_parser_error_and_continues() {
        let (_dir, project) = project(&[
            ("res/layout/bad.xml", "<LinearLayout><TextView></LinearLayout>"),
            ("res/layout/good.xml", "<Button/>"),
        ]);
        let driver = driver(
            vec![Box::new(Recorder {
                skip: "",
                stop: "",
            })],
            &Config::default(),
        );
        let outcome = driver.run(&project, &RunOptions::default()).unwrap();
        assert_eq!(messages(&outcome.findings, "ParserError").len(), 1);
        assert_eq!(messages(&outcome.findings, "ElementSeen"), vec!["Button"]);
        let parser_error = outcome
            .findings
            .iter()
            .find(|f| f.issue_id == "ParserError")
            .unwrap();
        assert!(parser_error.location.file.ends_with("bad.xml"));
    }

    #[test]
    fn project_state_spans_files_and_single_file_mode_skips_it() {
        let (dir, project) = project(&[
            ("res/layout/a.xml", "<A/>"),
            ("res/layout/b.xml", "<B/>"),
        ]);
        let driver = driver(vec![Box::new(Counter)], &Config::default());

        let outcome = driver.run(&project, &RunOptions::default()).unwrap();
        assert_eq!(messages(&outcome.findings, "ProjectWide"), vec!["2 layouts"]);

        let options = RunOptions {
            files: vec![dir.path().join("res/layout/a.xml")],
            ..RunOptions::default()
        };
        let outcome = driver.run(&project, &options).unwrap();
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.files_checked, 1);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let files: Vec<(String, String)> = (0..12)
            .map(|i| {
                (
                    format!("res/layout/l{i:02}.xml"),
                    format!("<LinearLayout><Button/><Item{i}/></LinearLayout>"),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        let (_dir, project) = project(&borrowed);
        let driver = driver(
            vec![Box::new(Recorder {
                skip: "",
                stop: "",
            })],
            &Config::default(),
        );
        let sequential = driver.run(&project, &RunOptions::default()).unwrap();
        let parallel = driver
            .run(
                &project,
                &RunOptions {
                    parallel: true,
                    ..RunOptions::default()
                },
            )
            .unwrap();
        assert_eq!(sequential.findings, parallel.findings);
        assert_eq!(sequential.findings.len(), 36);
    }

    #[test]
    fn expired_deadline_skips_files() {
        let (_dir, project) = project(&[("res/layout/a.xml", "<A/>")]);
        let driver = driver(
            vec![Box::new(Recorder {
                skip: "",
                stop: "",
            })],
            &Config::default(),
        );
        let options = RunOptions {
            deadline: Some(Instant::now()),
            ..RunOptions::default()
        };
        let outcome = driver.run(&project, &options).unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.files_checked, 0);
    }

    #[test]
    fn disabled_issue_detector_not_run() {
        let (_dir, project) = project(&[("res/layout/a.xml", "<A/>")]);
        let mut config = Config::default();
        config.policy.disable.insert("ElementSeen".into());
        let driver = driver(
            vec![Box::new(Recorder {
                skip: "",
                stop: "",
            })],
            &config,
        );
        let outcome = driver.run(&project, &RunOptions::default()).unwrap();
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn unregistered_detector_issue_rejected() {
        let registry = Arc::new(IssueRegistry::default());
        let detectors: Vec<Box<dyn Detector>> = vec![Box::new(Sequencer)];
        assert!(matches!(
            Driver::new(registry, detectors, &Config::default()),
            Err(LintError::InvalidIssue { .. })
        ));
    }
}
