use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Finding;

type InstanceKey = (String, PathBuf, usize, usize, usize, Option<String>);

#[derive(Debug, Default)]
struct SinkState {
    findings: Vec<Finding>,
    seen: HashSet<InstanceKey>,
    reported_files: HashSet<(String, PathBuf)>,
}

/// Collects findings from every traversal of a run.
///
/// Safe to share across threads; all mutation happens under one lock.
/// Reporting the same issue at the same span twice keeps the first finding.
#[derive(Debug, Default)]
pub struct ReportSink {
    state: Mutex<SinkState>,
}

impl ReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a finding. Returns `false` if an identical instance was
    /// already recorded.
    pub fn report(&self, finding: Finding) -> bool {
        let mut state = self.lock();
        insert(&mut state, finding)
    }

    /// Record a finding unless this issue was already reported for the
    /// same file through this method.
    pub fn report_once_per_file(&self, finding: Finding) -> bool {
        let mut state = self.lock();
        let key = (finding.issue_id.clone(), finding.location.file.clone());
        if state.reported_files.contains(&key) {
            return false;
        }
        let inserted = insert(&mut state, finding);
        if inserted {
            state.reported_files.insert(key);
        }
        inserted
    }

    pub fn len(&self) -> usize {
        self.lock().findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take all findings, sorted by file, start offset, end offset and issue id.
    pub fn drain(&self) -> Vec<Finding> {
        let mut state = self.lock();
        state.seen.clear();
        state.reported_files.clear();
        let mut findings = std::mem::take(&mut state.findings);
        drop(state);
        findings.sort_by(|a, b| {
            let (la, lb) = (&a.location, &b.location);
            la.file
                .cmp(&lb.file)
                .then(la.start.offset.cmp(&lb.start.offset))
                .then(la.end.offset.cmp(&lb.end.offset))
                .then_with(|| a.issue_id.cmp(&b.issue_id))
                .then_with(|| la.start.line.cmp(&lb.start.line))
                .then_with(|| a.message.cmp(&b.message))
        });
        findings
    }
}

fn insert(state: &mut SinkState, finding: Finding) -> bool {
    let loc = &finding.location;
    // Line-only locations (bytecode) carry no offsets and file-level ones
    // carry nothing at all; the line and message keep those apart.
    let key = (
        finding.issue_id.clone(),
        loc.file.clone(),
        loc.start.offset,
        loc.end.offset,
        loc.start.line,
        (!loc.has_position()).then(|| finding.message.clone()),
    );
    if !state.seen.insert(key) {
        return false;
    }
    state.findings.push(finding);
    true
}
