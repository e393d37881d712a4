use std::collections::HashMap;

use super::issue::Issue;
use super::Detector;
use crate::error::{LintError, Result};

/// Immutable table of every issue known to a run.
///
/// Built once through `IssueRegistryBuilder` and then shared by reference;
/// there is no global registry.
#[derive(Debug, Default)]
pub struct IssueRegistry {
    issues: Vec<&'static Issue>,
    by_id: HashMap<&'static str, usize>,
    by_lower_id: HashMap<String, usize>,
}

impl IssueRegistry {
    pub fn builder() -> IssueRegistryBuilder {
        IssueRegistryBuilder::default()
    }

    /// Registry holding the framework issues plus every issue the given
    /// detectors report, in detector order.
    pub fn for_detectors(detectors: &[Box<dyn Detector>]) -> Result<Self> {
        let mut builder = Self::builder();
        for issue in super::framework_issues() {
            builder.register(issue)?;
        }
        for detector in detectors {
            for issue in detector.issues() {
                builder.register(issue)?;
            }
        }
        Ok(builder.build())
    }

    pub fn lookup(&self, id: &str) -> Option<&'static Issue> {
        self.by_id.get(id).map(|&i| self.issues[i])
    }

    pub fn lookup_ignore_case(&self, id: &str) -> Option<&'static Issue> {
        self.by_lower_id
            .get(&id.to_lowercase())
            .map(|&i| self.issues[i])
    }

    pub fn contains(&self, issue: &Issue) -> bool {
        self.by_id.contains_key(issue.id)
    }

    /// All issues in registration order.
    pub fn issues(&self) -> &[&'static Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct IssueRegistryBuilder {
    registry: IssueRegistry,
}

impl IssueRegistryBuilder {
    /// Add an issue. Fails if the id is taken or the metadata is invalid.
    pub fn register(&mut self, issue: &'static Issue) -> Result<&mut Self> {
        if issue.id.is_empty() {
            return Err(LintError::InvalidIssue {
                id: String::new(),
                message: "issue id is empty".into(),
            });
        }
        if !(1..=10).contains(&issue.priority) {
            return Err(LintError::InvalidIssue {
                id: issue.id.into(),
                message: format!("priority {} is outside 1-10", issue.priority),
            });
        }
        if issue.scope().is_empty() {
            return Err(LintError::InvalidIssue {
                id: issue.id.into(),
                message: "scope set is empty".into(),
            });
        }
        let reg = &mut self.registry;
        if reg.by_id.contains_key(issue.id) || reg.by_lower_id.contains_key(&issue.id.to_lowercase())
        {
            return Err(LintError::DuplicateIssue(issue.id.into()));
        }

        let index = reg.issues.len();
        reg.issues.push(issue);
        reg.by_id.insert(issue.id, index);
        reg.by_lower_id.insert(issue.id.to_lowercase(), index);
        tracing::trace!(issue = issue.id, "registered issue");
        Ok(self)
    }

    pub fn build(self) -> IssueRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Category, ScopeSet, Severity};

    static FIRST: Issue = Issue::new(
        "First",
        "First",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::MANIFEST,
    );
    static FIRST_AGAIN: Issue = Issue::new(
        "first",
        "Same id, other case",
        "",
        Category::Correctness,
        5,
        Severity::Warning,
        ScopeSet::MANIFEST,
    );
    static SECOND: Issue = Issue::new(
        "Second",
        "Second",
        "",
        Category::Security,
        9,
        Severity::Error,
        ScopeSet::JAVA_FILE,
    );
    static BAD_PRIORITY: Issue = Issue::new(
        "BadPriority",
        "",
        "",
        Category::Security,
        11,
        Severity::Error,
        ScopeSet::JAVA_FILE,
    );
    static NO_SCOPE: Issue = Issue::new(
        "NoScope",
        "",
        "",
        Category::Security,
        3,
        Severity::Error,
        ScopeSet::empty(),
    );

    #[test]
    fn lookup_round_trips() {
        let mut builder = IssueRegistry::builder();
        builder.register(&FIRST).unwrap().register(&SECOND).unwrap();
        let registry = builder.build();

        for issue in [&FIRST, &SECOND] {
            let found = registry.lookup(issue.id).unwrap();
            assert!(std::ptr::eq(found, issue));
        }
        assert!(registry.lookup("Missing").is_none());
        assert_eq!(registry.issues().len(), 2);
        assert_eq!(registry.issues()[0].id, "First");
    }

    #[test]
    fn duplicate_id_fails() {
        let mut builder = IssueRegistry::builder();
        builder.register(&FIRST).unwrap();
        let err = builder.register(&FIRST).unwrap_err();
        assert!(matches!(err, LintError::DuplicateIssue(id) if id == "First"));
    }

    #[test]
    fn ids_differing_only_in_case_collide() {
        let mut builder = IssueRegistry::builder();
        builder.register(&FIRST).unwrap();
        assert!(builder.register(&FIRST_AGAIN).is_err());
    }

    #[test]
    fn invalid_metadata_rejected() {
        let mut builder = IssueRegistry::builder();
        assert!(matches!(
            builder.register(&BAD_PRIORITY),
            Err(LintError::InvalidIssue { .. })
        ));
        assert!(matches!(
            builder.register(&NO_SCOPE),
            Err(LintError::InvalidIssue { .. })
        ));
    }

    #[test]
    fn case_insensitive_lookup() {
        let mut builder = IssueRegistry::builder();
        builder.register(&SECOND).unwrap();
        let registry = builder.build();
        assert_eq!(registry.lookup_ignore_case("SECOND").unwrap().id, "Second");
        assert!(registry.lookup("SECOND").is_none());
    }
}
