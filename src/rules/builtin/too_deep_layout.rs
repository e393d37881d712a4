use serde::Deserialize;

use crate::config::Config;
use crate::error::{LintError, Result};
use crate::ir::xml::{ElementId, XmlDocument};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static TOO_DEEP_LAYOUT: Issue = Issue::new(
    "TooDeepLayout",
    "Layout hierarchy is too deep",
    "Layouts with too much nesting is bad for performance. Consider using a flatter \
     layout (such as `RelativeLayout` or `GridLayout`). The default maximum depth is \
     10 but can be configured with `max_depth` in `[rules.TooDeepLayout]`.",
    Category::Performance,
    1,
    Severity::Warning,
    ScopeSet::RESOURCE_FILE,
);

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    max_depth: Option<usize>,
}

/// TooDeepLayout: element nesting beyond `max_depth`, reported once per layout.
pub struct TooDeepLayoutDetector {
    max_depth: usize,
}

impl TooDeepLayoutDetector {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let settings: Settings = config.rule_settings(TOO_DEEP_LAYOUT.id)?;
        let max_depth = settings.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(LintError::Config(
                "[rules.TooDeepLayout] max_depth must be at least 1".into(),
            ));
        }
        Ok(Self::new(max_depth))
    }
}

impl Detector for TooDeepLayoutDetector {
    fn name(&self) -> &'static str {
        "TooDeepLayoutDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&TOO_DEEP_LAYOUT]
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
        if doc.depth(element) <= self.max_depth {
            return TraversalControl::Continue;
        }
        let el = doc.element(element);
        let reported = ctx.report_once_per_file(
            &TOO_DEEP_LAYOUT,
            Anchor::Element(element),
            el.location.clone(),
            format!(
                "`{}` has more than {} levels, bad for performance",
                el.tag, self.max_depth
            ),
        );
        if reported {
            TraversalControl::StopFile
        } else {
            // Suppressed here; a deeper element elsewhere may still count.
            TraversalControl::SkipChildren
        }
    }
}
