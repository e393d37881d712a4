use crate::ir::xml::{ElementId, XmlDocument};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static SCROLL_VIEW_COUNT: Issue = Issue::new(
    "ScrollViewCount",
    "`ScrollView` can have only one child",
    "ScrollViews can only have one child widget. If you want more children, wrap \
     them in a container layout.",
    Category::Correctness,
    8,
    Severity::Warning,
    ScopeSet::RESOURCE_FILE,
)
.with_more_info(&["https://developer.android.com/reference/android/widget/ScrollView"]);

const SCROLL_VIEWS: &[&str] = &[
    "ScrollView",
    "HorizontalScrollView",
    "android.support.v4.widget.NestedScrollView",
    "androidx.core.widget.NestedScrollView",
];

/// ScrollViewCount: scroll views with more than one direct child.
pub struct ScrollViewCountDetector;

impl Detector for ScrollViewCountDetector {
    fn name(&self) -> &'static str {
        "ScrollViewCountDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&SCROLL_VIEW_COUNT]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Elements(Selector::names(SCROLL_VIEWS.iter().copied()))]
    }

    fn visit_element(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
    ) -> TraversalControl {
        let el = doc.element(element);
        if el.children.len() > 1 {
            ctx.report(
                &SCROLL_VIEW_COUNT,
                Anchor::Element(element),
                el.location.clone(),
                "A scroll view can have only one child",
            );
        }
        TraversalControl::Continue
    }
}
