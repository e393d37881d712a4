use crate::ir::xml::{ElementId, XmlDocument};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static CONTENT_DESCRIPTION: Issue = Issue::new(
    "ContentDescription",
    "Image without `contentDescription`",
    "Non-textual widgets like ImageViews and ImageButtons should use the \
     `contentDescription` attribute to specify a textual description of the widget \
     such that screen readers and other accessibility tools can adequately describe \
     the user interface.\n\n\
     Note that elements in application screens that are purely decorative and do not \
     provide any content or enable a user action should not have accessibility \
     content descriptions. In this case, just suppress the lint warning with a \
     tools:ignore=\"ContentDescription\" attribute.",
    Category::Accessibility,
    3,
    Severity::Warning,
    ScopeSet::RESOURCE_FILE,
);

/// ContentDescription: images that screen readers cannot describe.
pub struct ContentDescriptionDetector;

impl Detector for ContentDescriptionDetector {
    fn name(&self) -> &'static str {
        "ContentDescriptionDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&CONTENT_DESCRIPTION]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Elements(Selector::names([
            "ImageView",
            "ImageButton",
        ]))]
    }

    fn visit_element(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
    ) -> TraversalControl {
        let el = doc.element(element);
        let hidden = el
            .android_attribute("importantForAccessibility")
            .is_some_and(|a| a.value == "no");
        if hidden {
            return TraversalControl::Continue;
        }

        match el.android_attribute("contentDescription") {
            None => {
                ctx.report(
                    &CONTENT_DESCRIPTION,
                    Anchor::Element(element),
                    el.location.clone(),
                    "[Accessibility] Missing `contentDescription` attribute on image",
                );
            }
            Some(attr) if attr.value.trim().is_empty() => {
                ctx.report(
                    &CONTENT_DESCRIPTION,
                    Anchor::Element(element),
                    attr.location.clone(),
                    "[Accessibility] Empty `contentDescription` attribute on image",
                );
            }
            Some(_) => {}
        }
        TraversalControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::builtin::harness::{lint, messages};
    use pretty_assertions::assert_eq;

    const NS: &str = r#"xmlns:android="http://schemas.android.com/apk/res/android""#;

    #[test]
    fn missing_description_reported_once() {
        let findings = lint(&[("res/layout/main.xml", "<ImageView/>")]);
        assert_eq!(
            messages(&findings, "ContentDescription"),
            vec!["[Accessibility] Missing `contentDescription` attribute on image"]
        );
    }

    #[test]
    fn empty_description_and_decorative_images() {
        let layout = format!(
            r#"<LinearLayout {NS}>
    <ImageButton android:contentDescription=""/>
    <ImageView android:contentDescription="@string/logo"/>
    <ImageView android:importantForAccessibility="no"/>
</LinearLayout>"#
        );
        let findings = lint(&[("res/layout/main.xml", &layout)]);
        let found = messages(&findings, "ContentDescription");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Empty"));
    }

    #[test]
    fn tools_ignore_suppresses() {
        let layout = format!(
            r#"<LinearLayout {NS} xmlns:tools="http://schemas.android.com/tools"
    tools:ignore="ContentDescription">
    <ImageView/>
</LinearLayout>"#
        );
        let findings = lint(&[("res/layout/main.xml", &layout)]);
        assert!(messages(&findings, "ContentDescription").is_empty());
    }
}
