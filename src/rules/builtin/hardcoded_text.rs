use crate::ir::xml::{ElementId, XmlDocument};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static HARDCODED_TEXT: Issue = Issue::new(
    "HardcodedText",
    "Hardcoded text",
    "Hardcoding text attributes directly in layout files is bad for several reasons:\n\n\
     * When creating configuration variations (for example for landscape or \
     portrait) you have to repeat the actual text (and keep it up to date when \
     making changes)\n\n\
     * The application cannot be translated to other languages by just adding new \
     translations for existing string resources.\n\n\
     There are quickfixes to automatically extract this hardcoded string into a \
     resource lookup.",
    Category::Internationalization,
    5,
    Severity::Warning,
    ScopeSet::RESOURCE_FILE.union(ScopeSet::MANIFEST),
);

const TEXT_ATTRIBUTES: &[&str] = &["text", "contentDescription", "hint", "label", "prompt"];

/// HardcodedText: user-visible strings written inline instead of as resources.
pub struct HardcodedTextDetector;

impl Detector for HardcodedTextDetector {
    fn name(&self) -> &'static str {
        "HardcodedTextDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&HARDCODED_TEXT]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Attributes(Selector::names(
            TEXT_ATTRIBUTES.iter().copied(),
        ))]
    }

    fn visit_attribute(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
        attribute: usize,
    ) -> TraversalControl {
        let attr = &doc.element(element).attributes[attribute];
        if !attr.is_android() {
            return TraversalControl::Continue;
        }
        let value = attr.value.as_str();
        // Resource and theme references, and data binding expressions.
        if value.is_empty() || value.starts_with('@') || value.starts_with('?') {
            return TraversalControl::Continue;
        }
        ctx.report(
            &HARDCODED_TEXT,
            Anchor::Element(element),
            attr.location.clone(),
            format!("[I18N] Hardcoded string \"{value}\", should use `@string` resource"),
        );
        TraversalControl::Continue
    }
}
