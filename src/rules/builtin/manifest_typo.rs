use crate::ir::xml::{ElementId, XmlDocument};
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static MANIFEST_TYPO: Issue = Issue::new(
    "ManifestTypo",
    "Typos in manifest tags",
    "This check looks through the manifest, and if it finds any tags that look like \
     likely misspellings, they are flagged.",
    Category::Correctness,
    5,
    Severity::Fatal,
    ScopeSet::MANIFEST,
);

/// Tags the manifest schema defines.
const MANIFEST_TAGS: &[&str] = &[
    "manifest",
    "application",
    "activity",
    "activity-alias",
    "service",
    "receiver",
    "provider",
    "uses-permission",
    "uses-permission-sdk-23",
    "permission",
    "permission-tree",
    "permission-group",
    "uses-sdk",
    "uses-feature",
    "uses-library",
    "uses-configuration",
    "supports-screens",
    "compatible-screens",
    "supports-gl-texture",
    "instrumentation",
    "meta-data",
    "intent-filter",
    "action",
    "category",
    "data",
    "grant-uri-permission",
    "path-permission",
    "screen",
    "queries",
    "package",
    "intent",
    "layout",
    "profileable",
    "property",
];

const MAX_DISTANCE: usize = 2;

/// Closest known tag within `MAX_DISTANCE` edits, if `tag` is not itself known.
fn suggestion(tag: &str) -> Option<&'static str> {
    if MANIFEST_TAGS.contains(&tag) {
        return None;
    }
    let lower = tag.to_lowercase();
    MANIFEST_TAGS
        .iter()
        .map(|&known| (levenshtein::levenshtein(&lower, known), known))
        .filter(|(distance, _)| *distance <= MAX_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

/// ManifestTypo: unknown manifest tags within a couple of edits of a real one.
pub struct ManifestTypoDetector;

impl Detector for ManifestTypoDetector {
    fn name(&self) -> &'static str {
        "ManifestTypoDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&MANIFEST_TYPO]
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
        // Namespaced and custom tags are outside the manifest schema.
        if el.prefix.is_some() || el.tag.contains('.') {
            return TraversalControl::Continue;
        }
        if let Some(known) = suggestion(&el.tag) {
            ctx.report(
                &MANIFEST_TYPO,
                Anchor::Element(element),
                el.location.clone(),
                format!("Misspelled tag `<{}>`: Did you mean `<{known}>` ?", el.tag),
            );
        }
        TraversalControl::Continue
    }
}
