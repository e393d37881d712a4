use std::collections::HashMap;

use crate::ir::xml::{ElementId, XmlDocument};
use crate::ir::Location;
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static DUPLICATE_IDS: Issue = Issue::new(
    "DuplicateIds",
    "Duplicate ids within a single layout",
    "Within a layout, id's should be unique since otherwise `findViewById()` can \
     return an unexpected view.",
    Category::Correctness,
    7,
    Severity::Fatal,
    ScopeSet::RESOURCE_FILE,
);

const NEW_ID_PREFIX: &str = "@+id/";

/// First definition of each id in the current layout.
#[derive(Default)]
struct SeenIds(HashMap<String, Location>);

/// DuplicateIds: the same `@+id/` declared twice in one layout.
pub struct DuplicateIdDetector;

impl Detector for DuplicateIdDetector {
    fn name(&self) -> &'static str {
        "DuplicateIdDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&DUPLICATE_IDS]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Attributes(Selector::names(["id"]))]
    }

    fn visit_attribute(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
        attribute: usize,
    ) -> TraversalControl {
        let el = doc.element(element);
        let attr = &el.attributes[attribute];
        if !attr.is_android() {
            return TraversalControl::Continue;
        }
        let id = attr.value.as_str();

        let first = ctx.file_state::<SeenIds>().0.get(id).cloned();
        match first {
            Some(first) => {
                let location = attr.location.clone().with_secondary(
                    first.with_message(format!("`{id}` originally defined here")),
                );
                ctx.report(
                    &DUPLICATE_IDS,
                    Anchor::Element(element),
                    location,
                    format!("Duplicate id `{id}`, already defined earlier in this layout"),
                );
            }
            // Ids on include tags override the included layout's root id.
            None if id.starts_with(NEW_ID_PREFIX) && el.tag != "include" => {
                ctx.file_state::<SeenIds>()
                    .0
                    .insert(id.to_string(), attr.location.clone());
            }
            None => {}
        }
        TraversalControl::Continue
    }
}
