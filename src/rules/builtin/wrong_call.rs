use crate::ir::bytecode::InvokeKind;
use crate::ir::ClassArtifact;
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
};

pub static WRONG_CALL: Issue = Issue::new(
    "WrongCall",
    "Using wrong draw/layout method",
    "Custom views typically need to call `measure()` on their children, not \
     `onMeasure`. Ditto for onDraw, onLayout, etc.",
    Category::Correctness,
    6,
    Severity::Fatal,
    ScopeSet::CLASS_FILE,
);

/// Framework callbacks, their descriptors, and the method callers should use instead.
const CALLBACKS: &[(&str, &str, &str)] = &[
    ("onDraw", "(Landroid/graphics/Canvas;)V", "draw"),
    ("onMeasure", "(II)V", "measure"),
    ("onLayout", "(ZIIII)V", "layout"),
];

/// WrongCall: direct calls to view lifecycle callbacks outside their own overrides.
pub struct WrongCallDetector;

impl Detector for WrongCallDetector {
    fn name(&self) -> &'static str {
        "WrongCallDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&WRONG_CALL]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::BytecodeCalls(Selector::names(
            CALLBACKS.iter().map(|(name, _, _)| *name),
        ))]
    }

    fn check_call(
        &self,
        ctx: &mut LintContext<'_>,
        class: &ClassArtifact,
        method: usize,
        call: usize,
    ) {
        let caller = &class.methods[method];
        let insn = &caller.calls[call];
        let Some((_, _, suggested)) = CALLBACKS
            .iter()
            .find(|(name, descriptor, _)| insn.name == *name && insn.descriptor == *descriptor)
        else {
            return;
        };
        // `super.onDraw(canvas)` from inside an `onDraw` override.
        if insn.kind == InvokeKind::Special && caller.name == insn.name {
            return;
        }
        ctx.report(
            &WRONG_CALL,
            Anchor::Method(method),
            ctx.call_location(class, method, call),
            format!(
                "Suspicious method call; should probably call \"`{suggested}`\" rather than \
                 \"`{}`\"",
                insn.name
            ),
        );
    }
}
