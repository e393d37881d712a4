use std::collections::HashMap;

use crate::ir::syntax::{NodeId, SyntaxTree};
use crate::ir::xml::{ElementId, XmlDocument};
use crate::ir::Location;
use crate::rules::symbols::qualified_class_name;
use crate::rules::{
    Anchor, Capability, Category, Detector, Issue, LintContext, ScopeSet, Selector, Severity,
    TraversalControl,
};

pub static REGISTERED: Issue = Issue::new(
    "Registered",
    "Class is not registered in the manifest",
    "Activities, services and content providers should be registered in the \
     `AndroidManifest.xml` file using `<activity>`, `<service>` and `<provider>` tags.\n\n\
     If your activity is simply a parent class intended to be subclassed by other \
     \"real\" activities, make it an abstract class.",
    Category::Correctness,
    6,
    Severity::Warning,
    ScopeSet::MANIFEST.union(ScopeSet::JAVA_FILE),
)
.with_more_info(&["https://developer.android.com/guide/topics/manifest/manifest-intro.html"]);

/// Component base classes and the manifest tag each must be registered with.
const COMPONENTS: &[(&str, &str)] = &[
    ("android.app.Activity", "activity"),
    ("android.app.Service", "service"),
    ("android.content.BroadcastReceiver", "receiver"),
    ("android.content.ContentProvider", "provider"),
];

fn tag_for(super_class: &str) -> Option<&'static str> {
    COMPONENTS
        .iter()
        .find(|(class, _)| *class == super_class)
        .map(|(_, tag)| *tag)
}

fn with_article(tag: &str) -> String {
    match tag.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {tag}"),
        _ => format!("a {tag}"),
    }
}

/// Manifest `package` attribute of the file being traversed.
#[derive(Default)]
struct ManifestPackage(Option<String>);

struct Component {
    class: String,
    tag: &'static str,
    location: Location,
}

#[derive(Default)]
struct Components {
    manifest_seen: bool,
    /// Registered class name → manifest tag.
    registered: HashMap<String, String>,
    declared: Vec<Component>,
}

/// Resolve an `android:name` value against the manifest package.
fn resolve_component_name(package: Option<&str>, name: &str) -> String {
    let name = name.replace('$', ".");
    match package {
        Some(pkg) if name.starts_with('.') => format!("{pkg}{name}"),
        Some(pkg) if !name.contains('.') => format!("{pkg}.{name}"),
        _ => name,
    }
}

/// Registered: component classes missing from (or misfiled in) the manifest.
pub struct RegistrationDetector;

impl Detector for RegistrationDetector {
    fn name(&self) -> &'static str {
        "RegistrationDetector"
    }

    fn issues(&self) -> Vec<&'static Issue> {
        vec![&REGISTERED]
    }

    fn capabilities(&self) -> Vec<Capability> {
        let mut tags = vec!["manifest"];
        tags.extend(COMPONENTS.iter().map(|(_, tag)| *tag));
        vec![
            Capability::Elements(Selector::names(tags)),
            Capability::SuperClasses(COMPONENTS.iter().map(|(c, _)| c.to_string()).collect()),
            Capability::WholeProject,
        ]
    }

    fn visit_element(
        &self,
        ctx: &mut LintContext<'_>,
        doc: &XmlDocument,
        element: ElementId,
    ) -> TraversalControl {
        let el = doc.element(element);
        if el.tag == "manifest" {
            let package = el.attribute(None, "package").map(|a| a.value.clone());
            ctx.file_state::<ManifestPackage>().0 = package;
            ctx.with_project_state(|c: &mut Components| c.manifest_seen = true);
            return TraversalControl::Continue;
        }
        let Some(name) = el.android_attribute("name") else {
            return TraversalControl::Continue;
        };
        let package = ctx.file_state::<ManifestPackage>().0.clone();
        let class = resolve_component_name(package.as_deref(), &name.value);
        let tag = el.tag.clone();
        ctx.with_project_state(|c: &mut Components| {
            c.registered.entry(class).or_insert(tag);
        });
        TraversalControl::Continue
    }

    fn visit_class(
        &self,
        ctx: &mut LintContext<'_>,
        tree: &SyntaxTree,
        class: NodeId,
        super_class: &str,
    ) -> TraversalControl {
        let node = tree.node(class);
        let Some(tag) = tag_for(super_class) else {
            return TraversalControl::Continue;
        };
        if node.has_modifier("abstract") || !node.has_modifier("public") {
            return TraversalControl::Continue;
        }
        if ctx
            .path()
            .is_some_and(|path| ctx.is_suppressed(&REGISTERED, Anchor::Node(class), path))
        {
            return TraversalControl::Continue;
        }
        let component = Component {
            class: qualified_class_name(tree, class),
            tag,
            location: node.location.clone(),
        };
        ctx.with_project_state(|c: &mut Components| c.declared.push(component));
        TraversalControl::Continue
    }

    fn after_check_project(&self, ctx: &mut LintContext<'_>) {
        let components = ctx.with_project_state(std::mem::take::<Components>);
        // Library projects and source-only checks have nothing to compare against.
        if !components.manifest_seen {
            return;
        }
        for component in components.declared {
            let message = match components.registered.get(&component.class) {
                None => format!(
                    "The `<{}> {}` is not registered in the manifest",
                    component.tag, component.class
                ),
                Some(tag) if tag != component.tag => format!(
                    "`{}` is {} but is registered in the manifest as {}",
                    component.class,
                    with_article(component.tag),
                    with_article(tag)
                ),
                Some(_) => continue,
            };
            ctx.report(&REGISTERED, Anchor::File, component.location, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::harness::{lint, messages};
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example">
    <application>
        <activity android:name=".MainActivity"/>
        <activity android:name="SyncService"/>
    </application>
</manifest>"#;

    const SOURCES: &[(&str, &str)] = &[
        (
            "src/com/example/MainActivity.java",
            "package com.example;\nimport android.app.Activity;\npublic class MainActivity extends Activity {}\n",
        ),
        (
            "src/com/example/Settings.java",
            "package com.example;\nimport android.app.Activity;\npublic class Settings extends Activity {}\n",
        ),
        (
            "src/com/example/BaseActivity.java",
            "package com.example;\nimport android.app.Activity;\npublic abstract class BaseActivity extends Activity {}\n",
        ),
        (
            "src/com/example/SyncService.java",
            "package com.example;\nimport android.app.Service;\npublic class SyncService extends Service {}\n",
        ),
        (
            "src/com/example/Hidden.java",
            "package com.example;\nimport android.app.Activity;\nimport android.annotation.SuppressLint;\n@SuppressLint(\"Registered\")\npublic class Hidden extends Activity {}\n",
        ),
    ];

    #[test]
    fn unregistered_and_misfiled_components() {
        let mut files = vec![("AndroidManifest.xml", MANIFEST)];
        files.extend_from_slice(SOURCES);
        let mut found = messages(&lint(&files), "Registered");
        found.sort();
        assert_eq!(
            found,
            vec![
                "The `<activity> com.example.Settings` is not registered in the manifest",
                "`com.example.SyncService` is a service but is registered in the manifest as an activity",
            ]
        );
    }

    #[test]
    fn silent_without_manifest() {
        assert!(messages(&lint(SOURCES), "Registered").is_empty());
    }

    #[test]
    fn component_names_resolve_against_package() {
        assert_eq!(resolve_component_name(Some("a.b"), ".Main"), "a.b.Main");
        assert_eq!(resolve_component_name(Some("a.b"), "Main"), "a.b.Main");
        assert_eq!(resolve_component_name(Some("a.b"), "x.y.Outer$Inner"), "x.y.Outer.Inner");
        assert_eq!(resolve_component_name(None, ".Main"), ".Main");
    }
}
