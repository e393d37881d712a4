//! Artifact discovery: which files make up a project, and which scope each one has.

use std::path::{Component, Path, PathBuf};

use crate::error::{LintError, Result};
use crate::ir::ClassArtifact;
use crate::rules::Scope;

const MAX_FILE_SIZE: u64 = 1_048_576;

/// One file of the project, classified into exactly one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub scope: Scope,
    pub size_bytes: u64,
}

/// Every lintable artifact under a root directory, sorted by path.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub root: PathBuf,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Files larger than this are skipped.
    pub max_file_size: u64,
    pub include_hidden: bool,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            include_hidden: false,
        }
    }
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, mut artifacts: Vec<Artifact>) -> Self {
        let root = root.into();
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            name: project_name(&root),
            root,
            artifacts,
        }
    }

    pub fn artifacts_of(&self, scope: Scope) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.scope == scope)
    }

    /// The Java source a compiled class came from, if it is part of the project.
    pub fn source_for_class(&self, class: &ClassArtifact) -> Option<&Path> {
        let source_file = class.source_file.as_deref()?;
        let suffix: PathBuf = class
            .package()
            .map(|pkg| pkg.split('.').collect::<PathBuf>())
            .unwrap_or_default()
            .join(source_file);
        self.artifacts_of(Scope::JavaFile)
            .find(|a| a.path.ends_with(&suffix))
            .map(|a| a.path.as_path())
    }
}

/// Walk `root` and classify every file. A file path yields a one-artifact project.
pub fn discover(root: &Path, options: &DiscoverOptions) -> Result<Project> {
    if !root.exists() {
        return Err(LintError::Config(format!(
            "path does not exist: {}",
            root.display()
        )));
    }

    if root.is_file() {
        let parent = root.parent().unwrap_or(Path::new(".")).to_path_buf();
        let artifacts = classify(root)
            .map(|scope| {
                Ok::<_, LintError>(Artifact {
                    path: root.to_path_buf(),
                    scope,
                    size_bytes: std::fs::metadata(root)?.len(),
                })
            })
            .transpose()?
            .into_iter()
            .collect();
        return Ok(Project::new(parent, artifacts));
    }

    let walker = ignore::WalkBuilder::new(root)
        .hidden(!options.include_hidden)
        .git_ignore(true)
        .build();

    let mut artifacts = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(scope) = classify(path) else {
            continue;
        };

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > options.max_file_size {
            tracing::debug!(file = %path.display(), size = metadata.len(), "skipping large file");
            continue;
        }

        artifacts.push(Artifact {
            path: path.to_path_buf(),
            scope,
            size_bytes: metadata.len(),
        });
    }

    tracing::debug!(root = %root.display(), artifacts = artifacts.len(), "discovered project");
    Ok(Project::new(root, artifacts))
}

/// The scope of a file, or `None` if it is not something lint looks at.
pub fn classify(path: &Path) -> Option<Scope> {
    let file_name = path.file_name()?.to_str()?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let in_res = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .any(|c| matches!(c, Component::Normal(name) if name == "res"));

    let scope = match ext.as_str() {
        _ if file_name == "AndroidManifest.xml" => Scope::Manifest,
        "xml" if in_res => Scope::ResourceFile,
        _ if in_res => Scope::BinaryResource,
        "java" => Scope::JavaFile,
        "class" => Scope::ClassFile,
        "jar" => Scope::JavaLibraries,
        "pro" => Scope::Proguard,
        "txt" if file_name.starts_with("proguard") => Scope::Proguard,
        "properties" => Scope::Property,
        "gradle" => Scope::Other,
        _ => return None,
    };
    Some(scope)
}

fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".into())
}
