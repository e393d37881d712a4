use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// The kind of artifact a single file is. Every artifact has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Manifest,
    ResourceFile,
    JavaFile,
    ClassFile,
    JavaLibraries,
    Proguard,
    Property,
    Other,
    BinaryResource,
    AllResourceFiles,
}

impl Scope {
    pub const ALL: [Scope; 10] = [
        Scope::Manifest,
        Scope::ResourceFile,
        Scope::JavaFile,
        Scope::ClassFile,
        Scope::JavaLibraries,
        Scope::Proguard,
        Scope::Property,
        Scope::Other,
        Scope::BinaryResource,
        Scope::AllResourceFiles,
    ];

    pub fn as_set(self) -> ScopeSet {
        match self {
            Self::Manifest => ScopeSet::MANIFEST,
            Self::ResourceFile => ScopeSet::RESOURCE_FILE,
            Self::JavaFile => ScopeSet::JAVA_FILE,
            Self::ClassFile => ScopeSet::CLASS_FILE,
            Self::JavaLibraries => ScopeSet::JAVA_LIBRARIES,
            Self::Proguard => ScopeSet::PROGUARD,
            Self::Property => ScopeSet::PROPERTY,
            Self::Other => ScopeSet::OTHER,
            Self::BinaryResource => ScopeSet::BINARY_RESOURCE,
            Self::AllResourceFiles => ScopeSet::ALL_RESOURCE_FILES,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manifest => write!(f, "MANIFEST"),
            Self::ResourceFile => write!(f, "RESOURCE_FILE"),
            Self::JavaFile => write!(f, "JAVA_FILE"),
            Self::ClassFile => write!(f, "CLASS_FILE"),
            Self::JavaLibraries => write!(f, "JAVA_LIBRARIES"),
            Self::Proguard => write!(f, "PROGUARD"),
            Self::Property => write!(f, "PROPERTY"),
            Self::Other => write!(f, "OTHER"),
            Self::BinaryResource => write!(f, "BINARY_RESOURCE"),
            Self::AllResourceFiles => write!(f, "ALL_RESOURCE_FILES"),
        }
    }
}

bitflags::bitflags! {
    /// The set of artifact kinds an issue's detector needs to see.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScopeSet: u16 {
        const MANIFEST = 1 << 0;
        const RESOURCE_FILE = 1 << 1;
        const JAVA_FILE = 1 << 2;
        const CLASS_FILE = 1 << 3;
        const JAVA_LIBRARIES = 1 << 4;
        const PROGUARD = 1 << 5;
        const PROPERTY = 1 << 6;
        const OTHER = 1 << 7;
        const BINARY_RESOURCE = 1 << 8;
        const ALL_RESOURCE_FILES = 1 << 9;
    }
}

impl ScopeSet {
    pub const RESOURCES: Self = Self::RESOURCE_FILE.union(Self::ALL_RESOURCE_FILES);
    pub const XML: Self = Self::MANIFEST
        .union(Self::RESOURCE_FILE)
        .union(Self::ALL_RESOURCE_FILES);
    pub const BYTECODE: Self = Self::CLASS_FILE.union(Self::JAVA_LIBRARIES);

    /// Whether a detector with this scope runs over an artifact of `scope`.
    ///
    /// Resource files are also visited by detectors that declared
    /// `ALL_RESOURCE_FILES`.
    pub fn applies_to(self, scope: Scope) -> bool {
        match scope {
            Scope::ResourceFile => self.intersects(Self::RESOURCES),
            other => self.contains(other.as_set()),
        }
    }

    /// Scopes that only make sense with the whole project in view.
    pub fn needs_whole_project(self) -> bool {
        self.intersects(Self::ALL_RESOURCE_FILES.union(Self::JAVA_LIBRARIES))
    }

    pub fn scopes(self) -> impl Iterator<Item = Scope> {
        Scope::ALL
            .into_iter()
            .filter(move |s| self.contains(s.as_set()))
    }
}

impl From<Scope> for ScopeSet {
    fn from(scope: Scope) -> Self {
        scope.as_set()
    }
}

impl std::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.scopes().map(|s| s.to_string()).collect();
        write!(f, "{}", names.join("|"))
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let scopes: Vec<Scope> = self.scopes().collect();
        let mut seq = serializer.serialize_seq(Some(scopes.len()))?;
        for scope in scopes {
            seq.serialize_element(&scope.to_string())?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_files_match_all_resource_scope() {
        assert!(ScopeSet::ALL_RESOURCE_FILES.applies_to(Scope::ResourceFile));
        assert!(ScopeSet::RESOURCE_FILE.applies_to(Scope::ResourceFile));
        assert!(!ScopeSet::MANIFEST.applies_to(Scope::ResourceFile));
        assert!(!ScopeSet::ALL_RESOURCE_FILES.applies_to(Scope::Manifest));
    }

    #[test]
    fn whole_project_scopes() {
        assert!(ScopeSet::ALL_RESOURCE_FILES.needs_whole_project());
        assert!(ScopeSet::JAVA_LIBRARIES.needs_whole_project());
        assert!(!(ScopeSet::JAVA_FILE | ScopeSet::CLASS_FILE).needs_whole_project());
    }

    #[test]
    fn displays_as_pipe_list() {
        let set = ScopeSet::MANIFEST | ScopeSet::JAVA_FILE;
        assert_eq!(set.to_string(), "MANIFEST|JAVA_FILE");
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["MANIFEST","JAVA_FILE"]"#
        );
    }
}
