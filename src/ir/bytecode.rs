use std::path::PathBuf;

/// An annotation as it appears in a class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeAnnotation {
    /// VM type descriptor, e.g. `Landroid/annotation/SuppressLint;`.
    pub descriptor: String,
    /// String constants found among the element values.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

/// A method invocation instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInsn {
    pub kind: InvokeKind,
    /// Owner class in dotted form.
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    /// Bytecode offset of the instruction within the method.
    pub pc: usize,
    pub line: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<BytecodeAnnotation>,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<BytecodeAnnotation>,
    pub calls: Vec<CallInsn>,
    pub first_line: Option<usize>,
}

/// A decoded `.class` file, reduced to what call-site detectors need.
#[derive(Debug, Clone)]
pub struct ClassArtifact {
    pub path: PathBuf,
    pub access: u16,
    /// Dotted class name, e.g. `com.example.MyView$Inner`.
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub source_file: Option<String>,
    pub annotations: Vec<BytecodeAnnotation>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassArtifact {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            access: 0,
            name: name.into(),
            super_name: None,
            interfaces: Vec::new(),
            source_file: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    /// Name of the outermost class for nested classes (`A$B$C` → `A`).
    pub fn outer_name(&self) -> &str {
        self.name.split('$').next().unwrap_or(&self.name)
    }

    /// Super class followed by interfaces.
    pub fn supertypes(&self) -> Vec<String> {
        self.super_name
            .iter()
            .chain(self.interfaces.iter())
            .cloned()
            .collect()
    }
}

/// `android/view/View` → `android.view.View`.
pub fn internal_to_dotted(name: &str) -> String {
    name.replace('/', ".")
}
