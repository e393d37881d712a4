use std::path::{Path, PathBuf};

use super::Location;

pub const ANDROID_URI: &str = "http://schemas.android.com/apk/res/android";
pub const TOOLS_URI: &str = "http://schemas.android.com/tools";

/// Index of an element within its `XmlDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone)]
pub struct XmlAttribute {
    /// Qualified name as written, e.g. `android:id`.
    pub name: String,
    pub prefix: Option<String>,
    pub local_name: String,
    /// Namespace URI the prefix is bound to, if any.
    pub namespace: Option<String>,
    pub value: String,
    pub location: Location,
}

impl XmlAttribute {
    pub fn is_android(&self) -> bool {
        self.namespace.as_deref() == Some(ANDROID_URI)
    }
}

#[derive(Debug, Clone)]
pub struct XmlElement {
    /// Tag as written, e.g. `ScrollView` or `androidx.core.widget.NestedScrollView`.
    pub tag: String,
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    /// Span of the start tag.
    pub location: Location,
    /// Comments between the previous sibling (or parent start tag) and this element.
    pub leading_comments: Vec<String>,
}

impl XmlElement {
    pub fn attribute(&self, namespace: Option<&str>, local_name: &str) -> Option<&XmlAttribute> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == namespace)
    }

    pub fn android_attribute(&self, local_name: &str) -> Option<&XmlAttribute> {
        self.attribute(Some(ANDROID_URI), local_name)
    }
}

/// A parsed XML resource or manifest, stored as an arena of elements.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub path: PathBuf,
    elements: Vec<XmlElement>,
    root: Option<ElementId>,
}

impl XmlDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            elements: Vec::new(),
            root: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn element(&self, id: ElementId) -> &XmlElement {
        &self.elements[id.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &XmlElement)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i), e))
    }

    pub fn children(&self, id: ElementId) -> impl Iterator<Item = (ElementId, &XmlElement)> {
        self.elements[id.0]
            .children
            .iter()
            .map(move |&child| (child, &self.elements[child.0]))
    }

    /// The element itself followed by its ancestors up to the root.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = (ElementId, &XmlElement)> {
        std::iter::successors(Some(id), move |cur| self.elements[cur.0].parent)
            .map(move |i| (i, &self.elements[i.0]))
    }

    /// Nesting depth; the root element has depth 1.
    pub fn depth(&self, id: ElementId) -> usize {
        self.ancestors(id).count()
    }

    /// Append an element. The first parentless element becomes the root.
    pub fn push_element(&mut self, mut element: XmlElement) -> ElementId {
        let id = ElementId(self.elements.len());
        match element.parent {
            Some(parent) => self.elements[parent.0].children.push(id),
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }
        element.children.clear();
        self.elements.push(element);
        id
    }
}
