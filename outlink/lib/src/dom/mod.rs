//! Element access used by the decorator.
//!
//! The decorator never touches a concrete tree. It runs against any
//! [`ElementContainer`], which exposes descendant lookup by tag plus the
//! handful of mutations decoration needs. [`Document`] is the in-memory
//! HTML implementation; tests and embedders can supply their own.

pub mod document;

pub use document::{DoctypeData, Document, ElementData, NodeId, NodeKind, Scope};

/// An element to be created and appended by [`ElementContainer::append_element`].
///
/// ## Examples
///
/// ```rust
/// use outlink_lib::dom::NewElement;
///
/// let img = NewElement::new("img").class("icon").attr("src", "icon.png");
/// assert_eq!(img.tag, "img");
/// assert_eq!(img.attributes.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl NewElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// Sets an attribute, replacing any earlier value for the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }
}

/// A subtree whose descendant elements can be looked up and mutated.
///
/// Elements are addressed through a copyable handle so an implementation can
/// hand out many of them without holding borrows into its tree.
pub trait ElementContainer {
    type Handle: Copy;

    /// Returns every descendant element with the given tag name, in
    /// document order. Tag names compare ASCII case-insensitively.
    fn find_descendants(&self, tag: &str) -> Vec<Self::Handle>;

    fn attribute(&self, element: Self::Handle, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, element: Self::Handle, name: &str, value: &str);

    /// Appends a new child element as the last child of `parent`.
    fn append_element(&mut self, parent: Self::Handle, element: NewElement) -> Self::Handle;

    fn has_class(&self, element: Self::Handle, class: &str) -> bool {
        self.attribute(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Adds `class` to the element's class list.
    ///
    /// Adding a class that is already present, or an empty class name, is a
    /// no-op.
    fn add_class(&mut self, element: Self::Handle, class: &str) {
        if class.is_empty() || self.has_class(element, class) {
            return;
        }

        let value = match self.attribute(element, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim_end(), class)
            }
            _ => class.to_string(),
        };
        self.set_attribute(element, "class", &value);
    }
}
