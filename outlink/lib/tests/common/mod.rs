//! Shared helpers for the decoration integration tests.

use std::fs;
use std::path::PathBuf;

use outlink_lib::{Document, NodeId};

/// Loads an HTML fixture from the `tests/fixtures/` directory.
///
/// ## Panics
///
/// Panics if the fixture file cannot be read.
pub fn load_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Finds the anchor with the given `href`.
///
/// ## Panics
///
/// Panics if no anchor has that `href`.
#[allow(dead_code)]
pub fn anchor_by_href(doc: &Document, href: &str) -> NodeId {
    doc.descendants_by_tag(doc.root(), "a")
        .into_iter()
        .find(|a| doc.attribute(*a, "href") == Some(href))
        .unwrap_or_else(|| panic!("no anchor with href {href:?}"))
}

/// Icon images that are direct children of `anchor`.
#[allow(dead_code)]
pub fn icons(doc: &Document, anchor: NodeId) -> Vec<NodeId> {
    doc.child_elements(anchor)
        .into_iter()
        .filter(|child| {
            doc.tag_name(*child) == Some("img")
                && doc.classes(*child).contains(&"icon_externallink")
        })
        .collect()
}
