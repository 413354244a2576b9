//! Marks external links in HTML so they open in a new browsing context.
//!
//! The decorator walks every `<a>` under a container, and for each one whose
//! `href` is an absolute `http(s)://` URL (or starts with a configured prefix)
//! sets `target="_blank"`, adds a class, and optionally appends an icon image.
//!
//! ```rust
//! use outlink_lib::{Document, PartialOptions, decorate_with};
//!
//! let mut doc = Document::parse_fragment(r#"<a href="http://example.com">x</a>"#);
//! decorate_with(&mut doc, PartialOptions::default().with_icon_url(""));
//!
//! assert_eq!(
//!     doc.to_html(),
//!     r#"<a href="http://example.com" target="_blank" class="external">x</a>"#,
//! );
//! ```

pub mod config;
pub mod decorate;
pub mod dom;
pub mod error;

pub use config::{DEFAULT_CSS_CLASS, DEFAULT_ICON_URL, DecorateOptions, PartialOptions};
pub use decorate::{
    DecorationSummary, ICON_CLASS, NEW_CONTEXT_TARGET, decorate, decorate_with,
    decorate_with_summary, is_external,
};
pub use dom::{Document, ElementContainer, NewElement, NodeId};
pub use error::OutlinkError;
