//! External link decoration.
//!
//! An anchor is external when its `href` starts with `http://` or `https://`,
//! or with the configured `start_url` prefix. Matching is a literal,
//! case-sensitive prefix test; nothing is parsed or normalized, so relative,
//! `mailto:`, `javascript:` and protocol-relative (`//host`) links are left
//! alone unless they happen to match `start_url`.
//!
//! External anchors get `target="_blank"`, the configured class, and (when an
//! icon URL is set) an `<img class="icon_externallink">` appended as their
//! last child.
//!
//! Setting the target and class is idempotent. Appending the icon is not:
//! each pass over the same tree adds another icon to every external anchor.
//!
//! ## Examples
//!
//! ```rust
//! use outlink_lib::{DecorateOptions, Document, decorate};
//!
//! let mut doc = Document::parse_fragment(
//!     r#"<a href="https://example.com">Example</a> <a href="/home">Home</a>"#,
//! );
//! decorate(&mut doc, &DecorateOptions::default());
//!
//! assert_eq!(
//!     doc.to_html(),
//!     r#"<a href="https://example.com" target="_blank" class="external">Example<img class="icon_externallink" src="images/externalink.png"></a> <a href="/home">Home</a>"#,
//! );
//! ```

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::config::{DecorateOptions, PartialOptions};
use crate::dom::{ElementContainer, NewElement};

/// Value of `target` that opens a link in a new browsing context.
pub const NEW_CONTEXT_TARGET: &str = "_blank";

/// Class carried by every appended icon image.
pub const ICON_CLASS: &str = "icon_externallink";

const EXTERNAL_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Counts gathered during one decoration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecorationSummary {
    /// Anchors found under the root.
    pub anchors: usize,
    /// Anchors classified as external and decorated.
    pub decorated: usize,
    /// Icon images appended.
    pub icons: usize,
}

/// Returns whether `href` points outside the site.
///
/// ## Examples
///
/// ```rust
/// use outlink_lib::{DecorateOptions, is_external};
///
/// let options = DecorateOptions::default();
/// assert!(is_external("https://example.com", &options));
/// assert!(!is_external("HTTPS://example.com", &options));
/// assert!(!is_external("//cdn.example.com/x.js", &options));
/// ```
pub fn is_external(href: &str, options: &DecorateOptions) -> bool {
    EXTERNAL_SCHEMES
        .iter()
        .any(|scheme| href.starts_with(scheme))
        || (!options.start_url.is_empty() && href.starts_with(options.start_url.as_str()))
}

/// Decorates every external anchor under `root` and returns `root`.
pub fn decorate<'a, C>(root: &'a mut C, options: &DecorateOptions) -> &'a mut C
where
    C: ElementContainer + ?Sized,
{
    decorate_with_summary(root, options);
    root
}

/// Like [`decorate`], merging `options` over the defaults first.
pub fn decorate_with<C>(root: &mut C, options: PartialOptions) -> &mut C
where
    C: ElementContainer + ?Sized,
{
    let options = DecorateOptions::merged(options);
    decorate(root, &options)
}

/// Runs a decoration pass and reports what it changed.
#[instrument(level = "debug", skip_all, fields(css_class = %options.css_class))]
pub fn decorate_with_summary<C>(root: &mut C, options: &DecorateOptions) -> DecorationSummary
where
    C: ElementContainer + ?Sized,
{
    let mut summary = DecorationSummary::default();

    for anchor in root.find_descendants("a") {
        summary.anchors += 1;

        let href = match root.attribute(anchor, "href") {
            Some(href) if !href.is_empty() => href,
            _ => {
                trace!("Skipping anchor without href");
                continue;
            }
        };

        if !is_external(href, options) {
            trace!(href, "Skipping internal anchor");
            continue;
        }

        debug!(href, "Decorating external anchor");
        root.set_attribute(anchor, "target", NEW_CONTEXT_TARGET);
        root.add_class(anchor, &options.css_class);
        summary.decorated += 1;

        if !options.icon_url.is_empty() {
            let icon = NewElement::new("img")
                .class(ICON_CLASS)
                .attr("src", options.icon_url.as_str());
            root.append_element(anchor, icon);
            summary.icons += 1;
        }
    }

    debug!(
        anchors = summary.anchors,
        decorated = summary.decorated,
        icons = summary.icons,
        "Decoration pass complete"
    );

    summary
}
