mod common;

use common::{anchor_by_href, icons, load_fixture};
use outlink_lib::{
    DecorateOptions, DecorationSummary, Document, ElementContainer, PartialOptions, decorate,
    decorate_with, decorate_with_summary,
};
use proptest::prelude::*;

fn decorated_fixture(options: &DecorateOptions) -> (Document, DecorationSummary) {
    let mut doc = Document::parse_fragment(&load_fixture("article.html"));
    let summary = decorate_with_summary(&mut doc, options);
    (doc, summary)
}

// ============================================================================
// Classification on a realistic fragment
// ============================================================================

#[test]
fn absolute_links_are_decorated() {
    let (doc, summary) = decorated_fixture(&DecorateOptions::default());

    for href in [
        "https://example.com/changelog",
        "http://mirror.example.org/notes.txt",
    ] {
        let anchor = anchor_by_href(&doc, href);
        assert_eq!(doc.attribute(anchor, "target"), Some("_blank"), "{href}");
        assert!(doc.classes(anchor).contains(&"external"), "{href}");
        assert_eq!(icons(&doc, anchor).len(), 1, "{href}");
    }

    assert_eq!(summary.anchors, 10);
    assert_eq!(summary.decorated, 2);
    assert_eq!(summary.icons, 2);
}

#[test]
fn existing_classes_are_kept() {
    let (doc, _) = decorated_fixture(&DecorateOptions::default());
    let anchor = anchor_by_href(&doc, "http://mirror.example.org/notes.txt");

    assert_eq!(doc.classes(anchor), ["download", "external"]);
}

#[test]
fn icon_is_the_last_child_with_configured_source() {
    let (doc, _) = decorated_fixture(&DecorateOptions::default());
    let anchor = anchor_by_href(&doc, "https://example.com/changelog");

    let last = *doc.children(anchor).last().expect("anchor has children");
    assert_eq!(doc.tag_name(last), Some("img"));
    assert_eq!(doc.attribute(last, "src"), Some("images/externalink.png"));
    assert_eq!(doc.attribute(last, "class"), Some("icon_externallink"));
    assert_eq!(
        doc.outer_html(anchor),
        r#"<a href="https://example.com/changelog" target="_blank" class="external">full changelog<img class="icon_externallink" src="images/externalink.png"></a>"#
    );
}

#[test]
fn non_external_links_are_untouched() {
    let source = load_fixture("article.html");
    let pristine = Document::parse_fragment(&source);
    let (doc, _) = decorated_fixture(&DecorateOptions::default());

    for href in [
        "/docs/upgrade.html",
        "mailto:team@example.com",
        "//cdn.example.com/logo.svg",
        "",
        "#top",
        "/docs/",
        "javascript:void(0)",
    ] {
        let before = anchor_by_href(&pristine, href);
        let after = anchor_by_href(&doc, href);
        assert_eq!(
            pristine.outer_html(before),
            doc.outer_html(after),
            "{href:?} should not change"
        );
    }
}

#[test]
fn anchors_without_href_are_untouched() {
    let (doc, _) = decorated_fixture(&DecorateOptions::default());
    let named = doc
        .find_descendants("a")
        .into_iter()
        .find(|a| doc.attribute(*a, "name") == Some("footnotes"))
        .expect("named anchor");

    assert_eq!(doc.outer_html(named), r#"<a name="footnotes">Footnotes</a>"#);
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn local_page_is_left_alone_by_default() {
    let mut doc = Document::parse_fragment(r#"<a href="/local/page">local</a>"#);
    decorate(&mut doc, &DecorateOptions::default());

    assert_eq!(doc.to_html(), r#"<a href="/local/page">local</a>"#);
}

#[test]
fn start_url_marks_matching_links_external() {
    let mut doc = Document::parse_fragment(r#"<a href="/local/page">local</a>"#);
    decorate_with(&mut doc, PartialOptions::default().with_start_url("/local/"));

    assert_eq!(
        doc.to_html(),
        r#"<a href="/local/page" target="_blank" class="external">local<img class="icon_externallink" src="images/externalink.png"></a>"#
    );
}

#[test]
fn custom_class_without_icon() {
    let mut doc = Document::parse_fragment(r#"<a href="https://example.com">x</a>"#);
    let options = DecorateOptions {
        css_class: "ext".to_string(),
        icon_url: String::new(),
        start_url: String::new(),
    };
    decorate(&mut doc, &options);

    let anchor = anchor_by_href(&doc, "https://example.com");
    assert_eq!(doc.attribute(anchor, "target"), Some("_blank"));
    assert_eq!(doc.classes(anchor), ["ext"]);
    assert!(doc.child_elements(anchor).is_empty());
}

#[test]
fn json_options_drive_decoration() {
    let partial =
        PartialOptions::from_json_str(r#"{ "iconUrl": "/static/out.svg", "unknown": true }"#)
            .expect("valid options");

    let mut doc = Document::parse_fragment(r#"<a href="https://example.com">x</a>"#);
    decorate(&mut doc, &DecorateOptions::merged(partial));

    let anchor = anchor_by_href(&doc, "https://example.com");
    let icon = icons(&doc, anchor)[0];
    assert_eq!(doc.attribute(icon, "src"), Some("/static/out.svg"));
    assert!(doc.classes(anchor).contains(&"external"));
}

// ============================================================================
// Repeated passes
// ============================================================================

#[test]
fn second_pass_appends_second_icon() {
    let mut doc = Document::parse_fragment(r#"<a href="https://example.com" class="external">x</a>"#);
    let options = DecorateOptions::default();

    decorate(decorate(&mut doc, &options), &options);

    let anchor = anchor_by_href(&doc, "https://example.com");
    assert_eq!(icons(&doc, anchor).len(), 2);
    assert_eq!(doc.classes(anchor), ["external"]);
    assert_eq!(doc.attribute(anchor, "target"), Some("_blank"));
}

#[test]
fn second_pass_without_icon_changes_nothing() {
    let options = DecorateOptions::merged(PartialOptions::default().with_icon_url(""));
    let (mut doc, _) = decorated_fixture(&options);
    let once = doc.to_html();

    decorate(&mut doc, &options);

    assert_eq!(doc.to_html(), once);
}

// ============================================================================
// Full documents and scoped containers
// ============================================================================

#[test]
fn scoped_pass_only_touches_container() {
    let mut doc = Document::parse_document(&load_fixture("page.html"));
    let content = doc
        .find_descendants("div")
        .into_iter()
        .find(|d| doc.attribute(*d, "id") == Some("content"))
        .expect("content div");

    let summary = decorate_with_summary(&mut doc.scope(content), &DecorateOptions::default());
    assert_eq!(summary.anchors, 2);
    assert_eq!(summary.decorated, 1);

    let sidebar = anchor_by_href(&doc, "https://sidebar.example.com");
    assert_eq!(doc.attribute(sidebar, "target"), None);

    let inside = anchor_by_href(&doc, "https://example.com");
    assert_eq!(doc.attribute(inside, "target"), Some("_blank"));
}

#[test]
fn full_document_serializes_with_doctype_and_raw_style() {
    let mut doc = Document::parse_document(&load_fixture("page.html"));
    decorate(&mut doc, &DecorateOptions::default());

    let html = doc.to_html();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"a.external::after { content: "&"; }"#));
    assert!(html.contains(r#"<a href="https://sidebar.example.com" target="_blank" class="external">"#));
    assert!(html.contains(r#"<a href="/local/page">local</a>"#));
}

#[test]
fn legacy_document_round_trips_untouched_markup() {
    let mut doc = Document::parse_document(&load_fixture("legacy.html"));
    let summary = decorate_with_summary(&mut doc, &DecorateOptions::default());
    let html = doc.to_html();

    assert!(html.starts_with(
        r#"<!-- generated by sitegen --><!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"><html>"#
    ));
    assert!(html.contains(r#"<noscript><img src="pixel.gif" alt="tracking"></noscript>"#));
    assert!(html.contains(
        r#"<a title="Changelog" href="https://example.com/changes" data-track="nav" target="_blank" class="external">changes<img class="icon_externallink" src="images/externalink.png"></a>"#
    ));
    assert!(html.contains(r#"<svg><a xlink:href="https://diagram.example.com">diagram</a></svg>"#));

    // the SVG anchor has no plain href
    assert_eq!(summary.anchors, 2);
    assert_eq!(summary.decorated, 1);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn relative_hrefs_never_change(path in "[a-z0-9/._#?=-]{0,24}") {
        prop_assume!(!path.starts_with("//"));
        let html = format!(r#"<a href="{path}">x</a>"#);

        let mut doc = Document::parse_fragment(&html);
        let before = doc.to_html();
        decorate(&mut doc, &DecorateOptions::default());

        prop_assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn absolute_hrefs_always_decorated(
        scheme in prop_oneof![Just("http://"), Just("https://")],
        host in "[a-z]{1,12}\\.[a-z]{2,3}",
        passes in 1usize..4,
    ) {
        let href = format!("{scheme}{host}");
        let mut doc = Document::parse_fragment(&format!(r#"<a href="{href}">x</a>"#));
        let options = DecorateOptions::default();

        for _ in 0..passes {
            decorate(&mut doc, &options);
        }

        let anchor = anchor_by_href(&doc, &href);
        prop_assert_eq!(doc.attribute(anchor, "target"), Some("_blank"));
        prop_assert_eq!(doc.classes(anchor), vec!["external"]);
        prop_assert_eq!(icons(&doc, anchor).len(), passes);
    }
}
