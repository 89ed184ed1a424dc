//! Small helpers over `scraper` element trees.

use scraper::{ElementRef, Selector};

/// Builds a selector from a literal known to be valid.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Concatenated descendant text, trimmed. Mirrors `textContent.trim()`.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first match of `selector` under `element`, if non-empty.
pub fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(text_content)
        .filter(|t| !t.is_empty())
}

pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Element siblings that follow `element`, in document order.
pub fn next_element_siblings<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

/// Direct element children.
pub fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Element that carries a serialized shadow root inside its host.
///
/// html5ever consumes `<template shadowrootmode>` while parsing and splices
/// its contents into the host, so snapshots use this marker instead.
pub const SHADOW_ROOT_TAG: &str = "threadline-shadow-root";

/// The attached shadow root of a host, if any.
pub fn shadow_root(host: ElementRef<'_>) -> Option<ElementRef<'_>> {
    child_elements(host).find(|child| child.value().name() == SHADOW_ROOT_TAG)
}

/// Collapses runs of whitespace into single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A CSS attribute selector matching `name="value"` exactly.
pub fn attr_selector(tag: &str, name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{tag}[{name}=\"{escaped}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_text_content_trims() {
        let doc = Html::parse_fragment("<div id=\"a\">  hello <b>world</b>  </div>");
        let div = doc.select(&selector("#a")).next().unwrap();
        assert_eq!(text_content(div), "hello world");
    }

    #[test]
    fn test_first_text_skips_empty() {
        let doc = Html::parse_fragment("<div><span class=\"x\">  </span></div>");
        let root = doc.root_element();
        assert_eq!(first_text(root, &selector(".x")), None);
    }

    #[test]
    fn test_shadow_root_marker_survives_parsing() {
        let doc = Html::parse_document(
            "<body><x-host id=\"h\"><threadline-shadow-root><p class=\"in\">in</p></threadline-shadow-root>\
             <div slot=\"comment\">light</div></x-host>\
             <x-host id=\"g\"><div slot=\"comment\">light</div></x-host></body>",
        );
        let hosts: Vec<_> = doc.select(&selector("x-host")).collect();

        let shadow = shadow_root(hosts[0]).unwrap();
        assert_eq!(first_text(shadow, &selector("p.in")).as_deref(), Some("in"));
        assert!(first_text(shadow, &selector("[slot=comment]")).is_none());
        assert!(shadow_root(hosts[1]).is_none());
    }

    #[test]
    fn test_nested_host_shadow_is_not_the_parent_shadow() {
        let doc = Html::parse_document(
            "<body><x-host id=\"outer\"><x-host id=\"inner\">\
             <threadline-shadow-root><p>inner</p></threadline-shadow-root></x-host></x-host></body>",
        );
        let hosts: Vec<_> = doc.select(&selector("x-host")).collect();
        assert!(shadow_root(hosts[0]).is_none());
        assert!(shadow_root(hosts[1]).is_some());
    }

    #[test]
    fn test_attr_selector_escapes_quotes() {
        assert_eq!(attr_selector("tr", "id", "a\"b"), "tr[id=\"a\\\"b\"]");
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace(" a \n\n b\tc "), "a b c");
    }
}
