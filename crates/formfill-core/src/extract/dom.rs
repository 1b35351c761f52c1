//! Small DOM helpers shared by the extractors.

use scraper::{ElementRef, Selector};

/// Parses one of the extractors' built-in selectors.
pub(super) fn built_in(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector must parse")
}

/// Trimmed text content of an element and all its descendants.
pub(super) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First descendant matching `sel`.
pub(super) fn first<'a>(el: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    el.select(sel).next()
}

/// Nearest ancestor element with the given tag name.
pub(super) fn closest<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}

pub(super) fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Current value of a radio or checkbox input; browsers report `on` when the
/// `value` attribute is missing.
pub(super) fn checkable_value(el: ElementRef<'_>) -> String {
    el.value().attr("value").unwrap_or("on").to_string()
}

/// Label text wrapping a checkable input, else the input's value.
pub(super) fn checkable_label(el: ElementRef<'_>) -> String {
    match closest(el, "label") {
        Some(label) => text_of(label),
        None => checkable_value(el),
    }
}

/// Whitespace-stripped and collapsed text, as browsers compute `option.text`.
pub(super) fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
