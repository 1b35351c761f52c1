//! Request Form tab: one field per labeled form item.
//!
//! A form item's value comes from the first source that is present, in this
//! order: text-like input, textarea, select, checked radio, checked
//! checkboxes, and finally the loose text of the item's content region.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

use super::dom::{built_in, checkable_label, collapsed_text, first, has_class, text_of};
use crate::record::{sanitize_field_name, ExtractionRecord};

const LABEL_CLASS: &str = "n-form-item-label";

struct FormSelectors {
    item: Selector,
    label: Selector,
    text_input: Selector,
    textarea: Selector,
    select: Selector,
    option: Selector,
    checked_radio: Selector,
    checked_box: Selector,
    content: Selector,
}

fn selectors() -> &'static FormSelectors {
    static SELECTORS: OnceLock<FormSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| FormSelectors {
        item: built_in(".n-form-item-blank"),
        label: built_in(".n-form-item-label"),
        text_input: built_in(r#"input[type="text"], input[type="number"], input[type="email"]"#),
        textarea: built_in("textarea"),
        select: built_in("select"),
        option: built_in("option"),
        checked_radio: built_in(r#"input[type="radio"][checked]"#),
        checked_box: built_in(r#"input[type="checkbox"][checked]"#),
        content: built_in(".n-form-item-content"),
    })
}

pub(super) fn extract(doc: &Html) -> ExtractionRecord {
    let sel = selectors();
    let mut out = ExtractionRecord::empty();

    for item in doc.select(&sel.item) {
        let Some(label) = first(item, &sel.label) else {
            continue;
        };
        let label = text_of(label);
        if label.is_empty() {
            continue;
        }
        let field = sanitize_field_name(&label);
        if let Some(value) = item_value(item, sel) {
            out.insert(field, value);
        }
    }

    out
}

fn item_value(item: ElementRef<'_>, sel: &FormSelectors) -> Option<String> {
    if let Some(input) = first(item, &sel.text_input) {
        return Some(input.value().attr("value").unwrap_or_default().trim().to_string());
    }

    if let Some(textarea) = first(item, &sel.textarea) {
        return Some(text_of(textarea));
    }

    if let Some(select) = first(item, &sel.select) {
        return Some(select_value(select, sel).trim().to_string());
    }

    if let Some(radio) = first(item, &sel.checked_radio) {
        return Some(checkable_label(radio));
    }

    let boxes: Vec<String> = item.select(&sel.checked_box).map(checkable_label).collect();
    if !boxes.is_empty() {
        return Some(boxes.join(", "));
    }

    let content = first(item, &sel.content)?;
    let text = loose_text(content);
    (!text.is_empty()).then_some(text)
}

/// Value a browser reports for a `<select>` given its markup.
fn select_value(select: ElementRef<'_>, sel: &FormSelectors) -> String {
    let options: Vec<ElementRef<'_>> = select.select(&sel.option).collect();
    let multiple = select.value().attr("multiple").is_some();
    let is_selected = |o: &&ElementRef<'_>| o.value().attr("selected").is_some();
    // A single select keeps the last `selected` option; a multiple one reports its first.
    let selected = if multiple {
        options.iter().find(is_selected)
    } else {
        options.iter().rev().find(is_selected)
    };
    let chosen = selected.or_else(|| {
        if multiple {
            None
        } else {
            options.iter().find(|o| o.value().attr("disabled").is_none())
        }
    });
    match chosen {
        Some(option) => match option.value().attr("value") {
            Some(v) => v.to_string(),
            None => collapsed_text(*option),
        },
        None => String::new(),
    }
}

/// Text of the content region's direct children, skipping the label element.
fn loose_text(content: ElementRef<'_>) -> String {
    content
        .children()
        .filter_map(|node| {
            if let Some(text) = node.value().as_text() {
                return Some(text.trim().to_string());
            }
            let el = ElementRef::wrap(node)?;
            (!has_class(el, LABEL_CLASS)).then(|| text_of(el))
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
