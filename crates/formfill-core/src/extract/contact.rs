//! Contact page: display name, email and phone.

use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::dom::{built_in, first, text_of};
use crate::record::ExtractionRecord;

struct ContactSelectors {
    name: Selector,
    detail_item: Selector,
    label: Selector,
    value: Selector,
}

fn selectors() -> &'static ContactSelectors {
    static SELECTORS: OnceLock<ContactSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| ContactSelectors {
        name: built_in(".contact-header-name h1"),
        detail_item: built_in(".contact-detail-item"),
        label: built_in(".label"),
        value: built_in(".value"),
    })
}

pub(super) fn extract(doc: &Html) -> ExtractionRecord {
    let sel = selectors();
    let mut out = ExtractionRecord::empty();

    if let Some(name) = doc.select(&sel.name).next() {
        out.insert("name", text_of(name));
    }

    for item in doc.select(&sel.detail_item) {
        let (Some(label), Some(value)) = (first(item, &sel.label), first(item, &sel.value)) else {
            continue;
        };
        let label = text_of(label).to_lowercase();
        if label.contains("email") {
            out.insert("email", text_of(value));
        } else if label.contains("phone") {
            out.insert("phone_number", text_of(value));
        }
    }

    out
}
