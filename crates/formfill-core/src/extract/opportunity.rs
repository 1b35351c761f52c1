//! Opportunity Details tab: primary contact, primary email, job id.

use scraper::{Html, Selector};
use std::sync::OnceLock;

use super::dom::{built_in, first, has_class, text_of};
use super::job_id::JobIdMatcher;
use crate::record::ExtractionRecord;

const EMAIL_ICON_CLASS: &str = "fa-envelope";

struct OpportunitySelectors {
    contact_name: Selector,
    info_item: Selector,
    icon: Selector,
    value: Selector,
    title: Selector,
}

fn selectors() -> &'static OpportunitySelectors {
    static SELECTORS: OnceLock<OpportunitySelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| OpportunitySelectors {
        contact_name: built_in(".opportunity-contact-name"),
        info_item: built_in(".contact-info-item"),
        icon: built_in("i"),
        value: built_in(".value"),
        title: built_in(".opportunity-title h1"),
    })
}

pub(super) fn extract(doc: &Html, job_id: &JobIdMatcher) -> ExtractionRecord {
    let sel = selectors();
    let mut out = ExtractionRecord::empty();

    if let Some(name) = doc.select(&sel.contact_name).next() {
        out.insert("primary_contact_name", text_of(name));
    }

    for item in doc.select(&sel.info_item) {
        let (Some(icon), Some(value)) = (first(item, &sel.icon), first(item, &sel.value)) else {
            continue;
        };
        if has_class(icon, EMAIL_ICON_CLASS) {
            out.insert("primary_email", text_of(value));
        }
    }

    if let Some(title) = doc.select(&sel.title).next() {
        let title = text_of(title);
        out.insert("job_id", job_id.resolve(&title));
    }

    out
}
