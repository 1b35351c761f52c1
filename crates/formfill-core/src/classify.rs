//! Page classification and sibling-tab addressing.
//!
//! The CRM serves contacts under `/contacts/detail/` and opportunities under
//! `/opportunities/list/{id}?tab=...`. The two opportunity tabs are siblings:
//! each one can be loaded in a hidden frame while the other is open.

use anyhow::{Context, Result};
use std::fmt;
use url::Url;

use crate::config::FormfillConfig;

const CONTACT_PATH: &str = "/contacts/detail/";
const OPPORTUNITY_PATH: &str = "/opportunities/list/";
const TAB_PARAM: &str = "tab";

/// Which extraction strategy a page gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Contact,
    OpportunityDetails,
    RequestForm,
}

impl PageKind {
    /// The `tab` query value for opportunity tabs.
    pub fn tab_name(self) -> Option<&'static str> {
        match self {
            PageKind::Contact => None,
            PageKind::OpportunityDetails => Some("Opportunity Details"),
            PageKind::RequestForm => Some("Request Form"),
        }
    }

    /// The other tab of the same opportunity.
    pub fn sibling(self) -> Option<PageKind> {
        match self {
            PageKind::Contact => None,
            PageKind::OpportunityDetails => Some(PageKind::RequestForm),
            PageKind::RequestForm => Some(PageKind::OpportunityDetails),
        }
    }

    fn from_tab(tab: &str) -> Option<PageKind> {
        match tab {
            "Opportunity Details" => Some(PageKind::OpportunityDetails),
            "Request Form" => Some(PageKind::RequestForm),
            _ => None,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Contact => write!(f, "contact"),
            PageKind::OpportunityDetails => write!(f, "opportunity details tab"),
            PageKind::RequestForm => write!(f, "request form tab"),
        }
    }
}

/// Picks the extraction strategy for `page_url`, or `None` for unknown pages.
pub fn classify(page_url: &str) -> Option<PageKind> {
    if page_url.contains(CONTACT_PATH) {
        return Some(PageKind::Contact);
    }
    if page_url.contains(OPPORTUNITY_PATH) {
        let tab = current_tab(page_url)?;
        return PageKind::from_tab(&tab);
    }
    None
}

/// Decoded value of the `tab` query parameter.
pub fn current_tab(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == TAB_PARAM)
        .map(|(_, v)| v.into_owned())
}

/// Final path segment of the page URL (empty when the path ends in `/`).
pub fn opportunity_id(page_url: &str) -> Result<String> {
    let url = Url::parse(page_url).with_context(|| format!("invalid page URL: {page_url}"))?;
    Ok(url.path().rsplit('/').next().unwrap_or_default().to_string())
}

/// Address of `tab` for the same opportunity under the configured location.
pub fn sibling_tab_url(cfg: &FormfillConfig, opportunity_id: &str, tab: PageKind) -> Result<Url> {
    let tab_name = tab
        .tab_name()
        .with_context(|| format!("{tab} has no sibling tab"))?;
    let mut url = Url::parse(&cfg.crm_base_url)
        .with_context(|| format!("invalid crm_base_url: {}", cfg.crm_base_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("crm_base_url cannot carry a path"))?
        .pop_if_empty()
        .extend([
            "v2",
            "location",
            cfg.location_id.as_str(),
            "opportunities",
            "list",
            opportunity_id,
        ]);
    url.query_pairs_mut().append_pair(TAB_PARAM, tab_name);
    Ok(url)
}
