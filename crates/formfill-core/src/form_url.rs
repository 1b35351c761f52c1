//! Serializes an Extraction Record onto the destination form's URL.

use anyhow::{Context, Result};
use url::Url;

use crate::record::ExtractionRecord;

/// Appends every non-empty field of `record` to `base` as a query parameter,
/// in record order. Fields with empty values are left out.
pub fn build_form_url(base: &str, record: &ExtractionRecord) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid form URL: {base}"))?;
    let mut filled = record.iter().filter(|(_, v)| !v.is_empty()).peekable();
    if filled.peek().is_some() {
        url.query_pairs_mut().extend_pairs(filled);
    }
    Ok(url)
}
