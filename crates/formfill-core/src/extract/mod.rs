//! Field extraction from rendered CRM pages.
//!
//! One entry point serves every page variant and every document: the main
//! page, or a sibling tab loaded in a hidden frame. Frames receive an
//! [`ExtractRequest`] and run it against their own document.

mod contact;
mod dom;
mod job_id;
mod opportunity;
mod request_form;

pub use job_id::{JobIdMatcher, DEFAULT_JOB_ID_PATTERN};

use scraper::Html;

use crate::classify::PageKind;
use crate::record::ExtractionRecord;

/// Which variant to run, plus the rules it needs.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub kind: PageKind,
    pub job_id: JobIdMatcher,
}

impl ExtractRequest {
    pub fn new(kind: PageKind, job_id: JobIdMatcher) -> Self {
        Self { kind, job_id }
    }

    /// Runs the variant against a parsed document.
    pub fn run(&self, doc: &Html) -> ExtractionRecord {
        match self.kind {
            PageKind::Contact => contact::extract(doc),
            PageKind::OpportunityDetails => opportunity::extract(doc, &self.job_id),
            PageKind::RequestForm => request_form::extract(doc),
        }
    }

    /// Parses `html` and runs the variant against it.
    pub fn run_on_source(&self, html: &str) -> ExtractionRecord {
        let doc = Html::parse_document(html);
        let fields = self.run(&doc);
        tracing::debug!(kind = %self.kind, fields = fields.len(), "extracted fields");
        fields
    }
}
