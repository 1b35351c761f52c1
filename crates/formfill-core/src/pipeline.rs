//! One extraction run: classify, extract, pull the sibling tab, build the URL.

use anyhow::Result;
use url::Url;

use crate::classify::{self, PageKind};
use crate::config::FormfillConfig;
use crate::cross_tab::{self, FrameHost};
use crate::extract::ExtractRequest;
use crate::form_url::build_form_url;
use crate::record::ExtractionRecord;

/// Inputs for a run. `page_html` is the rendered DOM of the page at `page_url`.
pub struct RunContext<'a, H: FrameHost + ?Sized> {
    pub config: &'a FormfillConfig,
    pub page_url: &'a str,
    pub page_html: &'a str,
    pub host: &'a H,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub page: Option<PageKind>,
    pub record: ExtractionRecord,
    pub form_url: Url,
}

pub async fn run<H: FrameHost + ?Sized>(ctx: RunContext<'_, H>) -> Result<RunOutcome> {
    let cfg = ctx.config;
    let job_id = cfg.job_id_matcher()?;
    let page = classify::classify(ctx.page_url);
    let mut record = ExtractionRecord::new(&cfg.request_type);

    match page {
        Some(kind) => {
            tracing::info!(page = %kind, url = ctx.page_url, "extracting page");
            let request = ExtractRequest::new(kind, job_id.clone());
            record = record.merge(request.run_on_source(ctx.page_html));

            if let Some(sibling) = kind.sibling() {
                let opportunity_id = classify::opportunity_id(ctx.page_url)?;
                let sibling_url = classify::sibling_tab_url(cfg, &opportunity_id, sibling)?;
                let request = ExtractRequest::new(sibling, job_id);
                let settings = cfg.cross_tab().loader_settings();
                match cross_tab::load_sibling(ctx.host, &settings, &request, &sibling_url).await {
                    Ok(fields) => record = record.merge(fields),
                    Err(e) => tracing::warn!("error extracting {} data: {}", sibling, e),
                }
            }
        }
        None => tracing::info!(url = ctx.page_url, "unrecognized page; sending defaults only"),
    }

    let form_url = build_form_url(&cfg.form_base_url, &record)?;
    tracing::info!(record = ?record, "extracted data");

    Ok(RunOutcome {
        page,
        record,
        form_url,
    })
}
