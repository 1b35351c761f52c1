//! Integration test: local HTTP server serving CRM tab pages, full extraction run.
//!
//! The current page comes from a fixture; the sibling tab is fetched over HTTP
//! through `HttpFrameHost`, exactly as the CLI does without `--sibling`.

mod common;

use formfill_core::classify::{self, PageKind};
use formfill_core::config::{CrossTabConfig, FormfillConfig};
use formfill_core::cross_tab::{load_sibling, CrossTabError, HttpFrameHost, LoaderSettings};
use formfill_core::extract::{ExtractRequest, JobIdMatcher};
use formfill_core::fetch::{fetch_page_async, FetchOptions};
use formfill_core::overlay::render_overlay;
use formfill_core::pipeline::{self, RunContext};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const CONTACT: &str = include_str!("fixtures/contact.html");
const DETAILS: &str = include_str!("fixtures/opportunity_details.html");
const REQUEST_FORM: &str = include_str!("fixtures/request_form.html");

fn config_for(base: &str) -> FormfillConfig {
    FormfillConfig {
        crm_base_url: base.to_string(),
        location_id: "LOC1".to_string(),
        cross_tab: Some(CrossTabConfig {
            settle_ms: 50,
            return_pause_ms: 0,
            ..CrossTabConfig::default()
        }),
        ..FormfillConfig::default()
    }
}

fn target(url: &url::Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

#[tokio::test]
async fn details_tab_pulls_request_form_over_http() {
    let addr_cfg = config_for("http://placeholder.invalid");
    let sibling = classify::sibling_tab_url(&addr_cfg, "opp77", PageKind::RequestForm).unwrap();
    let mut pages = HashMap::new();
    pages.insert(target(&sibling), REQUEST_FORM.to_string());
    let base = common::page_server::start(pages);

    let cfg = config_for(&base);
    let page_url = format!("{base}/v2/location/LOC1/opportunities/list/opp77?tab=Opportunity+Details");
    let host = HttpFrameHost::new(page_url.clone(), FetchOptions::from(&cfg.http()));

    let out = pipeline::run(RunContext {
        config: &cfg,
        page_url: &page_url,
        page_html: DETAILS,
        host: &host,
    })
    .await
    .expect("pipeline run");

    let rec = &out.record;
    assert_eq!(out.page, Some(PageKind::OpportunityDetails));
    assert_eq!(rec.get("request_type"), Some("Part of an Existing Project"));
    assert_eq!(rec.get("primary_contact_name"), Some("Maria Gonzalez"));
    assert_eq!(rec.get("primary_email"), Some("maria.gonzalez@example.com"));
    assert_eq!(rec.get("job_id"), Some("JOB-00123"));
    assert_eq!(rec.get("job_site_address"), Some("42 Elm Street"));
    assert_eq!(rec.get("services_needed"), Some("Roofing, Siding"));
    assert_eq!(rec.get("preferred_contact_method"), Some("Email"));
    assert_eq!(rec.get("budget"), Some("10-25k"));
    assert_eq!(rec.get("project_notes"), Some("Replace north-facing slope first."));
    assert_eq!(rec.get("assigned_crew"), Some("Crew B (lead: Ortiz)"));
    assert_eq!(rec.get("secondary_phone"), Some(""));

    let query: HashMap<String, String> = out.form_url.query_pairs().into_owned().collect();
    assert_eq!(query.get("services_needed").map(String::as_str), Some("Roofing, Siding"));
    assert!(!query.contains_key("secondary_phone"));
    assert!(render_overlay(&out.form_url).contains("<iframe"));
}

#[tokio::test]
async fn missing_sibling_keeps_current_tab_data() {
    let base = common::page_server::start(HashMap::new());
    let cfg = config_for(&base);
    let page_url = format!("{base}/v2/location/LOC1/opportunities/list/opp77?tab=Request%20Form");
    let host = HttpFrameHost::new(page_url.clone(), FetchOptions::from(&cfg.http()));

    let out = pipeline::run(RunContext {
        config: &cfg,
        page_url: &page_url,
        page_html: REQUEST_FORM,
        host: &host,
    })
    .await
    .expect("pipeline run");

    assert_eq!(out.page, Some(PageKind::RequestForm));
    assert_eq!(out.record.get("budget"), Some("10-25k"));
    assert!(out.record.get("job_id").is_none());
    assert_eq!(
        out.record.get("request_type"),
        Some("Part of an Existing Project")
    );
}

#[tokio::test]
async fn contact_page_fetched_over_http() {
    let mut pages = HashMap::new();
    pages.insert("/v2/location/LOC1/contacts/detail/c1".to_string(), CONTACT.to_string());
    let base = common::page_server::start(pages);
    let cfg = config_for(&base);
    let page_url = format!("{base}/v2/location/LOC1/contacts/detail/c1");

    let html = fetch_page_async(page_url.clone(), FetchOptions::default())
        .await
        .expect("fetch contact page");
    let host = HttpFrameHost::new(page_url.clone(), FetchOptions::default());
    let out = pipeline::run(RunContext {
        config: &cfg,
        page_url: &page_url,
        page_html: &html,
        host: &host,
    })
    .await
    .expect("pipeline run");

    assert_eq!(out.page, Some(PageKind::Contact));
    let keys: Vec<_> = out.record.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["request_type", "name", "email", "phone_number"]);
    assert_eq!(out.record.get("name"), Some("Maria Gonzalez"));
    assert_eq!(out.record.get("phone_number"), Some("+1 (555) 201-7788"));
}

#[tokio::test]
async fn fetch_reports_http_errors() {
    let base = common::page_server::start(HashMap::new());
    let err = fetch_page_async(format!("{base}/nope"), FetchOptions::default())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("HTTP 404"));
}

#[test]
fn timed_out_sibling_does_not_hold_the_runtime() {
    let base = common::page_server::start_silent();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let started = Instant::now();

    let result = rt.block_on(async {
        let opts = FetchOptions {
            timeout: Duration::from_secs(20),
            ..FetchOptions::default()
        };
        let host = HttpFrameHost::new(format!("{base}/outer"), opts);
        let settings = LoaderSettings {
            load_timeout: Duration::from_secs(1),
            ..LoaderSettings::default()
        };
        let request = ExtractRequest::new(PageKind::RequestForm, JobIdMatcher::default());
        let sibling = url::Url::parse(&format!("{base}/opp1?tab=Request+Form")).unwrap();
        load_sibling(&host, &settings, &request, &sibling).await
    });
    assert!(matches!(result, Err(CrossTabError::Timeout { .. })));

    // Dropping the runtime joins the blocking pool, so a transfer that was
    // not cancelled would keep it alive until curl's own 20s timeout.
    drop(rt);
    assert!(started.elapsed() < Duration::from_secs(6));
}
