//! Frame host serving saved pages from memory.
//!
//! Used when the sibling tab's rendered DOM was saved to disk ahead of time.
//! Addresses are matched on path and `tab` query value, so a saved page still
//! matches a sibling URL that encodes spaces differently.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use url::Url;

use super::{FrameHost, FrameId, FrameLoadError};
use crate::extract::ExtractRequest;
use crate::record::ExtractionRecord;

pub struct StaticFrameHost {
    address: String,
    pages: HashMap<String, String>,
    frames: Mutex<HashMap<FrameId, Option<String>>>,
    next_id: AtomicU64,
}

impl StaticFrameHost {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            pages: HashMap::new(),
            frames: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Serves `html` for `url`.
    pub fn with_page(mut self, url: &Url, html: impl Into<String>) -> Self {
        self.pages.insert(page_key(url), html.into());
        self
    }

    /// Serves the contents of `path` for `url`.
    pub fn with_page_file(self, url: &Url, path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("reading saved page {}", path.display()))?;
        Ok(self.with_page(url, html))
    }

    /// Number of frames currently attached.
    pub fn attached_frames(&self) -> usize {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn page_key(url: &Url) -> String {
    let tab = url
        .query_pairs()
        .find(|(k, _)| k == "tab")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    format!("{}{}#{}", url.origin().ascii_serialization(), url.path(), tab)
}

#[async_trait]
impl FrameHost for StaticFrameHost {
    fn current_address(&self) -> String {
        self.address.clone()
    }

    async fn navigate(&self, address: &str) -> anyhow::Result<()> {
        tracing::debug!(address, "navigate requested on static host");
        Ok(())
    }

    fn attach_frame(&self, url: &Url) -> FrameId {
        let id = FrameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let page = self.pages.get(&page_key(url)).cloned();
        if page.is_none() {
            tracing::debug!(%url, "no saved page for frame address");
        }
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, page);
        id
    }

    async fn frame_loaded(&self, frame: FrameId) -> Result<(), FrameLoadError> {
        match self
            .frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&frame)
        {
            Some(Some(_)) => Ok(()),
            Some(None) => Err(FrameLoadError::new("no saved page for this address")),
            None => Err(FrameLoadError::new("no such frame")),
        }
    }

    async fn run_in_frame(
        &self,
        frame: FrameId,
        request: &ExtractRequest,
    ) -> anyhow::Result<ExtractionRecord> {
        let frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
        match frames.get(&frame) {
            Some(Some(html)) => Ok(request.run_on_source(html)),
            _ => anyhow::bail!("frame {:?} has no document", frame),
        }
    }

    fn remove_frame(&self, frame: FrameId) {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PageKind;
    use crate::cross_tab::{load_sibling, CrossTabError, LoaderSettings};
    use crate::extract::JobIdMatcher;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DETAILS: &str = r#"<div class="opportunity-title"><h1>RF-9 Gutter Job</h1></div>"#;

    fn details_request() -> ExtractRequest {
        ExtractRequest::new(PageKind::OpportunityDetails, JobIdMatcher::default())
    }

    #[test]
    fn page_key_ignores_query_encoding() {
        let a = Url::parse("https://crm.example.com/o/1?tab=Request+Form").unwrap();
        let b = Url::parse("https://crm.example.com/o/1?tab=Request%20Form&x=1").unwrap();
        assert_eq!(page_key(&a), page_key(&b));
    }

    #[tokio::test(start_paused = true)]
    async fn serves_saved_page_from_file() {
        let url = Url::parse("https://crm.example.com/o/1?tab=Opportunity+Details").unwrap();
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(DETAILS.as_bytes()).unwrap();
        f.flush().unwrap();
        let host = StaticFrameHost::new("https://crm.example.com/o/1?tab=Request+Form")
            .with_page_file(&url, f.path())
            .unwrap();

        let fields = load_sibling(&host, &LoaderSettings::default(), &details_request(), &url)
            .await
            .unwrap();
        assert_eq!(fields.get("job_id"), Some("RF-9"));
        assert_eq!(host.attached_frames(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_address_fails_to_load() {
        let host = StaticFrameHost::new("https://crm.example.com/o/1");
        let url = Url::parse("https://crm.example.com/o/2?tab=Opportunity+Details").unwrap();
        let result = load_sibling(&host, &LoaderSettings::default(), &details_request(), &url).await;
        assert!(matches!(result, Err(CrossTabError::LoadFailed { .. })));
        assert_eq!(host.attached_frames(), 0);
    }
}
