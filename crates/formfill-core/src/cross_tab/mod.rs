//! Cross-tab loading: pull fields from a sibling tab through a hidden frame.
//!
//! The outer page owns a [`FrameHost`]. The loader attaches a frame at the
//! sibling address, races its load against a timeout, lets it settle, runs a
//! structured [`ExtractRequest`] inside it and returns the fields. The frame
//! is always removed before the loader returns.

mod error;
mod http_host;
mod static_host;

pub use error::{CrossTabError, FrameLoadError};
pub use http_host::HttpFrameHost;
pub use static_host::StaticFrameHost;

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::extract::ExtractRequest;
use crate::record::ExtractionRecord;

/// Handle to a frame attached by a [`FrameHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// The outer page as seen by the loader.
#[async_trait]
pub trait FrameHost: Send + Sync {
    /// Address the outer page currently shows.
    fn current_address(&self) -> String;

    /// Points the outer page back at `address`.
    async fn navigate(&self, address: &str) -> anyhow::Result<()>;

    /// Creates a hidden frame and starts loading `url` in it.
    fn attach_frame(&self, url: &Url) -> FrameId;

    /// Resolves when the frame's load event fires, or with its load error.
    async fn frame_loaded(&self, frame: FrameId) -> Result<(), FrameLoadError>;

    /// Runs `request` against the frame's current document.
    async fn run_in_frame(
        &self,
        frame: FrameId,
        request: &ExtractRequest,
    ) -> anyhow::Result<ExtractionRecord>;

    /// Detaches the frame. Unknown ids are ignored.
    fn remove_frame(&self, frame: FrameId);
}

/// How long to let a loaded frame settle before extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// Sleep for a fixed time after the load event.
    Fixed(Duration),
    /// Re-run the extraction every `interval` until it yields a field or
    /// `max_wait` has passed.
    Poll { interval: Duration, max_wait: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderSettings {
    pub load_timeout: Duration,
    pub readiness: ReadinessPolicy,
    /// Pause after sending the outer page back to its original address.
    pub return_pause: Duration,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(15),
            readiness: ReadinessPolicy::Fixed(Duration::from_millis(2000)),
            return_pause: Duration::from_millis(500),
        }
    }
}

/// Loads `sibling_url` in a hidden frame and returns the fields `request` finds there.
///
/// The caller merges the result into its own record; on error the caller's
/// record is untouched.
pub async fn load_sibling<H: FrameHost + ?Sized>(
    host: &H,
    settings: &LoaderSettings,
    request: &ExtractRequest,
    sibling_url: &Url,
) -> Result<ExtractionRecord, CrossTabError> {
    let tab = request
        .kind
        .tab_name()
        .map(str::to_string)
        .unwrap_or_else(|| request.kind.to_string());
    let original_address = host.current_address();

    let frame = host.attach_frame(sibling_url);
    tracing::debug!(%sibling_url, ?frame, "attached sibling frame");

    match tokio::time::timeout(settings.load_timeout, host.frame_loaded(frame)).await {
        Err(_) => {
            host.remove_frame(frame);
            return Err(CrossTabError::Timeout {
                tab,
                after: settings.load_timeout,
            });
        }
        Ok(Err(source)) => {
            host.remove_frame(frame);
            return Err(CrossTabError::LoadFailed { tab, source });
        }
        Ok(Ok(())) => {}
    }

    let extracted = settle_and_extract(host, frame, settings.readiness, request).await;
    host.remove_frame(frame);
    let fields = extracted.map_err(|source| CrossTabError::Extraction {
        tab: tab.clone(),
        source,
    })?;

    if host.current_address() != original_address {
        tracing::debug!(address = %original_address, "returning outer page to original address");
        host.navigate(&original_address)
            .await
            .map_err(|source| CrossTabError::Navigate {
                address: original_address.clone(),
                source,
            })?;
        tokio::time::sleep(settings.return_pause).await;
    }

    tracing::info!(tab = %tab, fields = fields.len(), "extracted sibling tab");
    Ok(fields)
}

async fn settle_and_extract<H: FrameHost + ?Sized>(
    host: &H,
    frame: FrameId,
    readiness: ReadinessPolicy,
    request: &ExtractRequest,
) -> anyhow::Result<ExtractionRecord> {
    match readiness {
        ReadinessPolicy::Fixed(delay) => {
            tokio::time::sleep(delay).await;
            host.run_in_frame(frame, request).await
        }
        ReadinessPolicy::Poll { interval, max_wait } => {
            let deadline = tokio::time::Instant::now() + max_wait;
            loop {
                let fields = host.run_in_frame(frame, request).await?;
                if !fields.is_empty() || tokio::time::Instant::now() >= deadline {
                    return Ok(fields);
                }
                tokio::time::sleep(interval).await;
            }
        }
    }
}
