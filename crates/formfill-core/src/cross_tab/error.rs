//! Error types for sibling-tab loading.

use std::time::Duration;
use thiserror::Error;

/// A frame failed to load (transport error, HTTP error, unknown address).
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct FrameLoadError {
    pub reason: String,
}

impl FrameLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Why a sibling tab contributed no fields. The pipeline logs these and carries on.
#[derive(Debug, Error)]
pub enum CrossTabError {
    /// The frame's load event did not fire in time.
    #[error("timeout while loading {tab} tab (after {}s)", after.as_secs())]
    Timeout { tab: String, after: Duration },

    /// The frame reported a load error.
    #[error("failed to load {tab} tab: {source}")]
    LoadFailed {
        tab: String,
        #[source]
        source: FrameLoadError,
    },

    /// The frame loaded but running the extraction inside it failed.
    #[error("extraction in {tab} tab failed: {source}")]
    Extraction {
        tab: String,
        #[source]
        source: anyhow::Error,
    },

    /// The outer page could not be returned to its original address.
    #[error("could not return to {address}: {source}")]
    Navigate {
        address: String,
        #[source]
        source: anyhow::Error,
    },
}
