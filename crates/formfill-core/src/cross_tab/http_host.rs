//! Frame host backed by plain HTTP fetches.
//!
//! Each attached frame starts a libcurl GET on the blocking pool; the frame
//! counts as loaded once the body arrives. The outer address never moves.
//! Removing a frame cancels its transfer, whether or not anyone is still
//! waiting on it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use url::Url;

use super::{FrameHost, FrameId, FrameLoadError};
use crate::extract::ExtractRequest;
use crate::fetch::{fetch_page_cancellable, FetchOptions};
use crate::record::ExtractionRecord;

enum FrameSlot {
    Loading {
        handle: JoinHandle<anyhow::Result<String>>,
        cancel: Arc<AtomicBool>,
    },
    /// `frame_loaded` has taken the transfer handle and is awaiting it.
    Waiting { cancel: Arc<AtomicBool> },
    Loaded(String),
}

pub struct HttpFrameHost {
    address: String,
    opts: FetchOptions,
    frames: Mutex<HashMap<FrameId, FrameSlot>>,
    next_id: AtomicU64,
}

impl HttpFrameHost {
    pub fn new(address: impl Into<String>, opts: FetchOptions) -> Self {
        Self {
            address: address.into(),
            opts,
            frames: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn frames(&self) -> std::sync::MutexGuard<'_, HashMap<FrameId, FrameSlot>> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FrameHost for HttpFrameHost {
    fn current_address(&self) -> String {
        self.address.clone()
    }

    async fn navigate(&self, address: &str) -> anyhow::Result<()> {
        // Fetching a frame never moves the outer page, so there is nothing to undo.
        tracing::debug!(address, "navigate requested on HTTP host");
        Ok(())
    }

    fn attach_frame(&self, url: &Url) -> FrameId {
        let id = FrameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let url = url.to_string();
        let opts = self.opts.clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle =
            tokio::task::spawn_blocking(move || fetch_page_cancellable(&url, &opts, &flag));
        self.frames().insert(id, FrameSlot::Loading { handle, cancel });
        id
    }

    async fn frame_loaded(&self, frame: FrameId) -> Result<(), FrameLoadError> {
        let handle = {
            let mut frames = self.frames();
            match frames.remove(&frame) {
                Some(FrameSlot::Loading { handle, cancel }) => {
                    frames.insert(frame, FrameSlot::Waiting { cancel });
                    handle
                }
                Some(slot @ FrameSlot::Loaded(_)) => {
                    frames.insert(frame, slot);
                    return Ok(());
                }
                Some(slot @ FrameSlot::Waiting { .. }) => {
                    frames.insert(frame, slot);
                    return Err(FrameLoadError::new("frame is already being awaited"));
                }
                None => return Err(FrameLoadError::new("no such frame")),
            }
        };

        let body = match handle.await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(FrameLoadError::new(format!("{e:#}"))),
            Err(e) => return Err(FrameLoadError::new(format!("fetch task failed: {e}"))),
        };

        let mut frames = self.frames();
        // A frame removed while loading stays removed.
        if frames.contains_key(&frame) {
            frames.insert(frame, FrameSlot::Loaded(body));
        }
        Ok(())
    }

    async fn run_in_frame(
        &self,
        frame: FrameId,
        request: &ExtractRequest,
    ) -> anyhow::Result<ExtractionRecord> {
        let frames = self.frames();
        match frames.get(&frame) {
            Some(FrameSlot::Loaded(body)) => Ok(request.run_on_source(body)),
            Some(_) => anyhow::bail!("frame {:?} has not finished loading", frame),
            None => anyhow::bail!("no such frame {:?}", frame),
        }
    }

    fn remove_frame(&self, frame: FrameId) {
        match self.frames().remove(&frame) {
            Some(FrameSlot::Loading { cancel, .. }) | Some(FrameSlot::Waiting { cancel }) => {
                cancel.store(true, Ordering::Relaxed);
                tracing::debug!(?frame, "cancelled frame transfer");
            }
            Some(FrameSlot::Loaded(_)) | None => {}
        }
    }
}
