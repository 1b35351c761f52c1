//! HTTP page fetches.
//!
//! Uses the curl crate (libcurl) to GET a CRM page with the configured
//! session headers and return its body as text.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::HttpConfig;

/// Transfer settings for one fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Extra request headers (e.g. `Cookie`).
    pub headers: HashMap<String, String>,
}

impl From<&HttpConfig> for FetchOptions {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            headers: cfg.headers.clone(),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

/// Performs a GET request and returns the response body.
///
/// Follows redirects. A non-2xx status is an error.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn fetch_page(url: &str, opts: &FetchOptions) -> Result<String> {
    fetch_page_cancellable(url, opts, &AtomicBool::new(false))
}

/// Like [`fetch_page`], but aborts the transfer once `cancel` is set.
///
/// libcurl polls the flag from its progress callback, at least once a second
/// even while the connection is idle.
pub fn fetch_page_cancellable(
    url: &str,
    opts: &FetchOptions,
    cancel: &AtomicBool,
) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.accept_encoding("")?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    easy.progress(true)?;

    if !opts.headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in &opts.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.load(Ordering::Relaxed))?;
        transfer
            .perform()
            .with_context(|| {
                if cancel.load(Ordering::Relaxed) {
                    format!("GET {url} cancelled")
                } else {
                    format!("GET {url} failed")
                }
            })?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Async wrapper running [`fetch_page`] on the blocking pool.
pub async fn fetch_page_async(url: String, opts: FetchOptions) -> Result<String> {
    tokio::task::spawn_blocking(move || fetch_page(&url, &opts))
        .await
        .context("fetch task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn options_from_http_config() {
        let mut cfg = HttpConfig::default();
        cfg.headers.insert("Cookie".into(), "s=1".into());
        let opts = FetchOptions::from(&cfg);
        assert_eq!(opts.connect_timeout, Duration::from_secs(15));
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert_eq!(opts.headers.get("Cookie").map(String::as_str), Some("s=1"));
    }

    #[test]
    fn invalid_url_is_an_error() {
        assert!(fetch_page("http://[::1", &FetchOptions::default()).is_err());
    }

    #[test]
    fn cancelled_transfer_stops_early() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        // Accept and hold the connection without ever answering.
        std::thread::spawn(move || {
            let _held: Vec<_> = listener.incoming().flatten().collect();
        });

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            flag.store(true, Ordering::Relaxed);
        });

        let opts = FetchOptions {
            timeout: Duration::from_secs(20),
            ..FetchOptions::default()
        };
        let started = Instant::now();
        let err = fetch_page_cancellable(&url, &opts, &cancel).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(format!("{err:#}").contains("cancelled"));
    }
}
