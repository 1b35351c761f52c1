use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cross_tab::{LoaderSettings, ReadinessPolicy};
use crate::extract::{JobIdMatcher, DEFAULT_JOB_ID_PATTERN};

/// How the loader decides a sibling frame has finished rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    /// Sleep `settle_ms` after the load event.
    #[default]
    Fixed,
    /// Re-run the extraction every `poll_interval_ms` until it yields a field,
    /// giving up after `settle_ms`.
    Poll,
}

/// Cross-tab loader timings (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossTabConfig {
    /// Seconds to wait for the sibling frame's load event.
    pub load_timeout_secs: u64,
    /// Settle budget after load, in milliseconds.
    pub settle_ms: u64,
    /// Pause after navigating the outer page back to its original address.
    pub return_pause_ms: u64,
    #[serde(default)]
    pub readiness: Readiness,
    /// Poll interval when `readiness = "poll"`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for CrossTabConfig {
    fn default() -> Self {
        Self {
            load_timeout_secs: 15,
            settle_ms: 2000,
            return_pause_ms: 500,
            readiness: Readiness::Fixed,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CrossTabConfig {
    pub fn loader_settings(&self) -> LoaderSettings {
        let settle = Duration::from_millis(self.settle_ms);
        let readiness = match self.readiness {
            Readiness::Fixed => ReadinessPolicy::Fixed(settle),
            Readiness::Poll => ReadinessPolicy::Poll {
                interval: Duration::from_millis(self.poll_interval_ms.max(1)),
                max_wait: settle,
            },
        };
        LoaderSettings {
            load_timeout: Duration::from_secs(self.load_timeout_secs),
            readiness,
            return_pause: Duration::from_millis(self.return_pause_ms),
        }
    }
}

/// HTTP settings for page and sibling-tab fetches (optional section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Extra request headers, e.g. `Cookie` for an authenticated CRM session.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            headers: HashMap::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/formfill/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormfillConfig {
    /// Form the record is sent to as query parameters.
    pub form_base_url: String,
    /// Origin of the CRM web app, used to build sibling-tab URLs.
    pub crm_base_url: String,
    /// CRM location (sub-account) the opportunity pages live under.
    pub location_id: String,
    /// Value of the always-present `request_type` field.
    pub request_type: String,
    /// Pattern whose first match in an opportunity title becomes `job_id`.
    pub job_id_pattern: String,
    #[serde(default)]
    pub cross_tab: Option<CrossTabConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for FormfillConfig {
    fn default() -> Self {
        Self {
            form_base_url: "https://api.leadconnectorhq.com/widget/form/rpBMjFJzdISFJTYMWgQV"
                .to_string(),
            crm_base_url: "https://app.gohighlevel.com".to_string(),
            location_id: "ND1DMa5sDNocNbpseXWv".to_string(),
            request_type: "Part of an Existing Project".to_string(),
            job_id_pattern: DEFAULT_JOB_ID_PATTERN.to_string(),
            cross_tab: None,
            http: None,
        }
    }
}

impl FormfillConfig {
    pub fn cross_tab(&self) -> CrossTabConfig {
        self.cross_tab.clone().unwrap_or_default()
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn job_id_matcher(&self) -> Result<JobIdMatcher> {
        JobIdMatcher::new(&self.job_id_pattern)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("formfill")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<FormfillConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<FormfillConfig> {
    if !path.exists() {
        let default_cfg = FormfillConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: FormfillConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
