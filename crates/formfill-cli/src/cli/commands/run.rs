//! `formfill run <url>` – extract, build the form URL, write the overlay.

use anyhow::{Context, Result};
use formfill_core::classify;
use formfill_core::config::FormfillConfig;
use formfill_core::cross_tab::{FrameHost, HttpFrameHost, StaticFrameHost};
use formfill_core::fetch::{fetch_page_async, FetchOptions};
use formfill_core::overlay;
use formfill_core::pipeline::{self, RunContext};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ExtractArgs {
    pub url: String,
    pub page: Option<PathBuf>,
    pub sibling: Option<PathBuf>,
    pub overlay: PathBuf,
    pub open: bool,
    pub json: bool,
}

pub async fn run_extract(cfg: &FormfillConfig, args: &ExtractArgs) -> Result<()> {
    eprintln!("Loading data, please wait...");

    let fetch_opts = FetchOptions::from(&cfg.http());
    let page_html = match &args.page {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading page {}", path.display()))?,
        None => fetch_page_async(args.url.clone(), fetch_opts.clone()).await?,
    };

    let host: Box<dyn FrameHost> = match &args.sibling {
        Some(path) => Box::new(saved_sibling_host(cfg, &args.url, path)?),
        None => Box::new(HttpFrameHost::new(args.url.clone(), fetch_opts)),
    };

    let outcome = pipeline::run(RunContext {
        config: cfg,
        page_url: &args.url,
        page_html: &page_html,
        host: host.as_ref(),
    })
    .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.record)?);
    } else {
        eprintln!("Extracted data:");
        for (key, value) in outcome.record.iter() {
            eprintln!("  {key}: {value}");
        }
    }
    println!("{}", outcome.form_url);

    overlay::write_overlay(&args.overlay, &outcome.form_url)?;
    eprintln!("Overlay written to {}", args.overlay.display());
    if args.open {
        open_in_browser(&args.overlay)?;
    }
    Ok(())
}

/// Frame host that serves the saved sibling tab at the address the loader will ask for.
fn saved_sibling_host(cfg: &FormfillConfig, url: &str, path: &Path) -> Result<StaticFrameHost> {
    let host = StaticFrameHost::new(url);
    let Some(sibling) = classify::classify(url).and_then(|kind| kind.sibling()) else {
        tracing::warn!("--sibling given but {} has no sibling tab; ignoring", url);
        return Ok(host);
    };
    let id = classify::opportunity_id(url)?;
    let sibling_url = classify::sibling_tab_url(cfg, &id, sibling)?;
    host.with_page_file(&sibling_url, path)
}

fn open_in_browser(path: &Path) -> Result<()> {
    std::process::Command::new("xdg-open")
        .arg(path)
        .spawn()
        .with_context(|| format!("launching xdg-open for {}", path.display()))?;
    Ok(())
}
