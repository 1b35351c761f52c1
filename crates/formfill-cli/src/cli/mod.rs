//! CLI for formfill.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use formfill_core::config;
use std::path::PathBuf;

use commands::{run_classify, run_extract, run_sanitize, ExtractArgs};

/// Top-level CLI: scrape a CRM page and open the pre-filled request form.
#[derive(Debug, Parser)]
#[command(name = "formfill")]
#[command(about = "Pre-fill a request form from CRM contact and opportunity pages", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/formfill/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Extract the page's fields, build the form URL and write the overlay page.
    Run {
        /// Address of the CRM page (contact or opportunity tab).
        url: String,

        /// Saved DOM of the page; fetched over HTTP when omitted.
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,

        /// Saved DOM of the sibling opportunity tab; fetched over HTTP when omitted.
        #[arg(long, value_name = "FILE")]
        sibling: Option<PathBuf>,

        /// Where to write the overlay page.
        #[arg(long, value_name = "FILE", default_value = "formfill-overlay.html")]
        overlay: PathBuf,

        /// Open the overlay page with xdg-open.
        #[arg(long)]
        open: bool,

        /// Print the extracted record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show how a page address is classified.
    Classify {
        /// Address of the CRM page.
        url: String,
    },

    /// Show the field name a form label maps to.
    Sanitize {
        /// Form label text.
        label: String,
    },
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                url,
                page,
                sibling,
                overlay,
                open,
                json,
            } => {
                let args = ExtractArgs {
                    url,
                    page,
                    sibling,
                    overlay,
                    open,
                    json,
                };
                run_extract(&cfg, &args).await?;
            }
            CliCommand::Classify { url } => run_classify(&cfg, &url)?,
            CliCommand::Sanitize { label } => run_sanitize(&label),
        }

        Ok(())
    }
}
