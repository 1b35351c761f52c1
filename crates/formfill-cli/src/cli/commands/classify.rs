//! `formfill classify <url>` – show page kind and sibling tab address.

use anyhow::Result;
use formfill_core::classify;
use formfill_core::config::FormfillConfig;

pub fn run_classify(cfg: &FormfillConfig, url: &str) -> Result<()> {
    let Some(kind) = classify::classify(url) else {
        println!("unrecognized page (only request_type will be sent)");
        return Ok(());
    };
    println!("page:        {kind}");
    if let Some(sibling) = kind.sibling() {
        let id = classify::opportunity_id(url)?;
        println!("opportunity: {id}");
        println!("sibling:     {}", classify::sibling_tab_url(cfg, &id, sibling)?);
    }
    Ok(())
}
