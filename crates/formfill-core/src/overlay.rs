//! Full-screen overlay page embedding the pre-filled form.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use url::Url;

const OVERLAY_ID: &str = "formfill-overlay";

/// Renders a standalone HTML page: dimmed backdrop, the form in an iframe,
/// and a Close button that removes the overlay.
pub fn render_overlay(form_url: &Url) -> String {
    let src = escape_attr(form_url.as_str());
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Request Form</title>
</head>
<body>
<div id="{OVERLAY_ID}" style="position: fixed; top: 0; left: 0; width: 100%; height: 100%; background-color: rgba(0, 0, 0, 0.7); z-index: 10000; display: flex; flex-direction: column; align-items: center; justify-content: center;">
<button type="button" onclick="document.getElementById('{OVERLAY_ID}').remove()" style="position: absolute; top: 20px; right: 20px; padding: 10px 15px; background: #f44336; color: white; border: none; border-radius: 4px; cursor: pointer; font-size: 16px; z-index: 10002;">Close</button>
<iframe src="{src}" style="width: 90%; height: 90%; border: none; border-radius: 5px; background-color: white; z-index: 10001;"></iframe>
</div>
</body>
</html>
"#
    )
}

/// Writes the overlay page for `form_url` to `path`.
pub fn write_overlay(path: &Path, form_url: &Url) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_overlay(form_url))
        .with_context(|| format!("writing overlay {}", path.display()))?;
    tracing::debug!(path = %path.display(), "overlay written");
    Ok(())
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
