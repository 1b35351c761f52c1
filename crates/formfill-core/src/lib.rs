pub mod config;
pub mod logging;

pub mod classify;
pub mod cross_tab;
pub mod extract;
pub mod fetch;
pub mod form_url;
pub mod overlay;
pub mod pipeline;
pub mod record;
