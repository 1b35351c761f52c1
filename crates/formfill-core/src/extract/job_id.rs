//! Job-ID heuristic for opportunity titles.

use anyhow::{Context, Result};
use regex::Regex;

/// Pattern used when the config does not override it: `LETTERS-DIGITS` or a bare digit run.
/// Word boundaries and digits are ASCII only.
pub const DEFAULT_JOB_ID_PATTERN: &str = r"(?-u:\b)([A-Z]+-[0-9]+|[0-9]+)(?-u:\b)";

/// Picks a job identifier out of a title: the first pattern match, or the
/// whole title when nothing matches.
#[derive(Debug, Clone)]
pub struct JobIdMatcher {
    pattern: Regex,
}

impl JobIdMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("invalid job_id_pattern {pattern:?}"))?;
        Ok(Self { pattern })
    }

    pub fn resolve<'a>(&self, title: &'a str) -> &'a str {
        self.pattern
            .find(title)
            .map(|m| m.as_str())
            .unwrap_or(title)
    }
}

impl Default for JobIdMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_ID_PATTERN).expect("default job id pattern must compile")
    }
}
