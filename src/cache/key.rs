//! Cache key format: `probability:<hypothesis>|<evidence>`.
//!
//! The prefix scopes bulk scans and flushes. Parsing splits on the first
//! delimiter, so a `|` inside the hypothesis cannot be recovered; such keys
//! still work for lookups since they are only ever rebuilt from a scenario.

use std::fmt;

use crate::types::Scenario;

pub const KEY_PREFIX: &str = "probability:";
pub const KEY_DELIMITER: char = '|';
/// Keep-alive key, deliberately outside `KEY_PREFIX` so flushes skip it.
pub const HEARTBEAT_KEY: &str = "heartbeat";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_scenario(scenario: &Scenario) -> Self {
        Self(format!(
            "{}{}{}{}",
            KEY_PREFIX, scenario.hypothesis, KEY_DELIMITER, scenario.evidence
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the scenario from a raw key. `None` for keys outside the
    /// prefix or without a delimiter.
    pub fn parse(raw: &str) -> Option<Scenario> {
        let body = raw.strip_prefix(KEY_PREFIX)?;
        let (hypothesis, evidence) = body.split_once(KEY_DELIMITER)?;
        Some(Scenario::new(hypothesis, evidence))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
