//! Validated job posting record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key attributes of one job posting after normalization.
///
/// `skills` only ever holds non-empty, trimmed strings. Keys the extraction
/// returned beyond the four known ones are carried in `extra` so they still
/// reach the email prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl JobRecord {
    /// True when nothing was extracted at all
    pub fn is_empty(&self) -> bool {
        self.role.is_empty()
            && self.experience.is_empty()
            && self.skills.is_empty()
            && self.description.is_empty()
            && self.extra.is_empty()
    }

    /// Compact JSON rendering used in prompts
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
