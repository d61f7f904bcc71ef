//! Coercion of raw extractions into [`JobRecord`]s
//!
//! Normalization never fails. Shape problems are logged as warnings and the
//! affected fields fall back to their empty values.

use crate::raw::RawExtraction;
use crate::record::JobRecord;
use serde_json::{Map, Value};
use tracing::warn;

pub const ROLE_KEY: &str = "role";
pub const EXPERIENCE_KEY: &str = "experience";
pub const SKILLS_KEY: &str = "skills";
pub const DESCRIPTION_KEY: &str = "description";

/// Turn any extraction into a structurally valid record
pub fn normalize(raw: RawExtraction) -> JobRecord {
    let kind = raw.kind();
    let candidate = match raw {
        RawExtraction::Object(map) | RawExtraction::ArraySingleton(map) => map,
        RawExtraction::Other(_) => {
            warn!(kind, "extraction is neither an object nor a list of objects, using an empty record");
            Map::new()
        }
    };
    normalize_object(candidate)
}

/// Convenience wrapper for an already-parsed JSON value
pub fn normalize_value(value: Value) -> JobRecord {
    normalize(RawExtraction::from(value))
}

fn normalize_object(mut candidate: Map<String, Value>) -> JobRecord {
    let role = take_text(&mut candidate, ROLE_KEY);
    let experience = take_text(&mut candidate, EXPERIENCE_KEY);
    let description = take_text(&mut candidate, DESCRIPTION_KEY);
    let skills = coerce_skills(candidate.remove(SKILLS_KEY));

    JobRecord {
        role,
        experience,
        skills,
        description,
        extra: candidate.into_iter().collect(),
    }
}

/// Coerce the `skills` field into a list of trimmed, non-empty strings.
///
/// Lists keep their string entries; a single string is split on commas.
/// Missing or mistyped values become an empty list.
pub fn coerce_skills(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => {
            let (skills, dropped) = skill_list(items);
            if dropped > 0 {
                warn!(dropped, "'skills' has entries that are not strings, dropping them");
            }
            skills
        }
        Some(Value::String(joined)) => split_skills(&joined),
        Some(other) => {
            warn!(value = %other, "'skills' is not a list or string, using an empty list");
            Vec::new()
        }
        None => {
            warn!("'skills' is missing, using an empty list");
            Vec::new()
        }
    }
}

/// String and number entries of a skill list, plus how many other entries
/// (null, objects, nested lists) were dropped
fn skill_list(items: Vec<Value>) -> (Vec<String>, usize) {
    let mut dropped = 0;
    let skills = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                dropped += 1;
                None
            }
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (skills, dropped)
}

/// Split a comma-joined skill string, trimming and dropping blanks
pub fn split_skills(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn take_text(candidate: &mut Map<String, Value>, key: &str) -> String {
    match candidate.remove(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}
