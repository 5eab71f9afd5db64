use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};

use crate::model::task::TaskDraft;
use crate::time::normalize_date_from;

/// Metadata keys understood by the add form.
pub const DRAFT_KEYS: &[&str] = &["category", "date"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// Splits `key:value` tokens whose key expands to one of `keys` from the
/// free text. Tokens with unknown keys (`10:30`, `Re:`) stay in the text.
pub fn parse_args(args: &[String], keys: &[&str]) -> Result<ParsedInput> {
    let mut name_parts = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && key.chars().all(char::is_alphabetic) {
                match expand_key(&key.to_lowercase(), keys) {
                    Ok(full_key) => {
                        metadata.insert(full_key, value.to_string());
                        continue;
                    }
                    Err(e) if is_ambiguous(&key.to_lowercase(), keys) => return Err(e),
                    Err(_) => {}
                }
            }
        }
        name_parts.push(arg.as_str());
    }

    Ok(ParsedInput {
        name: name_parts.join(" "),
        metadata,
    })
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

fn is_ambiguous(key: &str, candidates: &[&str]) -> bool {
    !candidates.contains(&key) && candidates.iter().filter(|c| c.starts_with(key)).count() > 1
}

/// Builds a draft from add-form words, e.g. `Buy milk cat:Shopping date:tomorrow`.
pub fn parse_draft(args: &[String]) -> Result<TaskDraft> {
    parse_draft_on(args, Local::now().date_naive())
}

pub fn parse_draft_on(args: &[String], today: NaiveDate) -> Result<TaskDraft> {
    let parsed = parse_args(args, DRAFT_KEYS)?;
    let category = parsed.metadata.get("category").cloned().unwrap_or_default();
    let date = parsed
        .metadata
        .get("date")
        .map(|d| normalize_date_from(d, today))
        .unwrap_or_default();
    Ok(TaskDraft::new(parsed.name, category, date))
}
