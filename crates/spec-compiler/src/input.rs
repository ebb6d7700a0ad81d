//! Scenario document input (`test_strategy.json` shape)

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use specforge_core_types::PageId;
use step_canon::RawStep;
use tracing::warn;

use crate::errors::{CompileError, CompileResult};

/// One AI-produced scenario. Every field is optional on the wire.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioIntent {
    #[serde(alias = "id", deserialize_with = "loose_text")]
    pub scenario_id: Option<String>,
    #[serde(alias = "name", deserialize_with = "loose_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "loose_list")]
    pub tags: Vec<String>,
    #[serde(alias = "test_steps")]
    pub steps: Vec<RawStep>,
    /// Page override; defaults to the entry url
    #[serde(alias = "url", deserialize_with = "loose_text")]
    pub page: Option<String>,
}

/// Scenarios generated for one crawled page
#[derive(Clone, Debug)]
pub struct PageIntents {
    pub page: PageId,
    pub url: String,
    pub module: Option<String>,
    pub scenarios: Vec<ScenarioIntent>,
}

#[derive(Clone, Debug, Default)]
pub struct ScenarioDocument {
    pub pages: Vec<PageIntents>,
    /// Entries skipped for errors, missing urls or bad shape
    pub skipped_entries: usize,
    pub skipped_scenarios: usize,
}

impl ScenarioDocument {
    pub fn from_json_str(raw: &str) -> CompileResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_slice(raw: &[u8]) -> CompileResult<Self> {
        let value: Value = serde_json::from_slice(raw)?;
        Self::from_value(value)
    }

    /// Accepts a list of page entries, a single entry, or `{"pages": [...]}`.
    pub fn from_value(value: Value) -> CompileResult<Self> {
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("pages").or_else(|| map.remove("modules")) {
                Some(Value::Array(entries)) => entries,
                Some(other) => {
                    return Err(CompileError::Shape(format!(
                        "`pages` must be a list, found {}",
                        kind_of(&other)
                    )))
                }
                None => vec![Value::Object(map)],
            },
            other => {
                return Err(CompileError::Shape(format!(
                    "expected a list of page entries, found {}",
                    kind_of(&other)
                )))
            }
        };

        let mut doc = ScenarioDocument::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match page_entry(index, entry) {
                Some((page, skipped)) => {
                    doc.skipped_scenarios += skipped;
                    doc.pages.push(page);
                }
                None => doc.skipped_entries += 1,
            }
        }
        Ok(doc)
    }

    pub fn scenario_count(&self) -> usize {
        self.pages.iter().map(|page| page.scenarios.len()).sum()
    }
}

fn page_entry(index: usize, entry: Value) -> Option<(PageIntents, usize)> {
    let Value::Object(mut map) = entry else {
        warn!(index, "skipping page entry that is not an object");
        return None;
    };
    let failed = |e: &&Value| match e {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    };
    if let Some(error) = map.get("error").filter(failed) {
        warn!(index, %error, "skipping page entry with generation error");
        return None;
    }
    let url = match map.remove("url") {
        Some(Value::String(url)) if !url.trim().is_empty() => url.trim().to_string(),
        _ => {
            warn!(index, "skipping page entry without url");
            return None;
        }
    };
    let module = match map.remove("module_name").or_else(|| map.remove("module")) {
        Some(Value::String(name)) if !name.trim().is_empty() => Some(name.trim().to_string()),
        _ => None,
    };
    let raw_scenarios = match map.remove("test_scenarios").or_else(|| map.remove("scenarios")) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut skipped = 0;
    let mut scenarios = Vec::with_capacity(raw_scenarios.len());
    for (position, raw) in raw_scenarios.into_iter().enumerate() {
        match serde_json::from_value::<ScenarioIntent>(raw) {
            Ok(intent) => scenarios.push(intent),
            Err(err) => {
                warn!(%url, position, error = %err, "skipping malformed scenario");
                skipped += 1;
            }
        }
    }

    Some((
        PageIntents {
            page: PageId::from_url(&url),
            url,
            module,
            scenarios,
        },
        skipped,
    ))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
    .map(|text| text.trim().to_string())
    .filter(|text| !text.is_empty())
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// A list of scalars, or one comma separated string.
fn loose_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(scalar_text).collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
