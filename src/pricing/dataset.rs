//! The dashboard's `data.json`.
//!
//! The document is kept as raw JSON so every field this tool does not know
//! about (benchmarks, tags, notes, use-case scores, top-level extras)
//! round-trips untouched and in its original key order.

use crate::error::RefreshError;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const INPUT_PRICE: &str = "input_per_mtok";
pub const OUTPUT_PRICE: &str = "output_per_mtok";
pub const CONTEXT_WINDOW: &str = "context_window";

/// Fields a parser may overwrite
pub const PRICE_FIELDS: [&str; 2] = [INPUT_PRICE, OUTPUT_PRICE];

/// Fields compared when reporting what a run changed
pub const DIFF_FIELDS: [&str; 3] = [INPUT_PRICE, OUTPUT_PRICE, CONTEXT_WINDOW];

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    root: Map<String, Value>,
}

impl Dataset {
    /// Validate the document shape: a `models` array of objects with a
    /// string `model`, and a string `last_updated`.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(root) = value else {
            return Err("root is not an object".to_string());
        };

        let models = root
            .get("models")
            .and_then(Value::as_array)
            .ok_or_else(|| "missing `models` array".to_string())?;

        for (idx, entry) in models.iter().enumerate() {
            let has_name = entry
                .as_object()
                .and_then(|m| m.get("model"))
                .is_some_and(Value::is_string);
            if !has_name {
                return Err(format!("models[{}] has no string `model`", idx));
            }
        }

        if !root.get("last_updated").is_some_and(Value::is_string) {
            return Err("missing `last_updated` string".to_string());
        }

        Ok(Self { root })
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, RefreshError> {
        let value: Value = serde_json::from_str(text).map_err(|source| RefreshError::DatasetParse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_value(value).map_err(|reason| RefreshError::DatasetShape {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, RefreshError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RefreshError::DatasetRead {
                path: path.to_path_buf(),
                source,
            })?;

        let dataset = Self::parse(&text, path)?;
        debug!(path = %path.display(), models = dataset.model_count(), "Loaded dataset");
        Ok(dataset)
    }

    /// Two-space indented JSON with a trailing newline
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        let mut text = serde_json::to_string_pretty(&self.root)?;
        text.push('\n');
        Ok(text)
    }

    pub async fn save(&self, path: &Path) -> Result<(), RefreshError> {
        let write_err = |source| RefreshError::DatasetWrite {
            path: path.to_path_buf(),
            source,
        };

        let text = self.to_pretty_string().map_err(|e| write_err(std::io::Error::other(e)))?;
        tokio::fs::write(path, text).await.map_err(write_err)?;

        debug!(path = %path.display(), "Saved dataset");
        Ok(())
    }

    pub fn model_count(&self) -> usize {
        self.root
            .get("models")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn last_updated(&self) -> &str {
        self.root
            .get("last_updated")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn set_last_updated(&mut self, date: NaiveDate) {
        self.root.insert(
            "last_updated".to_string(),
            Value::String(date.format("%Y-%m-%d").to_string()),
        );
    }

    /// Model records in file order, paired with their names
    pub fn models(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.root
            .get("models")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .filter_map(|m| m.get("model").and_then(Value::as_str).map(|name| (name, m)))
    }

    /// Look up a record by name; with duplicate names the last one wins
    pub fn model(&self, name: &str) -> Option<&Map<String, Value>> {
        self.models()
            .filter(|(model, _)| *model == name)
            .last()
            .map(|(_, record)| record)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut Map<String, Value>> {
        self.root
            .get_mut("models")
            .and_then(Value::as_array_mut)?
            .iter_mut()
            .rev()
            .filter_map(Value::as_object_mut)
            .find(|m| m.get("model").and_then(Value::as_str) == Some(name))
    }
}

/// Numbers compare by value so `2` and `2.0` are the same price
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Render a stored value the way a person would write it
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// One tracked field that differs between two snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub model: String,
    pub field: &'static str,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CHANGED {}.{}: {} -> {}",
            self.model,
            self.field,
            display_value(self.old.as_ref()),
            display_value(self.new.as_ref())
        )
    }
}

/// Compare the tracked fields of every model present in both snapshots.
///
/// Each name is compared once, in order of first appearance, using the last
/// record with that name on both sides.
pub fn diff_datasets(old: &Dataset, new: &Dataset) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    let mut seen = HashSet::new();

    for (name, _) in new.models() {
        if !seen.insert(name) {
            continue;
        }
        let (Some(old_record), Some(new_record)) = (old.model(name), new.model(name)) else {
            continue;
        };

        for field in DIFF_FIELDS {
            let before = old_record.get(field);
            let after = new_record.get(field);
            if !values_equal(before, after) {
                changes.push(FieldChange {
                    model: name.to_string(),
                    field,
                    old: before.cloned(),
                    new: after.cloned(),
                });
            }
        }
    }

    changes
}
