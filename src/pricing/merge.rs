use crate::pricing::dataset::{display_value, Dataset, INPUT_PRICE, OUTPUT_PRICE, PRICE_FIELDS};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Numeric fields a parser observed for one model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceUpdate {
    pub input_per_mtok: Option<f64>,
    pub output_per_mtok: Option<f64>,
    pub context_window: Option<u64>,
}

impl PriceUpdate {
    pub fn price(&self, field: &str) -> Option<f64> {
        match field {
            INPUT_PRICE => self.input_per_mtok,
            OUTPUT_PRICE => self.output_per_mtok,
            _ => None,
        }
    }
}

/// Model name -> observed fields. Ordered so merges report deterministically.
pub type UpdateSet = BTreeMap<String, PriceUpdate>;

/// Something a merge did (or noticed)
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    PriceChanged {
        model: String,
        field: &'static str,
        old: Option<Value>,
        new: f64,
    },
    /// Parsed a model the dataset does not have; never added automatically
    NewModel(String),
}

impl fmt::Display for MergeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriceChanged {
                model,
                field,
                old,
                new,
            } => write!(
                f,
                "{}: {} ${} -> ${}",
                model,
                field,
                display_value(old.as_ref()),
                format_price(*new)
            ),
            Self::NewModel(model) => {
                write!(f, "NEW MODEL FOUND: {} (add manually to data.json)", model)
            }
        }
    }
}

/// Two decimals, unless that would hide part of the price
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    if fixed.parse::<f64>() == Ok(value) {
        fixed
    } else {
        value.to_string()
    }
}

/// Apply parsed prices to the dataset.
///
/// Only the two price fields are ever written, and only when the parsed value
/// differs from the stored one.
pub fn merge_updates(dataset: &mut Dataset, updates: &UpdateSet) -> Vec<MergeEvent> {
    let mut events = Vec::new();

    for (name, update) in updates {
        let Some(record) = dataset.model_mut(name) else {
            events.push(MergeEvent::NewModel(name.clone()));
            continue;
        };

        for field in PRICE_FIELDS {
            let Some(new_price) = update.price(field) else {
                continue;
            };

            let current = record.get(field);
            if current.and_then(Value::as_f64) == Some(new_price) {
                continue;
            }

            let Some(number) = Number::from_f64(new_price) else {
                warn!(model = %name, field, value = new_price, "Ignoring non-finite parsed price");
                continue;
            };

            let old = record.insert(field.to_string(), Value::Number(number));
            events.push(MergeEvent::PriceChanged {
                model: name.clone(),
                field,
                old,
                new: new_price,
            });
        }
    }

    events
}
