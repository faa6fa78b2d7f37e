//! Flat form state → nested resume data.
//!
//! ```text
//! name                    = "Ada"            {"name": "Ada",
//! skills[0]               = "Rust"     →      "skills": ["Rust"],
//! experience[0].jobTitle  = "Engineer"        "experience": [{"jobTitle": "Engineer"}]}
//! ```
//!
//! Indices only order entries: they are sorted and compacted, so `[0]` and
//! `[5]` become two consecutive array elements.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::form::keys::{is_control_key, FieldKey};
use crate::form::FormError;

#[derive(Debug, Clone)]
pub struct UnflattenOptions {
    /// Drop entries whose values are all blank, and sections left empty.
    pub prune_blank: bool,
    pub max_entries: usize,
}

impl Default for UnflattenOptions {
    fn default() -> Self {
        UnflattenOptions {
            prune_blank: true,
            max_entries: 20,
        }
    }
}

enum Slot {
    Scalar(String),
    Plain(BTreeMap<usize, String>),
    Record(BTreeMap<usize, Map<String, Value>>),
}

impl Slot {
    fn describe(&self) -> &'static str {
        match self {
            Slot::Scalar(_) => "a scalar field",
            Slot::Plain(_) => "a list of values",
            Slot::Record(_) => "a list of records",
        }
    }
}

fn describe_key(key: &FieldKey) -> &'static str {
    match key {
        FieldKey::Scalar { .. } => "a scalar field",
        FieldKey::Item { .. } => "a list of values",
        FieldKey::ItemField { .. } => "a list of records",
    }
}

/// Builds the nested object for a sequence of `(key, value)` pairs.
///
/// Control keys (`_action`, ...) are skipped. Duplicate keys keep the last
/// value. Root members appear in the order their first key was seen.
pub fn unflatten<'a, I>(pairs: I, options: &UnflattenOptions) -> Result<Value, FormError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut order: Vec<String> = Vec::new();
    let mut slots: HashMap<String, Slot> = HashMap::new();

    for (raw_key, value) in pairs {
        if is_control_key(raw_key) {
            continue;
        }
        let key = FieldKey::parse(raw_key)?;
        let root = key.root().to_string();

        let slot = slots.entry(root.clone()).or_insert_with(|| {
            order.push(root.clone());
            match &key {
                FieldKey::Scalar { .. } => Slot::Scalar(String::new()),
                FieldKey::Item { .. } => Slot::Plain(BTreeMap::new()),
                FieldKey::ItemField { .. } => Slot::Record(BTreeMap::new()),
            }
        });

        match (slot, key) {
            (Slot::Scalar(current), FieldKey::Scalar { .. }) => {
                *current = value.to_string();
            }
            (Slot::Plain(items), FieldKey::Item { section, index }) => {
                check_capacity(items.contains_key(&index), items.len(), &section, options)?;
                items.insert(index, value.to_string());
            }
            (
                Slot::Record(records),
                FieldKey::ItemField {
                    section,
                    index,
                    field,
                },
            ) => {
                check_capacity(records.contains_key(&index), records.len(), &section, options)?;
                records
                    .entry(index)
                    .or_default()
                    .insert(field, Value::String(value.to_string()));
            }
            (slot, key) => {
                return Err(FormError::ShapeConflict {
                    name: root,
                    first: slot.describe(),
                    second: describe_key(&key),
                });
            }
        }
    }

    let mut out = Map::new();
    for root in order {
        let Some(slot) = slots.remove(&root) else {
            continue;
        };
        match slot {
            Slot::Scalar(value) => {
                out.insert(root, Value::String(value));
            }
            Slot::Plain(items) => {
                let values: Vec<Value> = items
                    .into_values()
                    .filter(|v| !(options.prune_blank && v.trim().is_empty()))
                    .map(Value::String)
                    .collect();
                if !(options.prune_blank && values.is_empty()) {
                    out.insert(root, Value::Array(values));
                }
            }
            Slot::Record(records) => {
                let values: Vec<Value> = records
                    .into_values()
                    .filter(|record| !(options.prune_blank && is_blank_record(record)))
                    .map(Value::Object)
                    .collect();
                if !(options.prune_blank && values.is_empty()) {
                    out.insert(root, Value::Array(values));
                }
            }
        }
    }

    Ok(Value::Object(out))
}

fn check_capacity(
    existing: bool,
    current_len: usize,
    section: &str,
    options: &UnflattenOptions,
) -> Result<(), FormError> {
    if !existing && current_len >= options.max_entries {
        return Err(FormError::TooManyEntries {
            section: section.to_string(),
            max: options.max_entries,
        });
    }
    Ok(())
}

fn is_blank_record(record: &Map<String, Value>) -> bool {
    record
        .values()
        .all(|v| v.as_str().map(|s| s.trim().is_empty()).unwrap_or(true))
}
