//! Flat form state for one template: `key → value`, plus the entry
//! bookkeeping behind the "Add" and "Remove" buttons.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::catalog::{ItemShape, SectionShape, TemplateSchema};
use crate::form::keys::{is_control_key, FieldKey};
use crate::form::unflatten::{unflatten, UnflattenOptions};
use crate::form::{FormError, FormLimits};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: BTreeMap<FieldKey, String>,
}

impl FormState {
    /// A blank form: every group field empty, list sections with the number of
    /// entries the schema starts with.
    pub fn initial(schema: &TemplateSchema) -> Self {
        let mut state = FormState::default();
        for section in &schema.sections {
            match &section.shape {
                SectionShape::Group { fields } => {
                    for field in fields {
                        state.set(
                            FieldKey::Scalar {
                                name: field.name.clone(),
                            },
                            "",
                        );
                    }
                }
                SectionShape::List {
                    item,
                    initial_entries,
                } => {
                    for index in 0..*initial_entries {
                        state.insert_blank_entry(&section.name, item, index);
                    }
                }
            }
        }
        state
    }

    /// Rebuilds state from submitted pairs.
    ///
    /// Group fields always exist (blank when absent); list sections contain
    /// exactly the submitted entries. Keys the schema does not describe are
    /// dropped. With no data pairs at all this is `initial`.
    pub fn from_pairs<'a, I>(
        schema: &TemplateSchema,
        pairs: I,
        limits: &FormLimits,
    ) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut submitted = FormState::default();
        for (raw_key, value) in pairs {
            if is_control_key(raw_key) {
                continue;
            }
            let key = FieldKey::parse(raw_key)?;
            if !schema.classify(&key) {
                warn!("Dropping form key '{raw_key}' unknown to the {} template", schema.kind);
                continue;
            }
            if value.len() > limits.max_value_bytes {
                return Err(FormError::ValueTooLong {
                    key: raw_key.to_string(),
                    max: limits.max_value_bytes,
                });
            }
            submitted.set(key, value);
        }

        if submitted.values.is_empty() {
            return Ok(FormState::initial(schema));
        }

        for section in &schema.sections {
            match &section.shape {
                SectionShape::Group { fields } => {
                    for field in fields {
                        submitted
                            .values
                            .entry(FieldKey::Scalar {
                                name: field.name.clone(),
                            })
                            .or_default();
                    }
                }
                SectionShape::List { item, .. } => {
                    let count = submitted.entry_count(&section.name);
                    if count > limits.max_entries {
                        return Err(FormError::TooManyEntries {
                            section: section.name.clone(),
                            max: limits.max_entries,
                        });
                    }
                    // Submitted indices may be sparse or huge; entries are kept
                    // in order and numbered from 0.
                    submitted.renumber_entries(&section.name, None);
                    // A record entry may arrive with only some of its fields.
                    for index in 0..count {
                        submitted.fill_missing_fields(&section.name, item, index);
                    }
                }
            }
        }

        Ok(submitted)
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Sorted, distinct entry indices present for a list section.
    pub fn entry_indices(&self, section: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .values
            .keys()
            .filter(|k| k.root() == section)
            .filter_map(FieldKey::index)
            .collect();
        indices.dedup();
        indices
    }

    pub fn entry_count(&self, section: &str) -> usize {
        self.entry_indices(section).len()
    }

    /// Appends a blank entry to a list section and returns its index.
    pub fn add_entry(
        &mut self,
        schema: &TemplateSchema,
        section: &str,
        limits: &FormLimits,
    ) -> Result<usize, FormError> {
        let item = list_item(schema, section)?;
        let indices = self.entry_indices(section);
        if indices.len() >= limits.max_entries {
            return Err(FormError::TooManyEntries {
                section: section.to_string(),
                max: limits.max_entries,
            });
        }
        let next = match indices.last() {
            Some(last) => last.checked_add(1).ok_or_else(|| FormError::TooManyEntries {
                section: section.to_string(),
                max: limits.max_entries,
            })?,
            None => 0,
        };
        self.insert_blank_entry(section, item, next);
        Ok(next)
    }

    /// Deletes one entry and renumbers the remaining ones densely from 0.
    pub fn remove_entry(
        &mut self,
        schema: &TemplateSchema,
        section: &str,
        index: usize,
    ) -> Result<(), FormError> {
        list_item(schema, section)?;
        if !self.entry_indices(section).contains(&index) {
            return Err(FormError::NoSuchEntry {
                section: section.to_string(),
                index,
            });
        }
        self.renumber_entries(section, Some(index));
        Ok(())
    }

    /// Renumbers a list section's entries densely from 0, keeping their
    /// order and dropping the entry at `skip`.
    fn renumber_entries(&mut self, section: &str, skip: Option<usize>) {
        let (mut taken, kept): (BTreeMap<FieldKey, String>, BTreeMap<FieldKey, String>) =
            std::mem::take(&mut self.values)
                .into_iter()
                .partition(|(k, _)| k.root() == section && k.index().is_some());
        self.values = kept;
        if let Some(skip) = skip {
            taken.retain(|k, _| k.index() != Some(skip));
        }

        let mut renumber: BTreeMap<usize, usize> = BTreeMap::new();
        for key in taken.keys() {
            if let Some(old) = key.index() {
                let next = renumber.len();
                renumber.entry(old).or_insert(next);
            }
        }
        for (key, value) in taken {
            let new_index = key.index().and_then(|old| renumber.get(&old).copied());
            if let Some(new_index) = new_index {
                self.values.insert(key.with_index(new_index), value);
            }
        }
    }

    /// Flat pairs in key order, as rendered into the form and the `data` parameter.
    pub fn pairs(&self) -> impl Iterator<Item = (String, &str)> {
        self.values.iter().map(|(k, v)| (k.to_string(), v.as_str()))
    }

    /// The flat state as a JSON object of strings.
    pub fn to_flat_json(&self) -> Value {
        let map: Map<String, Value> = self
            .pairs()
            .map(|(k, v)| (k, Value::String(v.to_string())))
            .collect();
        Value::Object(map)
    }

    /// Nested resume data for the renderers.
    pub fn to_nested(&self, options: &UnflattenOptions) -> Result<Value, FormError> {
        let pairs: Vec<(String, &str)> = self.pairs().collect();
        unflatten(pairs.iter().map(|(k, v)| (k.as_str(), *v)), options)
    }

    pub(crate) fn values(&self) -> &BTreeMap<FieldKey, String> {
        &self.values
    }

    fn insert_blank_entry(&mut self, section: &str, item: &ItemShape, index: usize) {
        match item {
            ItemShape::Plain { .. } => self.set(
                FieldKey::Item {
                    section: section.to_string(),
                    index,
                },
                "",
            ),
            ItemShape::Record { fields } => {
                for field in fields {
                    self.set(
                        FieldKey::ItemField {
                            section: section.to_string(),
                            index,
                            field: field.name.clone(),
                        },
                        "",
                    );
                }
            }
        }
    }

    fn fill_missing_fields(&mut self, section: &str, item: &ItemShape, index: usize) {
        if let ItemShape::Record { fields } = item {
            for field in fields {
                self.values
                    .entry(FieldKey::ItemField {
                        section: section.to_string(),
                        index,
                        field: field.name.clone(),
                    })
                    .or_default();
            }
        }
    }
}

fn list_item<'s>(schema: &'s TemplateSchema, section: &str) -> Result<&'s ItemShape, FormError> {
    match schema.section(section).map(|s| &s.shape) {
        Some(SectionShape::List { item, .. }) => Ok(item),
        _ => Err(FormError::UnknownSection(section.to_string())),
    }
}
