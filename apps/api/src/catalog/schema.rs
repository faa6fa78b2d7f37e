//! Field schemas: how each template's form is described.
//!
//! A section is either a *group* of scalar fields (`{"name": "Full Name"}`) or
//! a *list* of entries. List entries are plain values (`["Skill", "Skill"]`)
//! or records (`[{"degree": "Degree", "year": "Year"}]`); the number of
//! elements in the JSON array is the number of entries a fresh form starts with.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{CatalogError, TemplateKind};
use crate::form::keys::{is_ident, FieldKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemShape {
    Plain { label: String },
    Record { fields: Vec<FieldSpec> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionShape {
    Group {
        fields: Vec<FieldSpec>,
    },
    List {
        item: ItemShape,
        initial_entries: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSchema {
    pub name: String,
    pub shape: SectionShape,
}

impl SectionSchema {
    /// Human heading for the section: `experience` → `Experience`.
    pub fn title(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSchema {
    pub kind: TemplateKind,
    pub id: u8,
    pub description: String,
    pub sections: Vec<SectionSchema>,
}

impl TemplateSchema {
    pub fn section(&self, name: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Whether the form for this template has an input named by `key`.
    pub fn classify(&self, key: &FieldKey) -> bool {
        match key {
            FieldKey::Scalar { name } => self.sections.iter().any(|s| match &s.shape {
                SectionShape::Group { fields } => fields.iter().any(|f| &f.name == name),
                SectionShape::List { .. } => false,
            }),
            FieldKey::Item { section, .. } => matches!(
                self.section(section).map(|s| &s.shape),
                Some(SectionShape::List {
                    item: ItemShape::Plain { .. },
                    ..
                })
            ),
            FieldKey::ItemField { section, field, .. } => match self.section(section) {
                Some(SectionSchema {
                    shape:
                        SectionShape::List {
                            item: ItemShape::Record { fields },
                            ..
                        },
                    ..
                }) => fields.iter().any(|f| &f.name == field),
                _ => false,
            },
        }
    }

    /// Label shown next to the input for `key`, if the schema knows it.
    pub fn label_for(&self, key: &FieldKey) -> Option<&str> {
        match key {
            FieldKey::Scalar { name } => self.sections.iter().find_map(|s| match &s.shape {
                SectionShape::Group { fields } => fields
                    .iter()
                    .find(|f| &f.name == name)
                    .map(|f| f.label.as_str()),
                SectionShape::List { .. } => None,
            }),
            FieldKey::Item { section, .. } => match &self.section(section)?.shape {
                SectionShape::List {
                    item: ItemShape::Plain { label },
                    ..
                } => Some(label.as_str()),
                _ => None,
            },
            FieldKey::ItemField { section, field, .. } => match &self.section(section)?.shape {
                SectionShape::List {
                    item: ItemShape::Record { fields },
                    ..
                } => fields
                    .iter()
                    .find(|f| &f.name == field)
                    .map(|f| f.label.as_str()),
                _ => None,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JSON → schema
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn parse_template(
    kind: TemplateKind,
    raw: &Value,
) -> Result<TemplateSchema, CatalogError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| invalid(kind, "template entry must be an object"))?;

    let description = match obj.get("description") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid(kind, "'description' must be a string")),
    };

    let fields = obj
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(kind, "missing 'fields' object"))?;

    let sections = fields
        .iter()
        .map(|(name, def)| parse_section(kind, name, def))
        .collect::<Result<Vec<_>, _>>()?;

    check_root_names(kind, &sections)?;

    Ok(TemplateSchema {
        kind,
        id: kind.id(),
        description,
        sections,
    })
}

fn parse_section(
    kind: TemplateKind,
    name: &str,
    def: &Value,
) -> Result<SectionSchema, CatalogError> {
    if !is_ident(name) {
        return Err(invalid(kind, format!("invalid section name '{name}'")));
    }

    let shape = match def {
        Value::Object(map) => SectionShape::Group {
            fields: parse_fields(kind, name, map)?,
        },
        Value::Array(items) => parse_list(kind, name, items)?,
        _ => {
            return Err(invalid(
                kind,
                format!("section '{name}' must be an object or an array"),
            ))
        }
    };

    Ok(SectionSchema {
        name: name.to_string(),
        shape,
    })
}

fn parse_list(kind: TemplateKind, name: &str, items: &[Value]) -> Result<SectionShape, CatalogError> {
    let item = match items.first() {
        None => ItemShape::Plain {
            label: name.to_string(),
        },
        Some(Value::String(label)) => ItemShape::Plain {
            label: label.clone(),
        },
        Some(Value::Object(map)) => ItemShape::Record {
            fields: parse_fields(kind, name, map)?,
        },
        Some(_) => {
            return Err(invalid(
                kind,
                format!("entries of '{name}' must be strings or objects"),
            ))
        }
    };

    for other in items.iter().skip(1) {
        let same_shape = match (&item, other) {
            (ItemShape::Plain { .. }, Value::String(_)) => true,
            (ItemShape::Record { fields }, Value::Object(map)) => {
                map.len() == fields.len() && fields.iter().all(|f| map.contains_key(&f.name))
            }
            _ => false,
        };
        if !same_shape {
            return Err(invalid(
                kind,
                format!("entries of '{name}' do not share one shape"),
            ));
        }
    }

    Ok(SectionShape::List {
        item,
        initial_entries: items.len(),
    })
}

fn parse_fields(
    kind: TemplateKind,
    section: &str,
    map: &Map<String, Value>,
) -> Result<Vec<FieldSpec>, CatalogError> {
    if map.is_empty() {
        return Err(invalid(kind, format!("section '{section}' has no fields")));
    }
    map.iter()
        .map(|(name, label)| {
            if !is_ident(name) {
                return Err(invalid(
                    kind,
                    format!("invalid field name '{name}' in '{section}'"),
                ));
            }
            let label = label.as_str().ok_or_else(|| {
                invalid(kind, format!("label of '{section}.{name}' must be a string"))
            })?;
            Ok(FieldSpec {
                name: name.clone(),
                label: label.to_string(),
            })
        })
        .collect()
}

/// Group fields and list sections share the root of the nested resume object.
fn check_root_names(kind: TemplateKind, sections: &[SectionSchema]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for section in sections {
        let names: Vec<&str> = match &section.shape {
            SectionShape::Group { fields } => fields.iter().map(|f| f.name.as_str()).collect(),
            SectionShape::List { .. } => vec![section.name.as_str()],
        };
        for name in names {
            if !seen.insert(name) {
                return Err(invalid(kind, format!("'{name}' is defined twice")));
            }
        }
    }
    Ok(())
}

fn invalid(kind: TemplateKind, reason: impl Into<String>) -> CatalogError {
    CatalogError::InvalidSchema {
        template: kind.name().to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value) -> Result<TemplateSchema, CatalogError> {
        parse_template(TemplateKind::Classic, &raw)
    }

    #[test]
    fn test_sections_keep_json_order() {
        let schema = parse(json!({
            "fields": {
                "personal": {"name": "Full Name"},
                "skills": ["Skill"],
                "education": [{"degree": "Degree"}]
            }
        }))
        .unwrap();
        let names: Vec<_> = schema.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["personal", "skills", "education"]);
    }

    #[test]
    fn test_list_shapes() {
        let schema = parse(json!({
            "fields": {
                "skills": ["Skill", "Skill"],
                "experience": [{"jobTitle": "Job Title", "companyName": "Company"}],
                "awards": []
            }
        }))
        .unwrap();

        assert_eq!(
            schema.section("skills").unwrap().shape,
            SectionShape::List {
                item: ItemShape::Plain {
                    label: "Skill".to_string()
                },
                initial_entries: 2
            }
        );
        match &schema.section("experience").unwrap().shape {
            SectionShape::List {
                item: ItemShape::Record { fields },
                initial_entries,
            } => {
                assert_eq!(*initial_entries, 1);
                assert_eq!(fields[0].name, "jobTitle");
                assert_eq!(fields[1].label, "Company");
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(
            schema.section("awards").unwrap().shape,
            SectionShape::List {
                item: ItemShape::Plain {
                    label: "awards".to_string()
                },
                initial_entries: 0
            }
        );
    }

    #[test]
    fn test_mixed_list_is_rejected() {
        let err = parse(json!({"fields": {"skills": ["Skill", {"a": "b"}]}})).unwrap_err();
        assert!(err.to_string().contains("one shape"), "got: {err}");
    }

    #[test]
    fn test_record_entries_must_match() {
        let err = parse(json!({
            "fields": {"education": [{"degree": "Degree"}, {"year": "Year"}]}
        }))
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSchema { .. }));
    }

    #[test]
    fn test_duplicate_root_name_is_rejected() {
        let err = parse(json!({
            "fields": {
                "personal": {"skills": "Skills"},
                "skills": ["Skill"]
            }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("defined twice"), "got: {err}");
    }

    #[test]
    fn test_bad_field_name_is_rejected() {
        assert!(parse(json!({"fields": {"personal": {"full name": "Name"}}})).is_err());
        assert!(parse(json!({"fields": {"personal": {"name": 3}}})).is_err());
        assert!(parse(json!({"fields": {"personal": "name"}})).is_err());
        assert!(parse(json!({"description": "no fields"})).is_err());
    }

    #[test]
    fn test_classify_and_label() {
        let schema = parse(json!({
            "fields": {
                "personal": {"name": "Full Name"},
                "skills": ["Skill"],
                "experience": [{"jobTitle": "Job Title"}]
            }
        }))
        .unwrap();

        let key = |raw: &str| FieldKey::parse(raw).unwrap();
        assert!(schema.classify(&key("name")));
        assert!(schema.classify(&key("skills[7]")));
        assert!(schema.classify(&key("experience[0].jobTitle")));
        assert!(!schema.classify(&key("personal")));
        assert!(!schema.classify(&key("skills[0].name")));
        assert!(!schema.classify(&key("experience[0]")));
        assert!(!schema.classify(&key("experience[0].salary")));

        assert_eq!(schema.label_for(&key("name")), Some("Full Name"));
        assert_eq!(schema.label_for(&key("skills[3]")), Some("Skill"));
        assert_eq!(
            schema.label_for(&key("experience[1].jobTitle")),
            Some("Job Title")
        );
        assert_eq!(schema.label_for(&key("unknown")), None);
    }

    #[test]
    fn test_section_title_capitalizes() {
        let section = SectionSchema {
            name: "experience".to_string(),
            shape: SectionShape::List {
                item: ItemShape::Plain {
                    label: "x".to_string(),
                },
                initial_entries: 0,
            },
        };
        assert_eq!(section.title(), "Experience");
        assert!(matches!(section.shape, SectionShape::List { .. }));
    }
}
