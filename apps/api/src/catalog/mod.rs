// Template catalog: the three visual templates and the form schema each one exposes.
// The embedded templates.json is the default; TEMPLATES_PATH swaps in another file.

pub mod schema;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

pub use schema::{FieldSpec, ItemShape, SectionSchema, SectionShape, TemplateSchema};

const EMBEDDED_CATALOG: &str = include_str!("templates.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("template '{template}' has an invalid schema: {reason}")]
    InvalidSchema { template: String, reason: String },

    #[error("template catalog is missing '{0}'")]
    MissingTemplate(String),

    #[error("template catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read template catalog: {0}")]
    Io(#[from] std::io::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Template kinds
// ────────────────────────────────────────────────────────────────────────────

/// The visual templates. Numeric ids are what travels in `?template=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    #[default]
    Classic,
    Modern,
    Minimalist,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::Classic,
        TemplateKind::Modern,
        TemplateKind::Minimalist,
    ];

    pub fn id(self) -> u8 {
        match self {
            TemplateKind::Classic => 1,
            TemplateKind::Modern => 2,
            TemplateKind::Minimalist => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Classic => "Classic",
            TemplateKind::Modern => "Modern",
            TemplateKind::Minimalist => "Minimalist",
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Accepts a numeric id (`"2"`) or a case-insensitive name (`"modern"`).
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let trimmed = raw.trim();
        if let Ok(id) = trimmed.parse::<u8>() {
            return Self::from_id(id).ok_or_else(|| CatalogError::UnknownTemplate(raw.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CatalogError::UnknownTemplate(raw.to_string()))
    }

    fn ordinal(self) -> usize {
        usize::from(self.id()) - 1
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    /// Indexed by `TemplateKind::ordinal`; every kind is present.
    templates: Vec<TemplateSchema>,
}

#[derive(Deserialize)]
struct RawCatalog {
    templates: serde_json::Map<String, Value>,
}

impl TemplateCatalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        info!("Loaded template catalog from {}", path.display());
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let parsed: RawCatalog = serde_json::from_str(raw)?;

        let mut entries: Vec<Option<&Value>> = vec![None; TemplateKind::ALL.len()];
        for (name, entry) in &parsed.templates {
            let kind = TemplateKind::parse(name)?;
            let slot = &mut entries[kind.ordinal()];
            if slot.is_some() {
                return Err(CatalogError::InvalidSchema {
                    template: name.clone(),
                    reason: format!("{kind} is defined more than once"),
                });
            }
            *slot = Some(entry);
        }

        let templates = TemplateKind::ALL
            .into_iter()
            .map(|kind| {
                let entry = entries[kind.ordinal()]
                    .ok_or_else(|| CatalogError::MissingTemplate(kind.name().to_string()))?;
                schema::parse_template(kind, entry)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TemplateCatalog { templates })
    }

    pub fn get(&self, kind: TemplateKind) -> &TemplateSchema {
        &self.templates[kind.ordinal()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateSchema> {
        self.templates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_catalog_loads_all_templates() {
        let catalog = TemplateCatalog::embedded().unwrap();
        let kinds: Vec<_> = catalog.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, TemplateKind::ALL.to_vec());
        for schema in catalog.iter() {
            assert!(schema.section("experience").is_some());
            assert!(matches!(
                schema.section("skills").unwrap().shape,
                SectionShape::List { .. }
            ));
        }
    }

    #[test]
    fn test_get_returns_matching_kind() {
        let catalog = TemplateCatalog::embedded().unwrap();
        assert_eq!(catalog.get(TemplateKind::Modern).kind, TemplateKind::Modern);
        assert_eq!(catalog.get(TemplateKind::Minimalist).id, 3);
    }

    #[test]
    fn test_parse_kind_by_id_and_name() {
        assert_eq!(TemplateKind::parse("1").unwrap(), TemplateKind::Classic);
        assert_eq!(TemplateKind::parse("2").unwrap(), TemplateKind::Modern);
        assert_eq!(TemplateKind::parse(" 3 ").unwrap(), TemplateKind::Minimalist);
        assert_eq!(TemplateKind::parse("modern").unwrap(), TemplateKind::Modern);
        assert_eq!(TemplateKind::parse("CLASSIC").unwrap(), TemplateKind::Classic);
    }

    #[test]
    fn test_parse_kind_rejects_unknown() {
        for raw in ["0", "4", "", "fancy", "-1"] {
            assert!(
                matches!(TemplateKind::parse(raw), Err(CatalogError::UnknownTemplate(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_catalog_requires_every_template() {
        let raw = r#"{"templates": {"Classic": {"fields": {"personal": {"name": "Name"}}}}}"#;
        let err = TemplateCatalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::MissingTemplate(ref t) if t == "Modern"));
    }

    #[test]
    fn test_catalog_rejects_unknown_template_name() {
        let raw = r#"{"templates": {"Fancy": {"fields": {}}}}"#;
        assert!(matches!(
            TemplateCatalog::from_json(raw),
            Err(CatalogError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_catalog_rejects_duplicate_template() {
        let raw = r#"{"templates": {
            "Classic": {"fields": {"personal": {"name": "Name"}}},
            "classic": {"fields": {"personal": {"name": "Other"}}},
            "Modern": {"fields": {"personal": {"name": "Name"}}},
            "Minimalist": {"fields": {"personal": {"name": "Name"}}}
        }}"#;
        let err = TemplateCatalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSchema { ref template, .. } if template == "classic"));
    }

    #[test]
    fn test_catalog_from_path_override() {
        let raw = r#"{"templates": {
            "Classic": {"fields": {"personal": {"name": "Your Name"}}},
            "Modern": {"fields": {"personal": {"name": "Name"}, "skills": ["Skill"]}},
            "Minimalist": {"description": "tiny", "fields": {"personal": {"name": "Name"}}}
        }}"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();

        let catalog = TemplateCatalog::from_path(file.path()).unwrap();
        let classic = catalog.get(TemplateKind::Classic);
        assert_eq!(classic.sections.len(), 1);
        assert_eq!(
            classic.label_for(&crate::form::keys::FieldKey::parse("name").unwrap()),
            Some("Your Name")
        );
        assert_eq!(catalog.get(TemplateKind::Minimalist).description, "tiny");
    }

    #[test]
    fn test_catalog_from_missing_path_is_io_error() {
        let err = TemplateCatalog::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
