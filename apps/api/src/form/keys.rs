//! Flat form-field keys.
//!
//! Every input on the resume form is named with a flat key:
//!
//! ```text
//! name                      scalar field
//! skills[2]                 item of a plain list
//! experience[0].jobTitle    field of a record list
//! ```
//!
//! Parsing is a single left-to-right pass over the key; there is no nesting
//! beyond one index and one field.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix reserved for non-data inputs (`_action`, ...).
pub const CONTROL_PREFIX: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKey {
    Scalar {
        name: String,
    },
    Item {
        section: String,
        index: usize,
    },
    ItemField {
        section: String,
        index: usize,
        field: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("field key is empty")]
    Empty,
    #[error("invalid identifier in field key '{0}'")]
    BadIdentifier(String),
    #[error("missing ']' in field key '{0}'")]
    UnclosedIndex(String),
    #[error("invalid index in field key '{0}'")]
    BadIndex(String),
    #[error("unexpected trailing characters in field key '{0}'")]
    Trailing(String),
}

/// True when `s` is a valid section or field name: `[A-Za-z_][A-Za-z0-9_-]*`.
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// True for inputs such as `_action` that never carry resume data.
pub fn is_control_key(raw: &str) -> bool {
    raw.starts_with(CONTROL_PREFIX)
}

impl FieldKey {
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }

        let Some(open) = raw.find('[') else {
            if !is_ident(raw) {
                return Err(KeyError::BadIdentifier(raw.to_string()));
            }
            return Ok(FieldKey::Scalar {
                name: raw.to_string(),
            });
        };

        let section = &raw[..open];
        if !is_ident(section) {
            return Err(KeyError::BadIdentifier(raw.to_string()));
        }

        let rest = &raw[open + 1..];
        let close = rest
            .find(']')
            .ok_or_else(|| KeyError::UnclosedIndex(raw.to_string()))?;
        let digits = &rest[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyError::BadIndex(raw.to_string()));
        }
        let index: usize = digits
            .parse()
            .map_err(|_| KeyError::BadIndex(raw.to_string()))?;

        let tail = &rest[close + 1..];
        if tail.is_empty() {
            return Ok(FieldKey::Item {
                section: section.to_string(),
                index,
            });
        }

        let field = tail
            .strip_prefix('.')
            .ok_or_else(|| KeyError::Trailing(raw.to_string()))?;
        if !is_ident(field) {
            return Err(KeyError::BadIdentifier(raw.to_string()));
        }

        Ok(FieldKey::ItemField {
            section: section.to_string(),
            index,
            field: field.to_string(),
        })
    }

    /// The root-level name this key writes to: the scalar name or the section.
    pub fn root(&self) -> &str {
        match self {
            FieldKey::Scalar { name } => name,
            FieldKey::Item { section, .. } | FieldKey::ItemField { section, .. } => section,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            FieldKey::Scalar { .. } => None,
            FieldKey::Item { index, .. } | FieldKey::ItemField { index, .. } => Some(*index),
        }
    }

    /// Same key pointing at another entry of its section. Scalars are returned unchanged.
    pub fn with_index(&self, new_index: usize) -> FieldKey {
        match self {
            FieldKey::Scalar { .. } => self.clone(),
            FieldKey::Item { section, .. } => FieldKey::Item {
                section: section.clone(),
                index: new_index,
            },
            FieldKey::ItemField { section, field, .. } => FieldKey::ItemField {
                section: section.clone(),
                index: new_index,
                field: field.clone(),
            },
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Scalar { name } => write!(f, "{name}"),
            FieldKey::Item { section, index } => write!(f, "{section}[{index}]"),
            FieldKey::ItemField {
                section,
                index,
                field,
            } => write!(f, "{section}[{index}].{field}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        assert_eq!(
            FieldKey::parse("email").unwrap(),
            FieldKey::Scalar {
                name: "email".to_string()
            }
        );
    }

    #[test]
    fn test_parse_plain_item() {
        assert_eq!(
            FieldKey::parse("skills[2]").unwrap(),
            FieldKey::Item {
                section: "skills".to_string(),
                index: 2
            }
        );
    }

    #[test]
    fn test_parse_record_field() {
        let key = FieldKey::parse("experience[0].jobTitle").unwrap();
        assert_eq!(
            key,
            FieldKey::ItemField {
                section: "experience".to_string(),
                index: 0,
                field: "jobTitle".to_string()
            }
        );
        assert_eq!(key.root(), "experience");
        assert_eq!(key.index(), Some(0));
    }

    #[test]
    fn test_display_is_inverse_of_parse() {
        for raw in ["name", "skills[10]", "education[3].university", "linked_in-url"] {
            assert_eq!(FieldKey::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert_eq!(FieldKey::parse(""), Err(KeyError::Empty));
        assert!(matches!(
            FieldKey::parse("1name"),
            Err(KeyError::BadIdentifier(_))
        ));
        assert!(matches!(
            FieldKey::parse("skills[2"),
            Err(KeyError::UnclosedIndex(_))
        ));
        assert!(matches!(
            FieldKey::parse("skills[]"),
            Err(KeyError::BadIndex(_))
        ));
        assert!(matches!(
            FieldKey::parse("skills[-1]"),
            Err(KeyError::BadIndex(_))
        ));
        assert!(matches!(
            FieldKey::parse("skills[1]x"),
            Err(KeyError::Trailing(_))
        ));
        assert!(matches!(
            FieldKey::parse("experience[0]."),
            Err(KeyError::BadIdentifier(_))
        ));
        assert!(matches!(
            FieldKey::parse("experience[0].a.b"),
            Err(KeyError::BadIdentifier(_))
        ));
    }

    #[test]
    fn test_index_overflow_is_rejected() {
        let raw = format!("skills[{}0]", usize::MAX);
        assert!(matches!(FieldKey::parse(&raw), Err(KeyError::BadIndex(_))));
    }

    #[test]
    fn test_with_index_keeps_section_and_field() {
        let key = FieldKey::parse("education[4].degree").unwrap();
        assert_eq!(key.with_index(1).to_string(), "education[1].degree");
    }

    #[test]
    fn test_control_keys() {
        assert!(is_control_key("_action"));
        assert!(!is_control_key("name"));
    }
}
