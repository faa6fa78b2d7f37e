use serde::{Deserialize, Serialize};

use crate::catalog::{SectionShape, TemplateSchema};
use crate::form::keys::FieldKey;
use crate::form::state::FormState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Complete,
    Partial,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionFill {
    pub section: String,
    pub filled: usize,
    pub total: usize,
    pub status: SectionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Filled inputs over all inputs, 0.0 to 1.0.
    pub overall: f64,
    pub sections: Vec<SectionFill>,
    pub empty_sections: Vec<String>,
}

pub fn compute_completeness(schema: &TemplateSchema, state: &FormState) -> CompletenessReport {
    let mut sections = Vec::new();
    let mut empty_sections = Vec::new();
    let mut filled_sum = 0usize;
    let mut total_sum = 0usize;

    for section in &schema.sections {
        let (filled, total) = match &section.shape {
            SectionShape::Group { fields } => {
                let filled = fields
                    .iter()
                    .filter(|f| {
                        let key = FieldKey::Scalar {
                            name: f.name.clone(),
                        };
                        state.get(&key).is_some_and(|v| !v.trim().is_empty())
                    })
                    .count();
                (filled, fields.len())
            }
            SectionShape::List { .. } => {
                let inputs: Vec<&String> = state
                    .values()
                    .iter()
                    .filter(|(k, _)| k.index().is_some() && k.root() == section.name)
                    .map(|(_, v)| v)
                    .collect();
                let filled = inputs.iter().filter(|v| !v.trim().is_empty()).count();
                (filled, inputs.len())
            }
        };

        let status = if total > 0 && filled == total {
            SectionStatus::Complete
        } else if filled > 0 {
            SectionStatus::Partial
        } else {
            empty_sections.push(section.name.clone());
            SectionStatus::Empty
        };

        filled_sum += filled;
        total_sum += total;
        sections.push(SectionFill {
            section: section.name.clone(),
            filled,
            total,
            status,
        });
    }

    let overall = if total_sum == 0 {
        0.0
    } else {
        filled_sum as f64 / total_sum as f64
    };

    CompletenessReport {
        overall,
        sections,
        empty_sections,
    }
}
