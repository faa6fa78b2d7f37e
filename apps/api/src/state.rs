use std::sync::Arc;

use crate::catalog::{TemplateCatalog, TemplateKind};
use crate::config::Config;
use crate::errors::AppError;
use crate::form::{FormError, FormLimits, FormState};
use crate::layout::{build_document, Document, RenderOptions};
use crate::models::resume::ResumeData;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup; read-only afterwards.
    pub catalog: Arc<TemplateCatalog>,
}

impl AppState {
    pub fn new(config: Config, catalog: TemplateCatalog) -> Self {
        AppState {
            config,
            catalog: Arc::new(catalog),
        }
    }

    pub fn limits(&self) -> FormLimits {
        FormLimits {
            max_value_bytes: self.config.max_data_bytes,
            max_entries: self.config.max_entries_per_section,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            placeholders: self.config.render_placeholders,
        }
    }

    /// Form state for `kind` from flat submitted pairs.
    pub fn form_state<'a, I>(&self, kind: TemplateKind, pairs: I) -> Result<FormState, AppError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Ok(FormState::from_pairs(
            self.catalog.get(kind),
            pairs,
            &self.limits(),
        )?)
    }

    /// Nests the flat state and lays it out with the template.
    pub fn document(
        &self,
        kind: TemplateKind,
        state: &FormState,
    ) -> Result<(Document, ResumeData), AppError> {
        let nested = state.to_nested(&self.limits().unflatten_options())?;
        let data = ResumeData::from_value(nested)
            .map_err(|e| AppError::Validation(format!("Form data does not fit the resume: {e}")))?;
        Ok(self.document_from_data(kind, data))
    }

    /// Already nested data gets the same per-section cap as submitted forms.
    pub fn check_entry_limits(&self, data: &ResumeData) -> Result<(), FormError> {
        let max = self.config.max_entries_per_section;
        match data.entry_counts().into_iter().find(|(_, count)| *count > max) {
            Some((section, _)) => Err(FormError::TooManyEntries {
                section: section.to_string(),
                max,
            }),
            None => Ok(()),
        }
    }

    pub fn document_from_data(&self, kind: TemplateKind, data: ResumeData) -> (Document, ResumeData) {
        let doc = build_document(kind, &data, &self.render_options());
        (doc, data)
    }
}
