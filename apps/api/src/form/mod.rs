// Form state bookkeeping: flat keys, nesting, URL threading and fill reports.
// All of it is pure and synchronous; handlers call it directly.

pub mod codec;
pub mod completeness;
pub mod keys;
pub mod state;
pub mod unflatten;

use thiserror::Error;

pub use keys::{FieldKey, KeyError};
pub use state::FormState;
pub use unflatten::{unflatten, UnflattenOptions};

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("'{name}' is used both as {first} and as {second}")]
    ShapeConflict {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("section '{section}' has more than {max} entries")]
    TooManyEntries { section: String, max: usize },

    #[error("value of '{key}' is longer than {max} bytes")]
    ValueTooLong { key: String, max: usize },

    #[error("form data is larger than {max} bytes")]
    TooLarge { max: usize },

    #[error("form data must be a JSON object of strings: {0}")]
    BadData(String),

    #[error("'{0}' is not a repeated section of this template")]
    UnknownSection(String),

    #[error("entry {index} of '{section}' does not exist")]
    NoSuchEntry { section: String, index: usize },

    #[error("failed to encode form data: {0}")]
    Encode(String),
}

/// Size limits applied to user-supplied form state.
#[derive(Debug, Clone, Copy)]
pub struct FormLimits {
    pub max_value_bytes: usize,
    pub max_entries: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        FormLimits {
            max_value_bytes: 64 * 1024,
            max_entries: 20,
        }
    }
}

impl FormLimits {
    pub fn unflatten_options(&self) -> UnflattenOptions {
        UnflattenOptions {
            prune_blank: true,
            max_entries: self.max_entries,
        }
    }
}
