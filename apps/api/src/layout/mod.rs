// Layout: resume data → template-specific `Document`, plus the theme and font
// metrics both renderers share. Text measurement is CPU-bound; PDF layout runs
// inside tokio::task::spawn_blocking.

pub mod document;
pub mod font_metrics;
pub mod templates;
pub mod theme;

pub use document::Document;
pub use templates::{build_document, RenderOptions};
