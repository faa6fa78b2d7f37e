//! Browser-facing routes. State travels in the query string
//! (`template`, `data`) between the form, preview and download pages.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::TemplateKind;
use crate::errors::{AppError, PageError};
use crate::form::codec::{decode_data, encode_query};
use crate::form::FormState;
use crate::render::html::render_document;
use crate::render::pages::{form_page, home_page, preview_page, template_select_page};
use crate::render::pdf::render_pdf_blocking;
use crate::state::AppState;

const SELECT_TEMPLATE_MESSAGE: &str = "Please select a template!";

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub template: Option<String>,
    pub data: Option<String>,
}

impl TemplateQuery {
    /// The template for preview and download: must name a real template.
    fn strict_kind(&self) -> Result<TemplateKind, PageError> {
        Ok(TemplateKind::parse(self.template.as_deref().unwrap_or_default())?)
    }

    /// The template for the form page: anything unknown falls back to Classic.
    fn lenient_kind(&self) -> TemplateKind {
        let raw = self.template.as_deref().unwrap_or_default();
        TemplateKind::parse(raw).unwrap_or_else(|e| {
            warn!("{e}; showing the {} form instead", TemplateKind::default());
            TemplateKind::default()
        })
    }

    fn form_state(&self, state: &AppState, kind: TemplateKind) -> Result<FormState, AppError> {
        let pairs = decode_data(self.data.as_deref(), state.config.max_data_bytes)?;
        state.form_state(kind, pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Home and template selection
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn home() -> Html<String> {
    Html(home_page())
}

/// GET /templates
pub async fn templates(State(state): State<AppState>) -> Html<String> {
    Html(template_select_page(&state.catalog, None))
}

/// GET /templates/select?template=N
/// Redirects to the form, or shows the picker again with a message.
pub async fn select_template(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Response {
    match query.template.as_deref().map(TemplateKind::parse) {
        Some(Ok(kind)) => Redirect::to(&format!("/form?template={}", kind.id())).into_response(),
        _ => Html(template_select_page(&state.catalog, Some(SELECT_TEMPLATE_MESSAGE))).into_response(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Form
// ────────────────────────────────────────────────────────────────────────────

/// GET /form?template=N[&data=...]
pub async fn form(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Html<String>, PageError> {
    let kind = query.lenient_kind();
    let form_state = query.form_state(&state, kind)?;
    Ok(Html(form_page(state.catalog.get(kind), &form_state, None)))
}

/// What a form submission asked for, from its `_action` field.
#[derive(Debug, PartialEq)]
enum FormAction {
    Preview,
    Add(String),
    Remove(String, usize),
}

impl FormAction {
    fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = raw else {
            return Ok(FormAction::Preview);
        };
        let mut parts = raw.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("preview"), None, None) => Ok(FormAction::Preview),
            (Some("add"), Some(section), None) => Ok(FormAction::Add(section.to_string())),
            (Some("remove"), Some(section), Some(index)) => index
                .parse()
                .map(|index| FormAction::Remove(section.to_string(), index))
                .map_err(|_| AppError::Validation(format!("Invalid entry index in action '{raw}'"))),
            _ => Err(AppError::Validation(format!("Unknown form action '{raw}'"))),
        }
    }
}

/// POST /form?template=N
///
/// `preview` redirects to the preview page; `add:<section>` and
/// `remove:<section>:<index>` re-render the form with the entry added or removed.
pub async fn submit_form(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let kind = query.lenient_kind();
    let schema = state.catalog.get(kind);

    let submitted: usize = fields.iter().map(|(k, v)| k.len() + v.len()).sum();
    if submitted > state.config.max_data_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "form data is larger than {} bytes",
            state.config.max_data_bytes
        ))
        .into());
    }

    let action = FormAction::parse(
        fields
            .iter()
            .rev()
            .find(|(k, _)| k == "_action")
            .map(|(_, v)| v.as_str()),
    )?;
    let mut form_state =
        state.form_state(kind, fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let result = match action {
        FormAction::Preview => {
            let query = encode_query(kind, &form_state)?;
            return Ok(Redirect::to(&format!("/preview?{query}")).into_response());
        }
        FormAction::Add(section) => form_state
            .add_entry(schema, &section, &state.limits())
            .map(|_| ()),
        FormAction::Remove(section, index) => form_state.remove_entry(schema, &section, index),
    };

    // A refused add or remove keeps the user's input and explains why.
    let message = result.err().map(|e| e.to_string());
    Ok(Html(form_page(schema, &form_state, message.as_deref())).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Preview and download
// ────────────────────────────────────────────────────────────────────────────

/// GET /preview?template=N&data=...
pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Html<String>, PageError> {
    let kind = query.strict_kind()?;
    let form_state = query.form_state(&state, kind)?;
    let (doc, _) = state.document(kind, &form_state)?;
    let links = encode_query(kind, &form_state)?;
    info!(template = %kind, "Rendered preview");
    Ok(Html(preview_page(kind, &render_document(&doc), &links)))
}

/// GET /download?template=N&data=...
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Response, PageError> {
    let kind = query.strict_kind()?;
    let form_state = query.form_state(&state, kind)?;
    let (doc, resume) = state.document(kind, &form_state)?;
    let bytes = render_pdf_blocking(doc).await?;

    let filename = format!(
        "resume-{}-{}.pdf",
        resume.file_stem(),
        Utc::now().format("%Y%m%d")
    );
    info!(template = %kind, size = bytes.len(), %filename, "Rendered PDF");
    Ok(pdf_response(bytes, &filename))
}

pub(crate) fn pdf_response(bytes: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_bytes, body_text, get, send, with_query};
    use axum::{body::Body, http::Request, http::StatusCode};

    fn post_form(uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(pairs).unwrap()))
            .unwrap()
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[test]
    fn test_form_action_parse() {
        assert_eq!(FormAction::parse(None).unwrap(), FormAction::Preview);
        assert_eq!(
            FormAction::parse(Some("add:experience")).unwrap(),
            FormAction::Add("experience".to_string())
        );
        assert_eq!(
            FormAction::parse(Some("remove:skills:2")).unwrap(),
            FormAction::Remove("skills".to_string(), 2)
        );
        assert!(FormAction::parse(Some("remove:skills:two")).is_err());
        assert!(FormAction::parse(Some("explode")).is_err());
    }

    #[tokio::test]
    async fn test_home_and_templates_pages() {
        let home = body_text(get("/").await).await;
        assert!(home.contains(r#"href="/templates""#));
        let picker = body_text(get("/templates").await).await;
        assert!(picker.contains("Minimalist"));
    }

    #[tokio::test]
    async fn test_select_redirects_to_form() {
        let response = get("/templates/select?template=2").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/form?template=2");
    }

    #[tokio::test]
    async fn test_select_without_choice_shows_message() {
        let response = get("/templates/select").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(SELECT_TEMPLATE_MESSAGE));
    }

    #[tokio::test]
    async fn test_form_falls_back_to_classic() {
        let response = get("/form?template=99").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Classic resume"));
        assert!(html.contains(r#"action="/form?template=1""#));
    }

    #[tokio::test]
    async fn test_form_prefilled_from_data() {
        let uri = with_query(
            "/form",
            &[("template", "3"), ("data", r#"{"name":"Ada","skills[0]":"Rust"}"#)],
        );
        let html = body_text(get(&uri).await).await;
        assert!(html.contains(r#"name="name" value="Ada""#));
        assert!(html.contains(r#"name="skills[0]" value="Rust""#));
        assert!(!html.contains("skills[1]"));
    }

    #[tokio::test]
    async fn test_form_rejects_malformed_data() {
        let uri = with_query("/form", &[("template", "1"), ("data", "[1,2]")]);
        let response = get(&uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("JSON object"));
    }

    #[tokio::test]
    async fn test_submit_preview_redirects_with_state() {
        let request = post_form(
            "/form?template=2",
            &[
                ("name", "Ada Lovelace"),
                ("experience[0].jobTitle", "Analyst"),
                ("_action", "preview"),
            ],
        );
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("/preview?template=2&data="));

        let preview = body_text(get(&target).await).await;
        assert!(preview.contains("Ada Lovelace"));
        assert!(preview.contains("Analyst"));
        assert!(preview.contains("Download Resume"));
    }

    #[tokio::test]
    async fn test_submit_add_and_remove_entries() {
        let added = send(post_form(
            "/form?template=1",
            &[
                ("name", "Ada"),
                ("experience[0].jobTitle", "Analyst"),
                ("_action", "add:experience"),
            ],
        ))
        .await;
        assert_eq!(added.status(), StatusCode::OK);
        let html = body_text(added).await;
        assert!(html.contains(r#"name="experience[1].jobTitle" value="""#));

        let removed = send(post_form(
            "/form?template=1",
            &[
                ("experience[0].jobTitle", "First"),
                ("experience[1].jobTitle", "Second"),
                ("_action", "remove:experience:0"),
            ],
        ))
        .await;
        let html = body_text(removed).await;
        assert!(html.contains(r#"name="experience[0].jobTitle" value="Second""#));
        assert!(!html.contains("experience[1]"));
    }

    #[tokio::test]
    async fn test_submit_remove_missing_entry_shows_notice() {
        let response = send(post_form(
            "/form?template=1",
            &[("name", "Ada"), ("_action", "remove:skills:7")],
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"role="alert""#));
    }

    #[tokio::test]
    async fn test_submit_add_after_huge_index() {
        let response = send(post_form(
            "/form?template=1",
            &[
                ("skills[18446744073709551615]", "Rust"),
                ("_action", "add:skills"),
            ],
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"name="skills[0]" value="Rust""#));
        assert!(html.contains(r#"name="skills[1]" value="""#));
        assert!(!html.contains("18446744073709551615"));
    }

    #[tokio::test]
    async fn test_submit_oversized_body_is_413() {
        let long = "x".repeat(70 * 1024);
        let response = send(post_form("/form?template=1", &[("summary", long.as_str())])).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body_text(response).await.contains("larger than 65536 bytes"));
    }

    #[tokio::test]
    async fn test_submit_too_many_entries_is_400() {
        let keys: Vec<String> = (0..21).map(|i| format!("skills[{i}]")).collect();
        let pairs: Vec<(&str, &str)> = keys.iter().map(|k| (k.as_str(), "Skill")).collect();
        let response = send(post_form("/form?template=1", &pairs)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("more than 20 entries"));
    }

    #[tokio::test]
    async fn test_oversized_data_parameter_is_413() {
        let data = format!(r#"{{"name":"{}"}}"#, "x".repeat(70 * 1024));
        for path in ["/preview", "/download"] {
            let uri = with_query(path, &[("template", "1"), ("data", data.as_str())]);
            let response = get(&uri).await;
            assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE, "{path}");
        }
    }

    #[tokio::test]
    async fn test_preview_unknown_template_is_404_page() {
        let response = get("/preview?template=7").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains("Please select a valid template."));
    }

    #[tokio::test]
    async fn test_preview_placeholders_for_empty_form() {
        let html = body_text(get("/preview?template=1").await).await;
        assert!(html.contains("Anna Taylor"));
    }

    #[tokio::test]
    async fn test_download_returns_named_pdf() {
        let uri = with_query(
            "/download",
            &[("template", "1"), ("data", r#"{"name":"Ada Lovelace"}"#)],
        );
        let response = get(&uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        let today = Utc::now().format("%Y%m%d").to_string();
        assert_eq!(
            disposition,
            format!("attachment; filename=\"resume-ada-lovelace-{today}.pdf\"")
        );
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }
}
