//! JSON API over the same catalog, form parsing and renderers the site uses.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::catalog::TemplateKind;
use crate::errors::AppError;
use crate::form::completeness::compute_completeness;
use crate::form::FormState;
use crate::models::resume::ResumeData;
use crate::render::html::render_document;
use crate::render::pdf::render_pdf_blocking;
use crate::routes::pages::pdf_response;
use crate::state::AppState;

/// GET /api/v1/templates
pub async fn list_templates(State(state): State<AppState>) -> Json<Value> {
    let templates: Vec<Value> = state
        .catalog
        .iter()
        .map(|schema| {
            json!({
                "id": schema.id,
                "name": schema.kind.name(),
                "description": schema.description,
                "sections": schema.sections.iter().map(|s| &s.name).collect::<Vec<_>>(),
            })
        })
        .collect();
    Json(json!({ "templates": templates }))
}

/// GET /api/v1/templates/:id
/// Accepts the numeric id or the template name.
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let kind = TemplateKind::parse(&id)?;
    let schema = state.catalog.get(kind);
    Ok(Json(json!({
        "template": schema,
        "initialState": FormState::initial(schema).to_flat_json(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub template: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// POST /api/v1/resumes/parse
/// Flat form fields in, nested resume data and a completeness report out.
pub async fn parse_resume(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<Value>, AppError> {
    let kind = TemplateKind::parse(&req.template)?;
    let form_state = state.form_state(kind, req.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    let data = form_state.to_nested(&state.limits().unflatten_options())?;
    let completeness = compute_completeness(state.catalog.get(kind), &form_state);
    Ok(Json(json!({
        "template": kind.id(),
        "data": data,
        "completeness": completeness,
    })))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Html,
    Pdf,
}

/// Either flat `fields` (as a form would send) or already nested `data`.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub template: String,
    pub fields: Option<BTreeMap<String, String>>,
    pub data: Option<Value>,
    #[serde(default)]
    pub format: RenderFormat,
}

/// POST /api/v1/resumes/render
pub async fn render_resume(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let kind = TemplateKind::parse(&req.template)?;
    let (doc, resume) = match (req.fields, req.data) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Provide either 'fields' or 'data', not both".to_string(),
            ))
        }
        (None, Some(data)) => {
            let resume = ResumeData::from_value(data)
                .map_err(|e| AppError::Validation(format!("Invalid resume data: {e}")))?;
            state.check_entry_limits(&resume)?;
            state.document_from_data(kind, resume)
        }
        (fields, None) => {
            let fields = fields.unwrap_or_default();
            let form_state =
                state.form_state(kind, fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
            state.document(kind, &form_state)?
        }
    };

    info!(template = %kind, format = ?req.format, "Rendering resume via API");
    match req.format {
        RenderFormat::Html => Ok(Html(render_document(&doc)).into_response()),
        RenderFormat::Pdf => {
            let bytes = render_pdf_blocking(doc).await?;
            let filename = format!(
                "resume-{}-{}.pdf",
                resume.file_stem(),
                Utc::now().format("%Y%m%d")
            );
            Ok(pdf_response(bytes, &filename))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_bytes, body_text, get, send};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_list_templates() {
        let body = json_body(get("/api/v1/templates").await).await;
        let templates = body["templates"].as_array().unwrap();
        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0]["id"], 1);
        assert_eq!(templates[0]["name"], "Classic");
        assert_eq!(templates[1]["name"], "Modern");
    }

    #[tokio::test]
    async fn test_get_template_by_name_and_id() {
        let by_name = json_body(get("/api/v1/templates/minimalist").await).await;
        let by_id = json_body(get("/api/v1/templates/3").await).await;
        assert_eq!(by_name, by_id);
        assert_eq!(by_id["initialState"]["skills[3]"], "");
        assert_eq!(by_id["initialState"]["experience[0].jobTitle"], "");
    }

    #[tokio::test]
    async fn test_get_unknown_template_is_404() {
        let response = get("/api/v1/templates/fancy").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Please select a valid template.");
    }

    #[tokio::test]
    async fn test_parse_nests_fields() {
        let response = send(post_json(
            "/api/v1/resumes/parse",
            json!({
                "template": "1",
                "fields": {
                    "name": "Ada",
                    "experience[0].jobTitle": "Analyst",
                    "experience[3].jobTitle": "Translator",
                    "skills[0]": "Math",
                    "skills[1]": ""
                }
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["template"], 1);
        assert_eq!(body["data"]["name"], "Ada");
        assert_eq!(body["data"]["experience"][1]["jobTitle"], "Translator");
        assert_eq!(body["data"]["skills"], json!(["Math"]));
        assert!(body["completeness"]["overall"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_parse_rejects_malformed_key() {
        let response = send(post_json(
            "/api/v1/resumes/parse",
            json!({"template": "modern", "fields": {"experience[x].jobTitle": "A"}}),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_render_html_from_nested_data() {
        let response = send(post_json(
            "/api/v1/resumes/render",
            json!({
                "template": "2",
                "data": {"name": "Grace Hopper", "skills": "COBOL, Compilers"}
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Grace Hopper"));
        assert!(html.contains(">COBOL</li>"));
    }

    #[tokio::test]
    async fn test_render_pdf_from_fields() {
        let response = send(post_json(
            "/api/v1/resumes/render",
            json!({"template": "3", "fields": {"name": "Grace"}, "format": "pdf"}),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_render_caps_entries_for_nested_data() {
        let jobs: Vec<Value> = (0..200).map(|i| json!({"jobTitle": format!("Job {i}")})).collect();
        let response = send(post_json(
            "/api/v1/resumes/render",
            json!({"template": "1", "data": {"experience": jobs}}),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("'experience' has more than 20 entries"));
    }

    #[tokio::test]
    async fn test_render_rejects_fields_and_data_together() {
        let response = send(post_json(
            "/api/v1/resumes/render",
            json!({"template": "1", "fields": {}, "data": {}}),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
