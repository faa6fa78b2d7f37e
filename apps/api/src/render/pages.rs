//! Site pages: home, template picker, the resume form, preview and errors.
//! Plain server-rendered HTML; every piece of user text goes through `escape_html`.

use std::fmt::Write;

use crate::catalog::{ItemShape, SectionSchema, SectionShape, TemplateCatalog, TemplateKind, TemplateSchema};
use crate::form::completeness::compute_completeness;
use crate::form::{FieldKey, FormState};
use crate::layout::theme::Theme;
use crate::render::escape_html;

const SITE_CSS: &str = "\
body{margin:0;font-family:Helvetica,Arial,sans-serif;background:#f7fafc;color:#1a202c}\
nav{background:#1a365d;padding:12px 24px}nav a{color:#fff;text-decoration:none;margin-right:16px}\
main{max-width:900px;margin:0 auto;padding:24px}\
.cards{display:flex;flex-wrap:wrap;gap:16px}\
.card{flex:1 1 240px;background:#fff;border:1px solid #e2e8f0;border-radius:6px;padding:16px}\
.swatch{height:90px;border:1px solid #e2e8f0;border-radius:4px;margin-bottom:10px;padding:10px;box-sizing:border-box}\
fieldset{background:#fff;border:1px solid #e2e8f0;border-radius:6px;margin-bottom:16px}\
label{display:block;margin:8px 0 2px;font-size:14px}\
input[type=text],textarea{width:100%;box-sizing:border-box;padding:6px;border:1px solid #cbd5e0;border-radius:4px}\
.entry{border-top:1px dashed #e2e8f0;padding-top:8px;margin-top:8px}\
.notice{background:#fff5f5;border:1px solid #feb2b2;color:#c53030;padding:10px;border-radius:4px}\
.actions{display:flex;gap:12px;margin:16px 0}\
button,.button{background:#1a365d;color:#fff;border:0;border-radius:4px;padding:8px 14px;text-decoration:none;cursor:pointer}\
button.secondary{background:#718096}\
.sheet{background:#fff;box-shadow:0 1px 4px rgba(0,0,0,.15);margin:16px 0}";

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title}</title><style>{SITE_CSS}</style></head><body><nav><a href="/">Home</a><a href="/templates">Templates</a></nav><main>{body}</main></body></html>"#,
        title = escape_html(title),
    )
}

fn notice(out: &mut String, message: Option<&str>) {
    if let Some(message) = message {
        let _ = write!(out, r#"<p class="notice" role="alert">{}</p>"#, escape_html(message));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Home and template selection
// ────────────────────────────────────────────────────────────────────────────

pub fn home_page() -> String {
    page(
        "Resume Builder",
        r#"<h1>Build your resume</h1><p>Pick a template, fill in your details and download a print-ready PDF.</p><p><a class="button" href="/templates">Choose a template</a></p>"#,
    )
}

pub fn template_select_page(catalog: &TemplateCatalog, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Choose a template</h1>");
    notice(&mut body, error);
    body.push_str(r#"<form method="get" action="/templates/select"><div class="cards">"#);
    for schema in catalog.iter() {
        let theme = Theme::for_template(schema.kind);
        let background = theme
            .banner
            .map(|b| b.background.hex())
            .unwrap_or_else(|| "#ffffff".to_string());
        let _ = write!(
            body,
            r#"<label class="card"><div class="swatch" style="background:{background};font-family:{family}"><div style="color:{name};font-weight:bold;font-size:18px">{title}</div><div style="color:{muted};font-size:12px">Your Professional Title</div></div><input type="radio" name="template" value="{id}"> <strong>{title}</strong><p>{description}</p></label>"#,
            family = theme.name.face.css_family(),
            name = theme.name.color.hex(),
            muted = theme.title.color.hex(),
            title = escape_html(schema.kind.name()),
            id = schema.id,
            description = escape_html(&schema.description),
        );
    }
    body.push_str(r#"</div><div class="actions"><button type="submit">Use this template</button></div></form>"#);
    page("Choose a template", &body)
}

// ────────────────────────────────────────────────────────────────────────────
// Form
// ────────────────────────────────────────────────────────────────────────────

/// The resume form, pre-filled from `state`.
///
/// Buttons submit `_action` back to `/form`: `preview`, `add:<section>` or
/// `remove:<section>:<index>`.
pub fn form_page(schema: &TemplateSchema, state: &FormState, message: Option<&str>) -> String {
    let report = compute_completeness(schema, state);
    let mut body = format!(
        r#"<h1>{} resume</h1><p>{}% complete</p>"#,
        escape_html(schema.kind.name()),
        (report.overall * 100.0).round()
    );
    notice(&mut body, message);
    let _ = write!(body, r#"<form method="post" action="/form?template={}">"#, schema.id);

    for section in &schema.sections {
        let _ = write!(body, "<fieldset><legend>{}</legend>", escape_html(&section.title()));
        match &section.shape {
            SectionShape::Group { fields } => {
                for field in fields {
                    let key = FieldKey::Scalar {
                        name: field.name.clone(),
                    };
                    input(&mut body, schema, &key, state);
                }
            }
            SectionShape::List { item, .. } => list_section(&mut body, schema, section, item, state),
        }
        body.push_str("</fieldset>");
    }

    body.push_str(r#"<div class="actions"><button type="submit" name="_action" value="preview">Preview Resume</button></div></form>"#);

    let raw = serde_json::to_string_pretty(&state.to_flat_json()).unwrap_or_default();
    let _ = write!(
        body,
        "<details><summary>Form data</summary><pre>{}</pre></details>",
        escape_html(&raw)
    );
    page(&format!("{} resume", schema.kind.name()), &body)
}

fn list_section(
    out: &mut String,
    schema: &TemplateSchema,
    section: &SectionSchema,
    item: &ItemShape,
    state: &FormState,
) {
    let title = section.title();
    for (position, index) in state.entry_indices(&section.name).into_iter().enumerate() {
        let _ = write!(
            out,
            r#"<div class="entry"><strong>{} {}</strong>"#,
            escape_html(&title),
            position + 1
        );
        match item {
            ItemShape::Plain { .. } => {
                let key = FieldKey::Item {
                    section: section.name.clone(),
                    index,
                };
                input(out, schema, &key, state);
            }
            ItemShape::Record { fields } => {
                for field in fields {
                    let key = FieldKey::ItemField {
                        section: section.name.clone(),
                        index,
                        field: field.name.clone(),
                    };
                    input(out, schema, &key, state);
                }
            }
        }
        let _ = write!(
            out,
            r#"<button type="submit" class="secondary" name="_action" value="remove:{}:{index}">Remove</button></div>"#,
            escape_html(&section.name)
        );
    }
    let _ = write!(
        out,
        r#"<div class="actions"><button type="submit" class="secondary" name="_action" value="add:{}">Add {}</button></div>"#,
        escape_html(&section.name),
        escape_html(&title)
    );
}

fn input(out: &mut String, schema: &TemplateSchema, key: &FieldKey, state: &FormState) {
    let raw_name = key.to_string();
    let label = schema.label_for(key).unwrap_or(raw_name.as_str());
    let name = escape_html(&raw_name);
    let value = escape_html(state.get(key).unwrap_or_default());
    let multiline = matches!(
        key,
        FieldKey::Scalar { name } | FieldKey::ItemField { field: name, .. }
            if name == "summary" || name == "description"
    );
    let _ = write!(out, r#"<label for="{name}">{}</label>"#, escape_html(label));
    if multiline {
        let _ = write!(out, r#"<textarea id="{name}" name="{name}" rows="4">{value}</textarea>"#);
    } else {
        let _ = write!(out, r#"<input type="text" id="{name}" name="{name}" value="{value}">"#);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Preview and errors
// ────────────────────────────────────────────────────────────────────────────

/// `resume_html` is the already-rendered document; `query` the
/// `template=..&data=..` string shared by the edit and download links.
pub fn preview_page(kind: TemplateKind, resume_html: &str, query: &str) -> String {
    let query = escape_html(query);
    let body = format!(
        r#"<h1>Preview</h1><div class="actions"><a class="button" href="/download?{query}">Download Resume</a><a class="button" href="/form?{query}">Edit</a></div><div class="sheet">{resume_html}</div>"#
    );
    page(&format!("{} resume preview", kind.name()), &body)
}

pub fn error_page(status: u16, message: &str) -> String {
    let mut body = format!("<h1>Something went wrong ({status})</h1>");
    notice(&mut body, Some(message));
    body.push_str(r#"<p><a href="/templates">Back to templates</a></p>"#);
    page("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormLimits;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::embedded().unwrap()
    }

    #[test]
    fn test_template_select_lists_every_template() {
        let html = template_select_page(&catalog(), None);
        for kind in TemplateKind::ALL {
            assert!(html.contains(&format!(r#"value="{}""#, kind.id())));
            assert!(html.contains(kind.name()));
        }
        assert!(!html.contains("notice"));
    }

    #[test]
    fn test_template_select_shows_error() {
        let html = template_select_page(&catalog(), Some("Please select a template!"));
        assert!(html.contains(r#"role="alert">Please select a template!</p>"#));
    }

    #[test]
    fn test_form_page_inputs_and_buttons() {
        let catalog = catalog();
        let schema = catalog.get(TemplateKind::Classic);
        let mut state = FormState::initial(schema);
        state.set(
            FieldKey::parse("name").unwrap(),
            r#"Ada "The Countess" Lovelace"#,
        );
        let html = form_page(schema, &state, None);

        assert!(html.contains(r#"action="/form?template=1""#));
        assert!(html.contains(r#"name="name" value="Ada &quot;The Countess&quot; Lovelace""#));
        assert!(html.contains(r#"name="experience[0].jobTitle""#));
        assert!(html.contains(r#"name="skills[2]""#));
        assert!(html.contains(r#"value="add:experience">Add Experience</button>"#));
        assert!(html.contains(r#"value="remove:skills:0""#));
        assert!(html.contains(r#"<textarea id="summary" name="summary""#));
        assert!(html.contains(r#"value="preview""#));
        assert!(html.contains("<details><summary>Form data</summary>"));
    }

    #[test]
    fn test_form_page_after_removing_all_entries_keeps_add_button() {
        let catalog = catalog();
        let schema = catalog.get(TemplateKind::Modern);
        let state = FormState::from_pairs(schema, [("name", "Ada")], &FormLimits::default()).unwrap();
        let html = form_page(schema, &state, Some("Removed"));
        assert!(!html.contains("experience[0]"));
        assert!(html.contains(r#"value="add:experience""#));
        assert!(html.contains("Removed"));
    }

    #[test]
    fn test_preview_page_links() {
        let html = preview_page(TemplateKind::Modern, "<div>resume</div>", "template=2&data=%7B%7D");
        assert!(html.contains(r#"href="/download?template=2&amp;data=%7B%7D">Download Resume</a>"#));
        assert!(html.contains(r#"href="/form?template=2&amp;data=%7B%7D""#));
        assert!(html.contains("<div>resume</div>"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = error_page(404, "No <such> template");
        assert!(html.contains("(404)"));
        assert!(html.contains("No &lt;such&gt; template"));
    }
}
