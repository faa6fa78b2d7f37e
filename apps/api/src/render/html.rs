//! `Document` → self-contained HTML fragment.
//!
//! Every style is inline so the fragment can be embedded anywhere (the preview
//! page, or returned as-is from the render API) without a stylesheet.

use std::fmt::Write;

use crate::layout::document::{Block, Document, Item};
use crate::layout::theme::{Align, Rule, TextStyle, Theme, A4_WIDTH_PT};
use crate::render::escape_html;

pub fn render_document(doc: &Document) -> String {
    let theme = &doc.theme;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="resume resume-{kind}" style="box-sizing:border-box;max-width:{width}pt;margin:0 auto;padding:{pad}pt;background:#fff;color:{ink};font-family:{family};line-height:1.3">"#,
        kind = doc.kind.name().to_lowercase(),
        width = A4_WIDTH_PT,
        pad = theme.page_padding_pt,
        ink = theme.text_color.hex(),
        family = theme.body.face.css_family(),
    );

    for block in &doc.blocks {
        match block {
            Block::Header {
                name,
                title,
                contact_rows,
            } => header(&mut out, theme, name, title.as_deref(), contact_rows),
            Block::Divider => {
                if let Some(rule) = &theme.divider {
                    let _ = write!(out, r#"<hr style="{}">"#, hr_css(rule));
                }
            }
            Block::Section { heading, items } => section(&mut out, theme, heading, items),
        }
    }

    out.push_str("</div>");
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

fn header(out: &mut String, theme: &Theme, name: &str, title: Option<&str>, rows: &[Vec<String>]) {
    let align = match theme.header_align {
        Align::Left => "left",
        Align::Center => "center",
    };
    let mut css = format!("text-align:{align};margin-bottom:{}pt;", theme.section_gap_pt);
    if let Some(banner) = &theme.banner {
        let _ = write!(
            css,
            "background:{};padding:{}pt;",
            banner.background.hex(),
            banner.padding_pt
        );
    }
    let _ = write!(out, r#"<header style="{css}">"#);

    if !name.is_empty() {
        tag(out, "h1", &theme.name, name);
    }
    if let Some(title) = title {
        tag(out, "p", &theme.title, title);
    }
    let justify = match theme.header_align {
        Align::Left => "flex-start",
        Align::Center => "center",
    };
    for row in rows {
        let _ = write!(
            out,
            r#"<div class="contacts" style="display:flex;flex-wrap:wrap;justify-content:{justify};gap:{}pt;{}">"#,
            theme.contact_gap_pt,
            text_css(&theme.contact),
        );
        for contact in row {
            let _ = write!(out, "<span>{}</span>", escape_html(contact));
        }
        out.push_str("</div>");
    }
    out.push_str("</header>");
}

fn section(out: &mut String, theme: &Theme, heading: &str, items: &[Item]) {
    let mut css = format!("margin-bottom:{}pt;", theme.section_gap_pt);
    if let Some(rule) = &theme.section_rule {
        let _ = write!(
            css,
            "border-bottom:{}pt solid {};padding-bottom:{}pt;",
            rule.thickness_pt,
            rule.color.hex(),
            rule.margin_pt
        );
    }
    let _ = write!(out, r#"<section style="{css}">"#);

    let mut heading_css = text_css(&theme.heading);
    if let Some(rule) = &theme.heading_rule {
        let _ = write!(
            heading_css,
            "border-bottom:{}pt solid {};padding-bottom:{}pt;margin-bottom:{}pt;",
            rule.thickness_pt,
            rule.color.hex(),
            theme.heading.gap_after_pt,
            rule.margin_pt
        );
    }
    let _ = write!(
        out,
        r#"<h2 style="{heading_css}">{}</h2>"#,
        escape_html(heading)
    );

    for item in items {
        match item {
            Item::Paragraph { text } | Item::Line { text } => tag(out, "p", &theme.body, text),
            Item::Entry {
                title,
                subtitle,
                meta,
                body,
            } => {
                let _ = write!(
                    out,
                    r#"<div class="entry" style="margin-bottom:{}pt">"#,
                    theme.entry_gap_pt
                );
                if !title.is_empty() {
                    tag(out, "h3", &theme.entry_title, title);
                }
                if let Some(subtitle) = subtitle {
                    tag(out, "p", &theme.entry_subtitle, subtitle);
                }
                if let Some(meta) = meta {
                    tag(out, "p", &theme.entry_meta, meta);
                }
                if let Some(body) = body {
                    tag(out, "p", &theme.body, body);
                }
                out.push_str("</div>");
            }
            Item::Chips { labels } => chips(out, theme, labels),
        }
    }
    out.push_str("</section>");
}

fn chips(out: &mut String, theme: &Theme, labels: &[String]) {
    let chip = &theme.chip;
    let _ = write!(
        out,
        r#"<ul class="chips" style="list-style:none;margin:0;padding:0;display:flex;flex-wrap:wrap;gap:{}pt">"#,
        chip.margin_pt * 2.0
    );
    let mut css = text_css(&chip.text);
    let _ = write!(
        css,
        "padding:{}pt {}pt;border-radius:3pt;",
        chip.padding_y_pt, chip.padding_x_pt
    );
    if let Some(bg) = chip.background {
        let _ = write!(css, "background:{};", bg.hex());
    }
    if let Some(border) = chip.border {
        let _ = write!(css, "border:1px solid {};", border.hex());
    }
    for label in labels {
        let _ = write!(out, r#"<li style="{css}">{}</li>"#, escape_html(label));
    }
    out.push_str("</ul>");
}

// ────────────────────────────────────────────────────────────────────────────
// CSS helpers
// ────────────────────────────────────────────────────────────────────────────

fn tag(out: &mut String, name: &str, style: &TextStyle, text: &str) {
    let _ = write!(
        out,
        r#"<{name} style="{}">{}</{name}>"#,
        text_css(style),
        escape_html(text)
    );
}

fn text_css(style: &TextStyle) -> String {
    let mut css = format!(
        "font-family:{};font-size:{}pt;font-weight:{};color:{};margin:0 0 {}pt 0;white-space:pre-line;",
        style.face.css_family(),
        style.size_pt,
        if style.face.is_bold() { "bold" } else { "normal" },
        style.color.hex(),
        style.gap_after_pt,
    );
    if style.uppercase {
        css.push_str("text-transform:uppercase;");
    }
    if style.letter_spacing_pt > 0.0 {
        let _ = write!(css, "letter-spacing:{}pt;", style.letter_spacing_pt);
    }
    css
}

fn hr_css(rule: &Rule) -> String {
    format!(
        "border:0;border-top:{}pt solid {};margin:{}pt 0",
        rule.thickness_pt,
        rule.color.hex(),
        rule.margin_pt
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateKind;
    use crate::layout::templates::{build_document, RenderOptions};
    use crate::models::resume::ResumeData;

    fn render(kind: TemplateKind, data: &ResumeData) -> String {
        render_document(&build_document(kind, data, &RenderOptions::default()))
    }

    #[test]
    fn test_user_text_is_escaped() {
        let data = ResumeData {
            name: Some("<script>alert(1)</script>".to_string()),
            summary: Some("R&D \"lead\"".to_string()),
            ..ResumeData::default()
        };
        let html = render(TemplateKind::Classic, &data);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("R&amp;D &quot;lead&quot;"));
    }

    #[test]
    fn test_modern_banner_and_chips() {
        let data = ResumeData {
            skills: Some(vec!["Rust".to_string(), "SQL".to_string()]),
            ..ResumeData::default()
        };
        let html = render(TemplateKind::Modern, &data);
        assert!(html.starts_with(r#"<div class="resume resume-modern""#));
        assert!(html.contains("background:#1a365d"));
        assert!(html.contains("text-align:center"));
        assert_eq!(html.matches("<li ").count(), 2);
        assert!(html.contains(">Rust</li>"));
        assert!(html.contains("text-transform:uppercase"));
    }

    #[test]
    fn test_minimalist_dividers_are_rules() {
        let html = render(TemplateKind::Minimalist, &ResumeData::default());
        assert_eq!(html.matches("<hr ").count(), 3);
        assert!(html.contains("Your Professional Title"));
    }

    #[test]
    fn test_classic_skills_paragraph_and_section_rule() {
        let html = render(TemplateKind::Classic, &ResumeData::default());
        assert!(html.contains("Patient Care, Database Management, Inventory Management, Medical Billing"));
        assert!(html.contains("border-bottom:1pt solid #dddddd"));
        assert!(!html.contains("<ul"));
        assert!(html.ends_with("</div>"));
    }
}
