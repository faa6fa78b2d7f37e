//! `Document` → A4 PDF through `printpdf`.
//!
//! Layout is a single top-down cursor: every block measures its lines with the
//! AFM tables in `layout::font_metrics`, breaks to a new page when the next
//! line would cross the bottom margin, and draws with the base-14 fonts. The
//! base-14 fonts only cover WinAnsi, so text is mapped to Latin-1 first.
//!
//! CPU-bound: call from async code through `render_pdf_blocking`.

use std::collections::HashMap;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Pt, Rect,
};
use tracing::debug;

use crate::layout::document::{Block, Document, Item};
use crate::layout::font_metrics::{get_metrics, FontFace};
use crate::layout::theme::{Align, Rgb, Rule, TextStyle, Theme, A4_HEIGHT_PT, A4_WIDTH_PT};
use crate::render::RenderError;

const LAYER: &str = "Layer 1";

/// Share of the font size above the baseline, for placing the first line.
const ASCENT: f32 = 0.8;

pub fn render_pdf(doc: &Document) -> Result<Vec<u8>, RenderError> {
    render_pages(doc).map(|(bytes, _)| bytes)
}

/// Runs `render_pdf` on the blocking pool.
pub async fn render_pdf_blocking(doc: Document) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || render_pdf(&doc)).await?
}

/// PDF bytes and the number of pages used.
fn render_pages(doc: &Document) -> Result<(Vec<u8>, usize), RenderError> {
    let title = format!("Resume ({})", doc.kind.name());
    let (pdf, page, layer) =
        PdfDocument::new(title, mm(A4_WIDTH_PT), mm(A4_HEIGHT_PT), LAYER);

    let mut fonts = HashMap::new();
    for face in [
        FontFace::Helvetica,
        FontFace::HelveticaBold,
        FontFace::TimesRoman,
        FontFace::TimesBold,
    ] {
        let font = pdf.add_builtin_font(builtin(face)).map_err(pdf_error)?;
        fonts.insert(face, font);
    }

    let layer = pdf.get_page(page).get_layer(layer);
    let mut writer = PageWriter {
        theme: &doc.theme,
        y: doc.theme.page_padding_pt,
        pages: 1,
        pdf,
        layer,
        fonts,
    };

    for block in &doc.blocks {
        match block {
            Block::Header {
                name,
                title,
                contact_rows,
            } => writer.header(name, title.as_deref(), contact_rows),
            Block::Divider => {
                if let Some(rule) = doc.theme.divider {
                    writer.rule(&rule);
                }
            }
            Block::Section { heading, items } => writer.section(heading, items),
        }
    }

    let pages = writer.pages;
    debug!(template = %doc.kind, pages, "PDF laid out");
    let bytes = writer.pdf.save_to_bytes().map_err(pdf_error)?;
    Ok((bytes, pages))
}

fn pdf_error(e: printpdf::Error) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

fn mm(pt: f32) -> Mm {
    Mm::from(Pt(pt))
}

fn builtin(face: FontFace) -> BuiltinFont {
    match face {
        FontFace::Helvetica => BuiltinFont::Helvetica,
        FontFace::HelveticaBold => BuiltinFont::HelveticaBold,
        FontFace::TimesRoman => BuiltinFont::TimesRoman,
        FontFace::TimesBold => BuiltinFont::TimesBold,
    }
}

fn color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

/// Maps text onto what the WinAnsi-encoded base-14 fonts can show.
pub fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2022}' | '\u{25CF}' => '\u{00B7}',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\t' => ' ',
            c if c == '\n' || (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c,
            _ => '?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor layout
// ────────────────────────────────────────────────────────────────────────────

struct PageWriter<'a> {
    theme: &'a Theme,
    /// Distance from the top edge of the current page, in points.
    y: f32,
    pages: usize,
    pdf: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: HashMap<FontFace, IndirectFontRef>,
}

impl PageWriter<'_> {
    fn left(&self) -> f32 {
        self.theme.page_padding_pt
    }

    fn width(&self) -> f32 {
        self.theme.content_width_pt()
    }

    fn bottom(&self) -> f32 {
        A4_HEIGHT_PT - self.theme.page_padding_pt
    }

    /// Starts a new page unless `height` more points fit on this one.
    fn reserve(&mut self, height: f32) {
        if self.y + height <= self.bottom() || self.y <= self.theme.page_padding_pt {
            return;
        }
        let (page, layer) = self
            .pdf
            .add_page(mm(A4_WIDTH_PT), mm(A4_HEIGHT_PT), LAYER);
        self.layer = self.pdf.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = self.theme.page_padding_pt;
    }

    /// Filled rectangle with its top-left corner at (`x`, `top`) in page-top coordinates.
    fn fill_rect(&self, x: f32, top: f32, w: f32, h: f32, rgb: Rgb, mode: PaintMode) {
        match mode {
            PaintMode::Stroke => {
                self.layer.set_outline_color(color(rgb));
                self.layer.set_outline_thickness(0.75);
            }
            _ => self.layer.set_fill_color(color(rgb)),
        }
        let rect = Rect::new(
            mm(x),
            mm(A4_HEIGHT_PT - (top + h)),
            mm(x + w),
            mm(A4_HEIGHT_PT - top),
        )
        .with_mode(mode);
        self.layer.add_rect(rect);
    }

    /// One line of text whose line box starts at `self.y`. Does not advance.
    fn draw_line(&self, text: &str, style: &TextStyle, x: f32) {
        let Some(font) = self.fonts.get(&style.face) else {
            return;
        };
        self.layer.set_fill_color(color(style.color));
        let baseline = self.y + style.size_pt * ASCENT + (style.line_height_pt() - style.size_pt) / 2.0;
        self.layer.use_text(
            text,
            style.size_pt,
            mm(x),
            mm(A4_HEIGHT_PT - baseline),
            font,
        );
    }

    /// Wrapped text block, followed by the style's gap.
    fn text(&mut self, text: &str, style: &TextStyle, align: Align) {
        let text = latin1(&style.apply_case(text));
        let metrics = get_metrics(style.face);
        let width = self.width();
        for line in metrics.wrap_lines(&text, style.size_pt, width) {
            self.reserve(style.line_height_pt());
            let x = match align {
                Align::Left => self.left(),
                Align::Center => {
                    self.left() + (width - metrics.width_pt(&line, style.size_pt)).max(0.0) / 2.0
                }
            };
            self.draw_line(&line, style, x);
            self.y += style.line_height_pt();
        }
        self.y += style.gap_after_pt;
    }

    fn rule(&mut self, rule: &Rule) {
        self.reserve(rule.margin_pt * 2.0 + rule.thickness_pt);
        self.y += rule.margin_pt;
        self.fill_rect(
            self.left(),
            self.y,
            self.width(),
            rule.thickness_pt,
            rule.color,
            PaintMode::Fill,
        );
        self.y += rule.thickness_pt + rule.margin_pt;
    }

    // ── Blocks ───────────────────────────────────────────────────────────────

    fn header(&mut self, name: &str, title: Option<&str>, rows: &[Vec<String>]) {
        let theme = self.theme;
        let align = theme.header_align;

        if let Some(banner) = theme.banner {
            let height = banner.padding_pt * 2.0 + self.header_height(name, title, rows);
            self.reserve(height);
            self.fill_rect(
                self.left(),
                self.y,
                self.width(),
                height,
                banner.background,
                PaintMode::Fill,
            );
            self.y += banner.padding_pt;
        }

        if !name.is_empty() {
            self.text(name, &theme.name, align);
        }
        if let Some(title) = title {
            self.text(title, &theme.title, align);
        }
        for row in rows {
            self.contact_row(row);
        }

        if let Some(banner) = theme.banner {
            self.y += banner.padding_pt;
        }
        self.y += theme.section_gap_pt;
    }

    fn header_height(&self, name: &str, title: Option<&str>, rows: &[Vec<String>]) -> f32 {
        let theme = self.theme;
        let block = |text: &str, style: &TextStyle| {
            let lines = get_metrics(style.face)
                .wrap_lines(&latin1(&style.apply_case(text)), style.size_pt, self.width())
                .len();
            lines as f32 * style.line_height_pt() + style.gap_after_pt
        };
        let mut height = 0.0;
        if !name.is_empty() {
            height += block(name, &theme.name);
        }
        if let Some(title) = title {
            height += block(title, &theme.title);
        }
        for row in rows {
            height += self.row_lines(row).len() as f32 * theme.contact.line_height_pt()
                + theme.contact.gap_after_pt;
        }
        height
    }

    /// Splits a contact row into lines that fit the content width.
    fn row_lines(&self, row: &[String]) -> Vec<Vec<String>> {
        let style = &self.theme.contact;
        let metrics = get_metrics(style.face);
        let gap = self.theme.contact_gap_pt;
        let mut lines: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut used = 0.0;
        for item in row {
            let item = latin1(item);
            let w = metrics.width_pt(&item, style.size_pt);
            let needed = if current.is_empty() { w } else { used + gap + w };
            if !current.is_empty() && needed > self.width() {
                lines.push(std::mem::take(&mut current));
                used = w;
            } else {
                used = needed;
            }
            current.push(item);
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn contact_row(&mut self, row: &[String]) {
        let style = self.theme.contact;
        let metrics = get_metrics(style.face);
        let gap = self.theme.contact_gap_pt;
        for line in self.row_lines(row) {
            self.reserve(style.line_height_pt());
            let widths: Vec<f32> = line
                .iter()
                .map(|item| metrics.width_pt(item, style.size_pt))
                .collect();
            let total = widths.iter().sum::<f32>() + gap * (widths.len().saturating_sub(1)) as f32;
            let mut x = match self.theme.header_align {
                Align::Left => self.left(),
                Align::Center => self.left() + (self.width() - total).max(0.0) / 2.0,
            };
            for (item, w) in line.iter().zip(widths) {
                self.draw_line(item, &style, x);
                x += w + gap;
            }
            self.y += style.line_height_pt();
        }
        self.y += style.gap_after_pt;
    }

    fn section(&mut self, heading: &str, items: &[Item]) {
        let theme = self.theme;
        // Keep a heading together with at least the first line of its content.
        self.reserve(theme.heading.line_height_pt() + theme.body.line_height_pt() * 2.0);
        self.text(heading, &theme.heading, Align::Left);
        if let Some(rule) = theme.heading_rule {
            self.fill_rect(
                self.left(),
                self.y,
                self.width(),
                rule.thickness_pt,
                rule.color,
                PaintMode::Fill,
            );
            self.y += rule.thickness_pt + rule.margin_pt;
        }

        for item in items {
            match item {
                Item::Paragraph { text } | Item::Line { text } => {
                    self.text(text, &theme.body, Align::Left)
                }
                Item::Entry {
                    title,
                    subtitle,
                    meta,
                    body,
                } => {
                    if !title.is_empty() {
                        self.text(title, &theme.entry_title, Align::Left);
                    }
                    if let Some(subtitle) = subtitle {
                        self.text(subtitle, &theme.entry_subtitle, Align::Left);
                    }
                    if let Some(meta) = meta {
                        self.text(meta, &theme.entry_meta, Align::Left);
                    }
                    if let Some(body) = body {
                        self.text(body, &theme.body, Align::Left);
                    }
                    self.y += theme.entry_gap_pt;
                }
                Item::Chips { labels } => self.chips(labels),
            }
        }

        if let Some(rule) = theme.section_rule {
            self.y += rule.margin_pt;
            self.fill_rect(
                self.left(),
                self.y,
                self.width(),
                rule.thickness_pt,
                rule.color,
                PaintMode::Fill,
            );
            self.y += rule.thickness_pt;
        }
        self.y += theme.section_gap_pt;
    }

    /// Skill chips, flowed left to right and wrapped at the content width.
    fn chips(&mut self, labels: &[String]) {
        let chip = self.theme.chip;
        let style = chip.text;
        let metrics = get_metrics(style.face);
        let height = style.line_height_pt() + chip.padding_y_pt * 2.0;
        let step = chip.margin_pt * 2.0;
        // Chips without a box read as a plain list.
        let boxed = chip.background.is_some() || chip.border.is_some();
        let separator = if boxed { "" } else { ", " };

        let mut x = self.left();
        self.reserve(height);
        for (i, label) in labels.iter().enumerate() {
            let mut label = latin1(&style.apply_case(label));
            if i + 1 < labels.len() {
                label.push_str(separator);
            }
            let text_w = metrics.width_pt(&label, style.size_pt).min(self.width());
            let w = text_w + chip.padding_x_pt * 2.0;
            if x > self.left() && x + w > self.left() + self.width() {
                self.y += height + step;
                self.reserve(height);
                x = self.left();
            }
            if let Some(bg) = chip.background {
                self.fill_rect(x, self.y, w, height, bg, PaintMode::Fill);
            }
            if let Some(border) = chip.border {
                self.fill_rect(x, self.y, w, height, border, PaintMode::Stroke);
            }
            let saved = self.y;
            self.y += chip.padding_y_pt;
            self.draw_line(&label, &style, x + chip.padding_x_pt);
            self.y = saved;
            x += w + step;
        }
        self.y += height + style.gap_after_pt + step;
    }
}
