//! Visual parameters for each template, shared by the HTML and PDF renderers.
//! Sizes are points; page geometry is A4.

use serde::Serialize;

use crate::catalog::TemplateKind;
use crate::layout::font_metrics::FontFace;

pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Components in 0.0 to 1.0, as PDF colour operators expect.
    pub fn unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
    pub uppercase: bool,
    /// Extra space between letters, HTML preview only.
    pub letter_spacing_pt: f32,
    /// Space below the line block.
    pub gap_after_pt: f32,
}

impl TextStyle {
    fn new(face: FontFace, size_pt: f32, color: Rgb) -> Self {
        TextStyle {
            face,
            size_pt,
            color,
            uppercase: false,
            letter_spacing_pt: 0.0,
            gap_after_pt: 0.0,
        }
    }

    fn bold(mut self) -> Self {
        self.face = self.face.bold();
        self
    }

    fn upper(mut self) -> Self {
        self.uppercase = true;
        self
    }

    fn spaced(mut self, pt: f32) -> Self {
        self.letter_spacing_pt = pt;
        self
    }

    fn gap(mut self, pt: f32) -> Self {
        self.gap_after_pt = pt;
        self
    }

    /// Line height used for wrapping and vertical advance.
    pub fn line_height_pt(&self) -> f32 {
        self.size_pt * 1.3
    }

    pub fn apply_case(&self, text: &str) -> String {
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub color: Rgb,
    pub thickness_pt: f32,
    /// Space between the rule and the content it separates.
    pub margin_pt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Banner {
    pub background: Rgb,
    pub padding_pt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChipStyle {
    pub text: TextStyle,
    pub background: Option<Rgb>,
    pub border: Option<Rgb>,
    pub padding_x_pt: f32,
    pub padding_y_pt: f32,
    pub margin_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub page_padding_pt: f32,
    pub text_color: Rgb,
    pub header_align: Align,
    pub banner: Option<Banner>,
    pub name: TextStyle,
    pub title: TextStyle,
    pub contact: TextStyle,
    pub contact_gap_pt: f32,
    pub heading: TextStyle,
    /// Rule drawn under each section heading.
    pub heading_rule: Option<Rule>,
    /// Rule drawn under each whole section.
    pub section_rule: Option<Rule>,
    /// Rule used by `Block::Divider`.
    pub divider: Option<Rule>,
    pub section_gap_pt: f32,
    pub entry_title: TextStyle,
    pub entry_subtitle: TextStyle,
    pub entry_meta: TextStyle,
    pub entry_gap_pt: f32,
    pub body: TextStyle,
    pub chip: ChipStyle,
}

impl Theme {
    pub fn for_template(kind: TemplateKind) -> Theme {
        match kind {
            TemplateKind::Classic => classic(),
            TemplateKind::Modern => modern(),
            TemplateKind::Minimalist => minimalist(),
        }
    }

    pub fn content_width_pt(&self) -> f32 {
        A4_WIDTH_PT - 2.0 * self.page_padding_pt
    }
}

fn classic() -> Theme {
    let ink = Rgb(0x33, 0x33, 0x33);
    let muted = Rgb(0x55, 0x55, 0x55);
    let face = FontFace::TimesRoman;
    let body = TextStyle::new(face, 10.0, ink).gap(3.0);

    Theme {
        page_padding_pt: 30.0,
        text_color: ink,
        header_align: Align::Left,
        banner: None,
        name: TextStyle::new(face, 26.0, ink).bold().gap(5.0),
        title: TextStyle::new(face, 14.0, muted).gap(15.0),
        contact: TextStyle::new(face, 10.0, ink).gap(15.0),
        contact_gap_pt: 15.0,
        heading: TextStyle::new(face, 14.0, ink).bold().upper().gap(5.0),
        heading_rule: None,
        section_rule: Some(Rule {
            color: Rgb(0xdd, 0xdd, 0xdd),
            thickness_pt: 1.0,
            margin_pt: 10.0,
        }),
        divider: None,
        section_gap_pt: 15.0,
        entry_title: TextStyle::new(face, 12.0, ink).bold(),
        entry_subtitle: TextStyle::new(face, 11.0, ink).bold(),
        entry_meta: TextStyle::new(face, 10.0, muted),
        entry_gap_pt: 10.0,
        body,
        chip: ChipStyle {
            text: body,
            background: None,
            border: None,
            padding_x_pt: 0.0,
            padding_y_pt: 0.0,
            margin_pt: 0.0,
        },
    }
}

fn modern() -> Theme {
    let navy = Rgb(0x1a, 0x36, 0x5d);
    let pale = Rgb(0xe2, 0xe8, 0xf0);
    let gold = Rgb(0xec, 0xc9, 0x4b);
    let grey = Rgb(0x71, 0x80, 0x96);
    let face = FontFace::Helvetica;

    Theme {
        page_padding_pt: 30.0,
        text_color: Rgb::BLACK,
        header_align: Align::Center,
        banner: Some(Banner {
            background: navy,
            padding_pt: 30.0,
        }),
        name: TextStyle::new(face, 28.0, gold).bold().spaced(2.0).gap(5.0),
        title: TextStyle::new(face, 14.0, pale).spaced(1.0),
        contact: TextStyle::new(face, 10.0, pale),
        contact_gap_pt: 20.0,
        heading: TextStyle::new(face, 14.0, navy).bold().upper().gap(3.0),
        heading_rule: Some(Rule {
            color: Rgb(0xcb, 0xd5, 0xe0),
            thickness_pt: 1.0,
            margin_pt: 10.0,
        }),
        section_rule: None,
        divider: None,
        section_gap_pt: 20.0,
        entry_title: TextStyle::new(face, 12.0, Rgb::BLACK).bold(),
        entry_subtitle: TextStyle::new(face, 11.0, Rgb::BLACK),
        entry_meta: TextStyle::new(face, 10.0, grey),
        entry_gap_pt: 10.0,
        body: TextStyle::new(face, 10.0, Rgb::BLACK).gap(3.0),
        chip: ChipStyle {
            text: TextStyle::new(face, 9.0, Rgb::BLACK),
            background: Some(Rgb(0xed, 0xf2, 0xf7)),
            border: None,
            padding_x_pt: 6.0,
            padding_y_pt: 3.0,
            margin_pt: 3.0,
        },
    }
}

fn minimalist() -> Theme {
    let ink = Rgb(0x2d, 0x37, 0x48);
    let grey = Rgb(0x71, 0x80, 0x96);
    let line = Rgb(0xe2, 0xe8, 0xf0);
    let face = FontFace::Helvetica;

    Theme {
        page_padding_pt: 40.0,
        text_color: ink,
        header_align: Align::Left,
        banner: None,
        name: TextStyle::new(face, 24.0, ink).bold().gap(5.0),
        title: TextStyle::new(face, 14.0, grey).gap(20.0),
        contact: TextStyle::new(face, 10.0, Rgb(0x4a, 0x55, 0x68)).gap(15.0),
        contact_gap_pt: 15.0,
        heading: TextStyle::new(face, 12.0, ink).bold().upper().spaced(1.0).gap(10.0),
        heading_rule: None,
        section_rule: None,
        divider: Some(Rule {
            color: line,
            thickness_pt: 1.0,
            margin_pt: 15.0,
        }),
        section_gap_pt: 15.0,
        entry_title: TextStyle::new(face, 11.0, ink).bold(),
        entry_subtitle: TextStyle::new(face, 10.0, ink),
        entry_meta: TextStyle::new(face, 9.0, grey),
        entry_gap_pt: 10.0,
        body: TextStyle::new(face, 10.0, ink).gap(3.0),
        chip: ChipStyle {
            text: TextStyle::new(face, 9.0, ink),
            background: None,
            border: Some(line),
            padding_x_pt: 5.0,
            padding_y_pt: 2.0,
            margin_pt: 2.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_and_unit() {
        let navy = Rgb(0x1a, 0x36, 0x5d);
        assert_eq!(navy.hex(), "#1a365d");
        let (r, _, b) = Rgb(255, 0, 51).unit();
        assert!((r - 1.0).abs() < 1e-6);
        assert!((b - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_classic_is_serif_with_section_rules() {
        let theme = Theme::for_template(TemplateKind::Classic);
        assert_eq!(theme.body.face, FontFace::TimesRoman);
        assert_eq!(theme.name.face, FontFace::TimesBold);
        assert!(theme.section_rule.is_some());
        assert!(theme.banner.is_none());
    }

    #[test]
    fn test_modern_has_centered_banner_and_chips() {
        let theme = Theme::for_template(TemplateKind::Modern);
        assert_eq!(theme.header_align, Align::Center);
        assert_eq!(theme.banner.unwrap().background.hex(), "#1a365d");
        assert_eq!(theme.name.color.hex(), "#ecc94b");
        assert!(theme.chip.background.is_some());
    }

    #[test]
    fn test_minimalist_has_wider_margins_and_dividers() {
        let theme = Theme::for_template(TemplateKind::Minimalist);
        assert_eq!(theme.page_padding_pt, 40.0);
        assert!(theme.divider.is_some());
        assert!(theme.chip.border.is_some());
        assert!(theme.content_width_pt() < Theme::for_template(TemplateKind::Classic).content_width_pt());
    }

    #[test]
    fn test_uppercase_headings() {
        let theme = Theme::for_template(TemplateKind::Modern);
        assert_eq!(theme.heading.apply_case("Skills"), "SKILLS");
        assert_eq!(theme.body.apply_case("Skills"), "Skills");
    }
}
