//! The three resume templates: resume data → `Document`.
//!
//! Each template carries its own sample text. With placeholders on, a missing
//! field prints the sample; with placeholders off it is left out, and entries
//! or sections with nothing left are dropped.

use crate::catalog::TemplateKind;
use crate::layout::document::{Block, Document, Item};
use crate::layout::theme::Theme;
use crate::models::resume::{Certification, Education, Experience, ResumeData};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub placeholders: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { placeholders: true }
    }
}

pub fn build_document(kind: TemplateKind, data: &ResumeData, options: &RenderOptions) -> Document {
    let filler = Filler {
        placeholders: options.placeholders,
    };
    let blocks = match kind {
        TemplateKind::Classic => classic(data, &filler),
        TemplateKind::Modern => modern(data, &filler),
        TemplateKind::Minimalist => minimalist(data, &filler),
    };
    Document {
        kind,
        theme: Theme::for_template(kind),
        blocks,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field filling
// ────────────────────────────────────────────────────────────────────────────

struct Filler {
    placeholders: bool,
}

impl Filler {
    fn text(&self, value: &Option<String>, sample: &str) -> Option<String> {
        match value {
            Some(v) => Some(v.clone()),
            None if self.placeholders => Some(sample.to_string()),
            None => None,
        }
    }

    /// Joins the parts that are present with `sep`.
    fn join(&self, parts: &[Option<String>], sep: &str) -> Option<String> {
        let present: Vec<&str> = parts.iter().flatten().map(String::as_str).collect();
        (!present.is_empty()).then(|| present.join(sep))
    }

    /// Header contacts, in the order given.
    fn contacts(&self, fields: &[(&Option<String>, &str)]) -> Vec<String> {
        fields
            .iter()
            .filter_map(|(value, sample)| self.text(value, sample))
            .collect()
    }

    /// The entries to lay out: the user's, or one sample entry when there are none.
    fn entries<T: Default + Clone>(&self, items: &[T]) -> Vec<T> {
        if items.is_empty() && self.placeholders {
            vec![T::default()]
        } else {
            items.to_vec()
        }
    }

    fn skills(&self, data: &ResumeData, samples: &[&str]) -> Option<Vec<String>> {
        match &data.skills {
            Some(skills) => Some(skills.clone()),
            None if self.placeholders => Some(samples.iter().map(|s| s.to_string()).collect()),
            None => None,
        }
    }
}

fn entry_item(
    title: Option<String>,
    subtitle: Option<String>,
    meta: Option<String>,
    body: Option<String>,
) -> Option<Item> {
    if title.is_none() && subtitle.is_none() && meta.is_none() && body.is_none() {
        return None;
    }
    Some(Item::Entry {
        title: title.unwrap_or_default(),
        subtitle,
        meta,
        body,
    })
}

fn section(heading: &str, items: Vec<Item>, blocks: &mut Vec<Block>) {
    if !items.is_empty() {
        blocks.push(Block::Section {
            heading: heading.to_string(),
            items,
        });
    }
}

/// Dividers never stack up when the sections between them were dropped.
fn divider(blocks: &mut Vec<Block>) {
    if !matches!(blocks.last(), Some(Block::Divider)) {
        blocks.push(Block::Divider);
    }
}

fn summary(data: &ResumeData, heading: &str, blocks: &mut Vec<Block>) {
    if let Some(text) = &data.summary {
        section(
            heading,
            vec![Item::Paragraph { text: text.clone() }],
            blocks,
        );
    }
}

fn certifications(
    data: &ResumeData,
    f: &Filler,
    line: impl Fn(String, String) -> String,
    blocks: &mut Vec<Block>,
) {
    let Some(certs) = &data.certifications else {
        return;
    };
    let items = certs
        .iter()
        .enumerate()
        .filter_map(|(i, cert): (usize, &Certification)| {
            let title = f.text(&cert.title, &format!("Certification {}", i + 1));
            let issuer = f.text(&cert.issuer, "Issuing Organization");
            match (title, issuer) {
                (Some(t), Some(s)) => Some(line(t, s)),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            }
        })
        .map(|text| Item::Line { text })
        .collect();
    section("Certifications", items, blocks);
}

// ────────────────────────────────────────────────────────────────────────────
// Classic
// ────────────────────────────────────────────────────────────────────────────

fn classic(data: &ResumeData, f: &Filler) -> Vec<Block> {
    let mut blocks = vec![Block::Header {
        name: f.text(&data.name, "Anna Taylor").unwrap_or_default(),
        title: f.text(&data.title, "Certified Medical Assistant"),
        contact_rows: vec![f.contacts(&[
            (&data.email, "email@example.com"),
            (&data.phone, "123-456-7890"),
            (&data.location, "City, State"),
            (&data.linkedin, "linkedin.com/in/username"),
        ])],
    }];

    summary(data, "Professional Summary", &mut blocks);

    let jobs = f
        .entries(&data.experience)
        .iter()
        .filter_map(|job: &Experience| {
            entry_item(
                f.text(&job.job_title, "Medical Assistant"),
                f.join(
                    &[
                        f.text(&job.company_name, "First Choice Health Institute"),
                        f.text(&job.location, "Houston, TX"),
                    ],
                    " - ",
                ),
                f.join(
                    &[
                        f.text(&job.start_date, "08/2018"),
                        f.text(&job.end_date, "Present"),
                    ],
                    " - ",
                ),
                f.text(&job.description, "Job responsibilities and achievements"),
            )
        })
        .collect();
    section("Work Experience", jobs, &mut blocks);

    let schools = f
        .entries(&data.education)
        .iter()
        .filter_map(|edu: &Education| {
            entry_item(
                f.text(&edu.degree, "Bachelor of Science in Healthcare Management"),
                f.text(&edu.university, "University of Houston"),
                f.text(&edu.year, "2005 - 2008"),
                None,
            )
        })
        .collect();
    section("Education", schools, &mut blocks);

    let skills = f
        .skills(
            data,
            &[
                "Patient Care",
                "Database Management",
                "Inventory Management",
                "Medical Billing",
            ],
        )
        .map(|s| vec![Item::Paragraph { text: s.join(", ") }])
        .unwrap_or_default();
    section("Skills", skills, &mut blocks);

    certifications(data, f, |t, s| format!("{t} - {s}"), &mut blocks);
    blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Modern
// ────────────────────────────────────────────────────────────────────────────

fn modern(data: &ResumeData, f: &Filler) -> Vec<Block> {
    let rows = [
        f.contacts(&[
            (&data.phone, "123-456-7890"),
            (&data.email, "email@example.com"),
        ]),
        f.contacts(&[
            (&data.location, "City, State"),
            (&data.linkedin, "linkedin.com/in/username"),
        ]),
    ];
    let mut blocks = vec![Block::Header {
        name: f.text(&data.name, "EMMA WATSON").unwrap_or_default(),
        title: f.text(&data.title, "YOUR PROFESSIONAL TITLE"),
        contact_rows: rows.into_iter().filter(|r| !r.is_empty()).collect(),
    }];

    summary(data, "Profile", &mut blocks);

    let jobs = f
        .entries(&data.experience)
        .iter()
        .filter_map(|job: &Experience| {
            let dates = f.join(
                &[
                    f.text(&job.start_date, "Start Date"),
                    f.text(&job.end_date, "End Date"),
                ],
                " - ",
            );
            entry_item(
                f.text(&job.job_title, "JOB TITLE"),
                f.join(
                    &[
                        f.text(&job.company_name, "Company Name"),
                        f.text(&job.location, "City, State"),
                        dates,
                    ],
                    " | ",
                ),
                None,
                f.text(
                    &job.description,
                    "Job description with responsibilities and achievements",
                ),
            )
        })
        .collect();
    section("Professional Experience", jobs, &mut blocks);

    let schools = f
        .entries(&data.education)
        .iter()
        .filter_map(|edu: &Education| {
            entry_item(
                f.text(&edu.degree, "DEGREE NAME / MAJOR"),
                f.join(
                    &[
                        f.text(&edu.university, "University Name"),
                        f.text(&edu.year, "2010-2014"),
                    ],
                    " | ",
                ),
                None,
                None,
            )
        })
        .collect();
    section("Education", schools, &mut blocks);

    let skills = f
        .skills(data, &["Relevant Skill", "Relevant Skill", "Relevant Skill"])
        .map(|labels| vec![Item::Chips { labels }])
        .unwrap_or_default();
    section("Skills", skills, &mut blocks);

    certifications(data, f, |t, s| format!("• {t} - {s}"), &mut blocks);
    blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Minimalist
// ────────────────────────────────────────────────────────────────────────────

fn minimalist(data: &ResumeData, f: &Filler) -> Vec<Block> {
    let mut blocks = vec![
        Block::Header {
            name: f.text(&data.name, "Your Name").unwrap_or_default(),
            title: f.text(&data.title, "Your Professional Title"),
            contact_rows: vec![f.contacts(&[
                (&data.email, "email@example.com"),
                (&data.phone, "123-456-7890"),
                (&data.location, "City, State"),
                (&data.linkedin, "linkedin.com/in/username"),
            ])],
        },
        Block::Divider,
    ];

    summary(data, "Profile", &mut blocks);

    let jobs = f
        .entries(&data.experience)
        .iter()
        .filter_map(|job: &Experience| {
            let dates = f.join(
                &[
                    f.text(&job.start_date, "Start Date"),
                    f.text(&job.end_date, "End Date"),
                ],
                " - ",
            );
            entry_item(
                f.join(
                    &[
                        f.text(&job.job_title, "Position Title"),
                        f.text(&job.company_name, "Company Name"),
                    ],
                    " • ",
                ),
                None,
                f.join(&[dates, f.text(&job.location, "Location")], " | "),
                f.text(&job.description, "Job description"),
            )
        })
        .collect();
    section("Experience", jobs, &mut blocks);
    divider(&mut blocks);

    let schools = f
        .entries(&data.education)
        .iter()
        .filter_map(|edu: &Education| {
            entry_item(
                f.join(
                    &[
                        f.text(&edu.degree, "Degree"),
                        f.text(&edu.university, "University"),
                    ],
                    " • ",
                ),
                None,
                f.text(&edu.year, "Graduation Year"),
                None,
            )
        })
        .collect();
    section("Education", schools, &mut blocks);
    divider(&mut blocks);

    let skills = f
        .skills(data, &["Skill 1", "Skill 2", "Skill 3", "Skill 4"])
        .map(|labels| vec![Item::Chips { labels }])
        .unwrap_or_default();
    section("Skills", skills, &mut blocks);

    certifications(data, f, |t, s| format!("• {t} • {s}"), &mut blocks);

    // No trailing divider when the sections after it were dropped.
    while matches!(blocks.last(), Some(Block::Divider)) {
        blocks.pop();
    }
    blocks
}
