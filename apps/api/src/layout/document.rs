use serde::Serialize;

use crate::catalog::TemplateKind;
use crate::layout::theme::Theme;

/// A laid-out resume, independent of the output format.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub kind: TemplateKind,
    pub theme: Theme,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    /// Name, title and contact rows. Drawn inside the banner when the theme has one.
    Header {
        name: String,
        title: Option<String>,
        contact_rows: Vec<Vec<String>>,
    },
    Divider,
    Section {
        heading: String,
        items: Vec<Item>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum Item {
    Paragraph {
        text: String,
    },
    Entry {
        title: String,
        subtitle: Option<String>,
        meta: Option<String>,
        body: Option<String>,
    },
    Chips {
        labels: Vec<String>,
    },
    /// A single line such as a certification.
    Line {
        text: String,
    },
}

#[cfg(test)]
impl Document {
    pub fn section(&self, heading: &str) -> Option<&[Item]> {
        self.blocks.iter().find_map(|b| match b {
            Block::Section { heading: h, items } if h == heading => Some(items.as_slice()),
            _ => None,
        })
    }

    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { heading, .. } => Some(heading.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every piece of text in reading order; used for plain-text checks.
    pub fn plain_text(&self) -> String {
        let mut out: Vec<&str> = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Header {
                    name,
                    title,
                    contact_rows,
                } => {
                    out.push(name);
                    if let Some(title) = title {
                        out.push(title);
                    }
                    for row in contact_rows {
                        out.extend(row.iter().map(String::as_str));
                    }
                }
                Block::Divider => {}
                Block::Section { heading, items } => {
                    out.push(heading);
                    for item in items {
                        match item {
                            Item::Paragraph { text } | Item::Line { text } => out.push(text),
                            Item::Entry {
                                title,
                                subtitle,
                                meta,
                                body,
                            } => {
                                out.push(title);
                                out.extend(
                                    [subtitle, meta, body]
                                        .into_iter()
                                        .flatten()
                                        .map(String::as_str),
                                );
                            }
                            Item::Chips { labels } => {
                                out.extend(labels.iter().map(String::as_str))
                            }
                        }
                    }
                }
            }
        }
        out.join("\n")
    }
}
