use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Resume content as the templates consume it.
///
/// Built from the nested value produced by `form::unflatten`. Every text
/// field is optional; blank strings are treated as missing so templates can
/// fall back to their sample text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    #[serde(deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub linkedin: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub summary: Option<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    /// `None` when the user gave no skills at all.
    #[serde(deserialize_with = "skill_list")]
    pub skills: Option<Vec<String>>,
    #[serde(deserialize_with = "non_empty_list")]
    pub certifications: Option<Vec<Certification>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(deserialize_with = "blank_as_none")]
    pub job_title: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "blank_as_none")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub university: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    #[serde(deserialize_with = "blank_as_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub issuer: Option<String>,
}

impl ResumeData {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Entry count of every repeated section, in form order.
    pub fn entry_counts(&self) -> [(&'static str, usize); 4] {
        [
            ("experience", self.experience.len()),
            ("education", self.education.len()),
            ("skills", self.skills.as_ref().map_or(0, Vec::len)),
            ("certifications", self.certifications.as_ref().map_or(0, Vec::len)),
        ]
    }

    /// Name for the downloaded file: `ada-lovelace`, or `resume` when unnamed.
    pub fn file_stem(&self) -> String {
        let slug: String = self
            .name
            .as_deref()
            .unwrap_or_default()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            "resume".to_string()
        } else {
            slug
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkillInput {
    List(Vec<String>),
    Text(String),
}

/// Accepts `["Rust", "Go"]` or a single comma-separated `"Rust, Go"`.
fn skill_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<SkillInput>::deserialize(deserializer)?;
    let items: Vec<String> = match raw {
        None => return Ok(None),
        Some(SkillInput::List(items)) => items,
        Some(SkillInput::Text(text)) => text.split(',').map(str::to_string).collect(),
    };
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Ok((!items.is_empty()).then_some(items))
}

fn non_empty_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(raw.filter(|items| !items.is_empty()))
}
