//! Topic entity and the draft used to create or update it.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::section::{Section, UnknownSection};

/// Author recorded when a draft does not name one
pub const DEFAULT_AUTHOR: &str = "Instructor";

/// A stored educational topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Positive number, unique within its section; also the file name key
    pub topic_number: u32,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Markdown content without frontmatter
    #[serde(default)]
    pub body: String,

    pub date: NaiveDate,

    pub author: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub section: Section,

    /// In-section sort priority
    pub order: i64,

    /// Content-version token of the stored document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Topic {
    /// Sort key within a section: `order`, then topic number
    pub fn sort_key(&self) -> (i64, u32) {
        (self.order, self.topic_number)
    }

    /// Turn a stored topic back into an editable draft
    pub fn to_draft(&self) -> TopicDraft {
        TopicDraft {
            topic_number: i64::from(self.topic_number),
            title: self.title.clone(),
            description: self.description.clone(),
            body: self.body.clone(),
            date: Some(self.date),
            author: Some(self.author.clone()),
            keywords: self.keywords.clone(),
            section: self.section.id().to_string(),
            order: Some(self.order),
            version: self.version.clone(),
        }
    }
}

/// Reasons a draft is rejected before any storage call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Topic number must be a positive integer, got {0}")]
    InvalidTopicNumber(i64),

    #[error("Topic title is required")]
    MissingTitle,

    #[error("Unknown section: '{0}' (expected fires, emergency, education or protection)")]
    UnknownSection(String),
}

impl From<UnknownSection> for ValidationError {
    fn from(e: UnknownSection) -> Self {
        ValidationError::UnknownSection(e.0)
    }
}

/// Input for saving a topic.
///
/// Fields that come straight from user input stay loosely typed so that
/// `validate` can report precisely what is wrong with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDraft {
    #[serde(default)]
    pub topic_number: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "content")]
    pub body: String,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub author: Option<String>,

    /// Accepts a list or a comma-separated string
    #[serde(default, deserialize_with = "deserialize_keywords")]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub section: String,

    #[serde(default)]
    pub order: Option<i64>,

    /// Version token the editor last saw; used as the write precondition
    #[serde(default)]
    pub version: Option<String>,
}

impl TopicDraft {
    /// Check the draft invariants; no I/O happens here
    pub fn validate(&self) -> Result<(u32, Section), ValidationError> {
        let topic_number = u32::try_from(self.topic_number)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ValidationError::InvalidTopicNumber(self.topic_number))?;

        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        let section = self.section.parse::<Section>()?;

        Ok((topic_number, section))
    }

    /// Validate and fill in defaults, producing an unsaved topic
    pub fn into_topic(self, today: NaiveDate) -> Result<Topic, ValidationError> {
        let (topic_number, section) = self.validate()?;
        let title = self.title.trim().to_string();

        let body = if self.body.trim().is_empty() {
            format!("# {}\n\nStart writing the topic content here...", title)
        } else {
            self.body.trim_end().to_string()
        };

        let author = self
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Ok(Topic {
            topic_number,
            title,
            description: self.description,
            body,
            date: self.date.unwrap_or(today),
            author,
            keywords: normalize_keywords(self.keywords),
            section,
            order: self.order.unwrap_or(i64::from(topic_number)),
            version: self.version,
        })
    }
}

/// Split a comma-separated keyword string into trimmed, non-empty entries
pub fn split_keywords(raw: &str) -> Vec<String> {
    normalize_keywords(raw.split(','))
}

/// Trim keywords and drop empty ones, keeping order
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn deserialize_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Keywords>::deserialize(deserializer)? {
        Some(Keywords::List(list)) => normalize_keywords(list),
        Some(Keywords::Text(text)) => split_keywords(&text),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn draft(number: i64, title: &str, section: &str) -> TopicDraft {
        TopicDraft {
            topic_number: number,
            title: title.to_string(),
            section: section.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_non_positive_numbers() {
        assert_eq!(
            draft(0, "Test", "fires").validate(),
            Err(ValidationError::InvalidTopicNumber(0))
        );
        assert_eq!(
            draft(-3, "Test", "fires").validate(),
            Err(ValidationError::InvalidTopicNumber(-3))
        );
        assert_eq!(
            draft(i64::MAX, "Test", "fires").validate(),
            Err(ValidationError::InvalidTopicNumber(i64::MAX))
        );
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        assert_eq!(
            draft(5, "   ", "fires").validate(),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_validate_rejects_unknown_section() {
        assert_eq!(
            draft(5, "Test", "history").validate(),
            Err(ValidationError::UnknownSection("history".to_string()))
        );
    }

    #[test]
    fn test_into_topic_applies_defaults() {
        let topic = draft(5, " Test ", "fires").into_topic(today()).unwrap();

        assert_eq!(topic.topic_number, 5);
        assert_eq!(topic.title, "Test");
        assert_eq!(topic.author, DEFAULT_AUTHOR);
        assert_eq!(topic.date, today());
        assert_eq!(topic.order, 5);
        assert_eq!(topic.section, Section::Fires);
        assert!(topic.body.starts_with("# Test"));
        assert!(topic.version.is_none());
    }

    #[test]
    fn test_into_topic_keeps_explicit_values() {
        let mut d = draft(7, "Extinguishers", "protection");
        d.body = "# Body".to_string();
        d.order = Some(1);
        d.author = Some("Chief".to_string());
        d.keywords = vec![" foam ".to_string(), "".to_string(), "co2".to_string()];

        let topic = d.into_topic(today()).unwrap();
        assert_eq!(topic.body, "# Body");
        assert_eq!(topic.order, 1);
        assert_eq!(topic.author, "Chief");
        assert_eq!(topic.keywords, vec!["foam", "co2"]);
    }

    #[test]
    fn test_draft_keywords_string_and_list_forms() {
        let from_text: TopicDraft =
            serde_json::from_str(r#"{"topic_number": 1, "keywords": "a, b, c"}"#).unwrap();
        let from_list: TopicDraft =
            serde_json::from_str(r#"{"topic_number": 1, "keywords": ["a", "b", "c"]}"#).unwrap();

        assert_eq!(from_text.keywords, vec!["a", "b", "c"]);
        assert_eq!(from_list.keywords, from_text.keywords);
    }

    #[test]
    fn test_draft_accepts_content_alias() {
        let d: TopicDraft = serde_yaml::from_str(
            "topic_number: 2\ntitle: Smoke\nsection: fires\ncontent: \"# Smoke\"\n",
        )
        .unwrap();
        assert_eq!(d.body, "# Smoke");
    }

    #[test]
    fn test_to_draft_round_trip() {
        let topic = draft(12, "Evacuation", "emergency")
            .into_topic(today())
            .unwrap();
        let back = topic.to_draft().into_topic(today()).unwrap();
        assert_eq!(back, topic);
    }
}
