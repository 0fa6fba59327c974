//! Mapping between stored Markdown documents and [`Topic`] values.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::frontmatter::{self, Frontmatter, FrontmatterError};
use crate::domain::{Section, Topic, DEFAULT_AUTHOR};

/// A stored document that cannot be turned into a topic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    #[error("Document has no usable topic number")]
    MissingTopicNumber,
}

/// Build a topic from a raw document.
///
/// `file_number` is the number taken from the `topic-{n}.md` file name and
/// wins over the `topic_number` field. The section is the one the document
/// is stored under.
pub fn parse_topic(
    raw: &str,
    section: Section,
    file_number: Option<u32>,
    today: NaiveDate,
) -> Result<Topic, DocumentError> {
    let fm = frontmatter::parse(raw)?;

    let topic_number = file_number
        .or_else(|| {
            fm.get_i64("topic_number")
                .and_then(|n| u32::try_from(n).ok())
        })
        .filter(|n| *n > 0)
        .ok_or(DocumentError::MissingTopicNumber)?;

    let date = match fm.get_text("date").filter(|d| !d.trim().is_empty()) {
        Some(text) => parse_date(&text).unwrap_or_else(|| {
            warn!(topic_number, date = %text, "Unrecognized date, using today");
            today
        }),
        None => today,
    };

    let title = fm
        .get_text("title")
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("Topic {}", topic_number));

    let author = fm
        .get_text("author")
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    Ok(Topic {
        topic_number,
        title,
        description: fm.get_text("description").unwrap_or_default(),
        date,
        author,
        keywords: fm.get_list("keywords"),
        section,
        order: fm.get_i64("order").unwrap_or(i64::from(topic_number)),
        version: None,
        body: fm.into_body(),
    })
}

/// Render a topic in the stored document format
pub fn render_topic(topic: &Topic) -> String {
    let keywords: Vec<Value> = topic.keywords.iter().cloned().map(Value::from).collect();

    Frontmatter::new(topic.body.clone())
        .with_field("topic_number", topic.topic_number)
        .with_field("title", topic.title.clone())
        .with_field("description", topic.description.clone())
        .with_field("date", topic.date.format("%Y-%m-%d").to_string())
        .with_field("author", topic.author.clone())
        .with_field("keywords", keywords)
        .with_field("section", topic.section.id())
        .with_field("order", topic.order)
        .render()
}

/// Accept `YYYY-MM-DD` or an RFC 3339 timestamp
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn sample_topic() -> Topic {
        Topic {
            topic_number: 5,
            title: "Engine fire \"on ground\"".to_string(),
            description: "Actions: first minute".to_string(),
            body: "# Engine fire\n\n1. Shut down\n2. Discharge bottle".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            author: "Instructor".to_string(),
            keywords: vec!["engine".to_string(), "ground, apron".to_string()],
            section: Section::Fires,
            order: 3,
            version: None,
        }
    }

    #[test]
    fn test_render_matches_document_format() {
        let doc = render_topic(&sample_topic());
        let expected_head = "---\n\
topic_number: 5\n\
title: \"Engine fire \\\"on ground\\\"\"\n\
description: \"Actions: first minute\"\n\
date: \"2024-01-15\"\n\
author: \"Instructor\"\n\
keywords:\n  - \"engine\"\n  - \"ground, apron\"\n\
section: \"fires\"\n\
order: 3\n\
---\n\n# Engine fire";
        assert!(doc.starts_with(expected_head), "unexpected document:\n{}", doc);
    }

    #[test]
    fn test_round_trip() {
        let topic = sample_topic();
        let parsed = parse_topic(&render_topic(&topic), Section::Fires, Some(5), today()).unwrap();
        assert_eq!(parsed, topic);
    }

    #[test]
    fn test_round_trip_without_keywords() {
        let mut topic = sample_topic();
        topic.keywords.clear();
        let doc = render_topic(&topic);
        assert!(doc.contains("keywords: []\n"));
        assert_eq!(
            parse_topic(&doc, Section::Fires, Some(5), today()).unwrap(),
            topic
        );
    }

    #[test]
    fn test_defaults_for_sparse_document() {
        let topic = parse_topic("---\nkeywords: a, b\n---\nText", Section::Education, Some(201), today())
            .unwrap();

        assert_eq!(topic.topic_number, 201);
        assert_eq!(topic.title, "Topic 201");
        assert_eq!(topic.author, DEFAULT_AUTHOR);
        assert_eq!(topic.date, today());
        assert_eq!(topic.order, 201);
        assert_eq!(topic.keywords, vec!["a", "b"]);
        assert_eq!(topic.section, Section::Education);
        assert_eq!(topic.body, "Text");
    }

    #[test]
    fn test_file_number_wins_over_field() {
        let topic = parse_topic("---\ntopic_number: 9\n---\n", Section::Fires, Some(4), today()).unwrap();
        assert_eq!(topic.topic_number, 4);

        let topic = parse_topic("---\ntopic_number: 9\n---\n", Section::Fires, None, today()).unwrap();
        assert_eq!(topic.topic_number, 9);
    }

    #[test]
    fn test_section_comes_from_storage_location() {
        let topic = parse_topic(
            "---\nsection: \"protection\"\n---\n",
            Section::Fires,
            Some(1),
            today(),
        )
        .unwrap();
        assert_eq!(topic.section, Section::Fires);
    }

    #[test]
    fn test_rfc3339_date() {
        let topic = parse_topic(
            "---\ndate: \"2025-12-11T10:00:00Z\"\n---\n",
            Section::Fires,
            Some(1),
            today(),
        )
        .unwrap();
        assert_eq!(topic.date, NaiveDate::from_ymd_opt(2025, 12, 11).unwrap());
    }

    #[test]
    fn test_malformed_documents() {
        assert_eq!(
            parse_topic("no metadata", Section::Fires, Some(1), today()),
            Err(DocumentError::Frontmatter(FrontmatterError::MissingOpening))
        );
        assert_eq!(
            parse_topic("---\ntitle: x\n---\n", Section::Fires, None, today()),
            Err(DocumentError::MissingTopicNumber)
        );
    }

    #[test]
    fn test_blank_or_unrecognized_date_falls_back_to_today() {
        for date in ["\"\"", "\"15.01.2024\"", "yesterday"] {
            let doc = format!("---\ntitle: \"Smoke\"\ndate: {}\n---\n\n# Smoke", date);
            let topic = parse_topic(&doc, Section::Fires, Some(1), today()).unwrap();
            assert_eq!(topic.date, today(), "date {}", date);
            assert_eq!(topic.title, "Smoke");
        }
    }
}
