//! Topic repository: the business rules over the content gateway.
//!
//! Reads never fail. Missing sections list as empty, unparsable documents
//! are skipped, unknown topics come back as `None`. Writes validate their
//! input before any storage call and report storage failures as errors.
//! Nothing is retried.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::error::RepoError;
use super::gateway::ContentGateway;
use crate::config::paths;
use crate::domain::{Section, Topic, TopicDraft, ValidationError};
use crate::library::{parse_topic, render_topic};

/// Whether a save created a new document or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveKind {
    Created,
    Updated,
}

impl std::fmt::Display for SaveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveKind::Created => write!(f, "created"),
            SaveKind::Updated => write!(f, "updated"),
        }
    }
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub kind: SaveKind,
    /// The topic as stored, carrying its new version token
    pub topic: Topic,
}

/// Number of stored documents in a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub section: Section,
    pub documents: usize,
}

/// Section- and topic-level operations over a content store
pub struct TopicRepository {
    gateway: Arc<ContentGateway>,
    content_root: String,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl TopicRepository {
    /// Create a repository storing documents under `content_root`
    pub fn new(gateway: ContentGateway, content_root: impl Into<String>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            content_root: content_root.into(),
        }
    }

    pub fn gateway(&self) -> &ContentGateway {
        &self.gateway
    }

    pub fn content_root(&self) -> &str {
        &self.content_root
    }

    /// All parsable topics of a section, sorted by `order` then number
    #[instrument(skip(self), fields(store = self.gateway.store_name()))]
    pub async fn list_topics(&self, section: Section) -> Vec<Topic> {
        let dir = paths::section_dir(&self.content_root, section);
        let names = self.gateway.list(&dir).await;

        let mut fetches = JoinSet::new();
        for name in names {
            let Some(file_number) = paths::parse_topic_file_name(&name) else {
                warn!(%dir, %name, "Skipping file that is not a topic document");
                continue;
            };
            let gateway = Arc::clone(&self.gateway);
            let path = format!("{}/{}", dir, name);
            fetches.spawn(async move {
                let file = gateway.get(&path).await;
                (path, file_number, file)
            });
        }

        let today = today();
        let mut topics = Vec::new();
        while let Some(joined) = fetches.join_next().await {
            let (path, file_number, file) = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "Document fetch task failed");
                    continue;
                }
            };
            let Some(file) = file else {
                continue;
            };

            match parse_topic(&file.content, section, Some(file_number), today) {
                Ok(mut topic) => {
                    topic.version = Some(file.version);
                    topics.push(topic);
                }
                Err(e) => warn!(%path, error = %e, "Skipping malformed document"),
            }
        }

        topics.sort_by_key(Topic::sort_key);
        debug!(count = topics.len(), "Listed topics");
        topics
    }

    /// Topics of every section, in section display order
    pub async fn list_all_topics(&self) -> Vec<Topic> {
        let mut all = Vec::new();
        for section in Section::ALL {
            all.extend(self.list_topics(section).await);
        }
        all
    }

    /// Look up a topic by number.
    ///
    /// Without a section, sections are tried in display order and the first
    /// match wins.
    #[instrument(skip(self))]
    pub async fn get_topic(&self, topic_number: u32, section: Option<Section>) -> Option<Topic> {
        if topic_number == 0 {
            return None;
        }

        let candidates = match section {
            Some(section) => vec![section],
            None => Section::ALL.to_vec(),
        };

        for section in candidates {
            let path = paths::topic_path(&self.content_root, section, topic_number);
            let Some(file) = self.gateway.get(&path).await else {
                continue;
            };

            match parse_topic(&file.content, section, Some(topic_number), today()) {
                Ok(mut topic) => {
                    topic.version = Some(file.version);
                    return Some(topic);
                }
                Err(e) => warn!(%path, error = %e, "Stored topic is malformed"),
            }
        }

        None
    }

    /// Create or update a topic.
    ///
    /// A version token carried by the draft is used as the precondition, so
    /// an edit based on an outdated read is rejected. Without one, the token
    /// of the currently stored document is used.
    #[instrument(skip(self, draft), fields(topic_number = draft.topic_number, section = %draft.section))]
    pub async fn save_topic(&self, draft: TopicDraft) -> Result<SaveOutcome, RepoError> {
        let mut topic = draft.into_topic(today())?;
        if !topic.section.suggests(topic.topic_number) {
            debug!(
                range = ?topic.section.info().id_range,
                "Topic number outside the section's suggested range"
            );
        }

        let path = paths::topic_path(&self.content_root, topic.section, topic.topic_number);
        let existing = self.gateway.get_fresh(&path).await?;

        let precondition = match (&topic.version, &existing) {
            (Some(seen), _) => Some(seen.clone()),
            (None, Some(file)) => Some(file.version.clone()),
            (None, None) => None,
        };
        let kind = if existing.is_some() {
            SaveKind::Updated
        } else {
            SaveKind::Created
        };

        let message = format!(
            "{} topic {} in {}",
            match kind {
                SaveKind::Created => "Create",
                SaveKind::Updated => "Update",
            },
            topic.topic_number,
            topic.section
        );
        let version = self
            .gateway
            .put(&path, &render_topic(&topic), precondition.as_deref(), &message)
            .await?;

        info!(%path, %kind, "Saved topic");
        topic.version = Some(version);
        Ok(SaveOutcome { kind, topic })
    }

    /// Delete a topic; a missing topic is an error, not a silent success
    #[instrument(skip(self))]
    pub async fn delete_topic(&self, topic_number: i64, section: Section) -> Result<(), RepoError> {
        let topic_number = u32::try_from(topic_number)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ValidationError::InvalidTopicNumber(topic_number))?;

        let path = paths::topic_path(&self.content_root, section, topic_number);
        let existing = self
            .gateway
            .get_fresh(&path)
            .await?
            .ok_or(RepoError::NotFound {
                section,
                topic_number,
            })?;

        let message = format!("Delete topic {} in {}", topic_number, section);
        self.gateway
            .delete(&path, &existing.version, &message)
            .await?;

        info!(%path, "Deleted topic");
        Ok(())
    }

    /// Count addressable topic documents per section
    pub async fn section_stats(&self) -> Vec<SectionStats> {
        let mut stats = Vec::new();
        for section in Section::ALL {
            let dir = paths::section_dir(&self.content_root, section);
            let documents = self
                .gateway
                .list(&dir)
                .await
                .iter()
                .filter(|n| paths::parse_topic_file_name(n).is_some())
                .count();
            stats.push(SectionStats { section, documents });
        }
        stats
    }

    /// Drop every cached read
    pub fn clear_cache(&self) {
        self.gateway.clear_cache();
        info!("Cleared read cache");
    }
}
