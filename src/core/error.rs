//! Errors surfaced by the topic repository.
//!
//! Lower layers are normalized here: validation failures, a missing topic,
//! or a storage failure. Unparsable documents never surface; listings skip
//! them and lookups report them as missing.

use thiserror::Error;

use crate::adapters::StoreError;
use crate::domain::{Section, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Topic {topic_number} does not exist in section {section}")]
    NotFound { section: Section, topic_number: u32 },

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}
