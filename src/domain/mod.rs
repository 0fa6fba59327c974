//! Domain types for the topic portal.
//!
//! This module contains the core data structures:
//! - Section: The fixed registry of portal sections
//! - Topic: Stored educational content
//! - TopicDraft: Unvalidated input for creating or updating a topic

pub mod section;
pub mod topic;

// Re-export commonly used types
pub use section::{Section, SectionInfo, UnknownSection};
pub use topic::{Topic, TopicDraft, ValidationError, DEFAULT_AUTHOR};
