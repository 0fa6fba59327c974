//! Content access core.
//!
//! This module contains:
//! - Cache: Injectable, advisory read cache
//! - Gateway: Bounded and cached access to a content store
//! - Repository: Topic operations and their business rules
//! - Error: Errors surfaced to callers

pub mod cache;
pub mod error;
pub mod gateway;
pub mod repository;

// Re-export commonly used types
pub use cache::{CachedRead, NoCache, ReadCache, TtlCache};
pub use error::RepoError;
pub use gateway::ContentGateway;
pub use repository::{SaveKind, SaveOutcome, SectionStats, TopicRepository};
