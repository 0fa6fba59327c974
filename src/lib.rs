//! topicbase - Markdown topic repository for an educational portal
//!
//! Topics are Markdown documents with a frontmatter header, stored one file
//! per topic under a section directory, either on the local filesystem or
//! in a GitHub repository.
//!
//! # Architecture
//!
//! - Reads go through a gateway that bounds every store call with a timeout
//!   and serves repeated reads from a TTL cache
//! - Failed reads degrade to empty results; failed writes are reported
//! - Writes are guarded by the content version the editor last saw
//!
//! # Modules
//!
//! - `adapters`: Content stores (local filesystem, GitHub contents API)
//! - `core`: Gateway, read cache and the topic repository
//! - `domain`: Data structures (Section, Topic, TopicDraft)
//! - `library`: Frontmatter parsing and topic document rendering
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # List a section
//! topicbase list fires
//!
//! # Create or update a topic
//! topicbase save -n 5 -t "Extinguisher classes" -s fires --body-file body.md
//!
//! # Delete a topic
//! topicbase delete 5 --section fires
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use adapters::{ContentStore, FsStore, GithubConfig, GithubStore, StoreError, StoredFile};
pub use core::{ContentGateway, RepoError, SaveKind, SaveOutcome, TopicRepository, TtlCache};
pub use domain::{Section, SectionInfo, Topic, TopicDraft, ValidationError};
pub use library::{Frontmatter, FrontmatterError};
