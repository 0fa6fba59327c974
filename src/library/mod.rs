//! Markdown document handling for stored topics.
//!
//! # Storage Layout
//!
//! ```text
//! content/
//! ├── fires/
//! │   ├── topic-1.md        # frontmatter + Markdown body
//! │   └── topic-2.md
//! ├── emergency/
//! │   └── topic-101.md
//! ├── education/
//! └── protection/
//! ```

pub mod document;
pub mod frontmatter;

pub use document::{parse_topic, render_topic, DocumentError};
pub use frontmatter::{Frontmatter, FrontmatterError};
