//! Storage path conventions.
//!
//! Single source of truth - build paths with these helpers instead of
//! formatting them by hand.
//!
//! | Item | Path |
//! |------|------|
//! | Section listing | `{root}/{section}` |
//! | Topic document | `{root}/{section}/topic-{n}.md` |

use crate::domain::Section;

/// Default logical prefix for all content paths
pub const DEFAULT_CONTENT_ROOT: &str = "content";

/// Extension of topic documents
pub const TOPIC_EXTENSION: &str = ".md";

const TOPIC_PREFIX: &str = "topic-";

/// Directory holding a section's documents
pub fn section_dir(root: &str, section: Section) -> String {
    let root = root.trim_matches('/');
    if root.is_empty() {
        section.id().to_string()
    } else {
        format!("{}/{}", root, section.id())
    }
}

/// File name of a topic document (`topic-{n}.md`)
pub fn topic_file_name(topic_number: u32) -> String {
    format!("{}{}{}", TOPIC_PREFIX, topic_number, TOPIC_EXTENSION)
}

/// Full logical path of a topic document
pub fn topic_path(root: &str, section: Section, topic_number: u32) -> String {
    format!("{}/{}", section_dir(root, section), topic_file_name(topic_number))
}

/// Topic number of a canonical `topic-{n}.md` file name.
///
/// Names that only parse loosely (`topic-05.md`, `topic-+5.md`) are not
/// canonical: the repository could list them but never address them again.
pub fn parse_topic_file_name(name: &str) -> Option<u32> {
    name.strip_prefix(TOPIC_PREFIX)?
        .strip_suffix(TOPIC_EXTENSION)?
        .parse()
        .ok()
        .filter(|n| *n > 0 && topic_file_name(*n) == name)
}

/// Parent directory of a logical path
pub fn parent_dir(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(dir, _)| dir)
}
