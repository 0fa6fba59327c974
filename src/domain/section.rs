//! Static registry of portal sections.
//!
//! Sections are fixed at compile time. Each one carries display metadata
//! and a suggested numeric range for its topic numbers.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A portal section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Fire safety
    Fires,

    /// Emergency situations
    Emergency,

    /// Training materials and methods
    Education,

    /// Protective equipment and methods
    Protection,
}

/// Display metadata for a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    /// Suggested topic number range (never enforced)
    pub id_range: RangeInclusive<u32>,
}

/// Error for section identifiers outside the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown section: {0}")]
pub struct UnknownSection(pub String);

impl Section {
    /// All sections in display order
    pub const ALL: [Section; 4] = [
        Section::Fires,
        Section::Emergency,
        Section::Education,
        Section::Protection,
    ];

    /// Identifier used in storage paths and URLs
    pub fn id(self) -> &'static str {
        match self {
            Section::Fires => "fires",
            Section::Emergency => "emergency",
            Section::Education => "education",
            Section::Protection => "protection",
        }
    }

    /// Position in display order
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn info(self) -> SectionInfo {
        match self {
            Section::Fires => SectionInfo {
                id: "fires",
                title: "Fires in aviation",
                description: "Topics on fire safety",
                icon: "flame",
                color: "from-red-500 to-orange-500",
                id_range: 1..=99,
            },
            Section::Emergency => SectionInfo {
                id: "emergency",
                title: "Emergency situations",
                description: "Topics on actions during aviation emergencies",
                icon: "alert-triangle",
                color: "from-orange-500 to-amber-500",
                id_range: 101..=199,
            },
            Section::Education => SectionInfo {
                id: "education",
                title: "Education",
                description: "Training materials and teaching methods",
                icon: "book-open",
                color: "from-blue-500 to-cyan-500",
                id_range: 201..=299,
            },
            Section::Protection => SectionInfo {
                id: "protection",
                title: "Protection",
                description: "Protective equipment and methods in aviation",
                icon: "shield",
                color: "from-green-500 to-emerald-500",
                id_range: 301..=399,
            },
        }
    }

    /// Whether `topic_number` falls inside the suggested range
    pub fn suggests(self, topic_number: u32) -> bool {
        self.info().id_range.contains(&topic_number)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.id())
    }
}

impl std::str::FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fires" => Ok(Section::Fires),
            "emergency" | "emergency-situations" => Ok(Section::Emergency),
            "education" => Ok(Section::Education),
            "protection" => Ok(Section::Protection),
            _ => Err(UnknownSection(s.to_string())),
        }
    }
}
