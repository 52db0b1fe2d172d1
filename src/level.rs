//! Classification levels and token resolution
//!
//! The level table is a closed set with an explicit ordinal. Severity
//! comparisons always go through the ordinal, never through the name.

use crate::matcher::RawMatch;
use crate::types::Marking;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordinal of SECRET, the lowest level that requires a warning
pub const SECRET_ORDINAL: u8 = 2;

/// Ordinal of TOP SECRET, the lowest level `should_block` refuses
pub const TOP_SECRET_ORDINAL: u8 = 3;

/// Security classification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLevel {
    #[serde(rename = "UNCLASSIFIED")]
    Unclassified,
    #[serde(rename = "CONFIDENTIAL")]
    Confidential,
    #[serde(rename = "SECRET")]
    Secret,
    #[serde(rename = "TOP SECRET")]
    TopSecret,
    #[serde(rename = "COSMIC TOP SECRET")]
    CosmicTopSecret,
}

impl ClassificationLevel {
    /// All levels in ascending ordinal order
    pub const ALL: [ClassificationLevel; 5] = [
        Self::Unclassified,
        Self::Confidential,
        Self::Secret,
        Self::TopSecret,
        Self::CosmicTopSecret,
    ];

    /// Numeric sensitivity rank
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Unclassified => 0,
            Self::Confidential => 1,
            Self::Secret => 2,
            Self::TopSecret => 3,
            Self::CosmicTopSecret => 4,
        }
    }

    /// Canonical upper-case name
    pub fn name(self) -> &'static str {
        match self {
            Self::Unclassified => "UNCLASSIFIED",
            Self::Confidential => "CONFIDENTIAL",
            Self::Secret => "SECRET",
            Self::TopSecret => "TOP SECRET",
            Self::CosmicTopSecret => "COSMIC TOP SECRET",
        }
    }

    /// Short portion-marking alias
    pub fn alias(self) -> &'static str {
        match self {
            Self::Unclassified => "U",
            Self::Confidential => "C",
            Self::Secret => "S",
            Self::TopSecret => "TS",
            Self::CosmicTopSecret => "CTS",
        }
    }

    /// Display color tag used by banner renderers
    pub fn color(self) -> &'static str {
        match self {
            Self::Unclassified => "green",
            Self::Confidential => "blue",
            Self::Secret => "red",
            Self::TopSecret => "orange",
            Self::CosmicTopSecret => "yellow",
        }
    }

    /// Look up a level by ordinal
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.ordinal() == ordinal)
    }

    /// Whether this level requires a warning before processing
    pub fn is_restricted(self) -> bool {
        self.ordinal() >= SECRET_ORDINAL
    }
}

impl Default for ClassificationLevel {
    fn default() -> Self {
        Self::Unclassified
    }
}

impl std::fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialOrd for ClassificationLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassificationLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

/// Uppercase, trim, and collapse internal whitespace runs
fn canonical_form(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn lookup(canonical: &str) -> Option<ClassificationLevel> {
    ClassificationLevel::ALL
        .into_iter()
        .find(|l| l.name() == canonical || l.alias() == canonical)
}

/// Resolve a captured token to its classification level
///
/// Unrecognized tokens resolve to UNCLASSIFIED. Matcher noise must never
/// raise severity, so there is no error path here.
pub fn normalize(token: &str) -> ClassificationLevel {
    lookup(&canonical_form(token)).unwrap_or_default()
}

/// Ordinal for a canonical name or alias, `None` if unknown
pub fn level_of(name: &str) -> Option<u8> {
    lookup(&canonical_form(name)).map(ClassificationLevel::ordinal)
}

/// Resolve a matcher candidate into an immutable marking
pub fn resolve(raw: RawMatch) -> Marking {
    let classification = normalize(&raw.token);
    Marking {
        raw_text: raw.raw,
        classification,
        line: raw.line,
        family: raw.family,
    }
}
