//! Core detection and decision types
//!
//! All types use camelCase JSON serialization for wire compatibility.

use crate::level::ClassificationLevel;
use serde::{Deserialize, Serialize};

/// How many leading lines of a document are searched for markings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanScope {
    /// Number of leading lines considered (markings are a header-banner convention)
    #[serde(default = "default_lines_to_check")]
    pub lines_to_check: usize,
}

fn default_lines_to_check() -> usize {
    5
}

impl ScanScope {
    /// Scope covering the first `lines_to_check` lines
    pub fn new(lines_to_check: usize) -> Self {
        Self { lines_to_check }
    }
}

impl Default for ScanScope {
    fn default() -> Self {
        Self {
            lines_to_check: default_lines_to_check(),
        }
    }
}

/// Pattern family that produced a marking, in matcher priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingFamily {
    /// Bare classification word alone on a line (`SECRET`)
    Banner,
    /// Classification followed by `//` caveats (`TOP SECRET//NOFORN`)
    Caveated,
    /// `CLASSIFICATION:` / `CLASS:` prefixed line
    Prefixed,
    /// Inline parenthetical portion marking (`(S)`)
    Portion,
}

impl MarkingFamily {
    /// Stable identifier used in logs and errors
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Caveated => "caveated",
            Self::Prefixed => "prefixed",
            Self::Portion => "portion",
        }
    }
}

impl std::fmt::Display for MarkingFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched classification marking
///
/// The ordinal level is derived from `classification`; it is written on the
/// wire for readers but ignored when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MarkingRecord", from = "MarkingRecord")]
pub struct Marking {
    /// Text matched by the pattern, as it appeared in the document
    pub raw_text: String,

    /// Resolved classification
    pub classification: ClassificationLevel,

    /// 1-based line number within the scanned prefix
    pub line: usize,

    /// Pattern family that matched
    pub family: MarkingFamily,
}

impl Marking {
    /// Ordinal of `classification`
    pub fn level(&self) -> u8 {
        self.classification.ordinal()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkingRecord {
    raw_text: String,
    classification: ClassificationLevel,
    #[serde(default)]
    level: u8,
    line: usize,
    family: MarkingFamily,
}

impl From<Marking> for MarkingRecord {
    fn from(marking: Marking) -> Self {
        Self {
            level: marking.level(),
            raw_text: marking.raw_text,
            classification: marking.classification,
            line: marking.line,
            family: marking.family,
        }
    }
}

impl From<MarkingRecord> for Marking {
    fn from(record: MarkingRecord) -> Self {
        Self {
            raw_text: record.raw_text,
            classification: record.classification,
            line: record.line,
            family: record.family,
        }
    }
}

/// Aggregated detection result for one document
///
/// Built once per scan and never mutated; re-scanning yields a new verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether any marking was found
    pub detected: bool,

    /// Highest ordinal among all markings (0 when none)
    pub level: u8,

    /// Canonical name at `level`
    pub canonical_text: String,

    /// `level >= SECRET`
    pub warning_required: bool,

    /// Every marking found, in discovery order
    #[serde(default)]
    pub markings: Vec<Marking>,

    /// Human-readable rationale for `level`
    pub explanation: String,

    /// Display color tag for `level`
    pub color: String,
}

impl Verdict {
    /// Resolved classification for `level`, `None` if out of table
    pub fn classification(&self) -> Option<ClassificationLevel> {
        ClassificationLevel::from_ordinal(self.level)
    }

    /// Whether the verdict is SECRET or above
    pub fn restricted(&self) -> bool {
        self.warning_required
    }
}

/// Outcome of the processing gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    /// Downstream processing may proceed
    pub allowed: bool,

    /// A warning must be shown to the user
    pub requires_warning: bool,

    /// An audit record must be written
    pub requires_audit: bool,

    /// Human-readable reason for the decision
    pub reason: String,
}

impl PolicyDecision {
    /// Combine two decisions, keeping the stricter outcome
    pub fn merge(self, other: PolicyDecision) -> PolicyDecision {
        let reason = if !self.allowed {
            self.reason
        } else if !other.allowed {
            other.reason
        } else if !self.requires_warning && other.requires_warning {
            other.reason
        } else {
            self.reason
        };

        PolicyDecision {
            allowed: self.allowed && other.allowed,
            requires_warning: self.requires_warning || other.requires_warning,
            requires_audit: self.requires_audit || other.requires_audit,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(allowed: bool, warn: bool, audit: bool, reason: &str) -> PolicyDecision {
        PolicyDecision {
            allowed,
            requires_warning: warn,
            requires_audit: audit,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_scan_scope_default() {
        assert_eq!(ScanScope::default().lines_to_check, 5);
        assert_eq!(ScanScope::new(1).lines_to_check, 1);
    }

    #[test]
    fn test_scan_scope_deserialize_defaults() {
        let scope: ScanScope = serde_json::from_str("{}").unwrap();
        assert_eq!(scope.lines_to_check, 5);

        let scope: ScanScope = serde_json::from_str(r#"{"linesToCheck": 2}"#).unwrap();
        assert_eq!(scope.lines_to_check, 2);
    }

    #[test]
    fn test_marking_serialization() {
        let marking = Marking {
            raw_text: "(S)".to_string(),
            classification: ClassificationLevel::Secret,
            line: 1,
            family: MarkingFamily::Portion,
        };

        let json = serde_json::to_string(&marking).unwrap();
        assert!(json.contains("\"rawText\":\"(S)\""));
        assert!(json.contains("\"classification\":\"SECRET\""));
        assert!(json.contains("\"level\":2"));
        assert!(json.contains("\"family\":\"portion\""));

        let parsed: Marking = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, marking);
    }

    #[test]
    fn test_marking_level_follows_classification() {
        let parsed: Marking = serde_json::from_str(
            r#"{"rawText":"(S)","classification":"SECRET","level":0,"line":1,"family":"portion"}"#,
        )
        .unwrap();
        assert_eq!(parsed.level(), 2);

        let parsed: Marking = serde_json::from_str(
            r#"{"rawText":"TS","classification":"TOP SECRET","line":3,"family":"banner"}"#,
        )
        .unwrap();
        assert_eq!(parsed.level(), 3);
    }

    #[test]
    fn test_verdict_classification_lookup() {
        let verdict = Verdict {
            detected: true,
            level: 3,
            canonical_text: "TOP SECRET".to_string(),
            warning_required: true,
            markings: vec![],
            explanation: String::new(),
            color: "orange".to_string(),
        };
        assert_eq!(verdict.classification(), Some(ClassificationLevel::TopSecret));
        assert!(verdict.restricted());

        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"canonicalText\":\"TOP SECRET\""));
        assert!(json.contains("\"warningRequired\":true"));
    }

    #[test]
    fn test_merge_keeps_refusal() {
        let merged = decision(true, false, false, "ok").merge(decision(false, true, false, "no"));
        assert!(!merged.allowed);
        assert!(merged.requires_warning);
        assert!(!merged.requires_audit);
        assert_eq!(merged.reason, "no");
    }

    #[test]
    fn test_merge_first_refusal_wins_reason() {
        let merged = decision(false, true, false, "first").merge(decision(false, true, false, "second"));
        assert_eq!(merged.reason, "first");
    }

    #[test]
    fn test_merge_propagates_audit() {
        let merged = decision(true, true, true, "override").merge(decision(true, false, false, "ok"));
        assert!(merged.allowed);
        assert!(merged.requires_warning);
        assert!(merged.requires_audit);
        assert_eq!(merged.reason, "override");
    }

    #[test]
    fn test_merge_warning_reason_preferred() {
        let merged = decision(true, false, false, "ok").merge(decision(true, true, true, "override"));
        assert_eq!(merged.reason, "override");
    }
}
