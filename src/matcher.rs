//! Marking matcher — pattern families applied to a document's header lines
//!
//! Pattern families are data: a list of `(family, regex, groups)` entries
//! iterated uniformly. New marking conventions are additions to the list.

use crate::error::{MarkingError, Result};
use crate::types::{MarkingFamily, ScanScope};
use regex::Regex;
use std::sync::OnceLock;

const FULL_NAMES: &str = r"COSMIC\s+TOP\s+SECRET|TOP\s+SECRET|UNCLASSIFIED|CONFIDENTIAL|SECRET";
const ALIASES: &str = r"CTS|TS|U|C|S";
const CAVEATS: &str = r"[A-Z0-9][A-Z0-9 ,/\-]*";
/// A portion marking opens a line (after any bullet or quote markers) or
/// follows sentence punctuation, so `file(s)` and `Copyright (c)` are prose.
const PORTION_LEAD: &str = r"(?:^[\s\-*>]*|[.!?;:]\s+)";

/// Uncompiled marking pattern
#[derive(Debug, Clone)]
pub struct PatternDef {
    /// Family this pattern belongs to
    pub family: MarkingFamily,

    /// Regular expression source
    pub pattern: String,

    /// Capture group holding the classification token
    pub token_group: usize,

    /// Capture group holding the marking as written; 0 for the whole match
    pub marking_group: usize,
}

/// Built-in pattern definitions in priority order
pub fn default_patterns() -> Vec<PatternDef> {
    vec![
        PatternDef {
            family: MarkingFamily::Banner,
            pattern: format!(r"(?i)^\s*({FULL_NAMES})\s*$"),
            token_group: 1,
            marking_group: 0,
        },
        PatternDef {
            family: MarkingFamily::Caveated,
            pattern: format!(r"(?i)^\s*({FULL_NAMES}|{ALIASES})\s*//\s*{CAVEATS}$"),
            token_group: 1,
            marking_group: 0,
        },
        PatternDef {
            family: MarkingFamily::Prefixed,
            pattern: format!(
                r"(?i)^\s*(?:SECURITY\s+)?CLASS(?:IFICATION)?\s*:\s*({FULL_NAMES}|{ALIASES})\b(?:\s*//.*)?\s*$"
            ),
            token_group: 1,
            marking_group: 0,
        },
        PatternDef {
            family: MarkingFamily::Portion,
            pattern: format!(r"(?i){PORTION_LEAD}(\(({ALIASES})(?://{CAVEATS})?\))"),
            token_group: 2,
            marking_group: 1,
        },
    ]
}

/// A candidate marking before level resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Full text matched by the pattern
    pub raw: String,

    /// Captured classification token
    pub token: String,

    /// 1-based line number within the scanned prefix
    pub line: usize,

    /// Family of the matching pattern
    pub family: MarkingFamily,
}

struct MarkingPattern {
    family: MarkingFamily,
    regex: Regex,
    token_group: usize,
    marking_group: usize,
}

/// Compiled, immutable set of marking patterns
pub struct MarkingMatcher {
    patterns: Vec<MarkingPattern>,
}

impl MarkingMatcher {
    /// Compile a pattern set
    pub fn new(defs: &[PatternDef]) -> Result<Self> {
        let patterns = defs
            .iter()
            .map(|def| {
                let regex = Regex::new(&def.pattern).map_err(|e| MarkingError::InvalidPattern {
                    family: def.family.to_string(),
                    reason: e.to_string(),
                })?;
                let groups = regex.captures_len() - 1;
                if def.token_group == 0 || def.token_group > groups {
                    return Err(MarkingError::InvalidPattern {
                        family: def.family.to_string(),
                        reason: format!(
                            "token group {} out of range (pattern has {} groups)",
                            def.token_group, groups
                        ),
                    });
                }
                if def.marking_group > groups {
                    return Err(MarkingError::InvalidPattern {
                        family: def.family.to_string(),
                        reason: format!(
                            "marking group {} out of range (pattern has {} groups)",
                            def.marking_group, groups
                        ),
                    });
                }
                Ok(MarkingPattern {
                    family: def.family,
                    regex,
                    token_group: def.token_group,
                    marking_group: def.marking_group,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Process-wide matcher over the built-in patterns
    ///
    /// Built-in patterns are constants; failing to compile them is a startup fault.
    pub fn standard() -> &'static MarkingMatcher {
        static MATCHER: OnceLock<MarkingMatcher> = OnceLock::new();
        MATCHER.get_or_init(|| {
            MarkingMatcher::new(&default_patterns()).expect("built-in marking patterns compile")
        })
    }

    /// Families in priority order
    pub fn families(&self) -> Vec<MarkingFamily> {
        self.patterns.iter().map(|p| p.family).collect()
    }

    /// Find every marking in the first `scope.lines_to_check` lines
    ///
    /// Exhaustive over the scanned prefix. Results are ordered by line, then
    /// family priority, then position within the line.
    pub fn find_markings(&self, text: &str, scope: ScanScope) -> Vec<RawMatch> {
        let mut found = Vec::new();

        for (idx, line) in text.lines().take(scope.lines_to_check).enumerate() {
            for pattern in &self.patterns {
                for caps in pattern.regex.captures_iter(line) {
                    let Some(token) = caps.get(pattern.token_group) else {
                        continue;
                    };
                    let raw = caps
                        .get(pattern.marking_group)
                        .map_or(token.as_str(), |m| m.as_str());
                    found.push(RawMatch {
                        raw: raw.trim().to_string(),
                        token: token.as_str().to_string(),
                        line: idx + 1,
                        family: pattern.family,
                    });
                }
            }
        }

        found
    }
}

/// Find markings with the built-in pattern set
pub fn find_markings(text: &str, scope: ScanScope) -> Vec<RawMatch> {
    MarkingMatcher::standard().find_markings(text, scope)
}
