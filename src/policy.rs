//! Policy gate — pure decision functions over a classification level
//!
//! Nothing here holds state. Every decision is re-derivable from its inputs,
//! so the functions are safe to call from any thread.

use crate::level::{ClassificationLevel, SECRET_ORDINAL, TOP_SECRET_ORDINAL};
use crate::types::{PolicyDecision, Verdict};
use serde::{Deserialize, Serialize};

/// Decide whether processing may proceed at `level`
///
/// | level | override | allowed | warning | audit |
/// |-------|----------|---------|---------|-------|
/// | < 2   | any      | yes     | no      | no    |
/// | >= 2  | no       | no      | yes     | no    |
/// | >= 2  | yes      | yes     | yes     | yes   |
pub fn evaluate(level: u8, override_granted: bool) -> PolicyDecision {
    let name = ClassificationLevel::from_ordinal(level)
        .map(ClassificationLevel::name)
        .unwrap_or("UNKNOWN");

    if level < SECRET_ORDINAL {
        return PolicyDecision {
            allowed: true,
            requires_warning: false,
            requires_audit: false,
            reason: format!("{} content may be processed", name),
        };
    }

    if override_granted {
        PolicyDecision {
            allowed: true,
            requires_warning: true,
            requires_audit: true,
            reason: format!("{} content released by explicit user override", name),
        }
    } else {
        PolicyDecision {
            allowed: false,
            requires_warning: true,
            requires_audit: false,
            reason: format!("{} content requires explicit user override", name),
        }
    }
}

/// Gate decision for a verdict
pub fn evaluate_verdict(verdict: &Verdict, override_granted: bool) -> PolicyDecision {
    evaluate(verdict.level, override_granted)
}

/// Coarse "refuse outright" signal: TOP SECRET and above
///
/// Informational unless strict mode is enabled; it does not replace
/// [`evaluate`] and the two disagree at SECRET.
pub fn should_block(level: u8) -> bool {
    level >= TOP_SECRET_ORDINAL
}

/// Hard refusal used by strict mode
pub fn blocked(level: u8) -> PolicyDecision {
    let name = ClassificationLevel::from_ordinal(level)
        .map(ClassificationLevel::name)
        .unwrap_or("UNKNOWN");
    PolicyDecision {
        allowed: false,
        requires_warning: true,
        requires_audit: false,
        reason: format!("{} content is blocked; override is not permitted", name),
    }
}

/// Classifications a downstream provider is cleared to receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPolicy {
    /// Provider identifier (matched case-insensitively)
    pub name: String,

    /// Supported classifications; empty means unrestricted
    #[serde(default)]
    pub supported: Vec<ClassificationLevel>,

    /// Note shown alongside incompatibility warnings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ProviderPolicy {
    /// Provider that accepts every classification
    pub fn unrestricted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supported: Vec::new(),
            note: None,
        }
    }

    /// Provider cleared for the given classifications only
    pub fn restricted(name: impl Into<String>, supported: Vec<ClassificationLevel>) -> Self {
        Self {
            name: name.into(),
            supported,
            note: None,
        }
    }

    /// Attach a note for incompatibility warnings
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether this provider may receive content with this verdict
    ///
    /// Undetected content carries no restriction. Out-of-table levels are
    /// never supported by a restricted provider.
    pub fn supports(&self, verdict: &Verdict) -> bool {
        if self.supported.is_empty() || !verdict.detected {
            return true;
        }
        verdict
            .classification()
            .is_some_and(|level| self.supported.contains(&level))
    }
}

/// Decide whether content may be sent to a specific provider
pub fn evaluate_provider(
    verdict: &Verdict,
    provider: &ProviderPolicy,
    override_granted: bool,
) -> PolicyDecision {
    if provider.supports(verdict) {
        return PolicyDecision {
            allowed: true,
            requires_warning: false,
            requires_audit: false,
            reason: format!("provider '{}' supports {}", provider.name, verdict.canonical_text),
        };
    }

    let mut reason = format!(
        "provider '{}' does not support {} content",
        provider.name, verdict.canonical_text
    );
    if let Some(note) = &provider.note {
        reason.push_str(": ");
        reason.push_str(note);
    }

    PolicyDecision {
        allowed: override_granted,
        requires_warning: true,
        requires_audit: override_granted,
        reason,
    }
}
