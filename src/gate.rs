//! Classification gate — scan, decide, and audit in one place
//!
//! `ClassificationGate` wires the matcher, aggregator and policy functions to
//! a configuration. Scanning and deciding are synchronous and pure; only
//! [`ClassificationGate::process`] touches an audit sink.

use crate::aggregate::{aggregate, empty_verdict};
use crate::audit::{AuditEventType, AuditRecord, AuditSink};
use crate::config::GateConfig;
use crate::error::Result;
use crate::level::resolve;
use crate::matcher::MarkingMatcher;
use crate::policy::{blocked, evaluate, evaluate_provider, should_block};
use crate::types::{PolicyDecision, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier stamped on generated reports
pub const ANALYZER: &str = concat!("a3s-marking/", env!("CARGO_PKG_VERSION"));

/// Verdict with generation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReport {
    /// The detection result
    pub verdict: Verdict,

    /// When the report was generated
    pub generated_at: DateTime<Utc>,

    /// Analyzer name and version
    pub analyzer: String,
}

/// A request to release content for downstream processing
#[derive(Debug, Clone, Default)]
pub struct ProcessingRequest {
    /// Plain-text content; `None` when the host had no body to give
    pub content: Option<String>,

    /// Destination provider, matched against configured provider policies
    pub provider: Option<String>,

    /// The user explicitly accepted responsibility to proceed
    pub override_granted: bool,
}

impl ProcessingRequest {
    /// Request for the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Set the destination provider
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the override flag
    pub fn with_override(mut self, override_granted: bool) -> Self {
        self.override_granted = override_granted;
        self
    }
}

/// Result of [`ClassificationGate::process`]
#[derive(Debug, Clone)]
pub struct GateOutcome {
    /// Detection result
    pub verdict: Verdict,

    /// Final processing decision
    pub decision: PolicyDecision,

    /// Audit record written to the sink, if any
    pub audit: Option<AuditRecord>,
}

/// Detection and policy engine bound to one configuration
pub struct ClassificationGate {
    config: GateConfig,
    matcher: Option<Arc<MarkingMatcher>>,
}

impl ClassificationGate {
    /// Create a gate using the built-in marking patterns
    ///
    /// The configuration is validated; a zero-line scope would pass every
    /// document as unclassified.
    pub fn new(config: GateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            matcher: None,
        })
    }

    /// Create a gate with a custom pattern set
    pub fn with_matcher(config: GateConfig, matcher: Arc<MarkingMatcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            matcher: Some(matcher),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    fn matcher(&self) -> &MarkingMatcher {
        self.matcher
            .as_deref()
            .unwrap_or_else(|| MarkingMatcher::standard())
    }

    /// Scan text for classification markings
    pub fn scan(&self, text: &str) -> Verdict {
        let markings: Vec<_> = self
            .matcher()
            .find_markings(text, self.config.scope)
            .into_iter()
            .map(resolve)
            .collect();
        let verdict = aggregate(markings);

        if verdict.detected {
            tracing::info!(
                level = verdict.level,
                classification = %verdict.canonical_text,
                markings = verdict.markings.len(),
                restricted = verdict.warning_required,
                "Classification found"
            );
        } else {
            tracing::debug!("No classification detected");
        }

        verdict
    }

    /// Scan and write a `classification_detected` record when a marking is found
    ///
    /// Undetected content writes nothing. The record carries only sanitized
    /// content, like every other audit record.
    pub async fn scan_and_record(
        &self,
        text: &str,
        sink: &dyn AuditSink,
    ) -> Result<(Verdict, Option<AuditRecord>)> {
        let verdict = self.scan(text);
        if !verdict.detected {
            return Ok((verdict, None));
        }

        let record = AuditRecord::from_verdict(
            AuditEventType::ClassificationDetected,
            &verdict,
            text,
            self.config.preview_chars,
        );
        sink.record(record.clone()).await?;
        Ok((verdict, Some(record)))
    }

    /// Scan optional content; missing content yields a benign verdict
    pub fn scan_optional(&self, text: Option<&str>) -> Verdict {
        match text {
            Some(text) => self.scan(text),
            None => empty_verdict(),
        }
    }

    /// Scan and stamp the result with time and analyzer
    pub fn report(&self, text: &str) -> ClassificationReport {
        ClassificationReport {
            verdict: self.scan(text),
            generated_at: Utc::now(),
            analyzer: ANALYZER.to_string(),
        }
    }

    /// Final decision for a verdict, provider and override flag
    pub fn decide(
        &self,
        verdict: &Verdict,
        provider: Option<&str>,
        override_granted: bool,
    ) -> PolicyDecision {
        self.decide_with_event(verdict, provider, override_granted).0
    }

    fn decide_with_event(
        &self,
        verdict: &Verdict,
        provider: Option<&str>,
        override_granted: bool,
    ) -> (PolicyDecision, Option<AuditEventType>) {
        if self.config.strict && should_block(verdict.level) {
            return (
                blocked(verdict.level),
                Some(AuditEventType::ClassificationBlocked),
            );
        }

        let gate = evaluate(verdict.level, override_granted);
        let provider_decision = provider
            .and_then(|name| self.config.provider(name))
            .map(|policy| evaluate_provider(verdict, policy, override_granted));

        let provider_refused = provider_decision
            .as_ref()
            .is_some_and(|d| d.requires_warning);
        let decision = match provider_decision {
            Some(p) => p.merge(gate),
            None => gate,
        };

        let event = if decision.requires_audit {
            Some(AuditEventType::ClassificationWarningOverridden)
        } else if decision.allowed {
            None
        } else if provider_refused {
            Some(AuditEventType::ClassificationIncompatible)
        } else {
            Some(AuditEventType::ClassificationWarningShown)
        };

        (decision, event)
    }

    /// Scan, decide, and write at most one audit record
    ///
    /// A sink failure is returned as an error; the decision itself is never
    /// relaxed because auditing failed.
    pub async fn process(
        &self,
        request: &ProcessingRequest,
        sink: &dyn AuditSink,
    ) -> Result<GateOutcome> {
        let content = request.content.as_deref();
        let verdict = self.scan_optional(content);
        let (decision, event) =
            self.decide_with_event(&verdict, request.provider.as_deref(), request.override_granted);

        if !decision.allowed {
            tracing::warn!(
                level = verdict.level,
                classification = %verdict.canonical_text,
                provider = request.provider.as_deref().unwrap_or("-"),
                reason = %decision.reason,
                "Processing refused"
            );
        }

        let audit = match event {
            Some(event_type) => {
                let mut record = AuditRecord::from_verdict(
                    event_type,
                    &verdict,
                    content.unwrap_or_default(),
                    self.config.preview_chars,
                );
                if let Some(provider) = &request.provider {
                    record = record.with_provider(provider.clone());
                }
                sink.record(record.clone()).await?;
                Some(record)
            }
            None => None,
        };

        Ok(GateOutcome {
            verdict,
            decision,
            audit,
        })
    }
}

impl Default for ClassificationGate {
    fn default() -> Self {
        Self {
            config: GateConfig::default(),
            matcher: None,
        }
    }
}
