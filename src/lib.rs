//! # a3s-marking
//!
//! Security-classification marking detection and processing gate for the A3S
//! ecosystem.
//!
//! ## Overview
//!
//! `a3s-marking` scans the header lines of plain-text documents for
//! classification markings (`SECRET`, `TOP SECRET//NOFORN`,
//! `Classification: CONFIDENTIAL`, `(S)`), reduces them to a single verdict,
//! and decides whether the content may be sent to a downstream service.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_marking::{evaluate, ClassificationGate};
//!
//! let gate = ClassificationGate::default();
//! let verdict = gate.scan("SECRET\n\nPlease review the attached budget.");
//! assert_eq!(verdict.canonical_text, "SECRET");
//!
//! let decision = evaluate(verdict.level, false);
//! assert!(!decision.allowed);
//! assert!(decision.requires_warning);
//! ```
//!
//! ## Pipeline
//!
//! - **matcher** — ordered pattern families applied to the first N lines
//! - **level** — token normalization and the ordinal level table
//! - **aggregate** — highest-severity verdict over all markings
//! - **policy** — pure allow/warn/audit decision table and provider clearances
//! - **sanitize** — content-free representations for logging
//! - **audit** — audit records and append-only sinks
//! - **gate** — configuration-bound facade over the whole pipeline

pub mod aggregate;
pub mod audit;
pub mod config;
pub mod error;
pub mod gate;
pub mod level;
pub mod matcher;
pub mod policy;
pub mod sanitize;
pub mod types;

// Re-export core types
pub use aggregate::{aggregate, explanation};
pub use audit::{AuditEventType, AuditRecord, AuditSink, FileAuditSink, MemoryAuditSink};
pub use config::GateConfig;
pub use error::{MarkingError, Result};
pub use gate::{ClassificationGate, ClassificationReport, GateOutcome, ProcessingRequest};
pub use level::{level_of, normalize, ClassificationLevel};
pub use matcher::{find_markings, MarkingMatcher, PatternDef, RawMatch};
pub use policy::{evaluate, evaluate_provider, should_block, ProviderPolicy};
pub use sanitize::{sanitize_for_log, sanitize_for_log_with};
pub use types::{Marking, MarkingFamily, PolicyDecision, ScanScope, Verdict};
