//! Audit records and sinks
//!
//! Records are built from a verdict and pass content through the sanitizer
//! on construction, so a record can never carry raw classified text. Sinks are
//! append-only collaborators; buffering and delivery live here, not in the
//! detection core.

use crate::error::{MarkingError, Result};
use crate::sanitize::sanitize_for_log_with;
use crate::types::Verdict;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Kind of audited classification event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A marking was found while scanning, written by
    /// [`ClassificationGate::scan_and_record`](crate::gate::ClassificationGate::scan_and_record)
    ClassificationDetected,
    /// Processing was refused pending user override
    ClassificationWarningShown,
    /// The user overrode a classification warning
    ClassificationWarningOverridden,
    /// The selected provider is not cleared for the classification
    ClassificationIncompatible,
    /// Processing was refused with no override possible
    ClassificationBlocked,
}

impl AuditEventType {
    /// Wire name of the event type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassificationDetected => "classification_detected",
            Self::ClassificationWarningShown => "classification_warning_shown",
            Self::ClassificationWarningOverridden => "classification_warning_overridden",
            Self::ClassificationIncompatible => "classification_incompatible",
            Self::ClassificationBlocked => "classification_blocked",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique record identifier (aud-<uuid>)
    pub id: String,

    /// What happened
    pub event_type: AuditEventType,

    /// Ordinal of the verdict
    pub classification_level: u8,

    /// Canonical name of the verdict
    pub classification_text: String,

    /// Sanitizer output for the subject or body
    pub sanitized_content: String,

    /// Number of markings behind the verdict
    pub markings_count: usize,

    /// Provider the content was destined for, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// When the record was created
    pub timestamp: DateTime<Utc>,

    /// Optional key-value metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl AuditRecord {
    /// Build a record, sanitizing `content` against `verdict`
    pub fn from_verdict(
        event_type: AuditEventType,
        verdict: &Verdict,
        content: &str,
        preview_chars: usize,
    ) -> Self {
        Self {
            id: format!("aud-{}", uuid::Uuid::new_v4()),
            event_type,
            classification_level: verdict.level,
            classification_text: verdict.canonical_text.clone(),
            sanitized_content: sanitize_for_log_with(content, verdict, preview_chars),
            markings_count: verdict.markings.len(),
            provider: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Set the destination provider
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Append-only destination for audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append a record
    async fn record(&self, record: AuditRecord) -> Result<()>;

    /// Number of records currently retained
    async fn count(&self) -> Result<usize>;

    /// Most recent records, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>>;
}

/// In-memory audit sink with bounded capacity
///
/// Oldest records are evicted once `max_records` is exceeded.
pub struct MemoryAuditSink {
    records: Arc<RwLock<Vec<AuditRecord>>>,
    max_records: usize,
}

impl MemoryAuditSink {
    /// Create a sink retaining at most `max_records` (0 = unbounded)
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            max_records,
        }
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        tracing::warn!(
            record_id = %record.id,
            event_type = %record.event_type,
            level = record.classification_level,
            classification = %record.classification_text,
            "Classification audit"
        );

        let mut records = self.records.write().await;
        records.push(record);

        if self.max_records > 0 && records.len() > self.max_records {
            let drain_count = records.len() - self.max_records;
            records.drain(..drain_count);
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

/// JSON-lines file sink
///
/// Each record is one line of JSON. Appends are serialized through an
/// internal lock so concurrent writers never interleave lines.
pub struct FileAuditSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileAuditSink {
    /// Create a sink appending to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sink_error(&self, reason: String) -> MarkingError {
        MarkingError::Audit {
            sink: self.path.display().to_string(),
            reason,
        }
    }

    async fn read_all(&self) -> Result<Vec<AuditRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.sink_error(format!("read failed: {}", e))),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(MarkingError::from))
            .collect()
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    self.sink_error(format!(
                        "failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.sink_error(format!("open failed: {}", e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.sink_error(format!("write failed: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| self.sink_error(format!("flush failed: {}", e)))?;

        tracing::debug!(
            path = %self.path.display(),
            record_id = %record.id,
            event_type = %record.event_type,
            "Audit record appended"
        );
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read_all().await?.len())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let records = self.read_all().await?;
        Ok(records.into_iter().rev().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::level::ClassificationLevel;
    use crate::types::{Marking, MarkingFamily};

    fn secret_verdict() -> Verdict {
        aggregate(vec![Marking {
            raw_text: "SECRET".to_string(),
            classification: ClassificationLevel::Secret,
            line: 1,
            family: MarkingFamily::Banner,
        }])
    }

    fn test_record(event_type: AuditEventType) -> AuditRecord {
        AuditRecord::from_verdict(
            event_type,
            &secret_verdict(),
            "SECRET\nquarterly budget numbers",
            100,
        )
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("a3s-marking-test-{}", uuid::Uuid::new_v4()))
            .join("audit.jsonl")
    }

    #[test]
    fn test_record_is_sanitized() {
        let record = test_record(AuditEventType::ClassificationWarningShown);
        assert!(record.id.starts_with("aud-"));
        assert_eq!(record.classification_level, 2);
        assert_eq!(record.classification_text, "SECRET");
        assert_eq!(record.markings_count, 1);
        assert!(!record.sanitized_content.contains("budget"));
        assert!(record.sanitized_content.contains("SECRET"));
    }

    #[test]
    fn test_record_unclassified_preview() {
        let record = AuditRecord::from_verdict(
            AuditEventType::ClassificationDetected,
            &aggregate(vec![]),
            "Hi team, let's meet Thursday.",
            10,
        );
        assert_eq!(record.sanitized_content, "Hi team, l...");
    }

    #[test]
    fn test_record_serialization() {
        let record = test_record(AuditEventType::ClassificationWarningOverridden)
            .with_provider("openai")
            .with_metadata("user", "analyst");

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"eventType\":\"classification_warning_overridden\""));
        assert!(json.contains("\"classificationLevel\":2"));
        assert!(json.contains("\"classificationText\":\"SECRET\""));
        assert!(json.contains("\"sanitizedContent\""));
        assert!(json.contains("\"provider\":\"openai\""));

        let parsed: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, record.id);
        assert_eq!(parsed.metadata["user"], "analyst");
    }

    #[test]
    fn test_record_skips_empty_optional_fields() {
        let json = serde_json::to_string(&test_record(AuditEventType::ClassificationBlocked)).unwrap();
        assert!(!json.contains("provider"));
        assert!(!json.contains("metadata"));
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(
            AuditEventType::ClassificationIncompatible.to_string(),
            "classification_incompatible"
        );
        let json = serde_json::to_string(&AuditEventType::ClassificationWarningShown).unwrap();
        assert_eq!(json, "\"classification_warning_shown\"");
    }

    #[tokio::test]
    async fn test_memory_sink_record_and_count() {
        let sink = MemoryAuditSink::default();
        assert_eq!(sink.count().await.unwrap(), 0);

        sink.record(test_record(AuditEventType::ClassificationWarningShown))
            .await
            .unwrap();
        assert_eq!(sink.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_sink_recent_newest_first() {
        let sink = MemoryAuditSink::default();
        for i in 0..5 {
            let record = test_record(AuditEventType::ClassificationDetected)
                .with_metadata("seq", i.to_string());
            sink.record(record).await.unwrap();
        }

        let recent = sink.recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].metadata["seq"], "4");
        assert_eq!(recent[2].metadata["seq"], "2");
    }

    #[tokio::test]
    async fn test_memory_sink_max_capacity() {
        let sink = MemoryAuditSink::new(3);
        for i in 0..5 {
            let record = test_record(AuditEventType::ClassificationDetected)
                .with_metadata("seq", i.to_string());
            sink.record(record).await.unwrap();
        }

        assert_eq!(sink.count().await.unwrap(), 3);
        let recent = sink.recent(10).await.unwrap();
        assert_eq!(recent[0].metadata["seq"], "4");
        assert_eq!(recent[2].metadata["seq"], "2");
    }

    #[tokio::test]
    async fn test_file_sink_appends_json_lines() {
        let path = temp_path();
        let sink = FileAuditSink::new(&path);

        sink.record(test_record(AuditEventType::ClassificationWarningShown))
            .await
            .unwrap();
        sink.record(test_record(AuditEventType::ClassificationWarningOverridden))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("budget"));

        assert_eq!(sink.count().await.unwrap(), 2);
        let recent = sink.recent(1).await.unwrap();
        assert_eq!(
            recent[0].event_type,
            AuditEventType::ClassificationWarningOverridden
        );

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_file_sink_missing_file_is_empty() {
        let sink = FileAuditSink::new(temp_path());
        assert_eq!(sink.count().await.unwrap(), 0);
        assert!(sink.recent(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_sink_unwritable_path_is_audit_error() {
        let blocker = temp_path();
        std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        std::fs::write(&blocker, "not a directory").unwrap();

        // Parent of the sink path is a regular file
        let sink = FileAuditSink::new(blocker.join("audit.jsonl"));
        let err = sink
            .record(test_record(AuditEventType::ClassificationWarningShown))
            .await
            .unwrap_err();
        assert!(matches!(err, MarkingError::Audit { .. }));

        std::fs::remove_dir_all(blocker.parent().unwrap()).unwrap();
    }
}
