//! Gate configuration
//!
//! Loaded once by the caller and treated as immutable afterwards. Every field
//! has a default, so an empty JSON object is a valid configuration.

use crate::error::{MarkingError, Result};
use crate::policy::ProviderPolicy;
use crate::sanitize::DEFAULT_PREVIEW_CHARS;
use crate::types::ScanScope;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Configuration for a [`ClassificationGate`](crate::gate::ClassificationGate)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    /// Leading lines searched for markings
    #[serde(default)]
    pub scope: ScanScope,

    /// Preview length for unclassified content in audit records
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Refuse TOP SECRET and above outright, ignoring overrides
    #[serde(default)]
    pub strict: bool,

    /// Per-provider classification clearances
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderPolicy>,
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

/// Case-folded provider name used for uniqueness and lookup
fn provider_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            scope: ScanScope::default(),
            preview_chars: default_preview_chars(),
            strict: false,
            providers: Vec::new(),
        }
    }
}

impl GateConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GateConfig = serde_json::from_str(json)
            .map_err(|e| MarkingError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MarkingError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            lines_to_check = config.scope.lines_to_check,
            providers = config.providers.len(),
            strict = config.strict,
            "Gate config loaded"
        );
        Ok(config)
    }

    /// Check value ranges and provider uniqueness
    pub fn validate(&self) -> Result<()> {
        if self.scope.lines_to_check == 0 {
            return Err(MarkingError::Config(
                "linesToCheck must be >= 1".to_string(),
            ));
        }
        if self.preview_chars == 0 {
            return Err(MarkingError::Config(
                "previewChars must be >= 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            let key = provider_key(&provider.name);
            if key.is_empty() {
                return Err(MarkingError::Config(
                    "Provider name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(key) {
                return Err(MarkingError::Config(format!(
                    "Duplicate provider '{}'",
                    provider.name
                )));
            }
        }

        Ok(())
    }

    /// Look up a provider policy by name, case-insensitively
    pub fn provider(&self, name: &str) -> Option<&ProviderPolicy> {
        let key = provider_key(name);
        self.providers.iter().find(|p| provider_key(&p.name) == key)
    }

    /// Add a provider policy
    pub fn with_provider(mut self, provider: ProviderPolicy) -> Self {
        self.providers.push(provider);
        self
    }
}
