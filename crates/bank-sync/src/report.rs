//! Batch reports and diagnostics
//!
//! Every skip condition in a batch produces exactly one classified
//! diagnostic naming the offending path. Diagnostics never abort the batch;
//! the report carries them alongside the counters so callers can decide what
//! to surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Classified skip conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Path does not match the platform/language convention.
    UnresolvablePath,
    /// No manifest entry for a resolved bank or media id.
    ManifestMiss,
    /// Resolved language is not in the manifest's declared set. A numeric
    /// language token gets a distinct message since it signals sub-folder
    /// generation rather than a stray directory.
    UnrecognizedLanguage,
    /// No group store is wired; grouping skipped for the whole batch.
    MissingGroupStore,
}

/// One classified skip condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Offending path; absent for batch-scoped conditions.
    pub path: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn unresolvable(path: &str) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::UnresolvablePath,
            path: Some(path.to_string()),
            message: format!("Path '{path}' does not match the platform/language convention"),
        }
    }

    pub fn manifest_miss(path: &str, detail: impl std::fmt::Display) -> Self {
        Self {
            severity: Severity::Warning,
            kind: DiagnosticKind::ManifestMiss,
            path: Some(path.to_string()),
            message: format!("No manifest entry for '{path}': {detail}"),
        }
    }

    pub fn unrecognized_language(path: &str, language: &str, bank: &str) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::UnrecognizedLanguage,
            path: Some(path.to_string()),
            message: format!(
                "Language '{language}' of '{path}' is not declared for bank '{bank}'"
            ),
        }
    }

    pub fn numeric_language(path: &str, language: &str) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::UnrecognizedLanguage,
            path: Some(path.to_string()),
            message: format!(
                "Sub-folder generation is not supported: '{path}' sits in numeric folder '{language}'"
            ),
        }
    }

    pub fn missing_group_store() -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::MissingGroupStore,
            path: None,
            message: "No group store configured; group assignments skipped for this batch"
                .to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Summary of one applied batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,

    /// Bank files whose record update applied.
    pub banks_added: usize,
    /// Media files that updated at least one bank bucket.
    pub media_added: usize,
    /// Bank files whose platform entry was removed.
    pub banks_removed: usize,
    /// Media files removed from at least one bank bucket.
    pub media_removed: usize,
    /// Files assigned (or confirmed) in a distribution group.
    pub grouped: usize,
    /// Record documents written or deleted at persist time.
    pub records_flushed: usize,

    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            started_at: Utc::now(),
            banks_added: 0,
            media_added: 0,
            banks_removed: 0,
            media_removed: 0,
            grouped: 0,
            records_flushed: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// True when no error-severity diagnostic was emitted.
    pub fn success(&self) -> bool {
        self.diagnostics
            .iter()
            .all(|d| d.severity != Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
