//! Structured audit trail and validator diagnostics.
//!
//! Owned per-analysis and threaded through by value (never a process-wide
//! singleton) so independent analyses over independent snapshots never share
//! mutable state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence: u32,
    pub component: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, component: impl Into<String>, severity: Severity, message: impl Into<String>) {
        let sequence = self.entries.len() as u32;
        self.entries.push(AuditEntry {
            sequence,
            component: component.into(),
            message: message.into(),
            severity,
        });
    }

    pub fn info(&mut self, component: impl Into<String>, message: impl Into<String>) {
        self.record(component, Severity::Info, message);
    }

    pub fn warn(&mut self, component: impl Into<String>, message: impl Into<String>) {
        self.record(component, Severity::Warning, message);
    }

    pub fn error(&mut self, component: impl Into<String>, message: impl Into<String>) {
        self.record(component, Severity::Error, message);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.severity >= Severity::Warning)
            .map(|e| format!("[{}] {}", e.component, e.message))
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }
}

/// One check performed by a validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub check: String,
    pub severity: Severity,
    pub message: String,
}

impl TestResult {
    pub fn ok(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub results: Vec<TestResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.severity == Severity::Error)
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.results.extend(other.results);
    }
}
