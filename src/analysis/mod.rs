// Analysis module - issue model shared by every detector
#![allow(dead_code)]

pub mod detectors;

pub use detectors::{
    CleanupEngine, CleanupSpec, CursorDetector, Detector, FragmentTransactionDetector,
    PrefsEditorDetector, StreamDetector, TypedArrayDetector,
};

use crate::uast::Location;
use std::path::PathBuf;

/// Confidence level for a leak finding
///
/// The analysis is a heuristic single pass, so findings carry a confidence
/// score rather than a proof. Escape-free paths with no cleanup call rank
/// high; anything that relied on a fallback (unresolved calls, unknown
/// receivers) ranks lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// The tracked value may have escaped through a path we model coarsely
    Low,
    /// Standard single-pass result
    Medium,
    /// No escape and no cleanup anywhere in the method
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Score from 0.0 to 1.0 for sorting/filtering
    pub fn score(&self) -> f64 {
        match self {
            Confidence::Low => 0.25,
            Confidence::Medium => 0.50,
            Confidence::High => 0.75,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource-leak finding produced by a detector
#[derive(Debug, Clone)]
pub struct Finding {
    /// The kind of leak issue
    pub issue: LeakIssue,

    /// File the allocation call lives in
    pub file: PathBuf,

    /// Location of the allocation call
    pub location: Location,

    /// Enclosing function or method name
    pub function: String,

    /// Name of the allocating call (e.g. `query`, `beginTransaction`)
    pub allocation: String,

    /// Severity level
    pub severity: Severity,

    /// Confidence level
    pub confidence: Confidence,

    /// Human-readable description
    pub message: String,
}

impl Finding {
    pub fn new(
        issue: LeakIssue,
        file: PathBuf,
        location: Location,
        function: impl Into<String>,
        allocation: impl Into<String>,
    ) -> Self {
        let allocation = allocation.into();
        let severity = issue.default_severity();
        let message = issue.default_message(&allocation);

        Self {
            issue,
            file,
            location,
            function: function.into(),
            allocation,
            severity,
            confidence: Confidence::Medium,
            message,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Types of resource-leak issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeakIssue {
    /// Database cursor opened but never closed
    UnclosedCursor,

    /// TypedArray obtained but never recycled
    UnrecycledTypedArray,

    /// Fragment transaction begun but never committed
    UncommittedTransaction,

    /// SharedPreferences editor modified but never applied/committed
    UnappliedEdit,

    /// Stream or reader opened but never closed
    UnclosedStream,
}

impl LeakIssue {
    pub fn all() -> &'static [LeakIssue] {
        &[
            LeakIssue::UnclosedCursor,
            LeakIssue::UnrecycledTypedArray,
            LeakIssue::UncommittedTransaction,
            LeakIssue::UnappliedEdit,
            LeakIssue::UnclosedStream,
        ]
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            LeakIssue::UnclosedCursor => Severity::Error,
            LeakIssue::UnrecycledTypedArray => Severity::Warning,
            LeakIssue::UncommittedTransaction => Severity::Error,
            LeakIssue::UnappliedEdit => Severity::Warning,
            LeakIssue::UnclosedStream => Severity::Warning,
        }
    }

    pub fn default_message(&self, allocation: &str) -> String {
        match self {
            LeakIssue::UnclosedCursor => {
                format!("Cursor from '{allocation}()' is never closed")
            }
            LeakIssue::UnrecycledTypedArray => {
                format!("TypedArray from '{allocation}()' is never recycled")
            }
            LeakIssue::UncommittedTransaction => {
                format!("Transaction from '{allocation}()' is never committed")
            }
            LeakIssue::UnappliedEdit => {
                format!("Editor from '{allocation}()' is never applied or committed")
            }
            LeakIssue::UnclosedStream => {
                format!("Stream from '{allocation}()' is never closed")
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LeakIssue::UnclosedCursor => "RL001",
            LeakIssue::UnrecycledTypedArray => "RL002",
            LeakIssue::UncommittedTransaction => "RL003",
            LeakIssue::UnappliedEdit => "RL004",
            LeakIssue::UnclosedStream => "RL005",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LeakIssue::UnclosedCursor => "unclosed cursor",
            LeakIssue::UnrecycledTypedArray => "unrecycled TypedArray",
            LeakIssue::UncommittedTransaction => "uncommitted transaction",
            LeakIssue::UnappliedEdit => "unapplied editor",
            LeakIssue::UnclosedStream => "unclosed stream",
        }
    }

    /// Flag name accepted by `--detect`
    pub fn flag(&self) -> &'static str {
        match self {
            LeakIssue::UnclosedCursor => "cursor",
            LeakIssue::UnrecycledTypedArray => "typed-array",
            LeakIssue::UncommittedTransaction => "transaction",
            LeakIssue::UnappliedEdit => "prefs-editor",
            LeakIssue::UnclosedStream => "stream",
        }
    }

    pub fn from_flag(flag: &str) -> Option<LeakIssue> {
        LeakIssue::all()
            .iter()
            .copied()
            .find(|issue| issue.flag() == flag)
    }
}

/// Severity levels for leak findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
