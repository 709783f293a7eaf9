//! Unclosed Stream Detector
//!
//! Covers the context/resolver stream factories (`openFileInput`,
//! `openInputStream`, ...). Wrapping constructors and the `use {}` block
//! both count as handing the stream off, so only a stream that is plainly
//! dropped on the floor is reported.

use super::{CleanupEngine, CleanupSpec, Detector};
use crate::analysis::{Finding, LeakIssue};
use crate::uast::ParsedUnit;

const SPEC: CleanupSpec = CleanupSpec {
    issue: LeakIssue::UnclosedStream,
    factories: &[
        "openFileInput",
        "openFileOutput",
        "openInputStream",
        "openOutputStream",
        "openRawResource",
    ],
    cleanup: &["close", "use"],
    self_returning: &[],
};

/// Detector for streams that never reach `close()`
pub struct StreamDetector;

impl StreamDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StreamDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StreamDetector {
    fn issue(&self) -> LeakIssue {
        LeakIssue::UnclosedStream
    }

    fn detect(&self, unit: &ParsedUnit) -> Vec<Finding> {
        CleanupEngine::analyze(unit, &SPEC)
    }
}
