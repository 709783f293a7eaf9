//! Unrecycled TypedArray Detector
//!
//! `obtainStyledAttributes()` and friends hand out entries from a shared
//! pool; a TypedArray that is never `recycle()`d is lost to the pool for
//! good. Custom views hit this constantly in their attribute-parsing
//! constructors.

use super::{CleanupEngine, CleanupSpec, Detector};
use crate::analysis::{Finding, LeakIssue};
use crate::uast::ParsedUnit;

const SPEC: CleanupSpec = CleanupSpec {
    issue: LeakIssue::UnrecycledTypedArray,
    factories: &[
        "obtainStyledAttributes",
        "obtainAttributes",
        "obtainTypedArray",
    ],
    cleanup: &["recycle", "use"],
    self_returning: &[],
};

/// Detector for TypedArrays that never reach `recycle()`
pub struct TypedArrayDetector;

impl TypedArrayDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypedArrayDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for TypedArrayDetector {
    fn issue(&self) -> LeakIssue {
        LeakIssue::UnrecycledTypedArray
    }

    fn detect(&self, unit: &ParsedUnit) -> Vec<Finding> {
        CleanupEngine::analyze(unit, &SPEC)
    }
}
