//! Uncommitted Fragment Transaction Detector
//!
//! Detects `beginTransaction()` results that never reach a `commit*()`
//! call. FragmentTransaction is the classic fluent API: every `add`,
//! `replace`, `setCustomAnimations` and so on returns the transaction
//! itself, so the detector tells the tracker about the whole builder
//! vocabulary and the chain stays tracked end to end.
//!
//! ## Anti-Pattern
//!
//! ```kotlin
//! fun showDetail(fm: FragmentManager) {
//!     fm.beginTransaction()
//!         .replace(R.id.container, DetailFragment())
//!         .addToBackStack(null)
//!     // .commit() is missing -- nothing happens at all!
//! }
//! ```

use super::{CleanupEngine, CleanupSpec, Detector};
use crate::analysis::{Finding, LeakIssue};
use crate::uast::ParsedUnit;

const SPEC: CleanupSpec = CleanupSpec {
    issue: LeakIssue::UncommittedTransaction,
    factories: &["beginTransaction"],
    cleanup: &[
        "commit",
        "commitAllowingStateLoss",
        "commitNow",
        "commitNowAllowingStateLoss",
    ],
    self_returning: &[
        "add",
        "replace",
        "remove",
        "hide",
        "show",
        "attach",
        "detach",
        "addToBackStack",
        "disallowAddToBackStack",
        "setCustomAnimations",
        "setTransition",
        "setTransitionStyle",
        "setPrimaryNavigationFragment",
        "setReorderingAllowed",
        "setMaxLifecycle",
        "runOnCommit",
    ],
};

/// Detector for fragment transactions that are never committed
pub struct FragmentTransactionDetector;

impl FragmentTransactionDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FragmentTransactionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for FragmentTransactionDetector {
    fn issue(&self) -> LeakIssue {
        LeakIssue::UncommittedTransaction
    }

    fn detect(&self, unit: &ParsedUnit) -> Vec<Finding> {
        CleanupEngine::analyze(unit, &SPEC)
    }
}
