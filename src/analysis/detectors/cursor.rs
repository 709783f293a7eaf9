//! Unclosed Cursor Detector
//!
//! Detects database cursors that are opened but never closed.
//!
//! ## Anti-Pattern
//!
//! ```kotlin
//! fun countRows(db: SQLiteDatabase): Int {
//!     val cursor = db.query("items", null, null, null, null, null, null)
//!     return cursor.count
//!     // cursor.close() is missing!
//! }
//! ```
//!
//! ## Why It's Bad
//!
//! - Each open cursor pins a CursorWindow (up to 2 MB of native memory)
//! - SQLite eventually throws `SQLiteCantOpenDatabaseException`
//! - The framework logs "Cursor finalized without prior close()" at best
//!
//! ## Better Alternatives
//!
//! ```kotlin
//! fun countRows(db: SQLiteDatabase): Int {
//!     db.query("items", null, null, null, null, null, null).use { cursor ->
//!         return cursor.count
//!     }
//! }
//! ```

use super::{CleanupEngine, CleanupSpec, Detector};
use crate::analysis::{Finding, LeakIssue};
use crate::uast::ParsedUnit;

const SPEC: CleanupSpec = CleanupSpec {
    issue: LeakIssue::UnclosedCursor,
    factories: &[
        "query",
        "rawQuery",
        "queryWithFactory",
        "rawQueryWithFactory",
    ],
    cleanup: &["close", "use"],
    self_returning: &[],
};

/// Detector for cursors that never reach `close()`
pub struct CursorDetector;

impl CursorDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CursorDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for CursorDetector {
    fn issue(&self) -> LeakIssue {
        LeakIssue::UnclosedCursor
    }

    fn detect(&self, unit: &ParsedUnit) -> Vec<Finding> {
        CleanupEngine::analyze(unit, &SPEC)
    }
}
