//! Unapplied SharedPreferences Editor Detector
//!
//! An editor obtained from `SharedPreferences.edit()` buffers every
//! `putString`/`remove`/`clear` until `apply()` or `commit()` flushes
//! them. Forgetting the flush silently drops the writes.
//!
//! The put/remove family is fluent (each returns the editor), so chained
//! writes stay tracked the same way fragment transactions do.

use super::{CleanupEngine, CleanupSpec, Detector};
use crate::analysis::{Finding, LeakIssue};
use crate::uast::ParsedUnit;

const SPEC: CleanupSpec = CleanupSpec {
    issue: LeakIssue::UnappliedEdit,
    factories: &["edit"],
    cleanup: &["apply", "commit"],
    self_returning: &[
        "putString",
        "putStringSet",
        "putInt",
        "putLong",
        "putFloat",
        "putBoolean",
        "remove",
        "clear",
    ],
};

/// Detector for preference edits that are never applied
pub struct PrefsEditorDetector;

impl PrefsEditorDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrefsEditorDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for PrefsEditorDetector {
    fn issue(&self) -> LeakIssue {
        LeakIssue::UnappliedEdit
    }

    fn detect(&self, unit: &ParsedUnit) -> Vec<Finding> {
        CleanupEngine::analyze(unit, &SPEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uast::{lower, Language};
    use std::path::PathBuf;

    fn analyze_java(source: &str) -> Vec<Finding> {
        let unit = lower::lower_file(&PathBuf::from("Settings.java"), source, Language::Java)
            .expect("lowering should succeed");
        PrefsEditorDetector::new().detect(&unit)
    }

    #[test]
    fn test_unapplied_edit_reported() {
        let findings = analyze_java(
            r#"
            class Settings {
                void save(SharedPreferences prefs, String value) {
                    SharedPreferences.Editor editor = prefs.edit();
                    editor.putString("key", value);
                }
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, LeakIssue::UnappliedEdit);
        assert_eq!(findings[0].allocation, "edit");
    }

    #[test]
    fn test_fluent_apply_not_reported() {
        let findings = analyze_java(
            r#"
            class Settings {
                void save(SharedPreferences prefs, String value) {
                    prefs.edit().putString("key", value).apply();
                }
            }
            "#,
        );
        assert!(findings.is_empty(), "findings: {findings:?}");
    }

    #[test]
    fn test_split_apply_not_reported() {
        let findings = analyze_java(
            r#"
            class Settings {
                void save(SharedPreferences prefs, String value) {
                    SharedPreferences.Editor editor = prefs.edit();
                    editor.putString("key", value);
                    editor.apply();
                }
            }
            "#,
        );
        assert!(findings.is_empty(), "findings: {findings:?}");
    }
}
