// Resource-leak detectors
//
// Each detector pairs an acquisition vocabulary (factory methods) with a
// cleanup vocabulary and hands both to the shared cleanup engine. The
// engine does the actual flow tracking; detectors stay declarative.
#![allow(dead_code)]

mod cursor;
mod prefs_editor;
mod stream;
mod transaction;
mod typed_array;

pub use cursor::CursorDetector;
pub use prefs_editor::PrefsEditorDetector;
pub use stream::StreamDetector;
pub use transaction::FragmentTransactionDetector;
pub use typed_array::TypedArrayDetector;

use crate::analysis::{Confidence, Finding, LeakIssue};
use crate::flow::{get_variable_element, FlowTracker, SinkKind};
use crate::uast::{NodeId, NodeKind, ParsedUnit};
use tracing::trace;

/// Trait for resource-leak detectors
pub trait Detector: Send + Sync {
    /// The issue kind this detector reports
    fn issue(&self) -> LeakIssue;

    /// Run the detector on one lowered compilation unit
    fn detect(&self, unit: &ParsedUnit) -> Vec<Finding>;
}

/// Every detector, in reporting order
pub fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(CursorDetector::new()),
        Box::new(TypedArrayDetector::new()),
        Box::new(FragmentTransactionDetector::new()),
        Box::new(PrefsEditorDetector::new()),
        Box::new(StreamDetector::new()),
    ]
}

/// Vocabulary describing one resource lifecycle
#[derive(Debug, Clone)]
pub struct CleanupSpec {
    pub issue: LeakIssue,
    /// Method names whose call result is the tracked resource
    pub factories: &'static [&'static str],
    /// Method names that release the resource when called on it
    pub cleanup: &'static [&'static str],
    /// Fluent methods on the resource that return their receiver
    pub self_returning: &'static [&'static str],
}

/// Shared engine: finds acquisition calls, tracks each one through its
/// enclosing function, and folds the resulting sink events into findings.
///
/// An acquisition is reported when the tracked value neither reaches a
/// cleanup call as a receiver nor escapes the function (returned, stored
/// into a field, or passed on as an argument). Escapes suppress the
/// finding: once the value leaves the method, the cleanup obligation is
/// someone else's.
pub struct CleanupEngine;

impl CleanupEngine {
    pub fn analyze(unit: &ParsedUnit, spec: &CleanupSpec) -> Vec<Finding> {
        let mut findings = Vec::new();

        for function in &unit.functions {
            for call in Self::calls_in(unit, function.body) {
                let NodeKind::Call { name, .. } = unit.tree.kind(call) else {
                    continue;
                };
                if !spec.factories.contains(&name.as_str()) {
                    continue;
                }
                let allocation = name.clone();

                let mut tracker = FlowTracker::new(&unit.tree, &[call])
                    .with_self_returning(spec.self_returning.iter().copied());
                // Seed the variable the result is stored into, if any
                if let Some(decl) = get_variable_element(&unit.tree, call, true, false) {
                    tracker = tracker.with_references(&[decl]);
                }
                let report = tracker.analyze(function.body);

                let cleaned = report.receiver_calls().any(|receiver_call| {
                    match unit.tree.kind(receiver_call) {
                        NodeKind::Call { name, .. } => {
                            spec.cleanup.contains(&name.as_str())
                        }
                        _ => false,
                    }
                });
                if cleaned {
                    continue;
                }
                if report.escaped() {
                    trace!(
                        function = %function.name,
                        allocation = %allocation,
                        "escaped, suppressing"
                    );
                    continue;
                }

                let touched = report
                    .events_of(SinkKind::Receiver)
                    .next()
                    .is_some();
                let confidence = if touched {
                    Confidence::Medium
                } else {
                    Confidence::High
                };
                findings.push(
                    Finding::new(
                        spec.issue,
                        unit.path.clone(),
                        unit.tree.location(call),
                        function.name.clone(),
                        allocation,
                    )
                    .with_confidence(confidence),
                );
            }
        }

        findings.sort_by(|a, b| {
            a.location
                .line
                .cmp(&b.location.line)
                .then(a.location.column.cmp(&b.location.column))
        });
        findings
    }

    /// All call nodes within the subtree rooted at `body`
    fn calls_in(unit: &ParsedUnit, body: NodeId) -> Vec<NodeId> {
        let mut calls = Vec::new();
        let mut stack = vec![body];
        while let Some(id) = stack.pop() {
            if matches!(unit.tree.kind(id), NodeKind::Call { .. }) {
                calls.push(id);
            }
            stack.extend(unit.tree.kind(id).children());
        }
        calls.sort_unstable();
        calls
    }
}
