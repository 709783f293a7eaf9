//! Leakflow - Fast resource-leak detection for Android (Kotlin/Java)
//!
//! This library finds Android resources (cursors, TypedArrays, fragment
//! transactions, preference editors, streams) that are acquired but never
//! released, using a lightweight single-pass data-flow analysis over a
//! unified AST.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all .kt and .java files
//! 2. **Parsing** - Parse source files using tree-sitter
//! 3. **Lowering** - Lower both languages into one arena-based AST
//! 4. **Flow Tracking** - Follow each acquired resource forward through
//!    aliases, fluent chains, and scoping functions
//! 5. **Detection** - Fold sink events into leak findings
//! 6. **Reporting** - Output results in various formats

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod flow;
pub mod parser;
pub mod report;
pub mod uast;

pub use analysis::{Confidence, Finding, LeakIssue, Severity};
pub use config::Config;
pub use discovery::{FileFinder, FileType, SourceFile};
pub use flow::{FlowReport, FlowState, FlowTracker, SinkEvent, SinkKind};
pub use report::{ReportFormat, Reporter};
pub use uast::{Language, ParsedUnit, UastTree};
