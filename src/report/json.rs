//! JSON reporter - machine-readable output for CI pipelines

use crate::analysis::Finding;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// One finding as it appears on the wire
#[derive(Debug, Serialize)]
struct JsonFinding<'a> {
    code: &'static str,
    issue: &'static str,
    severity: &'a str,
    confidence: &'a str,
    file: String,
    line: usize,
    column: usize,
    function: &'a str,
    allocation: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    tool: &'static str,
    version: &'static str,
    total: usize,
    findings: Vec<JsonFinding<'a>>,
}

/// JSON reporter writing to a file or stdout
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let report = JsonReport {
            tool: "leakflow",
            version: env!("CARGO_PKG_VERSION"),
            total: findings.len(),
            findings: findings
                .iter()
                .map(|f| JsonFinding {
                    code: f.issue.code(),
                    issue: f.issue.display_name(),
                    severity: f.severity.as_str(),
                    confidence: f.confidence.as_str(),
                    file: f.file.display().to_string(),
                    line: f.location.line,
                    column: f.location.column,
                    function: &f.function,
                    allocation: &f.allocation,
                    message: &f.message,
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        match &self.output_path {
            Some(path) => {
                std::fs::write(path, json).into_diagnostic()?;
                eprintln!("Report written to {}", path.display());
            }
            None => println!("{json}"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LeakIssue;
    use crate::uast::Location;

    #[test]
    fn test_json_shape() {
        let findings = vec![Finding::new(
            LeakIssue::UnclosedCursor,
            PathBuf::from("a.kt"),
            Location::new(3, 9),
            "readAll",
            "query",
        )];
        let report = JsonReport {
            tool: "leakflow",
            version: "0.0.0",
            total: findings.len(),
            findings: findings
                .iter()
                .map(|f| JsonFinding {
                    code: f.issue.code(),
                    issue: f.issue.display_name(),
                    severity: f.severity.as_str(),
                    confidence: f.confidence.as_str(),
                    file: f.file.display().to_string(),
                    line: f.location.line,
                    column: f.location.column,
                    function: &f.function,
                    allocation: &f.allocation,
                    message: &f.message,
                })
                .collect(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"code\":\"RL001\""));
        assert!(json.contains("\"line\":3"));
    }
}
