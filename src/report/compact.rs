//! Compact terminal reporter - minimal output format
//!
//! One line per issue, optimized for scanning large result sets

use crate::analysis::Finding;
use crate::report::colors::{BoxChars, ConfidenceIndicator, SeveritySymbol, StructureColors};
use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Compact reporter for minimal, scannable output
pub struct CompactReporter {
    /// Base path to strip from file paths for shorter display
    base_path: Option<PathBuf>,
    /// Show confidence indicators
    show_confidence: bool,
    /// Maximum width for file paths (truncate if longer)
    max_path_width: usize,
}

impl CompactReporter {
    pub fn new() -> Self {
        Self {
            base_path: None,
            show_confidence: true,
            max_path_width: 60,
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    pub fn with_confidence(mut self, show: bool) -> Self {
        self.show_confidence = show;
        self
    }

    /// Format a path relative to base path if set
    fn format_path(&self, path: &Path) -> String {
        let display = if let Some(base) = &self.base_path {
            path.strip_prefix(base)
                .unwrap_or(path)
                .display()
                .to_string()
        } else {
            path.display().to_string()
        };

        if display.len() > self.max_path_width {
            format!("...{}", &display[display.len() - self.max_path_width + 3..])
        } else {
            display
        }
    }

    pub fn report(&self, findings: &[Finding]) {
        if findings.is_empty() {
            println!("{}", "No issues found!".green().bold());
            return;
        }

        let mut by_file: HashMap<PathBuf, Vec<&Finding>> = HashMap::new();
        for item in findings {
            by_file.entry(item.file.clone()).or_default().push(item);
        }

        let mut files: Vec<_> = by_file.keys().collect();
        files.sort();

        for file in files {
            let items = &by_file[file];
            let path_str = self.format_path(file);
            println!("{}", StructureColors::file_path(&path_str));

            let mut sorted_items: Vec<_> = items.iter().collect();
            sorted_items.sort_by_key(|i| i.location.line);

            for item in sorted_items {
                self.print_item(item);
            }
            println!();
        }

        self.print_summary(findings);
    }

    fn print_item(&self, item: &Finding) {
        let location = format!("{:>5}:{:<3}", item.location.line, item.location.column);

        let severity_symbol = SeveritySymbol::colored(&item.severity);
        let rule_code = StructureColors::rule_code(item.issue.code());

        let confidence = if self.show_confidence {
            format!("{} ", ConfidenceIndicator::for_level(&item.confidence))
        } else {
            String::new()
        };

        println!(
            "  {}{}  {}  {}  {} (in {})",
            confidence,
            StructureColors::location(&location),
            severity_symbol,
            rule_code,
            item.message,
            StructureColors::symbol_name(&item.function)
        );
    }

    fn print_summary(&self, findings: &[Finding]) {
        use crate::analysis::Severity;

        let errors = findings
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
            .count();
        let warnings = findings
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
            .count();
        let infos = findings
            .iter()
            .filter(|d| matches!(d.severity, Severity::Info))
            .count();

        println!("{}", BoxChars::heavy_line(50).dimmed());

        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(format!("{} {}", errors, "errors".red()));
        }
        if warnings > 0 {
            parts.push(format!("{} {}", warnings, "warnings".yellow()));
        }
        if infos > 0 {
            parts.push(format!("{} {}", infos, "info".blue()));
        }

        println!(
            "  {} {} ({})",
            StructureColors::count(&findings.len().to_string()),
            "issues".bold(),
            parts.join(", ")
        );
    }
}

impl Default for CompactReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_truncation() {
        let reporter = CompactReporter::new();
        let long_path = Path::new(
            "/very/long/path/that/exceeds/the/maximum/width/setting/for/display/purposes/file.kt",
        );
        let formatted = reporter.format_path(long_path);
        assert!(formatted.len() <= 60);
        assert!(formatted.starts_with("..."));
    }
}
