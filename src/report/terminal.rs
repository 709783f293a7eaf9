//! Terminal reporter with colored output
//!
//! Based on Rust compiler diagnostic design (RFC 1644)

use crate::analysis::Finding;
use crate::report::colors::{ConfidenceIndicator, SeveritySymbol, StructureColors};
use colored::Colorize;
use miette::Result;
use std::collections::HashMap;
use std::path::PathBuf;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Show confidence levels in output
    show_confidence: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_confidence: true,
        }
    }

    pub fn with_confidence(mut self, show: bool) -> Self {
        self.show_confidence = show;
        self
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            println!("{}", "No resource leaks found!".green().bold());
            return Ok(());
        }

        // Group by file
        let mut by_file: HashMap<PathBuf, Vec<&Finding>> = HashMap::new();
        for item in findings {
            by_file.entry(item.file.clone()).or_default().push(item);
        }

        println!();
        println!(
            "Found {} potential resource leaks:",
            StructureColors::count(&findings.len().to_string())
        );
        println!();

        if self.show_confidence {
            self.print_legend();
        }

        let mut files: Vec<_> = by_file.keys().collect();
        files.sort();

        for file in files {
            let items = &by_file[file];

            println!("{}", StructureColors::file_path(&file.display().to_string()));

            let mut sorted_items: Vec<_> = items.iter().collect();
            sorted_items.sort_by_key(|i| i.location.line);

            for item in sorted_items {
                self.print_item(item);
            }

            println!();
        }

        Ok(())
    }

    fn print_legend(&self) {
        println!("{}", "Confidence Legend:".dimmed());
        println!(
            "  {} {} {} {} {} {}",
            "!".yellow().bold(),
            "High".dimmed(),
            "?".dimmed(),
            "Medium".dimmed(),
            "~".dimmed().italic(),
            "Low".dimmed()
        );
        println!();
    }

    fn print_item(&self, item: &Finding) {
        let severity_symbol = SeveritySymbol::colored(&item.severity);

        let location = format!("{:>5}:{:<3}", item.location.line, item.location.column);

        let confidence_indicator = if self.show_confidence {
            format!("{} ", ConfidenceIndicator::for_level(&item.confidence))
        } else {
            String::new()
        };

        let issue_code = StructureColors::rule_code(item.issue.code());

        println!(
            "  {}{} {} [{}] {}",
            confidence_indicator,
            StructureColors::location(&location),
            severity_symbol,
            issue_code,
            item.message
        );

        println!(
            "    {} in {} '{}'",
            "→".dimmed(),
            "function".dimmed(),
            StructureColors::symbol_name(&item.function)
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
