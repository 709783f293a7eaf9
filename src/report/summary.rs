//! Summary reporter - statistics and overview only
//!
//! High-level view of analysis results with ASCII charts

use crate::analysis::{Confidence, Finding, LeakIssue, Severity};
use crate::report::colors::{BoxChars, ChartChars, StructureColors};
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Aggregated statistics over a result set
#[derive(Debug, Default)]
pub struct ResultStats {
    pub total_issues: usize,
    pub files_affected: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_rule: HashMap<&'static str, usize>,
}

impl ResultStats {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut stats = Self {
            total_issues: findings.len(),
            ..Default::default()
        };

        let mut files: Vec<&PathBuf> = findings.iter().map(|f| &f.file).collect();
        files.sort();
        files.dedup();
        stats.files_affected = files.len();

        for finding in findings {
            match finding.severity {
                Severity::Error => stats.errors += 1,
                Severity::Warning => stats.warnings += 1,
                Severity::Info => stats.infos += 1,
            }
            match finding.confidence {
                Confidence::High => stats.high += 1,
                Confidence::Medium => stats.medium += 1,
                Confidence::Low => stats.low += 1,
            }
            *stats.by_rule.entry(finding.issue.code()).or_default() += 1;
        }

        stats
    }
}

/// Summary-only reporter with statistics and charts
pub struct SummaryReporter {
    /// Width of bar charts
    bar_width: usize,
    /// Show files analyzed count
    show_files_count: Option<usize>,
    /// Show functions analyzed count
    show_functions_count: Option<usize>,
    /// Whether this is a final summary appended to another report
    is_final_summary: bool,
}

impl SummaryReporter {
    pub fn new() -> Self {
        Self {
            bar_width: 20,
            show_files_count: None,
            show_functions_count: None,
            is_final_summary: false,
        }
    }

    pub fn with_files_count(mut self, count: usize) -> Self {
        self.show_files_count = Some(count);
        self
    }

    pub fn with_functions_count(mut self, count: usize) -> Self {
        self.show_functions_count = Some(count);
        self
    }

    /// Mark this as a final summary appended to another report (different footer)
    pub fn as_final_summary(mut self) -> Self {
        self.is_final_summary = true;
        self
    }

    pub fn report(&self, findings: &[Finding]) {
        println!();
        println!("{}", "Leakflow Analysis Summary".cyan().bold());
        println!("{}", BoxChars::heavy_line(50));
        println!();

        if findings.is_empty() {
            println!("{}", "No resource leaks found!".green().bold());
            return;
        }

        let stats = ResultStats::from_findings(findings);

        self.print_basic_stats(&stats);
        println!();

        self.print_severity_breakdown(&stats);
        println!();

        self.print_rule_breakdown(&stats);
        println!();

        self.print_confidence_breakdown(&stats);
        println!();

        self.print_footer();
    }

    fn print_basic_stats(&self, stats: &ResultStats) {
        let label_width = 20;

        if let Some(files) = self.show_files_count {
            println!(
                "{:>width$}  {}",
                "Files analyzed:".dimmed(),
                StructureColors::count(&files.to_string()),
                width = label_width
            );
        }

        if let Some(functions) = self.show_functions_count {
            println!(
                "{:>width$}  {}",
                "Functions:".dimmed(),
                StructureColors::count(&functions.to_string()),
                width = label_width
            );
        }

        println!(
            "{:>width$}  {}",
            "Files affected:".dimmed(),
            StructureColors::count(&stats.files_affected.to_string()),
            width = label_width
        );

        println!(
            "{:>width$}  {}",
            "Leaks found:".dimmed(),
            StructureColors::count(&stats.total_issues.to_string()),
            width = label_width
        );
    }

    fn print_severity_breakdown(&self, stats: &ResultStats) {
        println!("{}", "By Severity:".white().bold());

        let total = stats.total_issues as f64;
        if total == 0.0 {
            return;
        }

        if stats.errors > 0 {
            let pct = (stats.errors as f64 / total) * 100.0;
            println!("  {} {:>6} ({:>5.1}%)", "Errors".red(), stats.errors, pct);
        }

        if stats.warnings > 0 {
            let pct = (stats.warnings as f64 / total) * 100.0;
            println!(
                "  {} {:>6} ({:>5.1}%)",
                "Warnings".yellow(),
                stats.warnings,
                pct
            );
        }

        if stats.infos > 0 {
            let pct = (stats.infos as f64 / total) * 100.0;
            println!("  {} {:>6} ({:>5.1}%)", "Info".blue(), stats.infos, pct);
        }
    }

    fn print_rule_breakdown(&self, stats: &ResultStats) {
        println!("{}", "By Rule:".white().bold());

        let total = stats.total_issues as f64;
        if total == 0.0 {
            return;
        }

        let mut rules: Vec<_> = stats.by_rule.iter().collect();
        rules.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (rule, count) in rules {
            let pct = (*count as f64 / total) * 100.0;
            let bar = ChartChars::bar(pct, self.bar_width);
            let desc = Self::rule_short_description(rule);

            println!(
                "  {}  │{}│ {:>4} ({:>5.1}%)  {}",
                StructureColors::rule_code(rule),
                bar.yellow(),
                count,
                pct,
                desc.dimmed()
            );
        }
    }

    fn print_confidence_breakdown(&self, stats: &ResultStats) {
        println!("{}", "By Confidence:".white().bold());

        let total = stats.total_issues as f64;
        if total == 0.0 {
            return;
        }

        if stats.high > 0 {
            let pct = (stats.high as f64 / total) * 100.0;
            println!(
                "  {} {} {:>6} ({:>5.1}%)",
                "!".yellow().bold(),
                "High".yellow(),
                stats.high,
                pct
            );
        }

        if stats.medium > 0 {
            let pct = (stats.medium as f64 / total) * 100.0;
            println!(
                "  {} {} {:>6} ({:>5.1}%)",
                "?".dimmed(),
                "Medium".dimmed(),
                stats.medium,
                pct
            );
        }

        if stats.low > 0 {
            let pct = (stats.low as f64 / total) * 100.0;
            println!(
                "  {} {} {:>6} ({:>5.1}%)",
                "~".dimmed(),
                "Low".dimmed(),
                stats.low,
                pct
            );
        }
    }

    fn print_footer(&self) {
        println!("{}", BoxChars::light_line(50).dimmed());
        if self.is_final_summary {
            println!(
                "{}",
                "Tip: Use --min-confidence high to filter noisy findings".dimmed()
            );
        } else {
            println!("{}", "Run without --summary for full details".dimmed());
            println!(
                "{}",
                "Use --min-confidence high to filter noisy findings".dimmed()
            );
        }
    }

    fn rule_short_description(rule: &str) -> &'static str {
        match LeakIssue::all().iter().find(|i| i.code() == rule) {
            Some(issue) => issue.display_name(),
            None => "unknown rule",
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}
