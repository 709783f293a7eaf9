mod colors;
mod compact;
mod json;
mod summary;
mod terminal;

pub use compact::CompactReporter;
pub use json::JsonReporter;
pub use summary::{ResultStats, SummaryReporter};
pub use terminal::TerminalReporter;

use crate::analysis::Finding;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    /// Default terminal output
    #[default]
    Terminal,
    /// Compact one-line-per-issue format
    Compact,
    /// Summary statistics only
    Summary,
    /// JSON machine-readable format
    Json,
}

/// Options for report generation
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Output file path (for JSON)
    pub output_path: Option<PathBuf>,
    /// Base path to strip from file paths for shorter display
    pub base_path: Option<PathBuf>,
    /// Show confidence indicators
    pub show_confidence: bool,
    /// Files analyzed count (for summary)
    pub files_count: Option<usize>,
    /// Functions analyzed count (for summary)
    pub functions_count: Option<usize>,
}

impl ReportOptions {
    pub fn new() -> Self {
        Self {
            output_path: None,
            base_path: None,
            show_confidence: true,
            files_count: None,
            functions_count: None,
        }
    }
}

/// Reporter for outputting leak analysis results
pub struct Reporter {
    format: ReportFormat,
    options: ReportOptions,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            options: ReportOptions {
                output_path,
                show_confidence: true,
                ..Default::default()
            },
        }
    }

    pub fn with_options(format: ReportFormat, options: ReportOptions) -> Self {
        Self { format, options }
    }

    /// Report the leak findings
    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter =
                    TerminalReporter::new().with_confidence(self.options.show_confidence);
                reporter.report(findings)?;
                self.print_final_summary(findings);
                Ok(())
            }
            ReportFormat::Compact => {
                let mut reporter =
                    CompactReporter::new().with_confidence(self.options.show_confidence);
                if let Some(base) = &self.options.base_path {
                    reporter = reporter.with_base_path(base.clone());
                }
                reporter.report(findings);
                Ok(())
            }
            ReportFormat::Summary => {
                let mut reporter = SummaryReporter::new();
                if let Some(files) = self.options.files_count {
                    reporter = reporter.with_files_count(files);
                }
                if let Some(functions) = self.options.functions_count {
                    reporter = reporter.with_functions_count(functions);
                }
                reporter.report(findings);
                Ok(())
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.options.output_path.clone());
                reporter.report(findings)
            }
        }
    }

    /// Print the full summary at the end of the terminal report
    fn print_final_summary(&self, findings: &[Finding]) {
        if findings.is_empty() {
            return;
        }
        let mut reporter = SummaryReporter::new().as_final_summary();
        if let Some(files) = self.options.files_count {
            reporter = reporter.with_files_count(files);
        }
        if let Some(functions) = self.options.functions_count {
            reporter = reporter.with_functions_count(functions);
        }
        reporter.report(findings);
    }
}
