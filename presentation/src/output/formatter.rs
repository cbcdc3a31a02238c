//! Output formatter trait

use consilium_domain::AggregateReport;

/// Trait for formatting diagnosis reports
pub trait OutputFormatter {
    /// Format the complete report
    fn format(&self, report: &AggregateReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &AggregateReport) -> serde_json::Result<String>;

    /// Format synthesis only (concise output)
    fn format_synthesis_only(&self, report: &AggregateReport) -> String;
}
