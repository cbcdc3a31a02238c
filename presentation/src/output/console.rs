//! Console output formatter for diagnosis reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use consilium_domain::{AggregateReport, SpecialistOutcome, SpecialistResult};

/// Formats diagnosis reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &AggregateReport) -> String {
        let mut output = String::new();

        // Header
        output.push_str(&Self::header("Specialist Panel Report"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Case:".cyan().bold(), report.case_id()));
        output.push_str(&format!(
            "{} {}\n",
            "Specialists:".cyan().bold(),
            Self::roster(report)
        ));
        output.push_str(&format!(
            "{} {:.1}s\n\n",
            "Latency:".cyan().bold(),
            report.latency_ms() / 1000.0
        ));

        // Phase 1: Consultation
        output.push_str(&Self::section_header("Phase 1: Specialist Consultation"));
        for result in report.results().values() {
            output.push_str(&Self::specialist_section(result));
        }

        // Phase 2: Synthesis
        output.push_str(&Self::section_header("Phase 2: Director Synthesis"));
        output.push_str(&format!("\n{}\n", report.synthesis()));

        let failed: Vec<_> = report
            .failed_specialists()
            .map(|r| r.specialist.display_name())
            .collect();
        if !failed.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Unavailable specialists:".yellow().bold(),
                failed.join(", ")
            ));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &AggregateReport) -> serde_json::Result<String> {
        serde_json::to_string_pretty(report)
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(report: &AggregateReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Final Diagnosis ===".cyan().bold()
        ));

        output.push_str(&format!("{} {}\n\n", "Case:".bold(), report.case_id()));

        output.push_str(&format!(
            "{} {}\n\n",
            "Specialists consulted:".dimmed(),
            Self::roster(report)
        ));

        output.push_str(report.synthesis());
        output.push('\n');

        output
    }

    fn roster(report: &AggregateReport) -> String {
        report
            .results()
            .keys()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn specialist_section(result: &SpecialistResult) -> String {
        let title = format!(
            "── {} [{}] ──",
            result.specialist.display_name(),
            result.specialist
        );
        match &result.outcome {
            SpecialistOutcome::Report { text } => {
                format!("\n{}\n{}\n", title.yellow().bold(), text)
            }
            SpecialistOutcome::Placeholder { kind, message } => format!(
                "\n{}\n{} ({})\n",
                title.red().bold(),
                Self::indent(message, "Unavailable: "),
                kind
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &AggregateReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &AggregateReport) -> serde_json::Result<String> {
        Self::format_json(report)
    }

    fn format_synthesis_only(&self, report: &AggregateReport) -> String {
        Self::format_synthesis_only(report)
    }
}
