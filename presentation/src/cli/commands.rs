//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for diagnosis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every specialist report followed by the synthesis
    Full,
    /// Only the director's synthesis
    Synthesis,
    /// JSON output
    Json,
}

/// CLI arguments for consilium
#[derive(Parser, Debug)]
#[command(name = "consilium")]
#[command(author, version, about = "Specialist panel - parallel consultation with a director synthesis")]
#[command(long_about = r#"
Consilium consults a panel of ophthalmology specialists about one clinical
history and asks a director to synthesize their opinions.

The process has two phases:
1. Consultation: every specialist analyzes the history in parallel
2. Synthesis: the director integrates all reports into a final diagnosis

A specialist that cannot be reached is reported as unavailable and the
director is told so. If the director cannot be reached, the run fails.

Configuration is loaded from (in priority order):
1. CONSILIUM_<SECTION>__<KEY>   Environment variables
2. --config <path>              Explicit config file
3. ./consilium.toml             Project-level config
4. ~/.config/consilium/config.toml   Global config

Example:
  consilium history.txt
  consilium -s retina -s neuro --output synthesis history.txt
  consilium --output json --save reports/case-17.txt history.txt
"#)]
pub struct Cli {
    /// File containing the clinical history
    #[arg(value_name = "HISTORY_FILE", required_unless_present = "show_config")]
    pub history_file: Option<PathBuf>,

    /// Identifier for this case (default: derived from the current time)
    #[arg(long, value_name = "ID")]
    pub case_id: Option<String>,

    /// Specialists to consult (can be specified multiple times)
    #[arg(short, long, value_name = "SPECIALIST")]
    pub specialist: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Write the synthesis text to this file
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Bypass the response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub metrics: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
