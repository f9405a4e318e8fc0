//! CLI argument parsing for realchange

use crate::config::ReportConfig;
use crate::methods::Method;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the report on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable aligned tables (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
    /// Self-contained HTML report with inline charts
    Html,
}

#[derive(Parser, Debug)]
#[command(name = "realchange")]
#[command(version)]
#[command(
    about = "Compare methods for detecting meaningful individual change in athletes",
    long_about = None
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the simulation seed
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// Override the number of simulated athletes
    #[arg(short = 'n', long = "athletes", value_name = "N")]
    pub athletes: Option<usize>,

    /// Method to run (repeatable, default all four)
    #[arg(short = 'm', long = "method", value_enum, value_name = "METHOD")]
    pub method: Vec<Method>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also write CSV tables, SVG charts, JSON and HTML into DIR
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the simulated dataset as CSV and exit
    #[arg(long = "dump-data")]
    pub dump_data: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply flag overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut ReportConfig) {
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(athletes) = self.athletes {
            config.simulation.athletes = athletes;
        }
    }

    /// Requested methods in first-mention order, without repeats
    pub fn methods(&self) -> Vec<Method> {
        let mut methods = Vec::new();
        for m in &self.method {
            if !methods.contains(m) {
                methods.push(*m);
            }
        }
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["realchange"]);
        assert!(cli.config.is_none());
        assert!(cli.seed.is_none());
        assert!(cli.athletes.is_none());
        assert!(cli.method.is_empty());
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.output_dir.is_none());
        assert!(!cli.dump_data);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::parse_from(["realchange", "-c", "study.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("study.toml")));
    }

    #[test]
    fn test_cli_repeatable_method() {
        let cli = Cli::parse_from(["realchange", "-m", "sem-mdc", "--method", "model"]);
        assert_eq!(cli.method, vec![Method::SemMdc, Method::Model]);
    }

    #[test]
    fn test_cli_methods_deduplicated() {
        let cli = Cli::parse_from(["realchange", "-m", "cv", "-m", "swc", "-m", "cv"]);
        assert_eq!(cli.methods(), vec![Method::Cv, Method::Swc]);
    }

    #[test]
    fn test_cli_rejects_unknown_method() {
        assert!(Cli::try_parse_from(["realchange", "-m", "icc"]).is_err());
    }

    #[test]
    fn test_cli_format_values() {
        for (arg, expected) in [
            ("text", OutputFormat::Text),
            ("json", OutputFormat::Json),
            ("csv", OutputFormat::Csv),
            ("html", OutputFormat::Html),
        ] {
            let cli = Cli::parse_from(["realchange", "--format", arg]);
            assert_eq!(cli.format, expected);
        }
    }

    #[test]
    fn test_cli_output_dir_and_dump() {
        let cli = Cli::parse_from(["realchange", "-o", "out", "--dump-data", "--debug"]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert!(cli.dump_data);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["realchange", "--seed", "7", "-n", "20"]);
        let mut config = ReportConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.athletes, 20);
        assert_eq!(config.thresholds.z_critical, 1.645);
    }

    #[test]
    fn test_cli_no_overrides_keep_config() {
        let cli = Cli::parse_from(["realchange"]);
        let mut config = ReportConfig::default();
        config.simulation.seed = 99;
        cli.apply_overrides(&mut config);
        assert_eq!(config.simulation.seed, 99);
    }
}
