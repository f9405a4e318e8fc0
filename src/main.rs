use anyhow::{Context, Result};
use clap::Parser;
use realchange::artifacts::write_artifacts;
use realchange::cli::{Cli, OutputFormat};
use realchange::config::ReportConfig;
use realchange::html_output::HtmlOutput;
use realchange::json_output::JsonReport;
use realchange::{csv_output, pipeline, simulate, text_output};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Configuration file (or defaults) with CLI overrides applied
fn load_config(args: &Cli) -> Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_toml(path)?,
        None => ReportConfig::default(),
    };
    args.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;

    if args.dump_data {
        let rows = simulate::simulate(&config.simulation)?;
        print!("{}", csv_output::dataset_to_csv(&rows));
        return Ok(());
    }

    let report = pipeline::run(&config, &args.methods())?;

    let rendered = match args.format {
        OutputFormat::Text => text_output::render_report(&report),
        OutputFormat::Json => {
            let mut json = JsonReport::from_report(&report)
                .to_json()
                .context("Failed to serialize report")?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => csv_output::render_report(&report),
        OutputFormat::Html => HtmlOutput::default().to_html(&report)?,
    };
    print!("{}", rendered);

    if let Some(dir) = &args.output_dir {
        let written = write_artifacts(&report, dir)?;
        eprintln!("Wrote {} files to {}", written.len(), dir.display());
    }

    Ok(())
}
