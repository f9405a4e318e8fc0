//! Report files written to an output directory
//!
//! Per-method CSV tables and SVG charts, plus `report.json` and `report.html`.
//! Failed methods get neither file.

use crate::chart::method_chart;
use crate::csv_output::{dataset_to_csv, report_to_csv};
use crate::html_output::HtmlOutput;
use crate::json_output::JsonReport;
use crate::pipeline::Report;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
    Ok(path)
}

/// Write every artifact of `report` into `dir`, creating it if needed
///
/// Returns the written paths in write order.
pub fn write_artifacts(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = vec![write_file(dir, "dataset.csv", &dataset_to_csv(&report.wide))?];

    for (method, csv) in report_to_csv(report) {
        written.push(write_file(dir, &format!("{}.csv", method.slug()), &csv)?);
    }

    for outcome in &report.outcomes {
        let Ok(method_report) = &outcome.result else {
            continue;
        };
        written.push(write_file(
            dir,
            &format!("{}.svg", outcome.method.slug()),
            &method_chart(method_report).to_svg()?,
        )?);
    }

    let json = JsonReport::from_report(report)
        .to_json()
        .context("Failed to serialize report")?;
    written.push(write_file(dir, "report.json", &json)?);
    written.push(write_file(
        dir,
        "report.html",
        &HtmlOutput::default().to_html(report)?,
    )?);

    tracing::info!(dir = %dir.display(), files = written.len(), "artifacts written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::pipeline::run;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_write_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let report = run(&ReportConfig::default(), &[]).unwrap();

        let written = write_artifacts(&report, dir.path()).unwrap();
        assert_eq!(
            names(&written),
            vec![
                "dataset.csv",
                "sem_mdc.csv",
                "cv.csv",
                "swc.csv",
                "model_statistic.csv",
                "sem_mdc.svg",
                "cv.svg",
                "swc.svg",
                "model_statistic.svg",
                "report.json",
                "report.html",
            ]
        );
        for path in &written {
            assert!(path.exists());
        }

        let csv = fs::read_to_string(dir.path().join("sem_mdc.csv")).unwrap();
        assert_eq!(csv.lines().count(), 16);
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let report = run(&ReportConfig::default(), &[crate::methods::Method::Cv]).unwrap();

        write_artifacts(&report, &nested).unwrap();
        assert!(nested.join("cv.svg").exists());
        assert!(!nested.join("swc.csv").exists());
    }

    #[test]
    fn test_failed_method_has_no_files() {
        let dir = TempDir::new().unwrap();
        let mut config = ReportConfig::default();
        config.simulation.athletes = 1;
        let report = run(&config, &[]).unwrap();

        let written = names(&write_artifacts(&report, dir.path()).unwrap());
        assert!(!written.contains(&"sem_mdc.csv".to_string()));
        assert!(!written.contains(&"swc.svg".to_string()));
        assert!(written.contains(&"cv.csv".to_string()));
        assert!(written.contains(&"report.json".to_string()));
    }

    #[test]
    fn test_unwritable_directory_errors() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();
        let report = run(&ReportConfig::default(), &[crate::methods::Method::Cv]).unwrap();

        let err = write_artifacts(&report, &file).unwrap_err();
        assert!(err.to_string().contains("Failed to create output directory"));
    }
}
