//! Plain-text report for the terminal

use crate::pipeline::{MethodOutcome, Report};
use crate::table::{method_header, method_table, Table};

/// Render aligned columns, numbers with two decimals
pub fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.render(2)).collect())
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    let header: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    output.push_str(header.join("  ").trim_end());
    output.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join("  "));
    output.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c, w = *w))
            .collect();
        output.push_str(&line.join("  "));
        output.push('\n');
    }

    output
}

fn render_outcome(outcome: &MethodOutcome) -> String {
    let mut output = format!("=== {} ===\n", outcome.method.title());
    match &outcome.result {
        Ok(report) => {
            for (name, value) in method_header(report) {
                output.push_str(&format!("{}: {}\n", name, value));
            }
            output.push('\n');
            output.push_str(&render_table(&method_table(report)));
        }
        Err(e) => {
            output.push_str(&format!("FAILED ({}): {}\n", e.kind(), e));
        }
    }
    output
}

/// Whole report: cohort header, then one section per method
pub fn render_report(report: &Report) -> String {
    let sim = &report.config.simulation;
    let mut output = format!(
        "Simulated cohort: {} athletes x 2 timepoints x {} trials (seed {})\n\n",
        report.dataset.athlete_count(),
        sim.trials(),
        sim.seed
    );

    let sections: Vec<String> = report.outcomes.iter().map(render_outcome).collect();
    output.push_str(&sections.join("\n"));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::pipeline::run;
    use crate::table::Cell;

    #[test]
    fn test_render_table_aligns_columns() {
        let mut table = Table::new(vec!["athlete", "value"]);
        table.push(vec![Cell::from("A01"), Cell::from(1.5)]);
        table.push(vec![Cell::from("A02"), Cell::from(1234.567)]);

        let text = render_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "athlete  value");
        assert_eq!(lines[1], "-------  -------");
        assert_eq!(lines[2], "    A01     1.50");
        assert_eq!(lines[3], "    A02  1234.57");
    }

    #[test]
    fn test_render_report_sections() {
        let report = run(&ReportConfig::default(), &[]).unwrap();
        let text = render_report(&report);

        assert!(text.starts_with("Simulated cohort: 15 athletes"));
        assert!(text.contains("=== Standard Error of Measurement / Minimal Detectable Change ==="));
        assert!(text.contains("MDC90:"));
        assert!(text.contains("=== Coefficient of Variation ==="));
        assert!(text.contains("Typical error:"));
        assert!(text.contains("=== Model Statistic ==="));
    }

    #[test]
    fn test_render_failed_method() {
        let mut config = ReportConfig::default();
        config.simulation.athletes = 1;
        let report = run(&config, &[]).unwrap();
        let text = render_report(&report);
        assert!(text.contains("FAILED (DegenerateModel)"));
        assert!(text.contains("FAILED (InsufficientTrials)"));
    }
}
