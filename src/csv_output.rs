//! CSV output for method tables and the simulated dataset
//!
//! Tables use four decimal places so spreadsheets can recompute thresholds.

use crate::dataset::WideRecord;
use crate::methods::Method;
use crate::pipeline::Report;
use crate::table::{method_table, Table};

const CSV_PRECISION: usize = 4;

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a table as CSV with a header row
pub fn table_to_csv(table: &Table) -> String {
    let mut output = String::new();
    output.push_str(&table.headers.join(","));
    output.push('\n');

    for row in &table.rows {
        let fields: Vec<String> = row
            .iter()
            .map(|cell| escape_field(&cell.render(CSV_PRECISION)))
            .collect();
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

/// One CSV document per successful method, keyed by method
pub fn report_to_csv(report: &Report) -> Vec<(Method, String)> {
    report
        .outcomes
        .iter()
        .filter_map(|outcome| {
            let method_report = outcome.result.as_ref().ok()?;
            Some((outcome.method, table_to_csv(&method_table(method_report))))
        })
        .collect()
}

/// All method tables for stdout, each introduced by a `# slug` line
///
/// Failed methods get a `# slug FAILED` line carrying the error instead.
pub fn render_report(report: &Report) -> String {
    let mut sections = Vec::new();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(method_report) => sections.push(format!(
                "# {}\n{}",
                outcome.method.slug(),
                table_to_csv(&method_table(method_report))
            )),
            Err(e) => sections.push(format!(
                "# {} FAILED ({}): {}\n",
                outcome.method.slug(),
                e.kind(),
                e
            )),
        }
    }
    sections.join("\n")
}

/// The wide dataset: one row per athlete and timepoint, one column per trial
pub fn dataset_to_csv(rows: &[WideRecord]) -> String {
    let trials = rows.iter().map(|r| r.trials.len()).max().unwrap_or(0);

    let mut headers = vec!["athlete".to_string(), "timepoint".to_string()];
    headers.extend((1..=trials).map(|t| format!("trial_{}", t)));

    let mut output = headers.join(",");
    output.push('\n');

    for row in rows {
        let mut fields = vec![row.athlete.to_string(), row.timepoint.number().to_string()];
        fields.extend(row.trials.iter().map(|v| format!("{:.2}", v)));
        fields.resize(headers.len(), String::new());
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}
