//! HTML output format for change-detection reports
//!
//! Styled tables with embedded CSS, plus one inline SVG chart per method.

use crate::chart::method_chart;
use crate::dataset::AthleteSummary;
use crate::pipeline::{MethodOutcome, Report};
use crate::table::{method_header, method_table, Cell, Table};
use anyhow::Result;

/// HTML output formatter
#[derive(Debug, Clone, Copy)]
pub struct HtmlOutput {
    include_charts: bool,
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new(true)
    }
}

impl HtmlOutput {
    /// Create a new HTML output formatter
    pub fn new(include_charts: bool) -> Self {
        Self { include_charts }
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px 8px;
            text-align: right;
        }
        th {
            background-color: #4a90d9;
            color: white;
            font-weight: bold;
        }
        td.text {
            text-align: left;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
        .summary-table th {
            background-color: #5cb85c;
        }
        .thresholds {
            list-style: none;
            padding: 0;
            font-family: monospace;
        }
        .flagged {
            color: #2e8b57;
            font-weight: bold;
        }
        .failed {
            color: #cc0000;
            font-family: monospace;
        }
        .chart {
            background-color: white;
            margin-bottom: 30px;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    fn format_cell(cell: &Cell) -> String {
        match cell {
            Cell::Text(s) => format!(r#"<td class="text">{}</td>"#, Self::escape_html(s)),
            Cell::Number(_) => format!("<td>{}</td>", cell.render(2)),
            Cell::Flag(true) => format!(r#"<td class="flagged">{}</td>"#, cell.render(2)),
            Cell::Flag(false) => format!("<td>{}</td>", cell.render(2)),
        }
    }

    fn render_table(table: &Table, class: Option<&str>) -> String {
        let mut html = match class {
            Some(c) => format!("    <table class=\"{}\">\n", c),
            None => "    <table>\n".to_string(),
        };

        let header_cells: Vec<String> = table
            .headers
            .iter()
            .map(|h| format!("<th>{}</th>", Self::escape_html(h)))
            .collect();
        html.push_str(&format!("        <tr>{}</tr>\n", header_cells.join("")));

        for row in &table.rows {
            let cells: Vec<String> = row.iter().map(Self::format_cell).collect();
            html.push_str(&format!("        <tr>{}</tr>\n", cells.join("")));
        }

        html.push_str("    </table>\n");
        html
    }

    fn summary_table(summaries: &[AthleteSummary]) -> Table {
        let mut table = Table::new(vec![
            "athlete",
            "timepoint_1_mean",
            "timepoint_2_mean",
            "change_score",
            "percent_change",
        ]);
        for s in summaries {
            table.push(vec![
                s.athlete.to_string().into(),
                s.timepoint_1_mean.into(),
                s.timepoint_2_mean.into(),
                s.change_score.into(),
                s.percent_change
                    .map(Cell::from)
                    .unwrap_or_else(|| Cell::from("undefined")),
            ]);
        }
        table
    }

    fn render_outcome(&self, outcome: &MethodOutcome) -> Result<String> {
        let mut html = format!(
            "    <h2 id=\"{}\">{}</h2>\n",
            outcome.method.slug(),
            Self::escape_html(outcome.method.title())
        );

        match &outcome.result {
            Ok(report) => {
                html.push_str("    <ul class=\"thresholds\">\n");
                for (name, value) in method_header(report) {
                    html.push_str(&format!(
                        "        <li>{}: {}</li>\n",
                        Self::escape_html(&name),
                        Self::escape_html(&value)
                    ));
                }
                html.push_str(&format!(
                    "        <li>Flagged athletes: {}</li>\n",
                    report.flagged_count()
                ));
                html.push_str("    </ul>\n");

                if self.include_charts {
                    html.push_str("    <div class=\"chart\">\n");
                    html.push_str(&method_chart(report).to_svg()?);
                    html.push_str("    </div>\n");
                }

                html.push_str(&Self::render_table(&method_table(report), None));
            }
            Err(e) => {
                html.push_str(&format!(
                    "    <p class=\"failed\">FAILED ({}): {}</p>\n",
                    e.kind(),
                    Self::escape_html(&e.to_string())
                ));
            }
        }

        Ok(html)
    }

    /// Generate complete HTML document
    pub fn to_html(&self, report: &Report) -> Result<String> {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("    <title>Realchange Report</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str("    <h1>Individual Change Report</h1>\n");

        let sim = &report.config.simulation;
        html.push_str(&format!(
            "    <p>{} athletes x 2 timepoints x {} trials, seed {}</p>\n",
            report.dataset.athlete_count(),
            sim.trials(),
            sim.seed
        ));

        html.push_str("    <h2>Athlete Summary</h2>\n");
        html.push_str(&Self::render_table(
            &Self::summary_table(report.dataset.summaries()),
            Some("summary-table"),
        ));

        for outcome in &report.outcomes {
            html.push_str(&self.render_outcome(outcome)?);
        }

        html.push_str("    <div class=\"footer\">\n");
        html.push_str(&format!(
            "        Generated by realchange {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        Ok(html)
    }
}
