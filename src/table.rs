//! Tabular view of each method's results
//!
//! One [`Table`] per method feeds the text, CSV and HTML presenters so all
//! three show the same columns.

use crate::methods::{CvReport, MethodReport, ModelReport, SemReport, SwcReport};

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl Cell {
    /// Render with `precision` decimal places for numbers
    pub fn render(&self, precision: usize) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => format!("{:.*}", precision, v),
            Cell::Flag(true) => "yes".to_string(),
            Cell::Flag(false) => "no".to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Flag(b)
    }
}

/// Header row plus body rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }
}

/// Group-level thresholds shown above a method's table
pub fn method_header(report: &MethodReport) -> Vec<(String, String)> {
    match report {
        MethodReport::SemMdc(r) => vec![
            ("SEM".to_string(), format!("{:.2}", r.sem)),
            (r.mdc_label.clone(), format!("{:.2}", r.mdc)),
            (
                "ANOVA residual MS".to_string(),
                format!("{:.2} (df={})", r.anova.ms_within, r.anova.df_within),
            ),
            (
                "ANOVA F".to_string(),
                r.anova
                    .f_statistic
                    .map(|f| format!("{:.3} (df={}, {})", f, r.anova.df_between, r.anova.df_within))
                    .unwrap_or_else(|| "undefined".to_string()),
            ),
        ],
        MethodReport::Cv(r) => vec![("Mean CV%".to_string(), format!("{:.2}", r.mean_cv_percent))],
        MethodReport::Swc(r) => vec![
            ("SWC fraction".to_string(), format!("{}", r.swc_fraction)),
            ("Typical error".to_string(), format!("{:.2}", r.typical_error.value)),
        ],
        MethodReport::Model(r) => vec![("z".to_string(), format!("{}", r.z_critical))],
    }
}

pub fn method_table(report: &MethodReport) -> Table {
    match report {
        MethodReport::SemMdc(r) => sem_table(r),
        MethodReport::Cv(r) => cv_table(r),
        MethodReport::Swc(r) => swc_table(r),
        MethodReport::Model(r) => model_table(r),
    }
}

fn sem_table(report: &SemReport) -> Table {
    let mut table = Table::new(vec![
        "athlete",
        "change_score",
        "sem",
        "mdc",
        "exceeds_mdc",
        "classification",
    ]);
    for row in &report.rows {
        table.push(vec![
            row.athlete.to_string().into(),
            row.change_score.into(),
            report.sem.into(),
            report.mdc.into(),
            row.exceeds_mdc.into(),
            row.classification.label().into(),
        ]);
    }
    table
}

fn cv_table(report: &CvReport) -> Table {
    let mut table = Table::new(vec![
        "athlete",
        "baseline_mean",
        "baseline_sd",
        "cv_percent",
        "percent_change",
        "classification",
    ]);
    for row in &report.rows {
        table.push(vec![
            row.athlete.to_string().into(),
            row.baseline_mean.into(),
            row.baseline_sd.into(),
            row.cv_percent.into(),
            row.percent_change.into(),
            row.classification.label().into(),
        ]);
    }
    table
}

fn swc_table(report: &SwcReport) -> Table {
    let mut table = Table::new(vec![
        "athlete",
        "athlete_sd",
        "swc",
        "change_score",
        "lower_range",
        "upper_range",
        "contacts_swc",
        "classification",
        "band",
    ]);
    for row in &report.rows {
        table.push(vec![
            row.athlete.to_string().into(),
            row.athlete_sd.into(),
            row.swc.into(),
            row.change_score.into(),
            row.lower_range.into(),
            row.upper_range.into(),
            row.contacts_swc.into(),
            row.classification.label().into(),
            row.band.label().into(),
        ]);
    }
    table
}

fn model_table(report: &ModelReport) -> Table {
    let mut table = Table::new(vec![
        "athlete",
        "trials",
        "ss",
        "df",
        "mse",
        "sem",
        "mdc",
        "mean_diff",
        "classification",
        "direction",
    ]);
    for row in &report.rows {
        table.push(vec![
            row.athlete.to_string().into(),
            row.trials.to_string().into(),
            row.error_term.ss.into(),
            row.error_term.df.to_string().into(),
            row.error_term.mse.into(),
            row.error_term.sem.into(),
            row.mdc.into(),
            row.mean_diff.into(),
            row.classification.label().into(),
            row.direction.label().into(),
        ]);
    }
    table
}
