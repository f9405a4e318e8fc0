//! Realchange - detecting meaningful individual change in athlete testing
//!
//! Simulates a cohort measured at two timepoints with repeated trials, then
//! classifies each athlete's change under four methods: group SEM with MDC,
//! coefficient of variation, smallest worthwhile change with typical error,
//! and an athlete-level model statistic. Results render as text, CSV, JSON,
//! HTML and SVG charts.

pub mod artifacts;
pub mod chart;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod dataset;
pub mod error;
pub mod html_output;
pub mod json_output;
pub mod methods;
pub mod pipeline;
pub mod simulate;
pub mod stats;
pub mod table;
pub mod text_output;
