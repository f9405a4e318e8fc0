//! JSON output format for the full report

use crate::config::ReportConfig;
use crate::dataset::AthleteSummary;
use crate::methods::{Method, MethodReport};
use crate::pipeline::Report;
use serde::Serialize;

/// One method's entry: its results or the reason it failed
#[derive(Debug, Clone, Serialize)]
pub struct JsonMethod<'a> {
    pub method: Method,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<&'a MethodReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    pub kind: &'static str,
    pub message: String,
}

/// Top-level JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub config: &'a ReportConfig,
    pub athletes: &'a [AthleteSummary],
    pub methods: Vec<JsonMethod<'a>>,
}

impl<'a> JsonReport<'a> {
    pub fn from_report(report: &'a Report) -> Self {
        let methods = report
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(results) => JsonMethod {
                    method: outcome.method,
                    title: outcome.method.title(),
                    results: Some(results),
                    error: None,
                },
                Err(e) => JsonMethod {
                    method: outcome.method,
                    title: outcome.method.title(),
                    results: None,
                    error: Some(JsonError {
                        kind: e.kind(),
                        message: e.to_string(),
                    }),
                },
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION"),
            config: &report.config,
            athletes: report.dataset.summaries(),
            methods,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
