// Change-detection methods
//
// Four independent ways of deciding whether an athlete's change between two
// testing sessions exceeds measurement noise:
//
// - sem:   group Standard Error of Measurement from a one-way ANOVA on the
//          baseline trials, with the Minimal Detectable Change alongside
// - cv:    athlete-level Coefficient of Variation on the percentage scale
// - swc:   Smallest Worthwhile Change (0.2 x athlete sd) with a group
//          Typical Error interval for presentation
// - model: athlete-level SEM from the athlete's own pooled trials
//
// Each method is a pure function of the dataset and thresholds. Thresholds
// are returned inside the method's report, never stored anywhere else.

mod cv;
mod model;
mod sem;
mod swc;

pub use cv::{coefficient_of_variation, evaluate_cv, CvClass, CvReport, CvRow};
pub use model::{
    athlete_error_term, evaluate_model, AthleteErrorTerm, ModelClass, ModelDirection, ModelReport,
    ModelRow,
};
pub use sem::{
    evaluate_sem, minimal_detectable_change, standard_error_of_measurement, SemClass, SemEstimate,
    SemReport, SemRow,
};
pub use swc::{
    evaluate_swc, smallest_worthwhile_change, touches_swc_band, typical_error, SwcBand, SwcClass,
    SwcReport, SwcRow, TrialPairSd, TypicalError,
};

use crate::config::ThresholdConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four change-detection methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Group SEM from one-way ANOVA, with MDC
    SemMdc,
    /// Athlete coefficient of variation
    Cv,
    /// Smallest worthwhile change with typical error
    Swc,
    /// Athlete-level model statistic
    Model,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::SemMdc, Method::Cv, Method::Swc, Method::Model];

    /// Human-readable title
    pub fn title(self) -> &'static str {
        match self {
            Method::SemMdc => "Standard Error of Measurement / Minimal Detectable Change",
            Method::Cv => "Coefficient of Variation",
            Method::Swc => "Smallest Worthwhile Change",
            Method::Model => "Model Statistic",
        }
    }

    /// File stem for per-method artifacts
    pub fn slug(self) -> &'static str {
        match self {
            Method::SemMdc => "sem_mdc",
            Method::Cv => "cv",
            Method::Swc => "swc",
            Method::Model => "model_statistic",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::SemMdc => "sem-mdc",
            Method::Cv => "cv",
            Method::Swc => "swc",
            Method::Model => "model",
        })
    }
}

/// Output of any one method
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MethodReport {
    SemMdc(SemReport),
    Cv(CvReport),
    Swc(SwcReport),
    Model(ModelReport),
}

impl MethodReport {
    pub fn method(&self) -> Method {
        match self {
            MethodReport::SemMdc(_) => Method::SemMdc,
            MethodReport::Cv(_) => Method::Cv,
            MethodReport::Swc(_) => Method::Swc,
            MethodReport::Model(_) => Method::Model,
        }
    }

    /// Number of athletes whose change exceeds the method's threshold
    pub fn flagged_count(&self) -> usize {
        match self {
            MethodReport::SemMdc(r) => r
                .rows
                .iter()
                .filter(|row| row.classification != SemClass::WithinNormalVariability)
                .count(),
            MethodReport::Cv(r) => r
                .rows
                .iter()
                .filter(|row| row.classification == CvClass::BeyondNormalVariability)
                .count(),
            MethodReport::Swc(r) => r
                .rows
                .iter()
                .filter(|row| row.classification == SwcClass::MeaningfulChange)
                .count(),
            MethodReport::Model(r) => r
                .rows
                .iter()
                .filter(|row| row.classification == ModelClass::TrueDifference)
                .count(),
        }
    }
}

/// Run one method over the dataset
pub fn evaluate(method: Method, dataset: &Dataset, thresholds: &ThresholdConfig) -> Result<MethodReport> {
    match method {
        Method::SemMdc => evaluate_sem(dataset, thresholds).map(MethodReport::SemMdc),
        Method::Cv => evaluate_cv(dataset).map(MethodReport::Cv),
        Method::Swc => evaluate_swc(dataset, thresholds).map(MethodReport::Swc),
        Method::Model => evaluate_model(dataset, thresholds).map(MethodReport::Model),
    }
}
