//! Error taxonomy for the change-detection methods
//!
//! Every variant is an input-validation failure raised before a method's
//! computation proceeds. Nothing here is retried; the caller supplies
//! valid data or gets no result for that method.

use crate::dataset::AthleteId;
use thiserror::Error;

/// Errors raised by the metric engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("Degenerate model: {reason}")]
    DegenerateModel { reason: String },

    #[error("Undefined ratio for athlete {athlete}: mean {mean} is not positive")]
    UndefinedRatio { athlete: AthleteId, mean: f64 },

    #[error("Insufficient trials: {context} needs at least {required}, got {actual}")]
    InsufficientTrials {
        context: String,
        required: usize,
        actual: usize,
    },

    #[error("Athlete {athlete} is missing timepoint {timepoint}")]
    MissingTimepoint { athlete: AthleteId, timepoint: u8 },
}

impl MetricError {
    pub(crate) fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        MetricError::InsufficientTrials {
            context: context.into(),
            required,
            actual,
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            MetricError::DegenerateModel { .. } => "DegenerateModel",
            MetricError::UndefinedRatio { .. } => "UndefinedRatio",
            MetricError::InsufficientTrials { .. } => "InsufficientTrials",
            MetricError::MissingTimepoint { .. } => "MissingTimepoint",
        }
    }
}

/// Result type for metric computations
pub type Result<T> = std::result::Result<T, MetricError>;
