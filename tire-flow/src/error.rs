use thiserror::Error;

use crate::answers::StepKey;

/// Errors raised by the dialog runtime and its storage
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("answer for {key} recorded before {missing}")]
    OutOfOrder { key: StepKey, missing: StepKey },
}

/// Why a step rejected its input. The session stays on the same step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("input is not a number")]
    NotANumber,

    #[error("value {value} is out of range")]
    OutOfRange { value: f64, notice: &'static str },
}

impl StepError {
    /// Text shown to the user before the step prompt is repeated
    pub fn notice(&self) -> &'static str {
        match self {
            StepError::NotANumber => "Пожалуйста, введите число",
            StepError::OutOfRange { notice, .. } => notice,
        }
    }
}

/// The estimator could not turn the collected answers into a result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("answer for {0} has the wrong kind of value")]
    InvalidValue(StepKey),

    #[error("wear computation produced a non-finite value")]
    NonFinite,
}

pub type Result<T> = std::result::Result<T, FlowError>;
