use serde::{Deserialize, Serialize};

use crate::{
    answers::{AnswerValue, Choice, StepKey},
    error::StepError,
};

/// Inclusive numeric bound of a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    Between { min: f64, max: f64 },
    AtLeast { min: f64 },
}

impl Bound {
    /// Non-finite values (NaN, infinities) are outside every bound.
    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match *self {
            Bound::Between { min, max } => (min..=max).contains(&value),
            Bound::AtLeast { min } => value >= min,
        }
    }
}

/// How a step validates its raw input
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Number { bound: Bound, notice: &'static str },
    /// Accepts any text verbatim
    Choice,
}

/// One question of the dialog: what it asks, where the answer goes and how it is checked
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
    pub key: StepKey,
    pub prompt: &'static str,
    pub rule: Rule,
}

impl StepSpec {
    pub fn number(key: StepKey, prompt: &'static str, bound: Bound, notice: &'static str) -> Self {
        Self {
            key,
            prompt,
            rule: Rule::Number { bound, notice },
        }
    }

    pub fn choice(key: StepKey, prompt: &'static str) -> Self {
        Self {
            key,
            prompt,
            rule: Rule::Choice,
        }
    }

    /// Validate raw channel text into a storable answer
    pub fn accept(&self, raw: &str) -> Result<AnswerValue, StepError> {
        match &self.rule {
            Rule::Number { bound, notice } => {
                let value: f64 = raw.trim().parse().map_err(|_| StepError::NotANumber)?;
                if !bound.contains(value) {
                    return Err(StepError::OutOfRange {
                        value,
                        notice: *notice,
                    });
                }
                Ok(AnswerValue::Number(value))
            }
            Rule::Choice => Ok(AnswerValue::Choice(Choice::from(raw))),
        }
    }

    /// Selector offered alongside the prompt. Purely a UI hint.
    pub fn choices(&self) -> Option<Vec<String>> {
        match self.rule {
            Rule::Choice => Some(Choice::OPTIONS.iter().map(|s| s.to_string()).collect()),
            Rule::Number { .. } => None,
        }
    }
}
