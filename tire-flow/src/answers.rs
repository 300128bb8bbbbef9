use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FlowError, Result};

pub const YES: &str = "Да";
pub const NO: &str = "Нет";

/// Identifier of one question in the fixed sequence.
///
/// Variants are declared in asking order, so the derived `Ord` is the step order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    AirTemp,
    TrackTemp,
    TirePressure,
    AvgSpeed,
    UsageTime,
    Antiaging,
    CarbonBlack,
    Silica,
    RubberPercent,
}

impl StepKey {
    pub const ALL: [StepKey; 9] = [
        StepKey::AirTemp,
        StepKey::TrackTemp,
        StepKey::TirePressure,
        StepKey::AvgSpeed,
        StepKey::UsageTime,
        StepKey::Antiaging,
        StepKey::CarbonBlack,
        StepKey::Silica,
        StepKey::RubberPercent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::AirTemp => "air_temp",
            StepKey::TrackTemp => "track_temp",
            StepKey::TirePressure => "tire_pressure",
            StepKey::AvgSpeed => "avg_speed",
            StepKey::UsageTime => "usage_time",
            StepKey::Antiaging => "antiaging",
            StepKey::CarbonBlack => "carbon_black",
            StepKey::Silica => "silica",
            StepKey::RubberPercent => "rubber_percent",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// The step asked after this one, if any
    pub fn next(&self) -> Option<StepKey> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Steps that must already be answered before this one
    pub fn predecessors(&self) -> &'static [StepKey] {
        &Self::ALL[..self.index()]
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to a yes/no question.
///
/// The channel offers "Да"/"Нет" buttons but any text is accepted. Anything
/// that is not literally "Нет" counts as present, `Other` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    Yes,
    No,
    Other(String),
}

impl Choice {
    pub const OPTIONS: [&'static str; 2] = [YES, NO];

    pub fn as_str(&self) -> &str {
        match self {
            Choice::Yes => YES,
            Choice::No => NO,
            Choice::Other(text) => text,
        }
    }

    pub fn is_no(&self) -> bool {
        matches!(self, Choice::No)
    }
}

impl From<&str> for Choice {
    fn from(raw: &str) -> Self {
        match raw {
            YES => Choice::Yes,
            NO => Choice::No,
            other => Choice::Other(other.to_string()),
        }
    }
}

impl From<String> for Choice {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            YES => Choice::Yes,
            NO => Choice::No,
            _ => Choice::Other(raw),
        }
    }
}

impl From<Choice> for String {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Yes => YES.to_string(),
            Choice::No => NO.to_string(),
            Choice::Other(text) => text,
        }
    }
}

/// A validated answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Choice(Choice),
}

/// Answers collected so far in one dialog instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionAnswers {
    values: BTreeMap<StepKey, AnswerValue>,
}

impl SessionAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an answer. Every earlier step must already be answered.
    pub fn record(&mut self, key: StepKey, value: AnswerValue) -> Result<()> {
        if let Some(missing) = key
            .predecessors()
            .iter()
            .find(|earlier| !self.values.contains_key(*earlier))
        {
            return Err(FlowError::OutOfOrder {
                key,
                missing: *missing,
            });
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: StepKey) -> Option<&AnswerValue> {
        self.values.get(&key)
    }

    /// Numeric answer for `key`; `None` when absent or not a number
    pub fn number(&self, key: StepKey) -> Option<f64> {
        match self.values.get(&key) {
            Some(AnswerValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Choice answer for `key`; `None` when absent or not a choice
    pub fn choice(&self, key: StepKey) -> Option<&Choice> {
        match self.values.get(&key) {
            Some(AnswerValue::Choice(choice)) => Some(choice),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        StepKey::ALL.iter().all(|key| self.values.contains_key(key))
    }

    /// The most recently answered step
    pub fn last_key(&self) -> Option<StepKey> {
        self.values.keys().next_back().copied()
    }
}
