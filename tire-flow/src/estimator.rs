//! Heuristic tire wear estimate.
//!
//! Wear starts at a fixed base and every measurement adds an independent,
//! non-negative penalty. The sum is capped at 100 and the remaining life is
//! classified into one of five conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    answers::{SessionAnswers, StepKey},
    error::EstimationError,
};

pub const BASE_WEAR: f64 = 20.0;

const DEFAULT_USAGE_MINUTES: f64 = 0.0;
const DEFAULT_TRACK_TEMP: f64 = 30.0;
const DEFAULT_AVG_SPEED: f64 = 100.0;
const DEFAULT_TIRE_PRESSURE: f64 = 28.0;
const DEFAULT_RUBBER_PERCENT: f64 = 55.0;

const MAX_USAGE_PENALTY: f64 = 40.0;
const IDEAL_PRESSURE: f64 = 28.0;
const IDEAL_RUBBER_PERCENT: f64 = 55.0;

const ANTIAGING_MISSING_PENALTY: f64 = 4.0;
const CARBON_BLACK_MISSING_PENALTY: f64 = 6.0;
const SILICA_MISSING_PENALTY: f64 = 8.0;

/// Tire condition derived from the remaining life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    Good,
    Average,
    Poor,
    Critical,
}

impl Condition {
    /// Non-overlapping partition of `remaining`, checked from the top down
    pub fn classify(remaining: f64) -> Self {
        if remaining > 75.0 {
            Condition::Excellent
        } else if remaining > 50.0 {
            Condition::Good
        } else if remaining > 25.0 {
            Condition::Average
        } else if remaining > 10.0 {
            Condition::Poor
        } else {
            Condition::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Excellent => "Отличное",
            Condition::Good => "Хорошее",
            Condition::Average => "Среднее",
            Condition::Poor => "Плохое",
            Condition::Critical => "Критическое",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Condition::Excellent => "Шины в идеальном состоянии",
            Condition::Good => "Шины в хорошем состоянии",
            Condition::Average => "Рекомендуется замена в ближайшее время",
            Condition::Poor => "Срочно замените шины",
            Condition::Critical => "Немедленная замена! Опасность повреждения!",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final estimate for one completed dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub wear_percentage: f64,
    pub remaining: f64,
    pub condition: Condition,
    pub recommendation: String,
}

/// Individual penalty terms that make up the wear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WearBreakdown {
    pub base: f64,
    pub usage: f64,
    pub track_temp: f64,
    pub speed: f64,
    pub pressure: f64,
    pub rubber: f64,
    pub additives: f64,
}

impl WearBreakdown {
    /// Unclamped sum of all terms
    pub fn total(&self) -> f64 {
        self.base
            + self.usage
            + self.track_temp
            + self.speed
            + self.pressure
            + self.rubber
            + self.additives
    }
}

pub fn usage_penalty(minutes: f64) -> f64 {
    (minutes * 0.05).min(MAX_USAGE_PENALTY)
}

pub fn track_temp_penalty(temp: f64) -> f64 {
    if temp > 50.0 {
        (temp - 50.0) * 0.5
    } else if temp > 40.0 {
        (temp - 40.0) * 0.3
    } else if temp < 15.0 {
        (15.0 - temp) * 0.2
    } else {
        0.0
    }
}

pub fn speed_penalty(speed: f64) -> f64 {
    if speed > 150.0 {
        (speed - 150.0) * 0.2
    } else if speed > 120.0 {
        (speed - 120.0) * 0.1
    } else {
        0.0
    }
}

pub fn pressure_penalty(pressure: f64) -> f64 {
    (pressure - IDEAL_PRESSURE).abs() * 0.8
}

pub fn rubber_penalty(rubber_percent: f64) -> f64 {
    (IDEAL_RUBBER_PERCENT - rubber_percent).max(0.0) * 0.4
}

fn number_or(
    answers: &SessionAnswers,
    key: StepKey,
    default: f64,
) -> Result<f64, EstimationError> {
    match answers.get(key) {
        None => Ok(default),
        Some(_) => answers
            .number(key)
            .ok_or(EstimationError::InvalidValue(key)),
    }
}

/// Absent answers default to "Нет"
fn additive_missing(answers: &SessionAnswers, key: StepKey) -> Result<bool, EstimationError> {
    match answers.get(key) {
        None => Ok(true),
        Some(_) => answers
            .choice(key)
            .map(|choice| choice.is_no())
            .ok_or(EstimationError::InvalidValue(key)),
    }
}

/// Compute each penalty term from the answers, substituting defaults for absent fields
pub fn wear_breakdown(answers: &SessionAnswers) -> Result<WearBreakdown, EstimationError> {
    let usage_minutes = number_or(answers, StepKey::UsageTime, DEFAULT_USAGE_MINUTES)?;
    let track_temp = number_or(answers, StepKey::TrackTemp, DEFAULT_TRACK_TEMP)?;
    let avg_speed = number_or(answers, StepKey::AvgSpeed, DEFAULT_AVG_SPEED)?;
    let pressure = number_or(answers, StepKey::TirePressure, DEFAULT_TIRE_PRESSURE)?;
    let rubber_percent = number_or(answers, StepKey::RubberPercent, DEFAULT_RUBBER_PERCENT)?;

    let mut additives = 0.0;
    for (key, penalty) in [
        (StepKey::Antiaging, ANTIAGING_MISSING_PENALTY),
        (StepKey::CarbonBlack, CARBON_BLACK_MISSING_PENALTY),
        (StepKey::Silica, SILICA_MISSING_PENALTY),
    ] {
        if additive_missing(answers, key)? {
            additives += penalty;
        }
    }

    Ok(WearBreakdown {
        base: BASE_WEAR,
        usage: usage_penalty(usage_minutes),
        track_temp: track_temp_penalty(track_temp),
        speed: speed_penalty(avg_speed),
        pressure: pressure_penalty(pressure),
        rubber: rubber_penalty(rubber_percent),
        additives,
    })
}

/// Estimate wear, remaining life and condition from a set of answers.
///
/// Deterministic and free of side effects. Air temperature is collected by the
/// dialog but does not influence the estimate.
pub fn estimate(answers: &SessionAnswers) -> Result<AnalysisResult, EstimationError> {
    let total = wear_breakdown(answers)?.total();
    if !total.is_finite() {
        return Err(EstimationError::NonFinite);
    }

    let wear_percentage = total.clamp(0.0, 100.0);
    let remaining = (100.0 - wear_percentage).clamp(0.0, 100.0);
    let condition = Condition::classify(remaining);

    Ok(AnalysisResult {
        wear_percentage,
        remaining,
        condition,
        recommendation: condition.recommendation().to_string(),
    })
}
