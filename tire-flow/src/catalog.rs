use crate::{
    answers::StepKey,
    dialog::{Dialog, DialogBuilder},
    step::{Bound, StepSpec},
};

pub const DIALOG_ID: &str = "tire_wear";
pub const GREETING: &str = "🏎️ Бот для анализа износа шин";

/// The nine measurement steps, in asking order
pub fn tire_wear_steps() -> Vec<StepSpec> {
    vec![
        StepSpec::number(
            StepKey::AirTemp,
            "Введите температуру воздуха (°C):",
            Bound::Between {
                min: -20.0,
                max: 60.0,
            },
            "Введите значение от -20°C до 60°C",
        ),
        StepSpec::number(
            StepKey::TrackTemp,
            "Введите температуру трека (°C):",
            Bound::Between {
                min: 10.0,
                max: 80.0,
            },
            "Введите значение от 10°C до 80°C",
        ),
        StepSpec::number(
            StepKey::TirePressure,
            "Введите давление в шинах (psi):",
            Bound::Between {
                min: 15.0,
                max: 40.0,
            },
            "Введите значение от 15 до 40 psi",
        ),
        StepSpec::number(
            StepKey::AvgSpeed,
            "Введите среднюю скорость (км/ч):",
            Bound::Between {
                min: 50.0,
                max: 350.0,
            },
            "Введите значение от 50 до 350 км/ч",
        ),
        // No upper limit on usage time.
        StepSpec::number(
            StepKey::UsageTime,
            "Введите время эксплуатации шин (в минутах):",
            Bound::AtLeast { min: 0.0 },
            "Введите положительное число",
        ),
        StepSpec::choice(StepKey::Antiaging, "Используются ли противостарители?"),
        StepSpec::choice(StepKey::CarbonBlack, "Содержится ли технический углерод?"),
        StepSpec::choice(StepKey::Silica, "Содержится ли диоксид кремния?"),
        StepSpec::number(
            StepKey::RubberPercent,
            "Введите процент каучука в шинах (50-60%):",
            Bound::Between {
                min: 50.0,
                max: 60.0,
            },
            "Введите значение от 50% до 60%",
        ),
    ]
}

/// Dialog that collects tire measurements and ends with a wear report
pub fn tire_wear_dialog() -> Dialog {
    tire_wear_steps()
        .into_iter()
        .fold(
            DialogBuilder::new(DIALOG_ID).greeting(GREETING),
            DialogBuilder::add_step,
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_key_order() {
        let keys: Vec<StepKey> = tire_wear_steps().iter().map(|step| step.key).collect();
        assert_eq!(keys, StepKey::ALL.to_vec());
    }

    #[test]
    fn only_additive_steps_offer_choices() {
        let with_choices: Vec<StepKey> = tire_wear_steps()
            .iter()
            .filter(|step| step.choices().is_some())
            .map(|step| step.key)
            .collect();
        assert_eq!(
            with_choices,
            vec![StepKey::Antiaging, StepKey::CarbonBlack, StepKey::Silica]
        );
    }
}
