use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    answers::{SessionAnswers, StepKey},
    error::StepError,
    estimator, report,
    step::StepSpec,
};

pub const START_COMMAND: &str = "/start";
pub const CANCEL_COMMAND: &str = "/cancel";

pub const CANCELLED: &str = "Анализ отменен. Для начала введите /start";
pub const IDLE_HINT: &str = "Для начала анализа введите /start";

/// Where a conversation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum DialogState {
    #[default]
    Idle,
    Awaiting(StepKey),
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogState::Idle => f.write_str("idle"),
            DialogState::Awaiting(key) => write!(f, "awaiting_{}", key),
        }
    }
}

/// One inbound message from the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Cancel,
    Answer(String),
}

impl Input {
    /// `/start` and `/cancel` are the only control tokens; everything else is an answer
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            START_COMMAND => Input::Start,
            CANCEL_COMMAND => Input::Cancel,
            _ => Input::Answer(raw.to_string()),
        }
    }
}

/// Outcome of handling one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// A step prompt is pending
    WaitingForInput,
    /// The last step was answered and the report was produced
    Completed,
    Cancelled,
    /// Nothing is in progress
    Idle,
    /// The dialog ended without a result
    Failed(String),
}

/// Everything the channel needs to reply and to persist the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: DialogState,
    /// `None` when the answers were discarded
    pub answers: Option<SessionAnswers>,
    pub response: String,
    pub choices: Option<Vec<String>>,
    pub status: ExecutionStatus,
    /// Set when the current step rejected the input
    pub rejection: Option<StepError>,
}

impl Transition {
    fn idle(response: impl Into<String>, status: ExecutionStatus) -> Self {
        Self {
            state: DialogState::Idle,
            answers: None,
            response: response.into(),
            choices: None,
            status,
            rejection: None,
        }
    }

    fn ask(step: &StepSpec, answers: SessionAnswers, response: String) -> Self {
        Self {
            state: DialogState::Awaiting(step.key),
            answers: Some(answers),
            response,
            choices: step.choices(),
            status: ExecutionStatus::WaitingForInput,
            rejection: None,
        }
    }
}

/// Fixed ordered sequence of steps driven by one validate-then-advance function
#[derive(Debug, Clone)]
pub struct Dialog {
    pub id: String,
    greeting: Option<String>,
    steps: Vec<StepSpec>,
}

impl Dialog {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            greeting: None,
            steps: Vec::new(),
        }
    }

    /// Append a step. Steps are asked in the order they are added.
    pub fn add_step(&mut self, step: StepSpec) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn set_greeting(&mut self, greeting: impl Into<String>) -> &mut Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub fn first_step(&self) -> Option<&StepSpec> {
        self.steps.first()
    }

    fn position(&self, key: StepKey) -> Option<usize> {
        self.steps.iter().position(|step| step.key == key)
    }

    /// Handle one input given the current state and answers.
    ///
    /// Pure and synchronous: the caller owns the answers and persists whatever
    /// the returned transition carries.
    pub fn handle(&self, state: DialogState, answers: SessionAnswers, input: Input) -> Transition {
        match (state, input) {
            (_, Input::Start) => self.start(),
            (DialogState::Idle, Input::Cancel) => {
                Transition::idle(IDLE_HINT, ExecutionStatus::Idle)
            }
            (DialogState::Awaiting(_), Input::Cancel) => {
                Transition::idle(CANCELLED, ExecutionStatus::Cancelled)
            }
            (DialogState::Idle, Input::Answer(_)) => {
                Transition::idle(IDLE_HINT, ExecutionStatus::Idle)
            }
            (DialogState::Awaiting(key), Input::Answer(raw)) => self.answer(key, answers, &raw),
        }
    }

    fn start(&self) -> Transition {
        let Some(first) = self.first_step() else {
            return Transition::idle(
                report::ESTIMATION_FAILED,
                ExecutionStatus::Failed(format!("dialog {} has no steps", self.id)),
            );
        };
        let response = match &self.greeting {
            Some(greeting) => format!("{}\n\n{}", greeting, first.prompt),
            None => first.prompt.to_string(),
        };
        Transition::ask(first, SessionAnswers::new(), response)
    }

    fn answer(&self, key: StepKey, mut answers: SessionAnswers, raw: &str) -> Transition {
        let Some(index) = self.position(key) else {
            return Transition::idle(
                report::ESTIMATION_FAILED,
                ExecutionStatus::Failed(format!("step {} is not part of dialog {}", key, self.id)),
            );
        };
        let step = &self.steps[index];

        let value = match step.accept(raw) {
            Ok(value) => value,
            Err(rejection) => {
                let response = format!("{}\n{}", rejection.notice(), step.prompt);
                let mut transition = Transition::ask(step, answers, response);
                transition.rejection = Some(rejection);
                return transition;
            }
        };

        if let Err(e) = answers.record(key, value) {
            return Transition::idle(
                report::ESTIMATION_FAILED,
                ExecutionStatus::Failed(e.to_string()),
            );
        }

        match self.steps.get(index + 1) {
            Some(next) => Transition::ask(next, answers, next.prompt.to_string()),
            None => match estimator::estimate(&answers) {
                Ok(result) => Transition::idle(report::render(&result), ExecutionStatus::Completed),
                Err(e) => Transition::idle(
                    report::ESTIMATION_FAILED,
                    ExecutionStatus::Failed(e.to_string()),
                ),
            },
        }
    }
}

/// Builder for creating dialogs
pub struct DialogBuilder {
    dialog: Dialog,
}

impl DialogBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            dialog: Dialog::new(id),
        }
    }

    pub fn add_step(mut self, step: StepSpec) -> Self {
        self.dialog.add_step(step);
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.dialog.set_greeting(greeting);
        self
    }

    pub fn build(self) -> Dialog {
        self.dialog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        answers::{AnswerValue, Choice},
        catalog::tire_wear_dialog,
        step::Bound,
    };

    const NEUTRAL_ANSWERS: [&str; 9] = ["20", "30", "28", "100", "0", "Да", "Да", "Да", "55"];

    fn run_inputs(dialog: &Dialog, inputs: &[&str]) -> (DialogState, SessionAnswers, Transition) {
        let mut state = DialogState::Idle;
        let mut answers = SessionAnswers::new();
        let mut last = None;
        for raw in inputs {
            let transition = dialog.handle(state, answers.clone(), Input::parse(raw));
            state = transition.state;
            answers = transition.answers.clone().unwrap_or_default();
            last = Some(transition);
        }
        (state, answers, last.expect("at least one input"))
    }

    #[test]
    fn input_parsing_recognises_commands() {
        assert_eq!(Input::parse("/start"), Input::Start);
        assert_eq!(Input::parse("  /cancel \n"), Input::Cancel);
        assert_eq!(Input::parse("/help"), Input::Answer("/help".to_string()));
        assert_eq!(Input::parse("Да"), Input::Answer("Да".to_string()));
    }

    #[test]
    fn start_greets_and_asks_first_question() {
        let dialog = tire_wear_dialog();
        let transition = dialog.handle(DialogState::Idle, SessionAnswers::new(), Input::Start);
        assert_eq!(transition.state, DialogState::Awaiting(StepKey::AirTemp));
        assert_eq!(
            transition.response,
            "🏎️ Бот для анализа износа шин\n\nВведите температуру воздуха (°C):"
        );
        assert_eq!(transition.answers, Some(SessionAnswers::new()));
        assert_eq!(transition.status, ExecutionStatus::WaitingForInput);
        assert_eq!(transition.choices, None);
    }

    #[test]
    fn accepted_answer_advances_to_next_step() {
        let dialog = tire_wear_dialog();
        let (state, answers, transition) = run_inputs(&dialog, &["/start", "25"]);
        assert_eq!(state, DialogState::Awaiting(StepKey::TrackTemp));
        assert_eq!(answers.number(StepKey::AirTemp), Some(25.0));
        assert_eq!(transition.response, "Введите температуру трека (°C):");
    }

    #[test]
    fn non_numeric_answer_keeps_state_and_answers() {
        let dialog = tire_wear_dialog();
        let (state, before, _) = run_inputs(&dialog, &["/start", "25"]);
        let transition = dialog.handle(state, before.clone(), Input::parse("тепло"));
        assert_eq!(transition.state, DialogState::Awaiting(StepKey::TrackTemp));
        assert_eq!(transition.answers, Some(before));
        assert_eq!(transition.rejection, Some(StepError::NotANumber));
        assert_eq!(
            transition.response,
            "Пожалуйста, введите число\nВведите температуру трека (°C):"
        );
    }

    #[test]
    fn every_numeric_bound_is_inclusive() {
        let dialog = tire_wear_dialog();
        for (index, step) in dialog.steps().iter().enumerate() {
            let crate::step::Rule::Number { bound, .. } = step.rule else {
                continue;
            };
            let (state, answers, _) = run_inputs(&dialog, &{
                let mut inputs = vec!["/start"];
                inputs.extend_from_slice(&NEUTRAL_ANSWERS[..index]);
                inputs
            });
            assert_eq!(state, DialogState::Awaiting(step.key));

            let (low, high) = match bound {
                Bound::Between { min, max } => (min, Some(max)),
                Bound::AtLeast { min } => (min, None),
            };

            let accepted = dialog.handle(state, answers.clone(), Input::Answer(low.to_string()));
            assert_ne!(accepted.state, state, "{} should accept {}", step.key, low);

            let rejected =
                dialog.handle(state, answers.clone(), Input::Answer((low - 1.0).to_string()));
            assert_eq!(rejected.state, state);
            assert_eq!(rejected.answers.as_ref(), Some(&answers));
            assert!(matches!(
                rejected.rejection,
                Some(StepError::OutOfRange { .. })
            ));

            if let Some(high) = high {
                let accepted =
                    dialog.handle(state, answers.clone(), Input::Answer(high.to_string()));
                assert_ne!(accepted.state, state, "{} should accept {}", step.key, high);

                let rejected =
                    dialog.handle(state, answers.clone(), Input::Answer((high + 1.0).to_string()));
                assert_eq!(rejected.state, state);
                assert!(rejected.response.starts_with(rejected.rejection.unwrap().notice()));
            }
        }
    }

    #[test]
    fn choice_steps_offer_selector_and_accept_any_text() {
        let dialog = tire_wear_dialog();
        let (state, _, transition) = run_inputs(&dialog, &["/start", "20", "30", "28", "100", "0"]);
        assert_eq!(state, DialogState::Awaiting(StepKey::Antiaging));
        assert_eq!(transition.response, "Используются ли противостарители?");
        assert_eq!(
            transition.choices,
            Some(vec!["Да".to_string(), "Нет".to_string()])
        );

        let (state, answers, _) = run_inputs(
            &dialog,
            &["/start", "20", "30", "28", "100", "0", "возможно"],
        );
        assert_eq!(state, DialogState::Awaiting(StepKey::CarbonBlack));
        assert_eq!(
            answers.get(StepKey::Antiaging),
            Some(&AnswerValue::Choice(Choice::Other("возможно".to_string())))
        );
    }

    #[test]
    fn final_step_reports_and_returns_to_idle() {
        let dialog = tire_wear_dialog();
        let mut inputs = vec!["/start"];
        inputs.extend_from_slice(&NEUTRAL_ANSWERS[..8]);
        let (_, answers, _) = run_inputs(&dialog, &inputs);
        assert!(!answers.is_complete());

        inputs.push(NEUTRAL_ANSWERS[8]);
        let (state, _, transition) = run_inputs(&dialog, &inputs);

        assert_eq!(state, DialogState::Idle);
        assert_eq!(transition.answers, None);
        assert_eq!(transition.status, ExecutionStatus::Completed);
        assert!(transition.response.contains("Общий износ: 20.0%"));
        assert!(transition.response.contains("Остаточный ресурс: 80.0%"));
        assert!(transition.response.contains("Состояние: Отличное"));
    }

    #[test]
    fn missing_additives_report_good_condition() {
        let dialog = tire_wear_dialog();
        let (_, _, transition) = run_inputs(
            &dialog,
            &["/start", "20", "30", "28", "100", "0", "Нет", "Нет", "Нет", "55"],
        );
        assert!(transition.response.contains("Общий износ: 38.0%"));
        assert!(transition.response.contains("Состояние: Хорошее"));
    }

    #[test]
    fn cancel_discards_answers_from_any_step() {
        let dialog = tire_wear_dialog();
        for answered in 0..NEUTRAL_ANSWERS.len() {
            let mut inputs = vec!["/start"];
            inputs.extend_from_slice(&NEUTRAL_ANSWERS[..answered]);
            let (state, answers, _) = run_inputs(&dialog, &inputs);
            assert_eq!(answers.len(), answered);

            let cancelled = dialog.handle(state, answers, Input::Cancel);
            assert_eq!(cancelled.state, DialogState::Idle);
            assert_eq!(cancelled.answers, None);
            assert_eq!(cancelled.status, ExecutionStatus::Cancelled);
            assert_eq!(cancelled.response, CANCELLED);

            let restarted = dialog.handle(
                cancelled.state,
                cancelled.answers.unwrap_or_default(),
                Input::Start,
            );
            assert_eq!(restarted.answers, Some(SessionAnswers::new()));
            assert_eq!(restarted.state, DialogState::Awaiting(StepKey::AirTemp));
        }
    }

    #[test]
    fn start_mid_dialog_restarts_with_empty_answers() {
        let dialog = tire_wear_dialog();
        let (state, answers, transition) = run_inputs(&dialog, &["/start", "20", "30", "/start"]);
        assert_eq!(state, DialogState::Awaiting(StepKey::AirTemp));
        assert!(answers.is_empty());
        assert_eq!(transition.status, ExecutionStatus::WaitingForInput);
    }

    #[test]
    fn idle_ignores_answers_and_cancel() {
        let dialog = tire_wear_dialog();
        for input in [Input::Answer("42".to_string()), Input::Cancel] {
            let transition = dialog.handle(DialogState::Idle, SessionAnswers::new(), input);
            assert_eq!(transition.state, DialogState::Idle);
            assert_eq!(transition.status, ExecutionStatus::Idle);
            assert_eq!(transition.response, IDLE_HINT);
        }
    }

    #[test]
    fn unknown_step_resets_to_idle() {
        let dialog = DialogBuilder::new("short")
            .add_step(StepSpec::number(
                StepKey::AirTemp,
                "air?",
                Bound::Between {
                    min: -20.0,
                    max: 60.0,
                },
                "range",
            ))
            .build();
        let transition = dialog.handle(
            DialogState::Awaiting(StepKey::Silica),
            SessionAnswers::new(),
            Input::Answer("Да".to_string()),
        );
        assert_eq!(transition.state, DialogState::Idle);
        assert!(matches!(transition.status, ExecutionStatus::Failed(_)));
        assert_eq!(transition.response, report::ESTIMATION_FAILED);
    }

    #[test]
    fn estimation_failure_on_final_step_resets_to_idle() {
        let dialog = tire_wear_dialog();
        let mut answers = SessionAnswers::new();
        for (key, raw) in StepKey::ALL.iter().zip(NEUTRAL_ANSWERS).take(8) {
            let value = match key {
                StepKey::TrackTemp => AnswerValue::Choice(Choice::Yes),
                _ => dialog.steps()[*key as usize].accept(raw).unwrap(),
            };
            answers.record(*key, value).unwrap();
        }

        let transition = dialog.handle(
            DialogState::Awaiting(StepKey::RubberPercent),
            answers,
            Input::Answer("55".to_string()),
        );
        assert_eq!(transition.state, DialogState::Idle);
        assert_eq!(transition.answers, None);
        assert_eq!(transition.response, report::ESTIMATION_FAILED);
        assert!(matches!(transition.status, ExecutionStatus::Failed(_)));
    }

    #[test]
    fn state_serializes_with_step_name() {
        let json = serde_json::to_value(DialogState::Awaiting(StepKey::AvgSpeed)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "state": "awaiting", "step": "avg_speed" })
        );
        assert_eq!(DialogState::Awaiting(StepKey::AvgSpeed).to_string(), "awaiting_avg_speed");
    }
}
