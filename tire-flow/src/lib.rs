pub mod answers;
pub mod catalog;
pub mod dialog;
pub mod error;
pub mod estimator;
pub mod report;
pub mod runner;
pub mod step;
pub mod storage;

// Re-export commonly used types
pub use answers::{AnswerValue, Choice, SessionAnswers, StepKey};
pub use catalog::{tire_wear_dialog, tire_wear_steps};
pub use dialog::{Dialog, DialogBuilder, DialogState, ExecutionStatus, Input, Transition};
pub use error::{EstimationError, FlowError, Result, StepError};
pub use estimator::{AnalysisResult, Condition, WearBreakdown, estimate, wear_breakdown};
pub use runner::FlowRunner;
pub use step::{Bound, Rule, StepSpec};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
