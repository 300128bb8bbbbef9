use serde::{Deserialize, Serialize};
use tire_flow::{DialogState, ExecutionStatus, Transition};

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Omit to open a new conversation
    pub session_id: Option<String>,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub session_id: String,
    pub response: String,
    /// Reply keyboard to render, if the current step offers one
    pub choices: Option<Vec<String>>,
    pub status: ExecutionStatus,
    pub state: DialogState,
}

impl ExecuteResponse {
    pub fn from_transition(session_id: String, transition: Transition) -> Self {
        Self {
            session_id,
            response: transition.response,
            choices: transition.choices,
            status: transition.status,
            state: transition.state,
        }
    }
}
