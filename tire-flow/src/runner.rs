//! FlowRunner – loads a session, handles exactly **one** inbound message, and
//! persists the updated session back to storage.
//!
//! The transition itself is [`Dialog::handle`], a pure function of
//! `(state, answers, input)`. The runner owns everything around it: looking up
//! the conversation, writing back the new state and answers (empty once a
//! dialog completes or is cancelled) and logging what happened.
//!
//! ```rust,no_run
//! # async fn demo() -> tire_flow::Result<()> {
//! use std::sync::Arc;
//! use tire_flow::{FlowRunner, InMemorySessionStorage, Session, SessionStorage, tire_wear_dialog};
//!
//! let storage = Arc::new(InMemorySessionStorage::new());
//! storage.save(Session::new("chat-42")).await?;
//!
//! let runner = FlowRunner::new(Arc::new(tire_wear_dialog()), storage);
//! let transition = runner.run("chat-42", "/start").await?;
//! println!("{}", transition.response);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    dialog::{Dialog, ExecutionStatus, Input, Transition},
    error::{FlowError, Result},
    storage::{Session, SessionStorage},
};

/// Orchestrates the _load → handle → save_ pattern for one conversation.
#[derive(Clone)]
pub struct FlowRunner {
    dialog: Arc<Dialog>,
    storage: Arc<dyn SessionStorage>,
}

impl FlowRunner {
    pub fn new(dialog: Arc<Dialog>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { dialog, storage }
    }

    /// Register a fresh idle session under `session_id`, replacing any existing one
    pub async fn open(&self, session_id: &str) -> Result<Session> {
        let session = Session::new(session_id);
        self.storage.save(session.clone()).await?;
        info!(session_id = %session_id, "Session opened");
        Ok(session)
    }

    /// Handle one raw message for `session_id` and persist the result.
    ///
    /// No per-session lock is taken: concurrent calls for the same session may lose an update.
    pub async fn run(&self, session_id: &str, raw: &str) -> Result<Transition> {
        let mut session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        let from = session.state;
        let input = Input::parse(raw);
        let answers = std::mem::take(&mut session.answers);
        let transition = self.dialog.handle(from, answers, input);

        session.state = transition.state;
        session.answers = transition.answers.clone().unwrap_or_default();
        session.updated_at = Utc::now();
        self.storage.save(session).await?;

        match (&transition.status, &transition.rejection) {
            (_, Some(rejection)) => warn!(
                session_id = %session_id,
                state = %from,
                reason = %rejection,
                "Answer rejected"
            ),
            (ExecutionStatus::Failed(reason), _) => error!(
                session_id = %session_id,
                from = %from,
                reason = %reason,
                "Dialog ended without a result"
            ),
            (status, None) => info!(
                session_id = %session_id,
                from = %from,
                to = %transition.state,
                status = ?status,
                "Transition applied"
            ),
        }

        Ok(transition)
    }
}
