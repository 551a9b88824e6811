//! Add-server provisioning wizard
//!
//! Per-operator finite-state flow: host, then username, then password. Each
//! step consumes exactly one inbound text value. The password is never
//! stored in the session; the final step removes the whole session and
//! hands the password out wrapped in `Zeroizing` for its single
//! provisioning call. Once that value drops, nothing retrievable remains.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

use crate::chat::OperatorId;

/// Current step of an add-server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    AwaitingHost,
    AwaitingUsername,
    AwaitingPassword,
}

/// One operator's in-flight wizard state.
///
/// Holds only the fields already collected; the password never lands here.
#[derive(Debug)]
struct WizardSession {
    step: WizardStep,
    host: Option<String>,
    username: Option<String>,
}

impl WizardSession {
    fn new() -> Self {
        Self {
            step: WizardStep::AwaitingHost,
            host: None,
            username: None,
        }
    }
}

/// Instruction to the panel after feeding one text value into the wizard.
#[derive(Debug)]
pub enum WizardOutcome {
    /// Host stored; prompt for the username
    AskUsername,
    /// Username stored; prompt for the password
    AskPassword,
    /// Current step's input was blank; re-prompt
    Retry(WizardStep),
    /// All fields collected; the session is already destroyed. The password
    /// exists only in this value.
    Provision {
        host: String,
        username: String,
        password: Zeroizing<String>,
    },
}

/// Owning store for wizard sessions, at most one per operator.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<OperatorId, WizardSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh add-server session, silently superseding any prior one.
    pub async fn begin(&self, operator: OperatorId) {
        let mut sessions = self.sessions.lock().await;
        let replaced = sessions.insert(operator, WizardSession::new()).is_some();
        if replaced {
            debug!(operator, "wizard session superseded");
        }
    }

    /// Destroy the operator's session, if any. Used when an unrelated
    /// command arrives mid-flow.
    pub async fn cancel(&self, operator: OperatorId) -> bool {
        self.sessions.lock().await.remove(&operator).is_some()
    }

    /// Whether the next free-text event for this operator is wizard input.
    pub async fn is_active(&self, operator: OperatorId) -> bool {
        self.sessions.lock().await.contains_key(&operator)
    }

    /// Feed one inbound text value into the operator's session.
    ///
    /// Returns `None` when no session exists (the text is a generic
    /// message). On the password step the session is removed before the
    /// outcome is returned, so it is gone regardless of what the caller
    /// does next.
    pub async fn handle_text(&self, operator: OperatorId, text: &str) -> Option<WizardOutcome> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&operator)?;

        let value = text.trim();
        if value.is_empty() {
            return Some(WizardOutcome::Retry(session.step));
        }

        match session.step {
            WizardStep::AwaitingHost => {
                session.host = Some(value.to_string());
                session.step = WizardStep::AwaitingUsername;
                Some(WizardOutcome::AskUsername)
            }
            WizardStep::AwaitingUsername => {
                session.username = Some(value.to_string());
                session.step = WizardStep::AwaitingPassword;
                Some(WizardOutcome::AskPassword)
            }
            WizardStep::AwaitingPassword => {
                // Terminal step: tear the session down first, then hand the
                // collected fields out. Host and username were set by the
                // earlier transitions.
                let session = sessions.remove(&operator)?;
                let (host, username) = match (session.host, session.username) {
                    (Some(host), Some(username)) => (host, username),
                    _ => return None,
                };
                Some(WizardOutcome::Provision {
                    host,
                    username,
                    password: Zeroizing::new(value.to_string()),
                })
            }
        }
    }
}
