//! Chat transport interface
//!
//! The chat protocol itself is an external collaborator. This module defines
//! the events the panel consumes and the rendering surface it produces, plus
//! the [`ChatTransport`] trait a concrete transport implements.

use async_trait::async_trait;

/// Identifier of the operator driving the panel (chat user id).
pub type OperatorId = i64;

/// Inbound events delivered by the chat transport.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A slash-style command, e.g. `start`
    Command {
        name: String,
        operator: OperatorId,
    },

    /// A menu button press carrying an opaque routing token
    ButtonPressed {
        token: String,
        operator: OperatorId,
    },

    /// Free text; consumed by the wizard while a session exists
    TextReceived {
        text: String,
        operator: OperatorId,
        /// Transport message id, used for the best-effort password scrub
        message_id: i64,
    },
}

/// A single menu button: visible label plus opaque routing token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Outbound rendering surface implemented by the concrete transport.
///
/// Implementations must be cheap to call concurrently; the panel invokes
/// them from spawned worker tasks as well as the event loop.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Render a message with an attached button menu
    async fn render_menu(
        &self,
        operator: OperatorId,
        text: &str,
        buttons: Vec<Button>,
    ) -> anyhow::Result<()>;

    /// Render a plain message
    async fn render_message(&self, operator: OperatorId, text: &str) -> anyhow::Result<()>;

    /// Delete an operator's own message, if the transport supports it.
    ///
    /// Used to scrub the password message after the wizard reads it.
    /// Failures are the caller's to log; they are never surfaced.
    async fn delete_message(&self, operator: OperatorId, message_id: i64) -> anyhow::Result<()>;
}
