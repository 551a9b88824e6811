//! Line-oriented console transport
//!
//! A minimal [`ChatTransport`] for running the panel without a chat network:
//! menus print with numbered buttons, and the event loop maps stdin lines to
//! chat events. Lines starting with `/` are commands, a bare number presses
//! the matching button from the last menu, anything else is free text.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;

use crate::chat::{Button, ChatEvent, ChatTransport, OperatorId};
use crate::panel::ControlPanel;

/// Operator id used for the single console session
const CONSOLE_OPERATOR: OperatorId = 0;

/// Console-backed transport printing to stdout.
#[derive(Default)]
pub struct ConsoleTransport {
    /// Buttons from the most recent menu, addressable by number
    last_buttons: Mutex<HashMap<usize, Button>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a button token by its printed number.
    pub async fn button_token(&self, number: usize) -> Option<String> {
        self.last_buttons
            .lock()
            .await
            .get(&number)
            .map(|b| b.token.clone())
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn render_menu(
        &self,
        _operator: OperatorId,
        text: &str,
        buttons: Vec<Button>,
    ) -> anyhow::Result<()> {
        println!("\n{}", text.trim_end());
        let mut last = self.last_buttons.lock().await;
        last.clear();
        for (idx, button) in buttons.into_iter().enumerate() {
            println!("  [{}] {}", idx + 1, button.label);
            last.insert(idx + 1, button);
        }
        Ok(())
    }

    async fn render_message(&self, _operator: OperatorId, text: &str) -> anyhow::Result<()> {
        println!("\n{}", text.trim_end());
        Ok(())
    }

    async fn delete_message(&self, _operator: OperatorId, _message_id: i64) -> anyhow::Result<()> {
        // The console cannot unprint a line; report failure so the caller
        // logs the missed scrub
        anyhow::bail!("console messages cannot be deleted")
    }
}

/// Read stdin and feed events into the panel until EOF.
pub async fn run_event_loop(panel: Arc<ControlPanel>, transport: Arc<ConsoleTransport>) {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut next_message_id: i64 = 0;

    panel
        .handle_event(ChatEvent::Command {
            name: "start".to_string(),
            operator: CONSOLE_OPERATOR,
        })
        .await;

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let wizard_input = panel.wizard_active(CONSOLE_OPERATOR).await;
        if let Some(event) =
            line_event(&transport, line, wizard_input, &mut next_message_id).await
        {
            panel.handle_event(event).await;
        }
    }

    info!("console input closed");
}

/// Map one stdin line to a chat event.
///
/// While a wizard session is active every non-command line is wizard input,
/// so an all-digit host or password is never mistaken for a button press.
async fn line_event(
    transport: &ConsoleTransport,
    line: String,
    wizard_input: bool,
    next_message_id: &mut i64,
) -> Option<ChatEvent> {
    if let Some(command) = line.strip_prefix('/') {
        return Some(ChatEvent::Command {
            name: command.to_string(),
            operator: CONSOLE_OPERATOR,
        });
    }

    if !wizard_input {
        if let Ok(number) = line.parse::<usize>() {
            return match transport.button_token(number).await {
                Some(token) => Some(ChatEvent::ButtonPressed {
                    token,
                    operator: CONSOLE_OPERATOR,
                }),
                None => {
                    println!("No button [{}] on the last menu.", number);
                    None
                }
            };
        }
    }

    *next_message_id += 1;
    Some(ChatEvent::TextReceived {
        text: line,
        operator: CONSOLE_OPERATOR,
        message_id: *next_message_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_menu_buttons_addressable_by_number() {
        let transport = ConsoleTransport::new();
        transport
            .render_menu(
                CONSOLE_OPERATOR,
                "menu",
                vec![
                    Button::new("First", "menu"),
                    Button::new("Second", "srv_menu"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(transport.button_token(1).await.as_deref(), Some("menu"));
        assert_eq!(transport.button_token(2).await.as_deref(), Some("srv_menu"));
        assert!(transport.button_token(3).await.is_none());
    }

    #[tokio::test]
    async fn test_new_menu_replaces_buttons() {
        let transport = ConsoleTransport::new();
        transport
            .render_menu(CONSOLE_OPERATOR, "a", vec![Button::new("One", "menu")])
            .await
            .unwrap();
        transport
            .render_menu(CONSOLE_OPERATOR, "b", vec![Button::new("Two", "list")])
            .await
            .unwrap();

        assert_eq!(transport.button_token(1).await.as_deref(), Some("list"));
    }

    #[tokio::test]
    async fn test_delete_message_reports_failure() {
        let transport = ConsoleTransport::new();
        assert!(transport.delete_message(CONSOLE_OPERATOR, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_numeric_line_presses_button_outside_wizard() {
        let transport = ConsoleTransport::new();
        transport
            .render_menu(CONSOLE_OPERATOR, "menu", vec![Button::new("First", "menu")])
            .await
            .unwrap();

        let mut next_id = 0;
        let event = line_event(&transport, "1".to_string(), false, &mut next_id).await;
        assert!(matches!(
            event,
            Some(ChatEvent::ButtonPressed { ref token, .. }) if token == "menu"
        ));
        // Out-of-range numbers are swallowed with a hint
        assert!(line_event(&transport, "9".to_string(), false, &mut next_id)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_numeric_line_is_wizard_input_while_session_active() {
        let transport = ConsoleTransport::new();
        transport
            .render_menu(CONSOLE_OPERATOR, "menu", vec![Button::new("First", "menu")])
            .await
            .unwrap();

        // An all-digit host (or password) must reach the wizard even though
        // it parses as a button number
        let mut next_id = 0;
        let event = line_event(&transport, "2130706433".to_string(), true, &mut next_id).await;
        assert!(matches!(
            event,
            Some(ChatEvent::TextReceived { ref text, .. }) if text == "2130706433"
        ));

        // Commands still interrupt the wizard
        let event = line_event(&transport, "/start".to_string(), true, &mut next_id).await;
        assert!(matches!(
            event,
            Some(ChatEvent::Command { ref name, .. }) if name == "start"
        ));
    }
}
