//! Message thread and send loop.

use tracing::{info, warn};

use super::Effect;
use super::notify::{Notification, Notifications};
use crate::api::ApiError;
use crate::session::{Message, Transcript};

/// Placeholder shown in an empty input line.
pub const INPUT_PLACEHOLDER: &str = "Type your message...";

const FAILURE_TITLE: &str = "Error";

/// Conversation component: transcript, input line, and the pending request flag.
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    transcript: Transcript,
    input: String,
    awaiting_reply: bool,
    scroll_target: Option<usize>,
}

impl ConversationView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input line. Allowed while a reply is pending.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send control shows its busy state.
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Index of the message the view must keep visible.
    pub fn scroll_target(&self) -> Option<usize> {
        self.scroll_target
    }

    /// Submit the input line.
    ///
    /// Blank input and sends while a reply is pending are ignored without
    /// touching any state.
    pub fn send(&mut self) -> Option<Effect> {
        if self.input.trim().is_empty() {
            return None;
        }
        if self.awaiting_reply {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.append(Message::user(text.clone()));
        self.awaiting_reply = true;
        info!(name: "chat.sent", chars = text.len(), "Message sent");
        Some(Effect::Chat(text))
    }

    /// Handle the outcome of the pending chat request.
    ///
    /// On failure the user's message stays in the transcript unanswered.
    pub fn on_reply(&mut self, result: Result<String, ApiError>, notifications: &mut Notifications) {
        if !self.awaiting_reply {
            return;
        }
        self.awaiting_reply = false;

        match result {
            Ok(reply) => {
                info!(name: "chat.replied", chars = reply.len(), "Reply received");
                self.append(Message::assistant(reply));
            }
            Err(e) => {
                warn!(
                    name: "chat.failed",
                    status = ?e.status(),
                    error = %e,
                    "Chat request failed"
                );
                notifications.push(Notification::error(FAILURE_TITLE, e.detail()));
            }
        }
    }

    fn append(&mut self, message: Message) {
        let index = self.transcript.push(message);
        self.scroll_target = Some(index);
    }
}
