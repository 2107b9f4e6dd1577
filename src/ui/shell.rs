//! Top-level mode controller.

use std::path::PathBuf;

use tracing::info;

use super::Effect;
use super::conversation::ConversationView;
use super::notify::Notifications;
use super::uploader::{DocumentReady, Uploader};
use crate::api::{ApiError, UploadProgress};

/// Which interface is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    AwaitingDocument,
    Conversing,
}

/// The mounted component. Exactly one exists at any time.
#[derive(Debug, Clone)]
pub enum Stage {
    AwaitingDocument(Uploader),
    Conversing(ConversationView),
}

/// Application shell.
///
/// Starts with the uploader mounted and switches to the conversation once a
/// document is ready. There is no way back short of restarting the client.
#[derive(Debug, Clone)]
pub struct Shell {
    stage: Stage,
    notifications: Notifications,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(Notifications::default())
    }
}

impl Shell {
    #[must_use]
    pub fn new(notifications: Notifications) -> Self {
        Self {
            stage: Stage::AwaitingDocument(Uploader::new()),
            notifications,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.stage {
            Stage::AwaitingDocument(_) => Mode::AwaitingDocument,
            Stage::Conversing(_) => Mode::Conversing,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn uploader(&self) -> Option<&Uploader> {
        match &self.stage {
            Stage::AwaitingDocument(uploader) => Some(uploader),
            Stage::Conversing(_) => None,
        }
    }

    pub fn conversation(&self) -> Option<&ConversationView> {
        match &self.stage {
            Stage::Conversing(view) => Some(view),
            Stage::AwaitingDocument(_) => None,
        }
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Switch to the conversation. Later calls leave the mounted view alone.
    pub fn mark_document_ready(&mut self, _ready: DocumentReady) {
        if let Stage::AwaitingDocument(_) = self.stage {
            info!(name: "shell.mode.changed", mode = "conversing", "Document ready");
            self.stage = Stage::Conversing(ConversationView::new());
        }
    }

    /// Route a submitted line to the mounted component.
    ///
    /// The uploader treats it as a drop, the conversation as a message.
    pub fn submit_line(&mut self, line: &str) -> Option<Effect> {
        match &mut self.stage {
            Stage::AwaitingDocument(uploader) => {
                uploader.drop_line(line, &mut self.notifications).ok()
            }
            Stage::Conversing(view) => {
                // A blank line submits text kept from a send refused while busy.
                if !line.trim().is_empty() || view.input().trim().is_empty() {
                    view.set_input(line);
                }
                view.send()
            }
        }
    }

    /// Drop files onto the uploader. Ignored once conversing.
    pub fn drop_files(&mut self, paths: Vec<PathBuf>) -> Option<Effect> {
        match &mut self.stage {
            Stage::AwaitingDocument(uploader) => {
                uploader.drop_files(paths, &mut self.notifications).ok()
            }
            Stage::Conversing(_) => None,
        }
    }

    pub fn upload_progress(&mut self, progress: UploadProgress) {
        if let Stage::AwaitingDocument(uploader) = &mut self.stage {
            uploader.on_progress(progress);
        }
    }

    pub fn upload_finished(&mut self, result: Result<(), ApiError>) {
        let ready = match &mut self.stage {
            Stage::AwaitingDocument(uploader) => uploader.on_finished(result, &mut self.notifications),
            Stage::Conversing(_) => None,
        };
        if let Some(ready) = ready {
            self.mark_document_ready(ready);
        }
    }

    pub fn chat_replied(&mut self, result: Result<String, ApiError>) {
        if let Stage::Conversing(view) = &mut self.stage {
            view.on_reply(result, &mut self.notifications);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_awaiting_document() {
        let shell = Shell::default();
        assert_eq!(shell.mode(), Mode::AwaitingDocument);
        assert!(shell.uploader().is_some());
        assert!(shell.conversation().is_none());
    }

    #[test]
    fn test_upload_success_switches_once() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let mut shell = Shell::default();
        let effect = shell.submit_line(&pdf.display().to_string());
        assert!(matches!(effect, Some(Effect::Upload(_))));

        shell.upload_finished(Ok(()));
        assert_eq!(shell.mode(), Mode::Conversing);
        assert!(shell.uploader().is_none());

        // Lines are now messages, and late upload events are ignored.
        assert_eq!(shell.submit_line("hi"), Some(Effect::Chat("hi".into())));
        shell.upload_finished(Ok(()));
        assert_eq!(shell.conversation().unwrap().transcript().len(), 1);
        assert_eq!(shell.drop_files(vec![pdf]), None);
    }

    #[test]
    fn test_blank_line_sends_kept_input() {
        let mut shell = Shell::default();
        shell.mark_document_ready(DocumentReady::for_tests());

        assert_eq!(shell.submit_line("first"), Some(Effect::Chat("first".into())));
        // Refused while the reply is pending, but kept in the input line.
        assert_eq!(shell.submit_line("second"), None);
        assert_eq!(shell.submit_line(""), None);
        assert_eq!(shell.conversation().unwrap().input(), "second");

        shell.chat_replied(Ok("answer".into()));
        assert_eq!(shell.submit_line("   "), Some(Effect::Chat("second".into())));
        assert_eq!(shell.conversation().unwrap().transcript().len(), 3);
    }

    #[test]
    fn test_upload_failure_stays_awaiting() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let mut shell = Shell::default();
        shell.submit_line(&pdf.display().to_string());
        shell.upload_finished(Err(ApiError::Rejected {
            status: 400,
            detail: Some("Unsupported file type".into()),
        }));

        assert_eq!(shell.mode(), Mode::AwaitingDocument);
        assert!(!shell.uploader().unwrap().is_in_flight());
        assert_eq!(
            shell.notifications().latest().unwrap().description.as_deref(),
            Some("Unsupported file type")
        );
    }
}
