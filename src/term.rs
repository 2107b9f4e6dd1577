//! Line-oriented terminal writer.
//!
//! Output is append-only, like the scroll-back of a terminal: every message
//! and notification is printed exactly once, in the order it appeared, so the
//! newest message is always the last thing on screen. Only the upload
//! progress bar is redrawn in place. Notifications that expired or were
//! dismissed before a draw are never printed.

use std::collections::HashSet;
use std::io::{self, Write};

use tokio::time::Instant;
use uuid::Uuid;

use crate::ui::render;
use crate::ui::{ConversationView, Mode, Notifications, Shell, Stage, Uploader};

/// Default line width when none is configured.
pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug)]
pub struct Terminal<W: Write> {
    out: W,
    width: usize,
    header_drawn: bool,
    mode: Option<Mode>,
    upload_in_flight: Option<bool>,
    progress: Option<u8>,
    progress_open: bool,
    printed_messages: usize,
    prompt: Option<String>,
    seen_notifications: HashSet<Uuid>,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out,
            width: width.max(20),
            header_drawn: false,
            mode: None,
            upload_in_flight: None,
            progress: None,
            progress_open: false,
            printed_messages: 0,
            prompt: None,
            seen_notifications: HashSet::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print whatever changed since the previous call.
    pub fn draw(&mut self, shell: &Shell) -> io::Result<()> {
        if !self.header_drawn {
            self.line(&render::header())?;
            self.line("")?;
            self.header_drawn = true;
        }

        match shell.stage() {
            Stage::AwaitingDocument(uploader) => self.draw_uploader(uploader)?,
            Stage::Conversing(view) => self.draw_conversation(view)?,
        }
        self.draw_notifications(shell.notifications())?;
        if let Stage::Conversing(view) = shell.stage() {
            self.draw_prompt(view)?;
        }
        self.out.flush()
    }

    /// Terminate a dangling progress line and flush.
    pub fn finish(&mut self) -> io::Result<()> {
        self.close_progress()?;
        self.out.flush()
    }

    fn draw_uploader(&mut self, uploader: &Uploader) -> io::Result<()> {
        self.mode = Some(Mode::AwaitingDocument);
        let in_flight = uploader.is_in_flight();
        if self.upload_in_flight != Some(in_flight) {
            self.line(&render::uploader_panel(uploader))?;
            self.upload_in_flight = Some(in_flight);
            self.progress = None;
        }
        if in_flight && self.progress != Some(uploader.progress()) {
            write!(self.out, "\r{}", render::progress_bar(uploader.progress()))?;
            self.progress_open = true;
            self.progress = Some(uploader.progress());
        }
        Ok(())
    }

    fn draw_conversation(&mut self, view: &ConversationView) -> io::Result<()> {
        if self.mode != Some(Mode::Conversing) {
            self.line("")?;
            self.line(&render::conversation_intro())?;
            self.mode = Some(Mode::Conversing);
        }
        let Some(target) = view.scroll_target() else {
            return Ok(());
        };
        while self.printed_messages <= target {
            if let Some(message) = view.transcript().get(self.printed_messages) {
                self.line("")?;
                self.line(&render::message(message, self.width))?;
            }
            self.printed_messages += 1;
        }
        Ok(())
    }

    fn draw_prompt(&mut self, view: &ConversationView) -> io::Result<()> {
        let prompt = render::prompt(view);
        if self.prompt.as_ref() != Some(&prompt) {
            self.line(&prompt)?;
            self.prompt = Some(prompt);
        }
        Ok(())
    }

    fn draw_notifications(&mut self, notifications: &Notifications) -> io::Result<()> {
        let fresh: Vec<String> = notifications
            .active(Instant::now())
            .filter(|n| self.seen_notifications.insert(n.id))
            .map(render::notification)
            .collect();
        for line in fresh {
            self.line(&line)?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        self.close_progress()?;
        writeln!(self.out, "{text}")
    }

    fn close_progress(&mut self) -> io::Result<()> {
        if self.progress_open {
            writeln!(self.out)?;
            self.progress_open = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, UploadProgress};
    use crate::ui::render::{SUBTITLE, TITLE};

    fn output(terminal: Terminal<Vec<u8>>) -> String {
        String::from_utf8(terminal.into_inner()).unwrap()
    }

    #[test]
    fn test_upload_then_conversation() {
        colored::control::set_override(false);
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let mut shell = Shell::default();
        let mut term = Terminal::new(Vec::new(), 40);
        term.draw(&shell).unwrap();

        shell.drop_files(vec![pdf]);
        term.draw(&shell).unwrap();
        shell.upload_progress(UploadProgress { sent: 4, total: 8 });
        term.draw(&shell).unwrap();
        // Unchanged progress is not redrawn.
        term.draw(&shell).unwrap();
        shell.upload_finished(Ok(()));
        term.draw(&shell).unwrap();

        shell.submit_line("What is in the document?");
        term.draw(&shell).unwrap();
        shell.chat_replied(Ok("It contains meeting notes.".into()));
        term.draw(&shell).unwrap();
        term.finish().unwrap();

        let out = output(term);
        assert!(out.starts_with(&format!("{TITLE}\n{SUBTITLE}\n\n")));
        assert!(out.contains("Uploading file... notes.pdf\n"));
        assert_eq!(out.matches("\r[##########----------]  50%").count(), 1);
        assert!(out.contains("✔ File uploaded successfully"));

        let question = out.find("What is in the document? [You]").unwrap();
        let answer = out.find("[AI] It contains meeting notes.").unwrap();
        assert!(question < answer);
        assert_eq!(out.matches("[AI] It contains meeting notes.").count(), 1);
        assert!(out.trim_end().ends_with("> Type your message..."));
    }

    #[test]
    fn test_failed_upload_shows_prompt_again() {
        colored::control::set_override(false);
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("notes.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let mut shell = Shell::default();
        let mut term = Terminal::new(Vec::new(), 40);
        term.draw(&shell).unwrap();
        shell.drop_files(vec![pdf]);
        term.draw(&shell).unwrap();
        shell.upload_finished(Err(ApiError::Rejected {
            status: 400,
            detail: Some("Unsupported file type".into()),
        }));
        term.draw(&shell).unwrap();

        let out = output(term);
        assert_eq!(out.matches(render::uploader_panel(&Uploader::new()).as_str()).count(), 2);
        assert!(out.contains("✖ Error uploading file: Unsupported file type"));
    }

    #[test]
    fn test_dismissed_notification_not_printed() {
        colored::control::set_override(false);
        let mut shell = Shell::default();
        let mut term = Terminal::new(Vec::new(), 40);

        shell.drop_files(vec!["a.pdf".into(), "b.pdf".into()]);
        shell.notifications_mut().dismiss_active(Instant::now());
        term.draw(&shell).unwrap();

        assert!(!output(term).contains("File not accepted"));
    }
}
