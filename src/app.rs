//! Single-writer event loop.
//!
//! [`App`] is the only owner of the [`Shell`]. Input lines, timer ticks, and
//! request outcomes all arrive as [`AppEvent`]s on one channel and are applied
//! in arrival order. Requests run as spawned tasks that report back on the
//! same channel, so the interface never blocks on the network.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ApiError, DocumentApi, ProgressSender, UploadProgress};
use crate::term::Terminal;
use crate::ui::{Effect, Shell};

/// Line that leaves the client.
pub const QUIT_COMMAND: &str = "/quit";

/// Line that closes the visible notifications.
pub const DISMISS_COMMAND: &str = "/dismiss";

/// Everything that can change application state.
#[derive(Debug)]
pub enum AppEvent {
    /// A line submitted on the terminal.
    Line(String),
    /// Files dropped onto the uploader (e.g. given on the command line).
    Drop(Vec<PathBuf>),
    UploadProgress(UploadProgress),
    UploadFinished(Result<(), ApiError>),
    ChatReplied(Result<String, ApiError>),
    /// Periodic timer used to expire notifications.
    Tick,
    Quit,
}

/// Whether the loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Forward input lines as [`AppEvent::Line`], then [`AppEvent::Quit`] at end of input.
///
/// Blocking; run it on its own thread. Bytes that are not UTF-8 (e.g. a dragged
/// Latin-1 file name) are replaced instead of ending the session.
pub fn forward_input<R: BufRead>(mut reader: R, events: &mpsc::UnboundedSender<AppEvent>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if let Cow::Owned(_) = line {
                    warn!(name: "input.invalid_utf8", "Input line is not valid UTF-8");
                }
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if events.send(AppEvent::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(name: "input.read_failed", error = %e, "Reading input failed");
                break;
            }
        }
    }
    let _ = events.send(AppEvent::Quit);
}

/// Event loop state.
pub struct App {
    shell: Shell,
    api: Arc<dyn DocumentApi>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("shell", &self.shell)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create the app and the channel that feeds it.
    pub fn new(shell: Shell, api: Arc<dyn DocumentApi>) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { shell, api, events }, rx)
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Sender for input sources (terminal reader, timer).
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.events.clone()
    }

    /// Apply one event.
    ///
    /// Must be called from within a tokio runtime: effects are spawned as tasks.
    pub fn handle(&mut self, event: AppEvent) -> Control {
        let effect = match event {
            AppEvent::Line(line) if line.trim() == QUIT_COMMAND => return Control::Quit,
            AppEvent::Quit => return Control::Quit,
            AppEvent::Line(line) if line.trim() == DISMISS_COMMAND => {
                let closed = self
                    .shell
                    .notifications_mut()
                    .dismiss_active(tokio::time::Instant::now());
                debug!(name: "app.notifications.dismissed", closed, "Notifications dismissed");
                None
            }
            AppEvent::Line(line) => self.shell.submit_line(&line),
            AppEvent::Drop(paths) => self.shell.drop_files(paths),
            AppEvent::UploadProgress(progress) => {
                self.shell.upload_progress(progress);
                None
            }
            AppEvent::UploadFinished(result) => {
                self.shell.upload_finished(result);
                None
            }
            AppEvent::ChatReplied(result) => {
                self.shell.chat_replied(result);
                None
            }
            AppEvent::Tick => {
                self.shell
                    .notifications_mut()
                    .prune(tokio::time::Instant::now());
                None
            }
        };
        if let Some(effect) = effect {
            self.spawn(effect);
        }
        Control::Continue
    }

    /// Issue the single request an effect asks for.
    fn spawn(&self, effect: Effect) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();

        match effect {
            Effect::Upload(file) => {
                debug!(name: "app.effect.upload", file = %file.file_name, "Spawning upload");
                tokio::spawn(async move {
                    let (progress, mut progress_rx) = ProgressSender::channel();
                    let upload = api.upload(&file, progress);
                    tokio::pin!(upload);

                    let result = loop {
                        tokio::select! {
                            biased;
                            Some(p) = progress_rx.recv() => {
                                let _ = events.send(AppEvent::UploadProgress(p));
                            }
                            result = &mut upload => break result,
                        }
                    };
                    // Progress reported before completion still precedes it.
                    while let Ok(p) = progress_rx.try_recv() {
                        let _ = events.send(AppEvent::UploadProgress(p));
                    }
                    let _ = events.send(AppEvent::UploadFinished(result));
                });
            }
            Effect::Chat(message) => {
                debug!(name: "app.effect.chat", chars = message.len(), "Spawning chat request");
                tokio::spawn(async move {
                    let result = api.chat(&message).await;
                    let _ = events.send(AppEvent::ChatReplied(result));
                });
            }
        }
    }

    /// Drive the loop until a quit event, redrawing after each event.
    pub async fn run<W: Write>(
        mut self,
        mut events: mpsc::UnboundedReceiver<AppEvent>,
        terminal: &mut Terminal<W>,
    ) -> std::io::Result<()> {
        terminal.draw(&self.shell)?;
        while let Some(event) = events.recv().await {
            let control = self.handle(event);
            terminal.draw(&self.shell)?;
            if control == Control::Quit {
                break;
            }
        }
        terminal.finish()
    }
}
