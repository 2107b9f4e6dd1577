//! Document drop target and upload progress.
//!
//! The uploader accepts exactly one PDF or text file per attempt. While an
//! upload is in flight the drop target is disabled and every further drop is
//! ignored. A successful upload yields a [`DocumentReady`] token, which is the
//! only way the [`Shell`](super::Shell) can move on to the conversation.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use super::Effect;
use super::notify::{Notification, Notifications};
use crate::api::{ApiError, DocumentFile, UploadProgress};

/// Affordance shown while idle.
pub const DROP_PROMPT: &str = "Drag and drop a PDF or text file here, or type its path";

/// Affordance shown while an upload is in flight.
pub const UPLOADING_PROMPT: &str = "Uploading file...";

const SUCCESS_TITLE: &str = "File uploaded successfully";
const FAILURE_TITLE: &str = "Error uploading file";
const REJECTED_TITLE: &str = "File not accepted";

/// Why a drop did not start an upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropRejected {
    #[error("an upload is already in progress")]
    Busy,

    #[error("no file given")]
    Empty,

    #[error("only one file can be uploaded at a time ({0} given)")]
    TooMany(usize),

    #[error("{0} is not a PDF or text file")]
    UnsupportedKind(String),

    #[error("{path}: {reason}")]
    NotFound { path: String, reason: String },
}

/// Proof that a document was accepted by the server.
///
/// Only the uploader can create one, and it creates at most one per
/// successful attempt.
#[derive(Debug)]
pub struct DocumentReady {
    _private: (),
}

#[cfg(test)]
impl DocumentReady {
    pub(crate) fn for_tests() -> Self {
        Self { _private: () }
    }
}

/// State of the current upload attempt.
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    file: Option<DocumentFile>,
    progress: u8,
    in_flight: bool,
}

impl UploadSession {
    pub fn file(&self) -> Option<&DocumentFile> {
        self.file.as_ref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Drop target component.
#[derive(Debug, Clone, Default)]
pub struct Uploader {
    session: UploadSession,
}

impl Uploader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.in_flight
    }

    /// Upload progress in percent, 0 when idle.
    pub fn progress(&self) -> u8 {
        self.session.progress
    }

    pub fn prompt(&self) -> &'static str {
        if self.session.in_flight {
            UPLOADING_PROMPT
        } else {
            DROP_PROMPT
        }
    }

    /// Handle a line of text pasted or dragged onto the terminal.
    pub fn drop_line(
        &mut self,
        line: &str,
        notifications: &mut Notifications,
    ) -> Result<Effect, DropRejected> {
        self.drop_files(parse_dropped_paths(line), notifications)
    }

    /// Handle dropped or selected files.
    ///
    /// Returns the upload to perform when exactly one accepted file was given
    /// and nothing is in flight.
    pub fn drop_files(
        &mut self,
        paths: Vec<PathBuf>,
        notifications: &mut Notifications,
    ) -> Result<Effect, DropRejected> {
        let result = self.accept(paths);
        match &result {
            Ok(Effect::Upload(file)) => {
                info!(
                    name: "upload.started",
                    file = %file.file_name,
                    bytes = file.size,
                    "Uploading document"
                );
            }
            Ok(Effect::Chat(_)) | Err(DropRejected::Busy | DropRejected::Empty) => {}
            Err(rejected) => {
                warn!(name: "upload.rejected", reason = %rejected, "Drop rejected");
                notifications.push(Notification::warning(REJECTED_TITLE, rejected.to_string()));
            }
        }
        result
    }

    fn accept(&mut self, paths: Vec<PathBuf>) -> Result<Effect, DropRejected> {
        if self.session.in_flight {
            return Err(DropRejected::Busy);
        }
        let path = match <[PathBuf; 1]>::try_from(paths) {
            Ok([path]) => path,
            Err(paths) if paths.is_empty() => return Err(DropRejected::Empty),
            Err(paths) => return Err(DropRejected::TooMany(paths.len())),
        };

        let file = match DocumentFile::inspect(&path) {
            Ok(Some(file)) => file,
            Ok(None) => return Err(DropRejected::UnsupportedKind(path.display().to_string())),
            Err(e) => {
                return Err(DropRejected::NotFound {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        self.session = UploadSession {
            file: Some(file.clone()),
            progress: 0,
            in_flight: true,
        };
        Ok(Effect::Upload(file))
    }

    /// Record bytes sent. Progress never moves backwards within an attempt.
    pub fn on_progress(&mut self, progress: UploadProgress) {
        if !self.session.in_flight {
            return;
        }
        self.session.progress = self.session.progress.max(progress.percent());
    }

    /// Handle the end of the in-flight upload.
    ///
    /// Returns [`DocumentReady`] only for a success that finishes an attempt
    /// actually in flight.
    pub fn on_finished(
        &mut self,
        result: Result<(), ApiError>,
        notifications: &mut Notifications,
    ) -> Option<DocumentReady> {
        if !self.session.in_flight {
            return None;
        }
        let session = std::mem::take(&mut self.session);
        let file_name = session.file.map(|f| f.file_name).unwrap_or_default();

        match result {
            Ok(()) => {
                info!(name: "upload.finished", file = %file_name, "Document uploaded");
                notifications.push(Notification::success(SUCCESS_TITLE));
                Some(DocumentReady { _private: () })
            }
            Err(e) => {
                warn!(
                    name: "upload.failed",
                    file = %file_name,
                    status = ?e.status(),
                    error = %e,
                    "Document upload failed"
                );
                notifications.push(Notification::error(FAILURE_TITLE, e.detail()));
                None
            }
        }
    }
}

/// Split a dropped line into paths.
///
/// Terminals paste dragged files as shell words: quoted, backslash-escaped,
/// or as `file://` URIs.
pub fn parse_dropped_paths(line: &str) -> Vec<PathBuf> {
    split_words(line.trim())
        .into_iter()
        .map(|word| {
            if word.starts_with("file://") {
                if let Some(path) = Url::parse(&word).ok().and_then(|u| u.to_file_path().ok()) {
                    return path;
                }
            }
            PathBuf::from(word)
        })
        .collect()
}

fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_word = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_parse_dropped_paths() {
        assert_eq!(parse_dropped_paths("  notes.pdf \n"), vec![PathBuf::from("notes.pdf")]);
        assert_eq!(
            parse_dropped_paths(r"/home/me/My\ Notes.pdf"),
            vec![PathBuf::from("/home/me/My Notes.pdf")]
        );
        assert_eq!(
            parse_dropped_paths("'/tmp/a b.txt' \"/tmp/c \\\"d\\\".pdf\""),
            vec![PathBuf::from("/tmp/a b.txt"), PathBuf::from("/tmp/c \"d\".pdf")]
        );
        assert_eq!(
            parse_dropped_paths("file:///tmp/My%20Notes.pdf"),
            vec![PathBuf::from("/tmp/My Notes.pdf")]
        );
        assert!(parse_dropped_paths("   ").is_empty());
        assert_eq!(parse_dropped_paths("''"), vec![PathBuf::new()]);
    }

    #[test]
    fn test_accepts_single_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = write(tmp.path(), "notes.pdf", b"%PDF-1.4");
        let mut notes = Notifications::default();
        let mut uploader = Uploader::new();

        let effect = uploader.drop_files(vec![pdf.clone()], &mut notes).unwrap();
        let Effect::Upload(file) = effect else {
            panic!("expected an upload");
        };
        assert_eq!(file.path, pdf);
        assert!(uploader.is_in_flight());
        assert_eq!(uploader.progress(), 0);
        assert_eq!(uploader.prompt(), UPLOADING_PROMPT);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_drop_ignored_while_in_flight() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = write(tmp.path(), "notes.pdf", b"%PDF-1.4");
        let txt = write(tmp.path(), "other.txt", b"hello");
        let mut notes = Notifications::default();
        let mut uploader = Uploader::new();

        uploader.drop_files(vec![pdf], &mut notes).unwrap();
        assert_eq!(
            uploader.drop_files(vec![txt], &mut notes),
            Err(DropRejected::Busy)
        );
        assert!(notes.is_empty());
        assert_eq!(uploader.session().file().unwrap().file_name, "notes.pdf");
    }

    #[test]
    fn test_rejections() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = write(tmp.path(), "a.pdf", b"%PDF");
        let txt = write(tmp.path(), "b.txt", b"b");
        let md = write(tmp.path(), "c.md", b"# c");
        let mut notes = Notifications::default();
        let mut uploader = Uploader::new();

        assert_eq!(uploader.drop_files(vec![], &mut notes), Err(DropRejected::Empty));
        assert!(notes.is_empty());

        assert_eq!(
            uploader.drop_files(vec![pdf, txt], &mut notes),
            Err(DropRejected::TooMany(2))
        );
        assert!(matches!(
            uploader.drop_files(vec![md], &mut notes),
            Err(DropRejected::UnsupportedKind(_))
        ));
        assert!(matches!(
            uploader.drop_files(vec![tmp.path().join("missing.pdf")], &mut notes),
            Err(DropRejected::NotFound { .. })
        ));

        assert_eq!(notes.len(), 3);
        assert!(!uploader.is_in_flight());
    }

    #[test]
    fn test_progress_is_monotonic_and_bounded() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = write(tmp.path(), "notes.pdf", b"%PDF-1.4");
        let mut notes = Notifications::default();
        let mut uploader = Uploader::new();

        // Ignored while idle.
        uploader.on_progress(UploadProgress { sent: 5, total: 10 });
        assert_eq!(uploader.progress(), 0);

        uploader.drop_files(vec![pdf], &mut notes).unwrap();
        let mut seen = Vec::new();
        for sent in [0, 30, 10, 70, 70, 200, 100] {
            uploader.on_progress(UploadProgress { sent, total: 100 });
            seen.push(uploader.progress());
        }
        assert_eq!(seen, vec![0, 30, 30, 70, 70, 100, 100]);
    }

    #[test]
    fn test_success_yields_token_once() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = write(tmp.path(), "notes.pdf", b"%PDF-1.4");
        let mut notes = Notifications::default();
        let mut uploader = Uploader::new();

        uploader.drop_files(vec![pdf], &mut notes).unwrap();
        uploader.on_progress(UploadProgress { sent: 8, total: 8 });

        assert!(uploader.on_finished(Ok(()), &mut notes).is_some());
        assert!(!uploader.is_in_flight());
        assert_eq!(uploader.progress(), 0);
        assert_eq!(notes.latest().unwrap().title, SUCCESS_TITLE);

        // A stray second completion is ignored.
        assert!(uploader.on_finished(Ok(()), &mut notes).is_none());
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_failure_resets_and_allows_retry() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = write(tmp.path(), "notes.pdf", b"%PDF-1.4");
        let mut notes = Notifications::default();
        let mut uploader = Uploader::new();

        uploader.drop_files(vec![pdf.clone()], &mut notes).unwrap();
        uploader.on_progress(UploadProgress { sent: 4, total: 8 });
        let rejected = ApiError::Rejected {
            status: 400,
            detail: Some("Unsupported file type".into()),
        };
        assert!(uploader.on_finished(Err(rejected), &mut notes).is_none());

        let toast = notes.latest().unwrap();
        assert_eq!(toast.title, FAILURE_TITLE);
        assert_eq!(toast.description.as_deref(), Some("Unsupported file type"));
        assert!(!uploader.is_in_flight());
        assert_eq!(uploader.progress(), 0);
        assert_eq!(uploader.prompt(), DROP_PROMPT);

        assert!(uploader.drop_files(vec![pdf], &mut notes).is_ok());
    }
}
