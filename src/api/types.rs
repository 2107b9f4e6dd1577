//! Wire types and the document handed to the upload endpoint.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat
// =============================================================================

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// The user's message, as typed.
    pub message: &'a str,
}

/// Success body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// Assistant reply text.
    pub response: String,
}

/// Error body returned by either endpoint.
///
/// `detail` is kept as raw JSON because servers also use it for structured
/// validation errors; only string details are shown to the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Parse an error body, yielding the detail only when it is a string.
    #[must_use]
    pub fn detail_from_bytes(body: &[u8]) -> Option<String> {
        let parsed: Self = serde_json::from_slice(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

// =============================================================================
// Upload
// =============================================================================

/// Document kinds the client offers to upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `application/pdf`, `.pdf`
    Pdf,
    /// `text/plain`, `.txt`
    PlainText,
}

impl DocumentKind {
    /// Every accepted kind.
    pub const ALL: [Self; 2] = [Self::Pdf, Self::PlainText];

    /// MIME type sent with the multipart field.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }

    /// File extension accepted for this kind.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "txt",
        }
    }

    /// Classify a path by its extension.
    ///
    /// The guess is advisory; the server is the one that validates content.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let mime = mime_guess::from_ext(&ext).first()?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension() == ext && mime.essence_str() == kind.mime())
    }
}

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    /// Location on disk.
    pub path: PathBuf,
    /// File name sent with the multipart field.
    pub file_name: String,
    /// Detected kind.
    pub kind: DocumentKind,
    /// Size in bytes at selection time.
    pub size: u64,
}

impl DocumentFile {
    /// Inspect `path` and build a document if it is an accepted, readable file.
    pub fn inspect(path: impl Into<PathBuf>) -> std::io::Result<Option<Self>> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let Some(kind) = DocumentKind::from_path(&path) else {
            return Ok(None);
        };
        let file_name = path.file_name().map_or_else(
            || format!("document.{}", kind.extension()),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Some(Self {
            path,
            file_name,
            kind,
            size: metadata.len(),
        }))
    }
}
