//! HTTP contract with the document chat server.
//!
//! The client talks to exactly two endpoints:
//!
//! - `POST /api/upload`: multipart body with a single `file` field
//! - `POST /api/chat`: JSON `{ "message": ... }`, answered with `{ "response": ... }`
//!
//! Both answer failures with a non-2xx status and an optional JSON
//! `{ "detail": ... }` body, surfaced to the user verbatim.
//!
//! # Architecture
//!
//! - [`DocumentApi`]: the seam the UI state machines are driven through
//! - [`HttpApi`]: reqwest implementation used by the binary
//! - [`ApiError`]: transport, rejection, and decode failures

mod client;
mod error;
mod progress;
mod types;

use async_trait::async_trait;

pub use client::HttpApi;
pub use error::ApiError;
pub use progress::{ProgressSender, UploadProgress};
pub use types::{ChatReply, ChatRequest, DocumentFile, DocumentKind, ErrorBody};

/// Operations the client needs from the server.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Upload `file`, reporting bytes handed to the transport on `progress`.
    async fn upload(&self, file: &DocumentFile, progress: ProgressSender) -> Result<(), ApiError>;

    /// Send a chat message and return the assistant's reply text.
    async fn chat(&self, message: &str) -> Result<String, ApiError>;
}
