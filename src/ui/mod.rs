//! Client state machines.
//!
//! Components own their state and never perform I/O. Operations that need
//! the server return an [`Effect`]; the [`App`](crate::app::App) event loop
//! issues the request and feeds the outcome back in.
//!
//! # Structure
//!
//! - [`shell`]: mode controller mounting exactly one of the components below
//! - [`uploader`]: document drop target with upload progress
//! - [`conversation`]: transcript, input line, and send loop
//! - [`notify`]: transient notifications
//! - [`render`]: state to styled terminal text

pub mod conversation;
pub mod notify;
pub mod render;
pub mod shell;
pub mod uploader;

use crate::api::DocumentFile;

pub use conversation::ConversationView;
pub use notify::{Level, Notification, Notifications};
pub use shell::{Mode, Shell, Stage};
pub use uploader::{DocumentReady, DropRejected, Uploader};

/// A request a component wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `POST /api/upload` with this document.
    Upload(DocumentFile),
    /// `POST /api/chat` with this message text.
    Chat(String),
}
