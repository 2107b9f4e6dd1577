//! Conversation transcript.
//!
//! The transcript is the ordered record of every message exchanged with the
//! assistant during one run of the client. It lives in memory only and is
//! dropped when the process exits.
//!
//! # Example
//!
//! ```rust
//! use docchat::session::{Message, Role, Transcript};
//!
//! let mut transcript = Transcript::new();
//! transcript.push(Message::user("What is in the document?"));
//! transcript.push(Message::assistant("It contains meeting notes."));
//!
//! assert_eq!(transcript.len(), 2);
//! assert_eq!(transcript.last().unwrap().role(), Role::Assistant);
//! ```

mod transcript;

pub use transcript::{Message, Role, Transcript};
