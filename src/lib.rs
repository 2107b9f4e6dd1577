//! docchat
//!
//! A terminal client for chatting with a document: upload a PDF or text file
//! to a document chat server, then ask questions about it.
//!
//! # Architecture
//!
//! - **State machines**: owned component state that never performs I/O
//! - **Event loop**: a single writer applying events in arrival order
//! - **HTTP client**: reqwest implementation of the upload and chat contract
//! - **Terminal**: append-only rendering of the transcript and notifications
//!
//! # Modules
//!
//! - [`api`]: HTTP contract with the server
//! - [`app`]: event loop driving the state machines
//! - [`config`]: CLI and layered configuration
//! - [`session`]: message transcript
//! - [`telemetry`]: logging setup
//! - [`term`]: terminal writer
//! - [`ui`]: shell, uploader, conversation, notifications, and rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app;
pub mod config;
pub mod session;
pub mod telemetry;
pub mod term;
pub mod ui;
