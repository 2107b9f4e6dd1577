//! Terminal rendering.
//!
//! Pure functions from component state to styled text. Colour is applied
//! with `colored`, which honours `NO_COLOR` and the global override set from
//! `ui.color`.

use colored::Colorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::conversation::{ConversationView, INPUT_PLACEHOLDER};
use super::notify::{Level, Notification};
use super::uploader::Uploader;
use crate::session::{Message, Role};

pub const TITLE: &str = "PDF Chatbot";
pub const SUBTITLE: &str = "Chat with your documents using AI";

const BAR_WIDTH: usize = 20;

/// Share of the line a message bubble may take, in percent.
const BUBBLE_SHARE: usize = 70;

const USER_LABEL: &str = "You";
const ASSISTANT_LABEL: &str = "AI";

pub fn header() -> String {
    format!("{}\n{}", TITLE.bold().blue(), SUBTITLE.dimmed())
}

/// Line shown once the conversation is mounted.
pub fn conversation_intro() -> String {
    format!(
        "{}",
        "Ask anything about the document. Type /dismiss to close notifications, /quit to leave.".dimmed()
    )
}

/// `[##########----------]  50%`
pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled).blue(),
        "-".repeat(BAR_WIDTH - filled).dimmed()
    )
}

/// Drop target line: the affordance, or the file being uploaded.
///
/// The progress bar is drawn separately so it can be redrawn in place.
pub fn uploader_panel(uploader: &Uploader) -> String {
    let session = uploader.session();
    match session.file() {
        Some(file) if session.in_flight() => {
            format!("{} {}", uploader.prompt(), file.file_name.as_str().bold())
        }
        _ => format!("{} {}", "⇪".blue(), uploader.prompt()),
    }
}

/// One transcript entry, user messages right-aligned within `width` columns.
pub fn message(message: &Message, width: usize) -> String {
    let lines = wrap(message.content(), bubble_width(width));

    match message.role() {
        Role::Assistant => {
            let badge = format!("[{ASSISTANT_LABEL}]");
            let indent = " ".repeat(badge.len() + 1);
            lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    if i == 0 {
                        format!("{} {line}", badge.as_str().green().bold())
                    } else {
                        format!("{indent}{line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Role::User => {
            let label = format!("[{USER_LABEL}]");
            let last = lines.len().saturating_sub(1);
            lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let used = UnicodeWidthStr::width(line.as_str())
                        + if i == last { label.len() + 1 } else { 0 };
                    let pad = " ".repeat(width.saturating_sub(used));
                    if i == last {
                        format!("{pad}{} {}", line.as_str().blue(), label.as_str().blue().bold())
                    } else {
                        format!("{pad}{}", line.as_str().blue())
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Columns a bubble may take on a line `width` columns wide.
fn bubble_width(width: usize) -> usize {
    (width.saturating_mul(BUBBLE_SHARE) / 100).max(1)
}

/// Input prompt, marked busy while a reply is pending.
pub fn prompt(view: &ConversationView) -> String {
    let marker = if view.is_awaiting_reply() {
        "…".yellow().bold()
    } else {
        ">".blue().bold()
    };
    if view.input().is_empty() {
        format!("{marker} {}", INPUT_PLACEHOLDER.dimmed())
    } else {
        format!("{marker} {}", view.input())
    }
}

pub fn notification(notification: &Notification) -> String {
    let title = match notification.level {
        Level::Success => format!("✔ {}", notification.title).as_str().green().bold(),
        Level::Warning => format!("! {}", notification.title).as_str().yellow().bold(),
        Level::Error => format!("✖ {}", notification.title).as_str().red().bold(),
    };
    match &notification.description {
        Some(description) => format!("{title}: {description}"),
        None => title.to_string(),
    }
}

/// Word-wrap `text` to `width` display columns, keeping explicit line breaks.
///
/// Words wider than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::new();
        let mut used = 0;
        for word in raw.split_whitespace() {
            for piece in split_wide(word, width) {
                let cols = UnicodeWidthStr::width(piece.as_str());
                if used > 0 && used + 1 + cols > width {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                }
                if used > 0 {
                    line.push(' ');
                    used += 1;
                }
                used += cols;
                line.push_str(&piece);
            }
        }
        lines.push(line);
    }
    lines
}

fn split_wide(word: &str, width: usize) -> Vec<String> {
    let mut pieces = vec![String::new()];
    let mut used = 0;
    for ch in word.chars() {
        let cols = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used > 0 && used + cols > width {
            pieces.push(String::new());
            used = 0;
        }
        if let Some(piece) = pieces.last_mut() {
            piece.push(ch);
        }
        used += cols;
    }
    pieces
}
