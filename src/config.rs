//! Command line and layered configuration.
//!
//! Priority: CLI flag > CLI env var > `DOCCHAT_` env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "docchat.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the document chat server
    #[arg(short, long, env = "DOCCHAT_SERVER")]
    pub server: Option<String>,

    /// Request timeout in seconds (requests wait indefinitely when unset)
    #[arg(long, env = "DOCCHAT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    /// PDF or text document to upload right away
    pub document: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
    /// Document given on the command line, dropped on startup.
    #[serde(default)]
    pub document: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub upload_path: String,
    pub chat_path: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub notification_ttl_ms: u64,
    pub color: bool,
    /// Columns used to align and wrap messages.
    pub width: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("api.base_url", "http://127.0.0.1:8000")?
            .set_default("api.upload_path", "/api/upload")?
            .set_default("api.chat_path", "/api/chat")?
            .set_default("ui.notification_ttl_ms", 3000)?
            .set_default("ui.color", true)?
            .set_default("ui.width", default_width())?
            .set_default("log.level", "warn")?
            .set_default("log.json", false)?;

        // An explicit file must exist; the working-directory default is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        // E.g. DOCCHAT_API__BASE_URL=http://docs.internal:8000
        builder = builder.add_source(
            Environment::with_prefix("DOCCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(server) = cli.server {
            builder = builder.set_override("api.base_url", server)?;
        }
        if let Some(timeout) = cli.timeout {
            builder = builder.set_override("api.request_timeout_secs", timeout)?;
        }
        if cli.no_color {
            builder = builder.set_override("ui.color", false)?;
        }
        if cli.log_json {
            builder = builder.set_override("log.json", true)?;
        }
        if let Some(document) = cli.document {
            builder = builder.set_override("document", document.to_string_lossy().into_owned())?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Terminal width from `COLUMNS`, as exported by most shells.
fn default_width() -> u64 {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(crate::term::DEFAULT_WIDTH as u64)
}
