//! reqwest implementation of [`DocumentApi`].

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

use super::{
    ApiError, ChatReply, ChatRequest, DocumentApi, DocumentFile, ErrorBody, ProgressSender,
};
use crate::config::ApiConfig;

/// HTTP client for the upload and chat endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use docchat::api::{DocumentApi, HttpApi};
///
/// # async fn example() -> Result<(), docchat::api::ApiError> {
/// let api = HttpApi::new("http://127.0.0.1:8000")?;
/// let reply = api.chat("What is in the document?").await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpApi {
    upload_url: Url,
    chat_url: Url,
    http: reqwest::Client,
}

impl HttpApi {
    /// Default upload endpoint path.
    pub const UPLOAD_PATH: &'static str = "/api/upload";
    /// Default chat endpoint path.
    pub const CHAT_PATH: &'static str = "/api/chat";

    /// Create a client for the server at `base_url` using the default paths.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ApiError> {
        Self::with_client(
            base_url,
            Self::UPLOAD_PATH,
            Self::CHAT_PATH,
            reqwest::Client::new(),
        )
    }

    /// Create a client with explicit paths and a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        upload_path: &str,
        chat_path: &str,
        http: reqwest::Client,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            upload_url: base_url.join(upload_path)?,
            chat_url: base_url.join(chat_path)?,
            http,
        })
    }

    /// Build from the `api` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_client(
            &config.base_url,
            &config.upload_path,
            &config.chat_path,
            builder.build()?,
        )
    }

    /// Resolved upload URL.
    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// Resolved chat URL.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // An unreadable error body is the same as one without detail.
        let body = response.bytes().await.unwrap_or_default();
        Err(ApiError::Rejected {
            status: status.as_u16(),
            detail: ErrorBody::detail_from_bytes(&body),
        })
    }
}

#[async_trait]
impl DocumentApi for HttpApi {
    async fn upload(&self, file: &DocumentFile, progress: ProgressSender) -> Result<(), ApiError> {
        let handle = tokio::fs::File::open(&file.path).await?;
        let total = handle.metadata().await?.len();
        let mut chunks = ReaderStream::new(handle);

        progress.report(0, total);
        let body = async_stream::stream! {
            let mut sent: u64 = 0;
            while let Some(chunk) = chunks.next().await {
                if let Ok(bytes) = &chunk {
                    sent += bytes.len() as u64;
                    progress.report(sent, total);
                }
                yield chunk;
            }
        };

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file.file_name.clone())
            .mime_str(file.kind.mime())?;
        let form = Form::new().part("file", part);

        debug!(
            name: "api.upload.request",
            url = %self.upload_url,
            file = %file.file_name,
            bytes = total,
            "Sending document"
        );
        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn chat(&self, message: &str) -> Result<String, ApiError> {
        debug!(name: "api.chat.request", url = %self.chat_url, chars = message.len(), "Sending message");
        let response = self
            .http
            .post(self.chat_url.clone())
            .json(&ChatRequest { message })
            .send()
            .await?;
        let body = Self::ensure_success(response).await?.bytes().await?;
        let reply: ChatReply =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(reply.response)
    }
}
