//! Local stand-in for the document chat server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

/// What an endpoint answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Raw(u16, &'static str),
}

impl Reply {
    pub fn ok_upload() -> Self {
        Self::Json(200, json!({ "message": "File processed successfully" }))
    }

    pub fn ok_chat(response: &str) -> Self {
        Self::Json(200, json!({ "response": response }))
    }

    pub fn detail(status: u16, detail: &str) -> Self {
        Self::Json(status, json!({ "detail": detail }))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Json(status, body) => {
                (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
            }
            Self::Raw(status, body) => (StatusCode::from_u16(status).unwrap(), body).into_response(),
        }
    }
}

/// One multipart field received by the upload endpoint.
#[derive(Debug, Clone)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct MockState {
    upload_reply: Reply,
    chat_reply: Reply,
    uploads: Arc<Mutex<Vec<Vec<ReceivedField>>>>,
    chats: Arc<Mutex<Vec<Value>>>,
}

/// Running mock server and everything it received.
pub struct MockServer {
    pub base_url: String,
    uploads: Arc<Mutex<Vec<Vec<ReceivedField>>>>,
    chats: Arc<Mutex<Vec<Value>>>,
}

impl MockServer {
    /// Upload requests received, each as its list of multipart fields.
    pub fn uploads(&self) -> Vec<Vec<ReceivedField>> {
        self.uploads.lock().unwrap().clone()
    }

    /// Chat request bodies received.
    pub fn chats(&self) -> Vec<Value> {
        self.chats.lock().unwrap().clone()
    }
}

async fn upload(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    state.uploads.lock().unwrap().push(fields);
    state.upload_reply.into_response()
}

async fn chat(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.chats.lock().unwrap().push(body);
    state.chat_reply.into_response()
}

/// Start a server answering every upload and chat request with the given replies.
pub async fn spawn(upload_reply: Reply, chat_reply: Reply) -> MockServer {
    let state = MockState {
        upload_reply,
        chat_reply,
        uploads: Arc::default(),
        chats: Arc::default(),
    };
    let server = MockServer {
        base_url: String::new(),
        uploads: Arc::clone(&state.uploads),
        chats: Arc::clone(&state.chats),
    };

    let app = Router::new()
        .route("/api/upload", post(upload))
        .route("/api/chat", post(chat))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{addr}"),
        ..server
    }
}

/// Address nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Write a document of `len` bytes into `dir`.
pub fn write_document(dir: &std::path::Path, name: &str, len: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let bytes: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
    std::fs::write(&path, bytes).unwrap();
    path
}
