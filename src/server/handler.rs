//! リクエストハンドラー

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hyper::body::HttpBody;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::assets::content_type_for;
use crate::config::Settings;
use crate::report::{Reporter, Severity};
use crate::security::{resolve_asset_path, SecurityConfig};

const API_QUESTIONS: &str = "/api/questions";
const API_LOG: &str = "/api/log";

/// `POST /api/log`で受け付けるクライアントログ
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientLogEntry {
    /// 文字列以外の値も受け付け、JSON表現のまま記録する
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub file: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
}

/// 問題配信サービス
///
/// ルーティング:
///
/// | メソッド | パス | 応答 |
/// |---|---|---|
/// | GET | `/` | インデックスページ |
/// | GET | `/api/questions` | 問題コレクション（ファイルの内容そのまま） |
/// | POST | `/api/log` | クライアントログを記録 |
/// | GET | `/<path>` | 静的アセット |
/// | OPTIONS | 任意 | CORSプリフライト |
pub struct QuestionService {
    static_root: PathBuf,
    questions_path: PathBuf,
    index: String,
    security: SecurityConfig,
    reporter: Arc<dyn Reporter>,
}

impl QuestionService {
    pub fn new(
        static_root: impl Into<PathBuf>,
        questions_path: impl Into<PathBuf>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            static_root: static_root.into(),
            questions_path: questions_path.into(),
            index: "index.html".to_string(),
            security: SecurityConfig::default(),
            reporter,
        }
    }

    pub fn from_settings(settings: &Settings, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            static_root: settings.server.static_root.clone(),
            questions_path: settings.server.questions.clone(),
            index: settings.server.index.clone(),
            security: settings.security(),
            reporter,
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// リクエストを処理する（失敗もすべてHTTP応答として返す）
    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        self.reporter
            .record(Severity::Debug, &format!("{} {}", method, path));

        let mut response = match (&method, path.as_str()) {
            (&Method::OPTIONS, _) => preflight(),
            (&Method::GET, "/") => self.serve_index().await,
            (&Method::GET, API_QUESTIONS) => self.serve_questions().await,
            (&Method::POST, API_LOG) => self.log_client_message(req).await,
            (&Method::GET, _) => self.serve_asset(&path).await,
            _ => json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &json!({ "error": "Method not allowed" }),
            ),
        };

        response.headers_mut().insert(
            "Access-Control-Allow-Origin",
            HeaderValue::from_static("*"),
        );
        response
    }

    async fn serve_index(&self) -> Response<Body> {
        match self.read_asset(&self.index).await {
            Some((bytes, file)) => file_response(bytes, &file),
            None => {
                self.reporter.record(
                    Severity::Error,
                    &format!("Failed to serve {}", self.index),
                );
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to serve {}", self.index),
                )
            }
        }
    }

    async fn serve_asset(&self, raw_path: &str) -> Response<Body> {
        let relative = raw_path.trim_start_matches('/');
        let decoded = match urlencoding::decode(relative) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => relative.to_string(),
        };

        match self.read_asset(&decoded).await {
            Some((bytes, file)) => file_response(bytes, &file),
            None => {
                self.reporter
                    .record(Severity::Warning, &format!("Failed to serve {}", decoded));
                error_response(StatusCode::NOT_FOUND, &format!("Failed to serve {}", decoded))
            }
        }
    }

    /// 静的ルート配下のファイルを読み込む（検証・読み込みに失敗した場合は`None`）
    async fn read_asset(&self, relative: &str) -> Option<(Vec<u8>, PathBuf)> {
        let file = match resolve_asset_path(&self.static_root, relative) {
            Ok(file) => file,
            Err(reason) => {
                self.reporter.record(Severity::Warning, &reason);
                return None;
            }
        };

        match tokio::fs::read(&file).await {
            Ok(bytes) => Some((bytes, file)),
            Err(_) => None,
        }
    }

    async fn serve_questions(&self) -> Response<Body> {
        // サイズ上限はファイルを読み込む前に確認する
        let size = match tokio::fs::metadata(&self.questions_path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let message = format!(
                    "Questions file not found at {}",
                    self.questions_path.display()
                );
                self.reporter.record(Severity::Error, &message);
                return error_response(StatusCode::NOT_FOUND, &message);
            }
            Err(e) => return self.questions_load_failed(&e.to_string()),
        };

        if size > self.security.max_input_file_size {
            return self.questions_load_failed(&format!(
                "file exceeds {} bytes",
                self.security.max_input_file_size
            ));
        }

        let bytes = match tokio::fs::read(&self.questions_path).await {
            Ok(bytes) => bytes,
            Err(e) => return self.questions_load_failed(&e.to_string()),
        };

        if let Err(e) = serde_json::from_slice::<Value>(&bytes) {
            self.reporter.record(
                Severity::Error,
                &format!("Invalid JSON in questions file: {}", e),
            );
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid JSON in questions file",
            );
        }

        self.reporter.record(
            Severity::Debug,
            &format!("Loaded questions from {}", self.questions_path.display()),
        );
        bytes_response(StatusCode::OK, "application/json", bytes)
    }

    fn questions_load_failed(&self, reason: &str) -> Response<Body> {
        self.reporter
            .record(Severity::Error, &format!("Failed to load questions: {}", reason));
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load questions")
    }

    async fn log_client_message(&self, req: Request<Body>) -> Response<Body> {
        let entry = match self.read_log_entry(req.into_body()).await {
            Ok(entry) => entry,
            Err(reason) => {
                self.reporter.record(
                    Severity::Error,
                    &format!("Error logging client message: {}", reason),
                );
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to log");
            }
        };

        self.reporter.record(
            Severity::Error,
            &format!("Client log: {}", client_message(entry.message.as_ref())),
        );
        json_response(StatusCode::OK, &json!({ "status": "logged" }))
    }

    async fn read_log_entry(&self, mut body: Body) -> Result<ClientLogEntry, String> {
        let limit = self.security.max_request_body;
        let mut buffer = Vec::new();

        while let Some(chunk) = body.data().await {
            let chunk = chunk.map_err(|e| format!("failed to read body: {}", e))?;
            if (buffer.len() + chunk.len()) as u64 > limit {
                return Err(format!("request body exceeds {} bytes", limit));
            }
            buffer.extend_from_slice(&chunk);
        }

        let value: Value =
            serde_json::from_slice(&buffer).map_err(|e| format!("malformed body: {}", e))?;
        if !value.is_object() {
            return Err("body must be a JSON object".to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("malformed body: {}", e))
    }
}

fn client_message(message: Option<&Value>) -> String {
    match message {
        None | Some(Value::Null) => "No message provided".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn preflight() -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::empty())
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn file_response(bytes: Vec<u8>, file: &Path) -> Response<Body> {
    bytes_response(StatusCode::OK, content_type_for(file), bytes)
}

fn bytes_response(status: StatusCode, content_type: &str, bytes: Vec<u8>) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap_or_else(|_| Response::new(Body::from("response build failed")))
}

fn json_response(status: StatusCode, value: &Value) -> Response<Body> {
    bytes_response(status, "application/json", value.to_string().into_bytes())
}

fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    json_response(status, &json!({ "error": message }))
}
