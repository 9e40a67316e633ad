//! Question Service Module
//!
//! 静的アセット・問題コレクションの配信と、クライアントログの受け付けを行うHTTPサービス。
//! 状態は持たず、問題コレクションはリクエストごとに読み直す。

mod assets;
mod handler;

pub use handler::{ClientLogEntry, QuestionService};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::Server;

use crate::config::Settings;
use crate::error::QuizSheetError;
use crate::report::Reporter;

/// 設定に従ってサービスを起動し、Ctrl-Cを受けるまで待ち受ける
pub async fn serve(settings: &Settings, reporter: Arc<dyn Reporter>) -> Result<(), QuizSheetError> {
    let addr: SocketAddr = settings.server.bind.parse().map_err(|e| {
        QuizSheetError::Config(format!("invalid bind address '{}': {}", settings.server.bind, e))
    })?;

    let service = Arc::new(QuestionService::from_settings(settings, reporter));

    let make_svc = make_service_fn(move |_conn| {
        let service = Arc::clone(&service);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let service = Arc::clone(&service);
                async move { Ok::<_, Infallible>(service.handle(req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_svc);
    tracing::info!("Question service listening on http://{}", addr);

    server.with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("Question service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
    }
}
