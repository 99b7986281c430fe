use crate::server::McpServer;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub async fn serve_stdio(server: Arc<McpServer>) -> Result<()> {
    tracing::info!("Serving MCP over stdio");
    serve_lines(server, tokio::io::stdin(), tokio::io::stdout()).await?;
    Ok(())
}

/// Newline-delimited JSON-RPC. Each request runs in its own task; a single
/// writer task serializes responses onto `writer`. Returns the writer once
/// input is exhausted and every in-flight request has answered.
pub async fn serve_lines<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> Result<W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<W, std::io::Error>(writer)
    });

    let mut lines = BufReader::new(reader).lines();
    let mut requests = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let server = server.clone();
                let tx = tx.clone();
                requests.spawn(async move {
                    if let Some(response) = server.handle_message(&line).await {
                        let _ = tx.send(response);
                    }
                });
            }
            Some(joined) = requests.join_next(), if !requests.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Request task failed: {}", e);
                }
            }
        }
    }

    while let Some(joined) = requests.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Request task failed: {}", e);
        }
    }
    drop(tx);

    let writer = writer_task
        .await
        .context("Writer task failed")?
        .context("Failed to write response")?;
    Ok(writer)
}

pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .with_state(server)
}

async fn handle_mcp(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => ([(header::CONTENT_TYPE, "application/json")], response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub async fn serve_http(server: Arc<McpServer>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Serving MCP over streamable HTTP at http://{}/mcp", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
