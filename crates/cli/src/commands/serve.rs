//! Serve command handler.
//!
//! Exposes the answer pipeline over HTTP.

use super::build_pipeline;
use ana_core::{config::AppConfig, AppError, AppResult};
use ana_knowledge::{AnaRag, AnswerRequest, AnswerResponse};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use clap::Args;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Start the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (default from config: 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (default from config: 8000)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Shared state for every request.
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<AnaRag>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let host = self.host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = self.port.unwrap_or(config.server.port);

        let rag = build_pipeline(config).await?;
        let status = rag.resource_status();
        tracing::info!(
            vector_index = status.vector_index,
            docs = status.docs,
            embedder = status.embedder,
            data = status.data,
            "Resources loaded"
        );

        let router = build_router(AppState { rag: Arc::new(rag) });

        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Starting ANA-RAG API on http://{}", addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "ANA-RAG API - Sistema de Recuperación Aumentada por Generación",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /ask": "Enviar una pregunta y recibir respuesta",
            "GET /health": "Verificar estado de la API"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "API funcionando correctamente",
        "resources_loaded": state.rag.resource_status(),
    }))
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Json<AnswerResponse> {
    tracing::info!("Received question ({} chars)", request.question.len());
    Json(state.rag.ask(&request).await)
}
