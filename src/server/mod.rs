pub mod handlers;
pub mod types;

use crate::{
    config::Config,
    history::ChatStore,
    pipeline::{HttpPipeline, TextGenerationPipeline},
    Result,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub fn router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/batch", post(handlers::chat_batch))
        .route("/history/:session_id", get(handlers::history))
        .route("/feedback", post(handlers::feedback))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Initialize chat storage
    let db_path =
        std::env::var("CHAT_DB_PATH").unwrap_or_else(|_| config.server.database_path.clone());
    let store = ChatStore::new(&db_path).await?;

    // The pipeline handle lives for the whole process and is shared
    // read-only between requests.
    let pipeline: Option<Arc<dyn TextGenerationPipeline>> = match config.pipeline {
        Some(pipeline_config) => {
            info!("Using text-generation backend at {}", pipeline_config.base_url);
            Some(Arc::new(HttpPipeline::new(pipeline_config)))
        }
        None => {
            warn!("No pipeline configured; answers will be placeholders");
            None
        }
    };

    let app_state = handlers::AppState {
        store: Arc::new(store),
        pipeline,
        params: config.generation.clone(),
    };

    let app = router(app_state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
