use gemma_chat::{
    history::ChatStore,
    pipeline::{GenerationParams, TextGenerationPipeline},
    server::handlers::AppState,
};
use std::sync::Arc;

/// Create an application state backed by an in-memory database
pub async fn create_test_state(pipeline: Option<Arc<dyn TextGenerationPipeline>>) -> AppState {
    let store = ChatStore::new(":memory:").await.unwrap();
    AppState {
        store: Arc::new(store),
        pipeline,
        params: GenerationParams::default(),
    }
}
