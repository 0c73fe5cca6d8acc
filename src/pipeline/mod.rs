mod http;
mod types;

pub use http::HttpPipeline;
pub use types::*;

use crate::Result;
use async_trait::async_trait;

/// Opaque handle to a loaded text-generation backend.
///
/// A single-input call returns the candidate continuations for that input;
/// a batched call blocks until the whole batch is done and returns one
/// candidate list per input, in input order.
#[async_trait]
pub trait TextGenerationPipeline: Send + Sync {
    async fn generate(
        &self,
        input: Vec<ChatTurn>,
        params: &GenerationParams,
    ) -> Result<Vec<Candidate>>;

    async fn generate_batch(
        &self,
        inputs: Vec<Vec<ChatTurn>>,
        params: &GenerationParams,
    ) -> Result<Vec<Vec<Candidate>>>;
}
