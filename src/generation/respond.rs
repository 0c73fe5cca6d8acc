use super::extract::{extract_reply, extract_reply_batch, EXTRACTION_FAILED};
use crate::pipeline::{ChatTurn, GenerationParams, TextGenerationPipeline};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Returned for every question when no pipeline handle is loaded.
pub const MODEL_UNAVAILABLE: &str = "the model is not loaded, so no response can be generated";

/// Generates a reply to a single question and measures its wall-clock
/// latency in seconds.
///
/// Always returns normally: an absent pipeline yields the fixed
/// unavailable message, a failing backend call yields an error-describing
/// string, and both carry a zero timing.
pub async fn generate_response(
    pipeline: Option<&dyn TextGenerationPipeline>,
    question: &str,
    params: &GenerationParams,
) -> (String, f64) {
    let Some(pipeline) = pipeline else {
        return (MODEL_UNAVAILABLE.to_string(), 0.0);
    };

    let started = Instant::now();
    let input = vec![ChatTurn::user(question)];

    match pipeline.generate(input, params).await {
        Ok(candidates) => {
            let reply = extract_reply(&candidates, question);
            let elapsed = started.elapsed().as_secs_f64();
            debug!("Generated response in {:.2}s", elapsed);
            (reply, elapsed)
        }
        Err(e) => {
            error!("Response generation failed: {}", e);
            (format!("generation failed: {e}"), 0.0)
        }
    }
}

/// Generates replies for a whole batch of questions with one backend call.
///
/// The batch is timed as a whole and the average per-response duration is
/// attached to every reply, since a single batched call exposes no
/// per-item timing. Both returned vectors always have exactly
/// `questions.len()` elements, whatever the backend does.
pub async fn generate_batch_responses(
    pipeline: Option<&dyn TextGenerationPipeline>,
    questions: &[String],
    params: &GenerationParams,
) -> (Vec<String>, Vec<f64>) {
    let Some(pipeline) = pipeline else {
        return (
            vec![MODEL_UNAVAILABLE.to_string(); questions.len()],
            vec![0.0; questions.len()],
        );
    };

    let started = Instant::now();
    let inputs: Vec<Vec<ChatTurn>> = questions
        .iter()
        .map(|q| vec![ChatTurn::user(q.as_str())])
        .collect();

    match pipeline.generate_batch(inputs, params).await {
        Ok(outputs) => {
            let total = started.elapsed().as_secs_f64();
            let average = if questions.is_empty() {
                0.0
            } else {
                total / questions.len() as f64
            };

            if outputs.len() != questions.len() {
                warn!(
                    "Backend returned {} outputs for {} questions",
                    outputs.len(),
                    questions.len()
                );
            }

            // Missing outputs count as extraction failures so the reply
            // count always matches the question count.
            let responses: Vec<String> = (0..questions.len())
                .map(|i| match outputs.get(i) {
                    Some(candidates) => extract_reply_batch(candidates),
                    None => EXTRACTION_FAILED.to_string(),
                })
                .collect();

            info!(
                "Generated {} responses in {:.2}s (average {:.2}s)",
                responses.len(),
                total,
                average
            );
            (responses, vec![average; questions.len()])
        }
        Err(e) => {
            error!("Batch response generation failed: {}", e);
            (
                vec![format!("generation failed: {e}"); questions.len()],
                vec![0.0; questions.len()],
            )
        }
    }
}
