mod extract;
mod respond;

pub use extract::{extract_reply, extract_reply_batch, EXTRACTION_FAILED};
pub use respond::{generate_batch_responses, generate_response, MODEL_UNAVAILABLE};
