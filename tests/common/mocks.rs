use async_trait::async_trait;
use gemma_chat::{
    pipeline::{Candidate, ChatTurn, GenerationParams, TextGenerationPipeline},
    Error, Result,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock text-generation pipeline for testing
pub struct MockPipeline {
    pub single_responses: Arc<Mutex<Vec<Vec<Candidate>>>>,
    pub batch_responses: Arc<Mutex<Vec<Vec<Vec<Candidate>>>>>,
    pub requests: Arc<Mutex<Vec<Vec<Vec<ChatTurn>>>>>,
    pub error: Option<String>,
    pub delay: Option<Duration>,
}

impl MockPipeline {
    pub fn new() -> Self {
        Self {
            single_responses: Arc::new(Mutex::new(Vec::new())),
            batch_responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            error: None,
            delay: None,
        }
    }

    pub fn with_response(self, candidates: Vec<Candidate>) -> Self {
        self.single_responses.lock().unwrap().push(candidates);
        self
    }

    pub fn with_batch_response(self, outputs: Vec<Vec<Candidate>>) -> Self {
        self.batch_responses.lock().unwrap().push(outputs);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recorded_requests(&self) -> Vec<Vec<Vec<ChatTurn>>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationPipeline for MockPipeline {
    async fn generate(
        &self,
        input: Vec<ChatTurn>,
        _params: &GenerationParams,
    ) -> Result<Vec<Candidate>> {
        self.requests.lock().unwrap().push(vec![input]);

        if let Some(ref error) = self.error {
            return Err(Error::pipeline(error.clone()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.single_responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::pipeline("No more mock responses available"));
        }
        Ok(responses.remove(0))
    }

    async fn generate_batch(
        &self,
        inputs: Vec<Vec<ChatTurn>>,
        _params: &GenerationParams,
    ) -> Result<Vec<Vec<Candidate>>> {
        self.requests.lock().unwrap().push(inputs);

        if let Some(ref error) = self.error {
            return Err(Error::pipeline(error.clone()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.batch_responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::pipeline("No more mock batch responses available"));
        }
        Ok(responses.remove(0))
    }
}

// Helper functions for creating test data

pub fn assistant_reply(content: &str) -> Vec<Candidate> {
    vec![Candidate::chat(vec![
        ChatTurn::user("question"),
        ChatTurn::assistant(content),
    ])]
}

pub fn flat_reply(text: &str) -> Vec<Candidate> {
    vec![Candidate::flat(text)]
}
