use super::types::{Candidate, ChatTurn, GenerationParams};
use super::TextGenerationPipeline;
use crate::{config::PipelineConfig, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Pipeline implementation speaking JSON over HTTP to a remote
/// text-generation server.
pub struct HttpPipeline {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    inputs: &'a [ChatTurn],
    parameters: &'a GenerationParams,
}

#[derive(Serialize)]
struct GenerateBatchRequest<'a> {
    model: &'a str,
    inputs: &'a [Vec<ChatTurn>],
    parameters: &'a GenerationParams,
}

impl HttpPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerationPipeline for HttpPipeline {
    async fn generate(
        &self,
        input: Vec<ChatTurn>,
        params: &GenerationParams,
    ) -> Result<Vec<Candidate>> {
        let url = format!("{}/generate", self.base_url);
        debug!("Posting generation request for {} turns to {}", input.len(), url);

        let request = GenerateRequest {
            model: &self.model,
            inputs: &input,
            parameters: params,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(Error::pipeline(format!(
                "backend returned {} for {}",
                response.status(),
                url
            )));
        }

        let candidates: Vec<Candidate> = response.json().await?;
        debug!("Received {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn generate_batch(
        &self,
        inputs: Vec<Vec<ChatTurn>>,
        params: &GenerationParams,
    ) -> Result<Vec<Vec<Candidate>>> {
        let url = format!("{}/generate_batch", self.base_url);
        debug!("Posting batch of {} inputs to {}", inputs.len(), url);

        let request = GenerateBatchRequest {
            model: &self.model,
            inputs: &inputs,
            parameters: params,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(Error::pipeline(format!(
                "backend returned {} for {}",
                response.status(),
                url
            )));
        }

        let outputs: Vec<Vec<Candidate>> = response.json().await?;
        debug!("Received {} candidate lists", outputs.len());
        Ok(outputs)
    }
}
