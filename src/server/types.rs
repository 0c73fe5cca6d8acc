use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub chat_id: Option<i64>,
    pub answer: String,
    pub response_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct BatchChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub questions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchChatResponse {
    pub session_id: String,
    pub answers: Vec<String>,
    pub average_response_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub chat_id: i64,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
