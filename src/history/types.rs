use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted question/answer exchange, with the measured response time
/// and the user's optional feedback on the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: Option<i64>,
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub response_time: f64,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    pub fn new(session_id: String, question: String, answer: String, response_time: f64) -> Self {
        Self {
            id: None,
            session_id,
            question,
            answer,
            response_time,
            feedback: None,
            created_at: Utc::now(),
        }
    }
}
