use serde::{Deserialize, Serialize};

/// Sampling parameters forwarded verbatim to the text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            do_sample: default_do_sample(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

fn default_max_new_tokens() -> u32 {
    512
}

fn default_do_sample() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// The generated-text field of a candidate comes back in one of two shapes
/// depending on how the backend was invoked: a chat transcript when it was
/// given structured messages, or a flat string (prompt echo included) when
/// it was given a raw prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedText {
    Chat(Vec<ChatTurn>),
    Flat(String),
}

/// One candidate continuation as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub generated_text: GeneratedText,
}

impl Candidate {
    pub fn chat(turns: Vec<ChatTurn>) -> Self {
        Self {
            generated_text: GeneratedText::Chat(turns),
        }
    }

    pub fn flat(text: impl Into<String>) -> Self {
        Self {
            generated_text: GeneratedText::Flat(text.into()),
        }
    }
}
