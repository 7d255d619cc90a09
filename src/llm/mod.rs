pub mod chat;
pub mod template;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmType {
    Ollama,
    /// Any server exposing the OpenAI `/v1/completions` endpoint
    /// (llama.cpp, vLLM, LM Studio).
    OpenAI,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}

impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(LlmType::Ollama),
            "openai" | "openai-compatible" => Ok(LlmType::OpenAI),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmType::Ollama => f.write_str("ollama"),
            LlmType::OpenAI => f.write_str("openai"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Ollama,
            api_key: None,
            model: None,
            base_url: None,
        }
    }
}

/// Sampling parameters sent with every generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub do_sample: bool,
    pub stop: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 100,
            temperature: 0.8,
            top_k: None,
            top_p: None,
            do_sample: true,
            stop: Vec::new(),
        }
    }
}

impl GenerationConfig {
    /// Greedy decoding is expressed as temperature 0.
    pub fn effective_temperature(&self) -> f32 {
        if self.do_sample { self.temperature } else { 0.0 }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM backend returned {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("LLM backend returned no completion")]
    EmptyCompletion,
    #[error("Invalid LLM configuration: {0}")]
    InvalidConfig(String),
}
