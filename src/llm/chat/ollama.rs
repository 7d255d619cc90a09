use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ check_status, no_stop, TextGenerator };
use crate::llm::{ GenerationConfig, LlmConfig, LlmError, LlmType };

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "tinyllama";

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    /// The prompt already carries the chat template.
    raw: bool,
    options: GenerateOptions<'a>,
}

#[derive(Serialize)]
struct GenerateOptions<'a> {
    num_predict: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

#[derive(Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());

        Self {
            http: HttpClient::new(),
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.llm_type != LlmType::Ollama {
            return Err(LlmError::InvalidConfig("Invalid config type for OllamaClient".into()));
        }

        Ok(Self::new(config.base_url.clone(), config.model.clone()))
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let req = GenerateRequest {
            model: &self.completion_model,
            prompt,
            stream: false,
            raw: true,
            options: GenerateOptions {
                num_predict: config.max_new_tokens,
                temperature: config.effective_temperature(),
                top_k: config.top_k,
                top_p: config.top_p,
                stop: &config.stop,
            },
        };
        debug!("POST {} model={}", url, self.completion_model);
        let resp = check_status(self.http.post(&url).json(&req).send().await?).await?;
        let data = resp.json::<GenerateResponse>().await?;
        Ok(format!("{}{}", prompt, data.response))
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
