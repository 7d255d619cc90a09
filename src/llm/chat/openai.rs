use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };

use super::{ check_status, no_stop, TextGenerator };
use crate::llm::{ GenerationConfig, LlmConfig, LlmError, LlmType };

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_MODEL: &str = "TinyLlama/TinyLlama-1.1B-Chat-v1.0";

/// Client for the legacy text-completion endpoint of OpenAI-compatible servers.
pub struct OpenAICompletionClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl OpenAICompletionClient {
    pub fn new(base_url: Option<String>, model: Option<String>, api_key: Option<String>) -> Self {
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self {
            http: HttpClient::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.llm_type != LlmType::OpenAI {
            return Err(
                LlmError::InvalidConfig("Invalid config type for OpenAICompletionClient".into())
            );
        }

        Ok(Self::new(config.base_url.clone(), config.model.clone(), config.api_key.clone()))
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e|
                LlmError::InvalidConfig(format!("Invalid API key header: {}", e))
            )?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for OpenAICompletionClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/completions", self.base_url);
        let req = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: config.max_new_tokens,
            temperature: config.effective_temperature(),
            top_k: config.top_k,
            top_p: config.top_p,
            stop: &config.stop,
            stream: false,
        };
        debug!("POST {} model={}", url, self.model);
        let resp = check_status(
            self.http.post(&url).headers(self.headers()?).json(&req).send().await?
        ).await?;
        let data = resp.json::<CompletionResponse>().await?;
        let choice = data.choices.into_iter().next().ok_or(LlmError::EmptyCompletion)?;
        Ok(format!("{}{}", prompt, choice.text))
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
