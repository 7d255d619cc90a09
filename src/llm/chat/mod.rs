pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use super::{ GenerationConfig, LlmConfig, LlmError, LlmType };
use self::ollama::OllamaClient;
use self::openai::OpenAICompletionClient;

/// A raw text-completion backend.
///
/// `generate` returns the full text: the prompt as sent, followed by the
/// model's continuation. Callers slice the reply out with the template's
/// assistant marker.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig
    ) -> Result<String, LlmError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let client: Arc<dyn TextGenerator> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAICompletionClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Status { status: status.as_u16(), body })
}

pub(crate) fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}
