pub mod repl;

use clap::{ Parser, Subcommand };

use crate::llm::{ GenerationConfig, LlmConfig, LlmType, ParseLlmTypeError };
use crate::llm::template::{ ChatTemplate, ParseTemplateError };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    // --- LLM Backend Args ---
    /// Type of local model server (ollama, openai)
    #[arg(long, global = true, env = "LLM_TYPE", default_value = "ollama")]
    pub llm_type: String,

    /// Base URL of the model server (e.g., http://localhost:11434 for Ollama)
    #[arg(long, global = true, env = "LLM_BASE_URL")] // No default, let adapters handle defaults if None
    pub base_url: Option<String>,

    /// API Key for OpenAI-compatible servers that require one
    #[arg(long, global = true, env = "LLM_API_KEY", default_value = "")]
    pub api_key: String,

    /// Model name (e.g., tinyllama)
    #[arg(long, global = true, env = "LLM_MODEL")] // No default, rely on adapter defaults if None
    pub model: Option<String>,

    /// Chat template used to linearize turns (zephyr, chatml)
    #[arg(long, global = true, env = "CHAT_TEMPLATE", default_value = "zephyr")]
    pub template: String,

    // --- Sampling Args ---
    /// Maximum number of tokens generated per reply
    #[arg(long, global = true, env = "MAX_NEW_TOKENS", default_value = "100")]
    pub max_new_tokens: u32,

    /// Sampling temperature
    #[arg(long, global = true, env = "TEMPERATURE", default_value = "0.8")]
    pub temperature: f32,

    #[arg(long, global = true, env = "TOP_K")]
    pub top_k: Option<u32>,

    #[arg(long, global = true, env = "TOP_P")]
    pub top_p: Option<f32>,

    /// Use greedy decoding instead of sampling
    #[arg(long, global = true, env = "NO_SAMPLE", default_value = "false")]
    pub no_sample: bool,

    // --- Persona Args ---
    /// Optional JSON file overriding the built-in persona
    #[arg(long, global = true, env = "PERSONA_PATH")]
    pub persona_path: Option<String>,

    /// Number of most recent turns sent with each prompt. 0 sends the whole history.
    #[arg(long, global = true, env = "HISTORY_WINDOW", default_value = "0")]
    pub history_window: usize,

    /// Enable debug logging/output
    #[arg(long, global = true, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the chat page and the /chat endpoint
    Serve {
        /// Host address and port for the server to listen on.
        #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:5000")]
        addr: String,
    },
    /// Talk to the persona on the terminal
    Chat,
}

impl Args {
    pub fn llm_config(&self) -> Result<LlmConfig, ParseLlmTypeError> {
        let llm_type: LlmType = self.llm_type.parse()?;
        Ok(LlmConfig {
            llm_type,
            api_key: Some(self.api_key.clone()).filter(|k| !k.is_empty()),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        })
    }

    pub fn chat_template(&self) -> Result<ChatTemplate, ParseTemplateError> {
        self.template.parse()
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            do_sample: !self.no_sample,
            stop: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let args = Args::try_parse_from(["persona-chat", "serve"]).unwrap();
        assert_eq!(args.command, Command::Serve { addr: "127.0.0.1:5000".into() });

        let generation = args.generation_config();
        assert_eq!(generation.max_new_tokens, 100);
        assert!(generation.do_sample);
        assert_eq!(args.chat_template().unwrap(), ChatTemplate::Zephyr);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "persona-chat",
            "chat",
            "--llm-type",
            "openai",
            "--api-key",
            "secret",
            "--no-sample",
        ]).unwrap();

        let config = args.llm_config().unwrap();
        assert_eq!(config.llm_type, LlmType::OpenAI);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(!args.generation_config().do_sample);
    }

    #[test]
    fn empty_api_key_is_none() {
        let args = Args::try_parse_from(["persona-chat", "chat", "--api-key", ""]).unwrap();
        assert!(args.llm_config().unwrap().api_key.is_none());
    }
}
