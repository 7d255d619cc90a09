#![allow(dead_code)]

use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };

use async_trait::async_trait;
use persona_chat::agent::PersonaAgent;
use persona_chat::config::persona::Persona;
use persona_chat::llm::chat::TextGenerator;
use persona_chat::llm::template::ChatTemplate;
use persona_chat::llm::{ GenerationConfig, LlmError };

/// Echoes the prompt back followed by a scripted continuation.
pub struct ScriptedGenerator {
    replies: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _config: &GenerationConfig
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LlmError::Status { status: 503, body: "model not loaded".into() });
        }
        let next = self.replies.lock().unwrap().pop().unwrap_or_else(|| "...".to_string());
        Ok(format!("{} {} ", prompt, next))
    }

    fn get_model(&self) -> String {
        "scripted".into()
    }

    fn get_base_url(&self) -> String {
        "memory://".into()
    }
}

pub fn agent_with(generator: Arc<ScriptedGenerator>) -> PersonaAgent {
    PersonaAgent::new(
        generator,
        Persona::default(),
        ChatTemplate::Zephyr,
        GenerationConfig::default(),
        0
    )
}
