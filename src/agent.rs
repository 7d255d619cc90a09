use log::{ debug, warn };
use std::sync::Arc;
use thiserror::Error;

use crate::config::persona::Persona;
use crate::llm::chat::TextGenerator;
use crate::llm::template::ChatTemplate;
use crate::llm::{ GenerationConfig, LlmError };
use crate::models::chat::Conversation;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Generation(#[from] LlmError),
}

/// Returns the text after the last `marker`, trimmed.
///
/// Without a marker the whole text comes back trimmed, echoed prompt included.
pub fn extract_reply(generated: &str, marker: &str) -> String {
    match generated.rfind(marker) {
        Some(idx) => generated[idx + marker.len()..].trim().to_string(),
        None => {
            warn!("Assistant marker '{}' missing from generated text", marker);
            generated.trim().to_string()
        }
    }
}

/// Persona + model handle, built once at startup and shared by all sessions.
pub struct PersonaAgent {
    generator: Arc<dyn TextGenerator>,
    persona: Persona,
    template: ChatTemplate,
    generation: GenerationConfig,
    history_window: usize,
}

impl PersonaAgent {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        persona: Persona,
        template: ChatTemplate,
        mut generation: GenerationConfig,
        history_window: usize
    ) -> Self {
        let stop = template.stop_sequence().to_string();
        if !generation.stop.contains(&stop) {
            generation.stop.push(stop);
        }
        Self { generator, persona, template, generation, history_window }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn model(&self) -> String {
        self.generator.get_model()
    }

    pub fn new_conversation(&self, id: impl Into<String>) -> Conversation {
        Conversation::with_system(id, &self.persona.system_prompt)
    }

    pub fn render_prompt(&self, conversation: &Conversation) -> String {
        self.template.render(conversation.window(self.history_window), true)
    }

    /// Generates the persona's next turn. The conversation is not modified.
    pub async fn respond(&self, conversation: &Conversation) -> Result<String, AgentError> {
        let prompt = self.render_prompt(conversation);
        debug!(
            "Generating for conversation {} ({} turns, {} prompt chars)",
            conversation.id,
            conversation.len(),
            prompt.len()
        );
        let generated = self.generator.generate(&prompt, &self.generation).await?;
        Ok(extract_reply(&generated, self.template.assistant_marker()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator {
        continuation: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _config: &GenerationConfig
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(format!("{}{}", prompt, self.continuation))
        }

        fn get_model(&self) -> String {
            "echo".into()
        }

        fn get_base_url(&self) -> String {
            String::new()
        }
    }

    fn agent(continuation: &str, window: usize) -> (PersonaAgent, Arc<EchoGenerator>) {
        let generator = Arc::new(EchoGenerator {
            continuation: continuation.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let agent = PersonaAgent::new(
            generator.clone(),
            Persona::default(),
            ChatTemplate::Zephyr,
            GenerationConfig::default(),
            window
        );
        (agent, generator)
    }

    #[test]
    fn extract_takes_text_after_marker() {
        let out = extract_reply("...<|assistant|>  Hi there!  ", "<|assistant|>");
        assert_eq!(out, "Hi there!");
    }

    #[test]
    fn extract_uses_last_marker() {
        let text = "<|assistant|>\nold</s>\n<|user|>\nagain</s>\n<|assistant|>\nnew";
        assert_eq!(extract_reply(text, "<|assistant|>"), "new");
    }

    #[test]
    fn extract_without_marker_returns_whole_text() {
        let text = "  <|system|>\nYou are Paul.</s>\nno marker here  ";
        assert_eq!(extract_reply(text, "<|assistant|>"), text.trim());
    }

    #[tokio::test]
    async fn respond_returns_only_the_continuation() {
        let (agent, generator) = agent(" Stay safe out there. ", 0);
        let mut conversation = agent.new_conversation("s1");
        conversation.push(ChatMessage::user("Hello"));

        let reply = agent.respond(&conversation).await.unwrap();
        assert_eq!(reply, "Stay safe out there.");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("<|system|>\nYou are Paul Delmann"));
        assert!(prompts[0].ends_with("<|user|>\nHello</s>\n<|assistant|>\n"));
        assert_eq!(conversation.len(), 2);
    }

    #[tokio::test]
    async fn history_window_bounds_rendered_prompt() {
        let (agent, _) = agent("ok", 1);
        let mut conversation = agent.new_conversation("s2");
        conversation.push(ChatMessage::user("first question"));
        conversation.push(ChatMessage::assistant("first answer"));
        conversation.push(ChatMessage::user("second question"));

        let prompt = agent.render_prompt(&conversation);
        assert!(prompt.contains("You are Paul Delmann"));
        assert!(prompt.contains("second question"));
        assert!(!prompt.contains("first question"));
    }

    #[test]
    fn model_comes_from_generator() {
        let (agent, _) = agent("", 0);
        assert_eq!(agent.model(), "echo");
    }

    #[test]
    fn template_stop_sequence_is_added_once() {
        let (agent, _) = agent("", 0);
        assert_eq!(agent.generation().stop, vec!["</s>".to_string()]);
    }
}
