use std::fmt;
use std::str::FromStr;

use crate::models::chat::{ ChatMessage, Role };

const ZEPHYR_EOS: &str = "</s>";
const CHATML_END: &str = "<|im_end|>";

/// Linearization conventions for role-tagged turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatTemplate {
    /// `<|system|>` / `<|user|>` / `<|assistant|>` headers, `</s>` terminated.
    /// This is what TinyLlama-1.1B-Chat was tuned on.
    #[default]
    Zephyr,
    ChatMl,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseTemplateError {
    message: String,
}

impl fmt::Display for ParseTemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseTemplateError {}

impl FromStr for ChatTemplate {
    type Err = ParseTemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zephyr" => Ok(ChatTemplate::Zephyr),
            "chatml" => Ok(ChatTemplate::ChatMl),
            _ =>
                Err(ParseTemplateError {
                    message: format!("Invalid chat template: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for ChatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTemplate::Zephyr => f.write_str("zephyr"),
            ChatTemplate::ChatMl => f.write_str("chatml"),
        }
    }
}

impl ChatTemplate {
    /// Token sequence that opens an assistant turn in rendered text.
    pub fn assistant_marker(&self) -> &'static str {
        match self {
            ChatTemplate::Zephyr => "<|assistant|>",
            ChatTemplate::ChatMl => "<|im_start|>assistant",
        }
    }

    /// Text the model is expected to stop on.
    pub fn stop_sequence(&self) -> &'static str {
        match self {
            ChatTemplate::Zephyr => ZEPHYR_EOS,
            ChatTemplate::ChatMl => CHATML_END,
        }
    }

    fn turn(&self, role: Role, content: &str, out: &mut String) {
        match self {
            ChatTemplate::Zephyr => {
                out.push_str("<|");
                out.push_str(role.as_str());
                out.push_str("|>\n");
                out.push_str(content);
                out.push_str(ZEPHYR_EOS);
                out.push('\n');
            }
            ChatTemplate::ChatMl => {
                out.push_str("<|im_start|>");
                out.push_str(role.as_str());
                out.push('\n');
                out.push_str(content);
                out.push_str(CHATML_END);
                out.push('\n');
            }
        }
    }

    pub fn render<'a, I>(&self, messages: I, add_generation_prompt: bool) -> String
        where I: IntoIterator<Item = &'a ChatMessage>
    {
        let mut out = String::new();
        for message in messages {
            self.turn(message.role, &message.content, &mut out);
        }
        if add_generation_prompt {
            out.push_str(self.assistant_marker());
            out.push('\n');
        }
        out
    }
}
