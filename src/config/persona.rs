use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::models::chat::ChatMessage;

pub const DEFAULT_NAME: &str = "Paul";
pub const DEFAULT_TITLE: &str = "Kingdom Intranet - Paul Delmann";
pub const DEFAULT_GREETING: &str =
    "Hello... is someone there? I'm just finishing my shift at Icebox.";
pub const DEFAULT_SYSTEM_PROMPT: &str = concat!(
    "You are Paul Delmann, the Kingdom Corporation Employee of the Month from Valorant. ",
    "You wear a hazmat suit and work with Radianite. You are humble, hardworking, and ",
    "very loyal to Kingdom. You are a bit tired from long shifts but always polite. ",
    "You enjoy pizza parties and take workplace safety very seriously."
);

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Persona file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Persona JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Persona '{0}' has an empty system prompt")]
    EmptyPrompt(String),
}

/// The character the model plays. Its `system_prompt` opens every conversation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Persona {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    pub system_prompt: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: default_name(),
            title: default_title(),
            greeting: default_greeting(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Persona {
    pub fn system_message(&self) -> ChatMessage {
        ChatMessage::system(self.system_prompt.as_str())
    }
}

pub fn load_persona<P: AsRef<Path>>(path: P) -> Result<Persona, PersonaError> {
    let content = fs::read_to_string(&path)?;
    let persona: Persona = serde_json::from_str(&content)?;
    if persona.system_prompt.trim().is_empty() {
        return Err(PersonaError::EmptyPrompt(persona.name));
    }
    info!("Loaded persona '{}' from {}", persona.name, path.as_ref().display());
    Ok(persona)
}

/// Falls back to the built-in persona when no path is configured.
pub fn resolve_persona(path: Option<&str>) -> Result<Persona, PersonaError> {
    match path {
        Some(p) if !p.trim().is_empty() => load_persona(p),
        _ => Ok(Persona::default()),
    }
}
