use chrono::Utc;
use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered turn history. Turns are only ever appended.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), messages: Vec::new() }
    }

    pub fn with_system(id: impl Into<String>, system_prompt: &str) -> Self {
        let mut conversation = Self::new(id);
        conversation.push(ChatMessage::system(system_prompt));
        conversation
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The leading system turn plus at most the last `limit` other turns.
    /// A `limit` of zero keeps everything.
    pub fn window(&self, limit: usize) -> Vec<&ChatMessage> {
        let (head, rest) = match self.messages.split_first() {
            Some((first, rest)) if first.role == Role::System => (Some(first), rest),
            _ => (None, self.messages.as_slice()),
        };

        let skip = if limit == 0 { 0 } else { rest.len().saturating_sub(limit) };
        head.into_iter().chain(rest[skip..].iter()).collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Ask the server to keep this exchange under a freshly minted session.
    #[serde(default)]
    pub new_session: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(messages: &[&ChatMessage]) -> Vec<String> {
        messages.iter().map(|m| m.content.clone()).collect()
    }

    #[test]
    fn push_keeps_conversation_order() {
        let mut conversation = Conversation::with_system("c1", "persona");
        conversation.push(ChatMessage::user("hello"));
        conversation.push(ChatMessage::assistant("hi"));

        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[test]
    fn window_keeps_system_turn_and_latest_turns() {
        let mut conversation = Conversation::with_system("c1", "persona");
        for i in 0..5 {
            conversation.push(ChatMessage::user(format!("u{}", i)));
        }

        assert_eq!(contents(&conversation.window(2)), vec!["persona", "u3", "u4"]);
        assert_eq!(conversation.window(0).len(), 6);
        assert_eq!(conversation.len(), 6);
    }

    #[test]
    fn window_without_system_turn() {
        let mut conversation = Conversation::new("c2");
        conversation.push(ChatMessage::user("a"));
        conversation.push(ChatMessage::user("b"));

        assert_eq!(contents(&conversation.window(1)), vec!["b"]);
        assert_eq!(contents(&conversation.window(10)), vec!["a", "b"]);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("x")).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
    }

    #[test]
    fn chat_request_session_is_optional() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"Hello"}"#).unwrap();
        assert_eq!(request.message, "Hello");
        assert!(request.session_id.is_none());
        assert!(!request.new_session);
    }
}
