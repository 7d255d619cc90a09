use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::chat::Conversation;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self, conversation_id: &str) -> Option<Conversation>;

    async fn save(&self, conversation: Conversation);

    async fn len(&self) -> usize;
}

/// Process-lifetime sessions. Nothing is ever evicted.
#[derive(Default)]
pub struct MemoryHistoryStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self, conversation_id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(conversation_id).cloned()
    }

    async fn save(&self, conversation: Conversation) {
        debug!("Saving conversation {} ({} turns)", conversation.id, conversation.len());
        self.conversations.write().await.insert(conversation.id.clone(), conversation);
    }

    async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}

pub fn initialize_history_store() -> Arc<dyn HistoryStore> {
    Arc::new(MemoryHistoryStore::new())
}
