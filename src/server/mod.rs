pub mod api;
pub mod page;

use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::agent::PersonaAgent;
use crate::history::HistoryStore;
use self::api::{ create_router, AppState };

pub struct Server {
    addr: String,
    agent: Arc<PersonaAgent>,
    history: Arc<dyn HistoryStore>,
}

impl Server {
    pub fn new(addr: String, agent: Arc<PersonaAgent>, history: Arc<dyn HistoryStore>) -> Self {
        Self { addr, agent, history }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = create_router(AppState {
            agent: self.agent.clone(),
            history: self.history.clone(),
        });

        let listener = tokio::net::TcpListener
            ::bind(addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
        info!("Chat page available on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
