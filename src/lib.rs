pub mod agent;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;

use agent::PersonaAgent;
use cli::{ Args, Command };
use config::persona::resolve_persona;
use history::initialize_history_store;
use llm::chat::new_generator;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub fn build_agent(args: &Args) -> Result<PersonaAgent, Box<dyn Error + Send + Sync>> {
    let persona = resolve_persona(args.persona_path.as_deref())?;
    let template = args.chat_template()?;
    let llm_config = args.llm_config()?;

    info!("Loading {}'s brain...", persona.name);
    let generator = new_generator(&llm_config)?;
    info!(
        "Generator configured: Type={}, Model={}, BaseURL={}",
        llm_config.llm_type,
        generator.get_model(),
        generator.get_base_url()
    );

    Ok(PersonaAgent::new(generator, persona, template, args.generation_config(), args.history_window))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("LLM Type: {}", args.llm_type);
    info!("Chat Template: {}", args.template);
    info!("Max New Tokens: {}", args.max_new_tokens);
    info!("Temperature: {}", args.temperature);
    info!("Sampling: {}", !args.no_sample);
    info!("Persona Path: {}", args.persona_path.as_deref().unwrap_or("built-in"));
    info!("History Window: {}", args.history_window);
    info!("-------------------------");

    let agent = Arc::new(build_agent(&args)?);
    info!("Persona '{}' ready on model {}", agent.persona().name, agent.model());

    match args.command {
        Command::Serve { addr } => {
            info!("Starting server on: {}", addr);
            let server = Server::new(addr, agent, initialize_history_store());
            server.run().await?;
        }
        Command::Chat => {
            cli::repl::run_stdio(&agent).await?;
        }
    }

    Ok(())
}
