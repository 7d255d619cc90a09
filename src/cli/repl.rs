use log::{ error, info };
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::agent::PersonaAgent;
use crate::models::chat::{ ChatMessage, Conversation };

fn is_exit(line: &str) -> bool {
    let token = line.trim();
    token.eq_ignore_ascii_case("quit") || token.eq_ignore_ascii_case("exit")
}

/// Line-at-a-time chat over any reader/writer pair. Returns the conversation
/// accumulated so far when the user leaves or input ends.
pub async fn run_repl<R, W>(
    agent: &PersonaAgent,
    reader: R,
    mut writer: W
) -> io::Result<Conversation>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    let mut conversation = agent.new_conversation("cli");
    let mut lines = reader.lines();

    writer.write_all(format!("{}: {}\n", agent.persona().name, agent.persona().greeting).as_bytes()).await?;
    writer.write_all(b"(type 'quit' or 'exit' to leave)\n").await?;

    loop {
        writer.write_all(b"You: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            writer.write_all(b"\n").await?;
            break;
        };
        if is_exit(&line) {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        conversation.push(ChatMessage::user(message));
        match agent.respond(&conversation).await {
            Ok(reply) => {
                writer.write_all(format!("AI: {}\n", reply).as_bytes()).await?;
                conversation.push(ChatMessage::assistant(reply));
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                writer.write_all(format!("AI: [error] {}\n", e).as_bytes()).await?;
            }
        }
        writer.flush().await?;
    }

    writer.flush().await?;
    info!("Chat ended after {} turns", conversation.len());
    Ok(conversation)
}

pub async fn run_stdio(agent: &PersonaAgent) -> io::Result<Conversation> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_repl(agent, stdin, tokio::io::stdout()).await
}
