//! Example: Interactive streaming chat session.
//!
//! Demonstrates real-time streaming responses — tokens are printed as they
//! arrive. The accumulated reply is injected back into the session so the
//! conversation context stays intact across turns.
//!
//! # Usage
//!
//! ```bash
//! MODEL_PROVIDER=ollama OLLAMA_MODEL_ID=qwen3:8b OLLAMA_TEMPERATURE=0.7 \
//!     cargo run --example streaming_chat
//! ```
//!
//! Type a message and press enter; an empty line exits.

use std::io::{self, Write};

use caravan::client_wrapper::Role;
use caravan::model_factory::ModelFactory;
use caravan::LLMSession;
use futures_util::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    caravan::init_logger();

    println!("=== Caravan Interactive Streaming Session ===\n");
    println!("You'll see the assistant's response appear token by token as it's generated.");
    println!("Empty line exits.\n");

    let client = ModelFactory::create_client()?;
    let system_prompt = "You are a concise, knowledgeable travel mentor.".to_string();
    let max_tokens = 8_192;
    let mut session = LLMSession::new(client, system_prompt, max_tokens);

    println!("Using model: {}", session.model_name());
    println!("Max tokens: {}\n", session.get_max_tokens());

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut user_input = String::new();
        io::stdin().read_line(&mut user_input)?;
        let user_input = user_input.trim().to_string();
        if user_input.is_empty() {
            break;
        }

        print!("\nAssistant: ");
        io::stdout().flush()?;

        match session.send_message_stream(Role::User, user_input).await {
            Ok(mut stream) => {
                let mut full_response = String::new();

                while let Some(chunk_result) = stream.next().await {
                    match chunk_result {
                        Ok(chunk) => {
                            if !chunk.content.is_empty() {
                                print!("{}", chunk.content);
                                io::stdout().flush()?;
                                full_response.push_str(&chunk.content);
                            }
                            if chunk.is_final {
                                println!();
                            }
                        }
                        Err(e) => {
                            eprintln!("\n[Error in stream: {}]", e);
                            break;
                        }
                    }
                }

                // Keep the conversation context intact for the next turn
                if !full_response.is_empty() {
                    session.inject_message(Role::Assistant, full_response);
                }
                println!();
            }
            Err(err) => {
                // Client without streaming support: fall back to a plain call
                eprintln!("[streaming unavailable: {}; falling back]", err);
                let response = session
                    .send_message(Role::User, "Please answer my last question.".to_string())
                    .await?;
                println!("{}\n", response.content);
            }
        }
    }

    let usage = session.token_usage();
    println!(
        "Session token usage: input {}, output {}, total {} (window {})",
        usage.input_tokens,
        usage.output_tokens,
        usage.total_tokens,
        session.get_max_tokens()
    );

    Ok(())
}
