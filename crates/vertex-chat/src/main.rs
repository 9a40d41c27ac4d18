//! A simple program demonstrates how to use `vertex-chat` as a library.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use vertex_chat::message::ChatMessage;
use vertex_chat::{CallOptions, VertexChat, VertexConfigBuilder};

const BAR_CHAR: &str = "▎";
const DEFAULT_MODEL: &str = "chat-bison";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(access_token) = env::var("VERTEX_ACCESS_TOKEN") else {
        eprintln!("VERTEX_ACCESS_TOKEN environment variable is not set");
        return;
    };
    let Ok(project) = env::var("VERTEX_PROJECT") else {
        eprintln!("VERTEX_PROJECT environment variable is not set");
        return;
    };
    let model = env::var("VERTEX_MODEL")
        .unwrap_or_else(|_| DEFAULT_MODEL.to_owned());

    let mut config = VertexConfigBuilder::new(project, access_token);
    if let Ok(location) = env::var("VERTEX_LOCATION") {
        config = config.with_location(location);
    }
    let chat = match vertex_chat::connect(config.build(), &model) {
        Ok(chat) => chat,
        Err(err) => {
            eprintln!("failed to load {model}: {err}");
            return;
        }
    };

    let mut messages = vec![];
    if let Ok(system_prompt) = env::var("VERTEX_SYSTEM_PROMPT") {
        messages.push(ChatMessage::system(system_prompt));
    }

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        messages.push(ChatMessage::human(line));
        match ask(&chat, &messages).await {
            Some(answer) => messages.push(ChatMessage::ai(answer)),
            None => {
                // Forget the question so the conversation stays valid.
                messages.pop();
            }
        }
    }
}

/// Streams the answer to the terminal, returning the full text.
async fn ask(chat: &VertexChat, messages: &[ChatMessage]) -> Option<String> {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner().tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    progress_bar.set_message("🤔 Thinking...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let stream = match chat.stream(messages, CallOptions::default()).await {
        Ok(stream) => stream,
        Err(err) => {
            progress_bar.finish_and_clear();
            print_error(&err);
            return None;
        }
    };
    let mut stream = pin!(stream);

    let mut answer = String::new();
    while let Some(chunk) = stream.next().await {
        // Finish the progress bar before printing anything else.
        if !progress_bar.is_finished() {
            progress_bar.finish_and_clear();
            print!("{}🤖 ", BAR_CHAR.bright_cyan());
        }
        match chunk {
            Ok(chunk) => {
                print!("{}", chunk.delta.bright_white());
                std::io::stdout().flush().ok();
                answer.push_str(&chunk.delta);
            }
            Err(err) => {
                println!();
                print_error(&err);
                return None;
            }
        }
    }
    progress_bar.finish_and_clear();
    println!();
    Some(answer)
}

fn print_error(err: &vertex_chat::Error) {
    error!("request failed: {err:?}");
    println!("{}❌ {}", BAR_CHAR.bright_red(), err.bright_red());
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
