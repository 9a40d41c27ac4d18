//! Chat adapter for the hosted Vertex AI chat models.
//!
//! [`ChatVertexAI`] takes a generic conversation, a list of
//! [`ChatMessage`](message::ChatMessage)s, and drives one exchange with a
//! chat model through the client contract of [`vertex_chat_model`]: the
//! leading system message becomes the session context, the messages in
//! between become the message history, and the last human message is the
//! question sent to the model.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod chat_model;
mod error;
pub mod message;
mod parser;
mod stop_words;

pub use chat_model::{
    CallOptions, ChatStream, ChatVertexAI, ChatVertexAIBuilder, SessionStream,
};
pub use error::Error;
pub use parser::{ChatHistory, parse_chat_history, parse_examples};
pub use stop_words::enforce_stop_words;
