//! Chat with the hosted Vertex AI models through a generic conversation
//! interface.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library, [`connect`] gives a [`VertexChat`] ready to
//! call.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub use vertex_chat_core::*;
pub use vertex_chat_rest_model::{
    VertexChatModel, VertexConfig, VertexConfigBuilder, VertexProvider,
};

/// Re-exports of [`vertex_chat_model`] crate.
pub mod model {
    pub use vertex_chat_model::*;
}

/// A [`ChatVertexAI`] backed by the Vertex AI REST API.
pub type VertexChat = ChatVertexAI<VertexChatModel>;

/// Creates a chat model for `model_name` from the REST configuration,
/// using the default settings of [`ChatVertexAIBuilder`] otherwise.
pub fn connect(
    config: VertexConfig,
    model_name: &str,
) -> Result<VertexChat, Error> {
    debug!("connecting to {model_name}");
    let provider = VertexProvider::new(config);
    ChatVertexAIBuilder::new(model_name).build(&provider)
}
