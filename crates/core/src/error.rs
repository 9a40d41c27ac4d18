use std::error::Error as StdError;

use thiserror::Error;
use vertex_chat_model::{ClientError, ErrorKind};

/// Errors returned by [`ChatVertexAI`](crate::ChatVertexAI).
///
/// Everything except [`Error::Client`] is a validation failure, raised
/// before any session is opened.
#[derive(Debug, Error)]
pub enum Error {
    /// No message was given.
    #[error("at least one message is required to start the chat")]
    EmptyConversation,
    /// The last message is not from human.
    #[error("last message in the list should be from human, got {kind}")]
    InvalidLastMessage {
        /// Kind of the offending message.
        kind: String,
    },
    /// The history contains a message that has no place in it.
    #[error("unexpected message with type {kind} at the position {index}")]
    InvalidMessageSequence {
        /// Position of the offending message.
        index: usize,
        /// Kind of the offending message.
        kind: String,
    },
    /// The examples can't be split into input/output pairs.
    #[error("expected examples to have an even amount of messages, got {count}")]
    InvalidExampleCount {
        /// Number of example messages given.
        count: usize,
    },
    /// An example message is from the wrong side.
    #[error("expected example message {index} to be from {expected}, got {actual}")]
    InvalidExampleRole {
        /// Position of the offending message.
        index: usize,
        /// The kind that belongs at this position.
        expected: &'static str,
        /// Kind of the offending message.
        actual: String,
    },
    /// The chat client failed.
    #[error("chat client failed ({kind}): {source}")]
    Client {
        /// Kind reported by the client.
        kind: ErrorKind,
        /// The client error, unchanged.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn client<E: ClientError>(err: E) -> Self {
        Self::Client {
            kind: err.kind(),
            source: Box::new(err),
        }
    }

    /// Returns the client error kind if this error came from the client.
    #[inline]
    pub fn client_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Client { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
