use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};

use crate::provider::ClientError;

/// A (possibly partial) text response from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextResponse {
    /// The generated text.
    pub text: String,
}

impl TextResponse {
    /// Creates a response carrying `text`.
    #[inline]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

/// A streamed response from a chat session.
pub trait ResponseStream: Sized + Send + 'static {
    /// The error type that may be returned by the client.
    type Error: ClientError;

    /// Attempts to pull out the next partial response.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct stream state:
    ///
    /// - `Poll::Pending` means that the next partial response is not
    ///   ready yet. Implementations will ensure that the current task
    ///   will be notified when it may be ready.
    /// - `Poll::Ready(Ok(Some(response)))` means a partial response is
    ///   delivered, and more may follow on subsequent calls.
    /// - `Poll::Ready(Ok(None))` means the stream has completed.
    /// - `Poll::Ready(Err(error))` means an error occurred while
    ///   receiving the stream.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_response(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<TextResponse>, Self::Error>>;
}
