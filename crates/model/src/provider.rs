use std::error::Error;

use crate::error::ErrorKind;
use crate::request::SessionParams;
use crate::response::{ResponseStream, TextResponse};
use crate::variant::ModelVariant;

/// The error type for a chat client.
pub trait ClientError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// Loads chat clients by model name.
///
/// General chat models and code chat models are loaded through separate
/// entry points, [`ClientFactory::load_pretrained`] picks one of them
/// from the model name.
pub trait ClientFactory {
    /// The client type this factory produces.
    type Client: ChatClient;

    /// Loads a general purpose chat model.
    fn chat_model(
        &self,
        model_name: &str,
    ) -> Result<Self::Client, <Self::Client as ChatClient>::Error>;

    /// Loads a code-oriented chat model.
    fn code_chat_model(
        &self,
        model_name: &str,
    ) -> Result<Self::Client, <Self::Client as ChatClient>::Error>;

    /// Loads a model, choosing the entry point by its name.
    #[inline]
    fn load_pretrained(
        &self,
        model_name: &str,
    ) -> Result<Self::Client, <Self::Client as ChatClient>::Error> {
        match ModelVariant::from_model_name(model_name) {
            ModelVariant::Chat => self.chat_model(model_name),
            ModelVariant::CodeChat => self.code_chat_model(model_name),
        }
    }
}

/// A loaded chat model, which is an entry for opening chat sessions.
///
/// Once the client is created, it should behave like a stateless object.
/// Opening a session must not affect other sessions opened from the same
/// client, so that independent calls can share one client.
pub trait ChatClient: Send + Sync {
    /// The error type that may be returned by the client.
    type Error: ClientError;

    /// The session type for this client.
    type Session: ChatSession<Error = Self::Error>;

    /// Returns the family of the loaded model.
    fn variant(&self) -> ModelVariant;

    /// Opens a chat session.
    ///
    /// No network traffic is expected here. Implementations should reject
    /// parameters the model doesn't accept, such as a context for code
    /// models.
    fn start_chat(
        &self,
        params: SessionParams,
    ) -> Result<Self::Session, Self::Error>;
}

/// An open chat session.
pub trait ChatSession: Send {
    /// The error type that may be returned by the session.
    type Error: ClientError;

    /// The streamed response type for this session.
    type Stream: ResponseStream<Error = Self::Error>;

    /// Sends a message and waits for the complete response.
    ///
    /// The returned future must be fully independent of `self`.
    fn send_message(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<TextResponse, Self::Error>> + Send + 'static;

    /// Sends a message and returns the response as a stream of partial
    /// responses.
    ///
    /// The returned future must be fully independent of `self`.
    fn send_message_streaming(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static;
}
