//! A chat client for the Vertex AI REST API.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};
use vertex_chat_model::{
    ChatClient, ChatSession, ClientError, ClientFactory, ErrorKind,
    GenerationParams, InputOutputTextPair, ModelVariant, SessionParams,
    TextResponse, TurnMessage,
};

pub use config::{VertexConfig, VertexConfigBuilder};
use io::{Chunks, Sse};
use proto::{ChatPayload, PredictResponse};
pub use response::VertexResponseStream;

/// Error type for [`VertexProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ClientError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

fn kind_from_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::BAD_REQUEST => ErrorKind::InvalidRequest,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::Unauthenticated
        }
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimitExceeded,
        _ => ErrorKind::Other,
    }
}

/// Turns a non-success response into an error carrying the body returned
/// by the server.
async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::new(
        format!("server returned {status}: {body}"),
        kind_from_status(status),
    ))
}

/// The message history of a session, shared with its in-flight requests.
#[derive(Clone, Debug, Default)]
pub(crate) struct History(Arc<Mutex<Vec<TurnMessage>>>);

impl History {
    #[inline]
    fn new(turns: Vec<TurnMessage>) -> Self {
        Self(Arc::new(Mutex::new(turns)))
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Vec<TurnMessage>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn snapshot(&self) -> Vec<TurnMessage> {
        self.lock().clone()
    }
}

/// Vertex AI model provider.
#[derive(Clone, Debug)]
pub struct VertexProvider {
    client: Client,
    config: Arc<VertexConfig>,
}

impl VertexProvider {
    /// Creates a new `VertexProvider` with the given configuration.
    #[inline]
    pub fn new(config: VertexConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn load(&self, model_name: &str, variant: ModelVariant) -> VertexChatModel {
        debug!("loaded {model_name} as {variant:?}");
        VertexChatModel {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            model_name: model_name.to_owned(),
            variant,
        }
    }
}

impl ClientFactory for VertexProvider {
    type Client = VertexChatModel;

    #[inline]
    fn chat_model(&self, model_name: &str) -> Result<VertexChatModel, Error> {
        Ok(self.load(model_name, ModelVariant::Chat))
    }

    #[inline]
    fn code_chat_model(
        &self,
        model_name: &str,
    ) -> Result<VertexChatModel, Error> {
        Ok(self.load(model_name, ModelVariant::CodeChat))
    }
}

/// A chat model served by Vertex AI.
#[derive(Clone, Debug)]
pub struct VertexChatModel {
    client: Client,
    config: Arc<VertexConfig>,
    model_name: String,
    variant: ModelVariant,
}

impl VertexChatModel {
    /// Returns the model name.
    #[inline]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl ChatClient for VertexChatModel {
    type Error = Error;
    type Session = VertexChatSession;

    #[inline]
    fn variant(&self) -> ModelVariant {
        self.variant
    }

    fn start_chat(
        &self,
        params: SessionParams,
    ) -> Result<VertexChatSession, Error> {
        if params.context.is_some() && !self.variant.supports_context() {
            return Err(Error::new(
                format!("{} does not accept a context", self.model_name),
                ErrorKind::InvalidRequest,
            ));
        }
        Ok(VertexChatSession {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            model_name: self.model_name.clone(),
            context: params.context,
            examples: params.examples,
            params: params.params,
            history: History::new(params.message_history),
        })
    }
}

/// A chat session with a Vertex AI model.
///
/// Every request carries the whole message history. An exchange is
/// appended to the history only after the answer completes.
#[derive(Debug)]
pub struct VertexChatSession {
    client: Client,
    config: Arc<VertexConfig>,
    model_name: String,
    context: Option<String>,
    examples: Vec<InputOutputTextPair>,
    params: GenerationParams,
    history: History,
}

impl VertexChatSession {
    /// Returns the turns exchanged so far.
    #[inline]
    pub fn history(&self) -> Vec<TurnMessage> {
        self.history.snapshot()
    }

    fn payload(&self, text: &str) -> ChatPayload {
        let mut messages = self.history.snapshot();
        messages.push(TurnMessage::user(text));
        ChatPayload {
            context: self.context.clone(),
            examples: self.examples.clone(),
            messages,
            params: self.params.clone(),
        }
    }
}

impl ChatSession for VertexChatSession {
    type Error = Error;
    type Stream = VertexResponseStream;

    fn send_message(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<TextResponse, Error>> + Send + 'static {
        let req = proto::create_request(&self.payload(text));
        let resp_fut = self
            .client
            .post(self.config.model_url(&self.model_name, "predict"))
            .bearer_auth(&self.config.access_token)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send();
        let question = text.to_owned();
        let history = self.history.clone();

        async move {
            let resp = resp_fut
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let resp = check_status(resp).await?;
            let resp: PredictResponse = resp
                .json()
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let response = proto::parse_response(resp);

            let mut history = history.lock();
            history.push(TurnMessage::user(question));
            history.push(TurnMessage::bot(response.text.clone()));
            Ok(response)
        }
    }

    fn send_message_streaming(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<VertexResponseStream, Error>> + Send + 'static
    {
        let req = proto::create_streaming_request(&self.payload(text));
        let url = format!(
            "{}?alt=sse",
            self.config.model_url(&self.model_name, "serverStreamingPredict")
        );
        let client = self.client.clone();
        let access_token = self.config.access_token.clone();
        let question = text.to_owned();
        let history = self.history.clone();

        async move {
            let req = req.map_err(|err| {
                Error::new(format!("{err}"), ErrorKind::InvalidRequest)
            })?;
            let resp = client
                .post(url)
                .bearer_auth(access_token)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ACCEPT, "text/event-stream")
                .json(&req)
                .send()
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let resp = check_status(resp).await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.essence_str() == "text/event-stream")
                .unwrap_or(false);
            if !is_valid_content_type {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            // Here we got a successful response.
            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(VertexResponseStream::from_sse(sse, question, history))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> VertexProvider {
        VertexProvider::new(VertexConfigBuilder::new("proj", "token").build())
    }

    #[test]
    fn test_kind_from_status() {
        assert_eq!(
            kind_from_status(StatusCode::BAD_REQUEST),
            ErrorKind::InvalidRequest
        );
        assert_eq!(
            kind_from_status(StatusCode::UNAUTHORIZED),
            ErrorKind::Unauthenticated
        );
        assert_eq!(
            kind_from_status(StatusCode::FORBIDDEN),
            ErrorKind::Unauthenticated
        );
        assert_eq!(
            kind_from_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorKind::RateLimitExceeded
        );
        assert_eq!(
            kind_from_status(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_load_pretrained() {
        let provider = provider();
        let model = provider.load_pretrained("chat-bison@001").unwrap();
        assert_eq!(model.variant(), ModelVariant::Chat);
        assert_eq!(model.model_name(), "chat-bison@001");

        let model = provider.load_pretrained("codechat-bison").unwrap();
        assert_eq!(model.variant(), ModelVariant::CodeChat);
    }

    #[test]
    fn test_start_chat() {
        let provider = provider();
        let params = SessionParams {
            context: Some("Be nice".to_owned()),
            message_history: vec![
                TurnMessage::user("Hi"),
                TurnMessage::bot("Hello"),
            ],
            ..Default::default()
        };

        let code_model = provider.code_chat_model("codechat-bison").unwrap();
        let err = code_model.start_chat(params.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let model = provider.chat_model("chat-bison").unwrap();
        let session = model.start_chat(params).unwrap();
        assert_eq!(session.history().len(), 2);

        let payload = session.payload("How are you?");
        assert_eq!(payload.context.as_deref(), Some("Be nice"));
        assert_eq!(
            payload.messages.last(),
            Some(&TurnMessage::user("How are you?"))
        );
        // Building a payload doesn't touch the history.
        assert_eq!(session.history().len(), 2);
    }
}
