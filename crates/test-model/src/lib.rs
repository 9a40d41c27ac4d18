//! A local fake chat model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use vertex_chat_model::{
    ChatClient, ChatSession, ClientError, ClientFactory, ErrorKind,
    ModelVariant, ResponseStream, SessionParams, TextResponse,
};

pub use preset::*;

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

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ClientError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct State {
    script: VecDeque<PresetResponse>,
    delay: Option<Duration>,
    loaded_models: Vec<(String, ModelVariant)>,
    started_sessions: Vec<SessionParams>,
    sent_messages: Vec<String>,
}

/// A local fake model provider for testing purpose.
///
/// Before sending messages, you need to setup the script, which is how the
/// model should respond. Every sent message consumes the next preset
/// response, no matter which session it was sent from. If the script runs
/// out, an error will be returned.
///
/// The provider also records every model it loaded, every session it
/// opened and every message it received, so tests can inspect what the
/// caller asked for. Clones share the same script and records.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    state: Arc<Mutex<State>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&self, preset: PresetResponse) {
        self.lock().script.push_back(preset);
    }

    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.lock().delay = Some(duration);
    }

    /// Returns the names and variants of the models loaded so far.
    pub fn loaded_models(&self) -> Vec<(String, ModelVariant)> {
        self.lock().loaded_models.clone()
    }

    /// Returns the parameters of every session opened so far.
    pub fn started_sessions(&self) -> Vec<SessionParams> {
        self.lock().started_sessions.clone()
    }

    /// Returns every message sent so far.
    pub fn sent_messages(&self) -> Vec<String> {
        self.lock().sent_messages.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self, model_name: &str, variant: ModelVariant) -> TestChatModel {
        self.lock()
            .loaded_models
            .push((model_name.to_owned(), variant));
        TestChatModel {
            provider: self.clone(),
            variant,
        }
    }

    fn next_response(
        &self,
        text: &str,
    ) -> Result<(PresetResponse, Option<Duration>), Error> {
        let mut state = self.lock();
        state.sent_messages.push(text.to_owned());
        let Some(preset) = state.script.pop_front() else {
            return Err(Error::new("no enough responses", ErrorKind::Other));
        };
        Ok((preset, state.delay))
    }
}

impl ClientFactory for TestModelProvider {
    type Client = TestChatModel;

    fn chat_model(&self, model_name: &str) -> Result<TestChatModel, Error> {
        Ok(self.load(model_name, ModelVariant::Chat))
    }

    fn code_chat_model(
        &self,
        model_name: &str,
    ) -> Result<TestChatModel, Error> {
        Ok(self.load(model_name, ModelVariant::CodeChat))
    }
}

/// A model loaded from [`TestModelProvider`].
#[derive(Clone)]
pub struct TestChatModel {
    provider: TestModelProvider,
    variant: ModelVariant,
}

impl ChatClient for TestChatModel {
    type Error = crate::Error;
    type Session = TestChatSession;

    #[inline]
    fn variant(&self) -> ModelVariant {
        self.variant
    }

    fn start_chat(
        &self,
        params: SessionParams,
    ) -> Result<Self::Session, Self::Error> {
        if params.context.is_some() && !self.variant.supports_context() {
            return Err(Error::new(
                "context is not supported by this model",
                ErrorKind::InvalidRequest,
            ));
        }
        self.provider.lock().started_sessions.push(params);
        Ok(TestChatSession {
            provider: self.provider.clone(),
        })
    }
}

pub struct TestChatSession {
    provider: TestModelProvider,
}

impl ChatSession for TestChatSession {
    type Error = crate::Error;
    type Stream = TestResponseStream;

    fn send_message(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<TextResponse, Self::Error>> + Send + 'static
    {
        let result = self.provider.next_response(text).and_then(|(preset, _)| {
            let mut text = String::new();
            for event in preset.events {
                match event {
                    PresetEvent::Chunk(chunk) => text.push_str(&chunk),
                    PresetEvent::Failure(message) => {
                        return Err(Error::new(message, ErrorKind::Other));
                    }
                }
            }
            Ok(TextResponse { text })
        });
        ready(result)
    }

    fn send_message_streaming(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let result =
            self.provider
                .next_response(text)
                .map(|(preset, delay)| TestResponseStream {
                    events: preset.events.into(),
                    delay: delay.unwrap_or(Duration::from_millis(1)),
                    sleep: None,
                    finished: false,
                });
        ready(result)
    }
}

pub struct TestResponseStream {
    events: VecDeque<PresetEvent>,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
    finished: bool,
}

impl ResponseStream for TestResponseStream {
    type Error = crate::Error;

    fn poll_next_response(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<TextResponse>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if this.finished {
            return Poll::Ready(Ok(None));
        }

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            return match this.events.pop_front() {
                Some(PresetEvent::Chunk(text)) => {
                    Poll::Ready(Ok(Some(TextResponse { text })))
                }
                Some(PresetEvent::Failure(message)) => {
                    this.finished = true;
                    Poll::Ready(Err(Error::new(message, ErrorKind::Other)))
                }
                None => {
                    this.finished = true;
                    Poll::Ready(Ok(None))
                }
            };
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_response(cx)
    }
}
