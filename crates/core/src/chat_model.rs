mod builder;
mod stream;

use std::fmt::{self, Debug};
use std::pin::pin;
use std::sync::Arc;

use futures_util::StreamExt;
use tracing::Instrument;
use vertex_chat_model::{
    ChatClient, ChatSession, GenerationParams, ModelVariant, SessionParams,
};

pub use builder::ChatVertexAIBuilder;
pub use stream::ChatStream;

use crate::error::Error;
use crate::message::{ChatGenerationChunk, ChatMessage, ChatResult};
use crate::parser::{parse_chat_history, parse_examples};
use crate::stop_words::enforce_stop_words;

/// The stream type of sessions opened by the client `C`.
pub type SessionStream<C> =
    <<C as ChatClient>::Session as ChatSession>::Stream;

pub(crate) type TokenObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-call options of [`ChatVertexAI`].
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Stop words for this call. Falls back to the instance-level ones
    /// when unset.
    pub stop: Option<Vec<String>>,
    /// Whether to stream the response. Falls back to the instance-level
    /// setting when unset.
    pub stream: Option<bool>,
    /// Few-shot examples as alternating human and AI messages.
    pub examples: Vec<ChatMessage>,
    /// Sampling parameters overriding the defaults for this call.
    pub params: GenerationParams,
    on_new_token: Option<TokenObserver>,
}

impl CallOptions {
    /// Sets the stop words.
    #[inline]
    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = Some(stop.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether to stream the response.
    #[inline]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Sets the few-shot examples.
    #[inline]
    pub fn with_examples(
        mut self,
        examples: impl Into<Vec<ChatMessage>>,
    ) -> Self {
        self.examples = examples.into();
        self
    }

    /// Sets the sampling parameters.
    #[inline]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Attaches a callback to be invoked with every streamed chunk, after
    /// stop words are applied and before the chunk is yielded.
    #[inline]
    pub fn on_new_token(
        mut self,
        on_new_token: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_new_token = Some(Arc::new(on_new_token));
        self
    }
}

impl Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("stop", &self.stop)
            .field("stream", &self.stream)
            .field("examples", &self.examples)
            .field("params", &self.params)
            .field("on_new_token", &self.on_new_token.is_some())
            .finish()
    }
}

/// A chat model hosted on Vertex AI.
///
/// Every call translates the given conversation into a fresh session:
/// the leading system message (if any) becomes the context, the messages
/// in between become the message history, and the last message, which
/// must be from human, is sent as the question. No state is kept between
/// calls.
///
/// Use [`ChatVertexAIBuilder`] to create one.
pub struct ChatVertexAI<C> {
    client: C,
    model_name: String,
    streaming: bool,
    default_params: GenerationParams,
    stop: Option<Vec<String>>,
}

impl<C: ChatClient> ChatVertexAI<C> {
    /// Returns the model name.
    #[inline]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the family of the loaded model.
    #[inline]
    pub fn variant(&self) -> ModelVariant {
        self.client.variant()
    }

    /// Returns the parameters every call starts from.
    #[inline]
    pub fn default_params(&self) -> &GenerationParams {
        &self.default_params
    }

    /// Returns whether calls stream by default.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Returns the underlying client.
    #[inline]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Generates the next turn of the conversation.
    ///
    /// If streaming is enabled for this call, the response is streamed
    /// and all chunks are concatenated into a single generation.
    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        options: CallOptions,
    ) -> Result<ChatResult, Error> {
        if options.stream.unwrap_or(self.streaming) {
            let mut stream = pin!(self.stream(messages, options).await?);
            let mut aggregated = ChatGenerationChunk::default();
            while let Some(chunk) = stream.next().await {
                aggregated += chunk?;
            }
            return Ok(ChatResult {
                generations: vec![aggregated.into_generation()],
            });
        }

        let (params, question) = self.prepare(messages, &options)?;
        let mut session =
            self.client.start_chat(params).map_err(Error::client)?;
        let response = session
            .send_message(question)
            .instrument(trace_span!("send message", model = %self.model_name))
            .await
            .map_err(|err| {
                error!("got an error: {err:?}");
                Error::client(err)
            })?;
        trace!("got a response: {:?}", response);

        let stop = self.stop_words(&options);
        let text = enforce_stop_words(&response.text, stop);
        Ok(ChatResult::from_text(text))
    }

    /// Generates the next turn of the conversation as a stream of chunks.
    ///
    /// The stream ends when the model has finished the response. Each
    /// chunk has the stop words applied on its own, and is reported to the
    /// `on_new_token` callback of `options` before being yielded.
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
        options: CallOptions,
    ) -> Result<ChatStream<SessionStream<C>>, Error> {
        let (params, question) = self.prepare(messages, &options)?;
        let mut session =
            self.client.start_chat(params).map_err(Error::client)?;
        let inner = session
            .send_message_streaming(question)
            .instrument(trace_span!(
                "send message streaming",
                model = %self.model_name
            ))
            .await
            .map_err(|err| {
                error!("got an error: {err:?}");
                Error::client(err)
            })?;

        let stop = self.stop_words(&options).to_vec();
        Ok(ChatStream::new(inner, stop, options.on_new_token))
    }

    /// Validates the conversation and builds the session parameters.
    ///
    /// Returns the parameters and the question to send.
    fn prepare<'a>(
        &self,
        messages: &'a [ChatMessage],
        options: &CallOptions,
    ) -> Result<(SessionParams, &'a str), Error> {
        let Some((question, history)) = messages.split_last() else {
            return Err(Error::EmptyConversation);
        };
        let ChatMessage::Human(question) = question else {
            return Err(Error::InvalidLastMessage {
                kind: question.kind().to_owned(),
            });
        };

        let chat_history = parse_chat_history(history)?;
        let examples = if options.examples.is_empty() {
            vec![]
        } else {
            parse_examples(&options.examples)?
        };

        let context = chat_history.context.filter(|c| !c.is_empty());
        let context = if self.variant().supports_context() {
            context
        } else {
            if context.is_some() {
                debug!("dropped context, {} has no context", self.model_name);
            }
            None
        };

        let params = SessionParams {
            context,
            message_history: chat_history.history,
            examples,
            params: self.default_params.merge(&options.params),
        };
        debug!(
            "starting chat with {} history turns and {} examples",
            params.message_history.len(),
            params.examples.len()
        );
        Ok((params, question))
    }

    #[inline]
    fn stop_words<'a>(&'a self, options: &'a CallOptions) -> &'a [String] {
        options
            .stop
            .as_deref()
            .or(self.stop.as_deref())
            .unwrap_or_default()
    }
}
