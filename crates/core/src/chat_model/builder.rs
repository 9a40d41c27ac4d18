use vertex_chat_model::{
    ChatClient, ClientFactory, GenerationParams, ModelVariant,
};

use super::ChatVertexAI;
use crate::error::Error;

/// [`ChatVertexAI`] builder.
#[derive(Clone, Debug)]
pub struct ChatVertexAIBuilder {
    model_name: String,
    streaming: bool,
    temperature: f32,
    max_output_tokens: u32,
    top_k: u32,
    top_p: f32,
    stop: Option<Vec<String>>,
}

impl Default for ChatVertexAIBuilder {
    #[inline]
    fn default() -> Self {
        Self::new("chat-bison")
    }
}

impl ChatVertexAIBuilder {
    /// Creates a builder for the given model.
    #[inline]
    pub fn new<S: Into<String>>(model_name: S) -> Self {
        Self {
            model_name: model_name.into(),
            streaming: false,
            temperature: 0.0,
            max_output_tokens: 128,
            top_k: 40,
            top_p: 0.95,
            stop: None,
        }
    }

    /// Sets whether calls stream by default.
    #[inline]
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Sets the default sampling temperature.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the default upper bound of tokens in a response.
    #[inline]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Sets the default top-k. Ignored by code models.
    #[inline]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the default top-p. Ignored by code models.
    #[inline]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the stop words used by calls that don't specify their own.
    #[inline]
    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = Some(stop.into_iter().map(Into::into).collect());
        self
    }

    /// Loads the model from `factory` and builds the chat model.
    pub fn build<F: ClientFactory>(
        self,
        factory: &F,
    ) -> Result<ChatVertexAI<F::Client>, Error> {
        let client = factory
            .load_pretrained(&self.model_name)
            .map_err(Error::client)?;
        Ok(self.build_with_client(client))
    }

    /// Builds the chat model around an already loaded client.
    pub fn build_with_client<C: ChatClient>(
        self,
        client: C,
    ) -> ChatVertexAI<C> {
        let default_params = match client.variant() {
            ModelVariant::Chat => GenerationParams {
                temperature: Some(self.temperature),
                max_output_tokens: Some(self.max_output_tokens),
                top_k: Some(self.top_k),
                top_p: Some(self.top_p),
            },
            ModelVariant::CodeChat => GenerationParams {
                temperature: Some(self.temperature),
                max_output_tokens: Some(self.max_output_tokens),
                top_k: None,
                top_p: None,
            },
        };
        debug!("loaded {} as {:?} model", self.model_name, client.variant());

        ChatVertexAI {
            client,
            model_name: self.model_name,
            streaming: self.streaming,
            default_params,
            stop: self.stop,
        }
    }
}
