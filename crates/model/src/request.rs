use serde::{Deserialize, Serialize};

/// The speaker of a turn in the message history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The human side of the conversation.
    User,
    /// The model side of the conversation.
    Bot,
}

impl Author {
    /// Returns the author tag used by the vendor API.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Bot => "bot",
        }
    }
}

/// One turn of the message history sent to the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnMessage {
    /// Who said it.
    pub author: Author,
    /// What was said.
    pub content: String,
}

impl TurnMessage {
    /// Creates a turn spoken by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            author: Author::User,
            content: content.into(),
        }
    }

    /// Creates a turn spoken by the model.
    #[inline]
    pub fn bot<S: Into<String>>(content: S) -> Self {
        Self {
            author: Author::Bot,
            content: content.into(),
        }
    }
}

/// A few-shot example: the input the model may see and the output it
/// should produce for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputOutputTextPair {
    /// The example input.
    pub input_text: String,
    /// The expected output.
    pub output_text: String,
}

/// Sampling parameters for a chat session.
///
/// Every field is optional, an unset field leaves the choice to the
/// model provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Upper bound of tokens in a response.
    pub max_output_tokens: Option<u32>,
    /// Top-k sampling.
    pub top_k: Option<u32>,
    /// Nucleus sampling.
    pub top_p: Option<f32>,
}

impl GenerationParams {
    /// Merges `overrides` on top of `self`.
    ///
    /// Values set in `overrides` win, unset ones fall back to `self`.
    #[inline]
    pub fn merge(&self, overrides: &GenerationParams) -> GenerationParams {
        GenerationParams {
            temperature: overrides.temperature.or(self.temperature),
            max_output_tokens: overrides
                .max_output_tokens
                .or(self.max_output_tokens),
            top_k: overrides.top_k.or(self.top_k),
            top_p: overrides.top_p.or(self.top_p),
        }
    }
}

/// Everything needed to open a chat session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionParams {
    /// A leading instruction applied once per session. Must be `None` for
    /// models that don't support a context.
    pub context: Option<String>,
    /// The turns exchanged before the message that will be sent.
    pub message_history: Vec<TurnMessage>,
    /// Few-shot examples.
    pub examples: Vec<InputOutputTextPair>,
    /// Sampling parameters.
    pub params: GenerationParams,
}
