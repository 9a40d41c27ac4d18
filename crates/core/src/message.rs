//! Generic chat messages and generation results.

use std::ops::{Add, AddAssign};

/// A role-tagged message of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChatMessage {
    /// An instruction for the model. Only allowed as the first message.
    System(String),
    /// A message from the human.
    Human(String),
    /// A message from the model.
    Ai(String),
    /// A message with any other role.
    Generic {
        /// The role name.
        role: String,
        /// The message text.
        content: String,
    },
}

impl ChatMessage {
    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::System(content.into())
    }

    /// Creates a human message.
    #[inline]
    pub fn human<S: Into<String>>(content: S) -> Self {
        Self::Human(content.into())
    }

    /// Creates an AI message.
    #[inline]
    pub fn ai<S: Into<String>>(content: S) -> Self {
        Self::Ai(content.into())
    }

    /// Returns the kind of this message: `system`, `human`, `ai`, or the
    /// role name of a generic message.
    #[inline]
    pub fn kind(&self) -> &str {
        match self {
            Self::System(_) => "system",
            Self::Human(_) => "human",
            Self::Ai(_) => "ai",
            Self::Generic { role, .. } => role,
        }
    }

    /// Returns the text of this message.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            Self::System(content) | Self::Human(content) | Self::Ai(content) => {
                content
            }
            Self::Generic { content, .. } => content,
        }
    }
}

/// One complete answer from the model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChatGeneration {
    /// The generated text.
    pub text: String,
}

impl ChatGeneration {
    /// Returns the answer as an AI message.
    #[inline]
    pub fn message(&self) -> ChatMessage {
        ChatMessage::Ai(self.text.clone())
    }
}

/// The result of a complete (non-streamed) call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChatResult {
    /// The generations, one per candidate.
    pub generations: Vec<ChatGeneration>,
}

impl ChatResult {
    #[inline]
    pub(crate) fn from_text<S: Into<String>>(text: S) -> Self {
        Self {
            generations: vec![ChatGeneration { text: text.into() }],
        }
    }

    /// Returns the text of the first generation, if any.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.generations.first().map(|g| g.text.as_str())
    }
}

/// One incremental piece of a streamed answer.
///
/// Chunks can be concatenated with `+` and `+=`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChatGenerationChunk {
    /// The text delta.
    pub delta: String,
}

impl ChatGenerationChunk {
    /// Creates a chunk carrying `delta`.
    #[inline]
    pub fn new<S: Into<String>>(delta: S) -> Self {
        Self {
            delta: delta.into(),
        }
    }

    /// Converts the (usually concatenated) chunk into a generation.
    #[inline]
    pub fn into_generation(self) -> ChatGeneration {
        ChatGeneration { text: self.delta }
    }
}

impl AddAssign for ChatGenerationChunk {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.delta.push_str(&rhs.delta);
    }
}

impl Add for ChatGenerationChunk {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_content() {
        let generic = ChatMessage::Generic {
            role: "function".to_owned(),
            content: "42".to_owned(),
        };
        assert_eq!(generic.kind(), "function");
        assert_eq!(generic.content(), "42");
        assert_eq!(ChatMessage::system("x").kind(), "system");
        assert_eq!(ChatMessage::human("x").kind(), "human");
        assert_eq!(ChatMessage::ai("y").content(), "y");
    }

    #[test]
    fn test_concat_chunks() {
        let chunk = ChatGenerationChunk::new("A")
            + ChatGenerationChunk::new("B")
            + ChatGenerationChunk::new("C");
        let generation = chunk.into_generation();
        assert_eq!(generation.text, "ABC");
        assert_eq!(generation.message(), ChatMessage::ai("ABC"));
    }
}
