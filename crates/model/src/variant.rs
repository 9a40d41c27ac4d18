/// The family a chat model belongs to.
///
/// The family decides which factory entry point loads the model and
/// which session parameters the model accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelVariant {
    /// A general purpose chat model, such as `chat-bison`.
    Chat,
    /// A code-oriented chat model, such as `codechat-bison`.
    CodeChat,
}

impl ModelVariant {
    /// Classifies a model by its name.
    ///
    /// Any name containing `code` denotes a code-oriented model.
    #[inline]
    pub fn from_model_name(model_name: &str) -> Self {
        if model_name.contains("code") {
            Self::CodeChat
        } else {
            Self::Chat
        }
    }

    /// Returns whether sessions of this model accept a context string.
    #[inline]
    pub fn supports_context(self) -> bool {
        matches!(self, Self::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            ModelVariant::from_model_name("chat-bison"),
            ModelVariant::Chat
        );
        assert_eq!(
            ModelVariant::from_model_name("chat-bison@001"),
            ModelVariant::Chat
        );
        assert_eq!(
            ModelVariant::from_model_name("codechat-bison"),
            ModelVariant::CodeChat
        );
        assert_eq!(
            ModelVariant::from_model_name("code-bison-32k"),
            ModelVariant::CodeChat
        );
    }

    #[test]
    fn test_context_support() {
        assert!(ModelVariant::Chat.supports_context());
        assert!(!ModelVariant::CodeChat.supports_context());
    }
}
