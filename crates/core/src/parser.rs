use vertex_chat_model::{InputOutputTextPair, TurnMessage};

use crate::error::Error;
use crate::message::ChatMessage;

/// A context and a history of turns, ready to open a session with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChatHistory {
    /// The leading system instruction, if any.
    pub context: Option<String>,
    /// The turns in conversation order.
    pub history: Vec<TurnMessage>,
}

/// Parses the messages preceding the question into a [`ChatHistory`].
///
/// A system message is only accepted as the first message, where it
/// becomes the context. Human and AI messages become `user` and `bot`
/// turns. Anything else is rejected with
/// [`Error::InvalidMessageSequence`].
pub fn parse_chat_history(
    messages: &[ChatMessage],
) -> Result<ChatHistory, Error> {
    let mut chat_history = ChatHistory::default();
    for (index, message) in messages.iter().enumerate() {
        match message {
            ChatMessage::System(content) if index == 0 => {
                chat_history.context = Some(content.clone());
            }
            ChatMessage::Ai(content) => {
                chat_history.history.push(TurnMessage::bot(content.as_str()));
            }
            ChatMessage::Human(content) => {
                chat_history.history.push(TurnMessage::user(content.as_str()));
            }
            _ => {
                return Err(Error::InvalidMessageSequence {
                    index,
                    kind: message.kind().to_owned(),
                });
            }
        }
    }
    Ok(chat_history)
}

/// Parses few-shot example messages into input/output pairs.
///
/// The messages must come in (human, AI) pairs.
pub fn parse_examples(
    examples: &[ChatMessage],
) -> Result<Vec<InputOutputTextPair>, Error> {
    if examples.len() % 2 != 0 {
        return Err(Error::InvalidExampleCount {
            count: examples.len(),
        });
    }

    examples
        .chunks_exact(2)
        .enumerate()
        .map(|(pair_idx, pair)| {
            let index = pair_idx * 2;
            let ChatMessage::Human(input_text) = &pair[0] else {
                return Err(Error::InvalidExampleRole {
                    index,
                    expected: "human",
                    actual: pair[0].kind().to_owned(),
                });
            };
            let ChatMessage::Ai(output_text) = &pair[1] else {
                return Err(Error::InvalidExampleRole {
                    index: index + 1,
                    expected: "ai",
                    actual: pair[1].kind().to_owned(),
                });
            };
            Ok(InputOutputTextPair {
                input_text: input_text.clone(),
                output_text: output_text.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history() {
        let messages = [
            ChatMessage::system("You are terse"),
            ChatMessage::human("Hi"),
            ChatMessage::ai("Hello"),
        ];
        let parsed = parse_chat_history(&messages).unwrap();
        assert_eq!(parsed.context.as_deref(), Some("You are terse"));
        assert_eq!(
            parsed.history,
            [TurnMessage::user("Hi"), TurnMessage::bot("Hello")]
        );

        // Parsing again yields the same result and leaves the input alone.
        assert_eq!(parse_chat_history(&messages).unwrap(), parsed);
        assert_eq!(messages[0], ChatMessage::system("You are terse"));
    }

    #[test]
    fn test_parse_history_without_context() {
        let messages = [
            ChatMessage::ai("Hello"),
            ChatMessage::human("Hi"),
            ChatMessage::human("Still there?"),
        ];
        let parsed = parse_chat_history(&messages).unwrap();
        assert_eq!(parsed.context, None);
        assert_eq!(parsed.history.len(), 3);

        assert_eq!(parse_chat_history(&[]).unwrap(), ChatHistory::default());
    }

    #[test]
    fn test_misplaced_system_message() {
        for index in 1..4 {
            let mut messages = vec![
                ChatMessage::human("Hi"),
                ChatMessage::ai("Hello"),
                ChatMessage::human("How are you?"),
                ChatMessage::ai("Fine"),
            ];
            messages[index] = ChatMessage::system("Be nice");
            let err = parse_chat_history(&messages).unwrap_err();
            assert!(
                matches!(
                    &err,
                    Error::InvalidMessageSequence { index: i, kind }
                        if *i == index && kind == "system"
                ),
                "unexpected error: {err:?}"
            );
        }
    }

    #[test]
    fn test_generic_message_rejected() {
        let messages = [
            ChatMessage::system("Be nice"),
            ChatMessage::Generic {
                role: "function".to_owned(),
                content: "{}".to_owned(),
            },
        ];
        let err = parse_chat_history(&messages).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMessageSequence { index: 1, ref kind } if kind == "function"
        ));
    }

    #[test]
    fn test_parse_examples() {
        let examples = [ChatMessage::human("2+2"), ChatMessage::ai("4")];
        let pairs = parse_examples(&examples).unwrap();
        assert_eq!(
            pairs,
            [InputOutputTextPair {
                input_text: "2+2".to_owned(),
                output_text: "4".to_owned(),
            }]
        );

        let examples = [
            ChatMessage::human("a"),
            ChatMessage::ai("1"),
            ChatMessage::human("b"),
            ChatMessage::ai("2"),
            ChatMessage::human("c"),
            ChatMessage::ai("3"),
        ];
        let pairs = parse_examples(&examples).unwrap();
        let flattened: Vec<_> = pairs
            .iter()
            .map(|p| (p.input_text.as_str(), p.output_text.as_str()))
            .collect();
        assert_eq!(flattened, [("a", "1"), ("b", "2"), ("c", "3")]);

        assert!(parse_examples(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_odd_examples() {
        for len in [1, 3, 5] {
            let examples: Vec<_> = (0..len)
                .map(|i| {
                    if i % 2 == 0 {
                        ChatMessage::human("q")
                    } else {
                        ChatMessage::ai("a")
                    }
                })
                .collect();
            let err = parse_examples(&examples).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidExampleCount { count } if count == len
            ));
        }
    }

    #[test]
    fn test_wrong_example_roles() {
        let examples = [ChatMessage::ai("4"), ChatMessage::human("2+2")];
        let err = parse_examples(&examples).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidExampleRole { index: 0, expected: "human", ref actual }
                if actual == "ai"
        ));

        let examples = [
            ChatMessage::human("2+2"),
            ChatMessage::ai("4"),
            ChatMessage::human("3+3"),
            ChatMessage::human("6"),
        ];
        let err = parse_examples(&examples).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidExampleRole { index: 3, expected: "ai", ref actual }
                if actual == "human"
        ));
    }
}
