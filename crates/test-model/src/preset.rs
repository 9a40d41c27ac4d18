use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    /// A partial response text.
    #[serde(rename = "chunk")]
    Chunk(String),
    /// A failure with the given message. Streams stop after it.
    #[serde(rename = "failure")]
    Failure(String),
}

/// The preset response for one sent message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Creates a `PresetResponse` streaming the given chunks in order.
    #[inline]
    pub fn with_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: chunks
                .into_iter()
                .map(|chunk| PresetEvent::Chunk(chunk.into()))
                .collect(),
        }
    }

    /// Creates a `PresetResponse` that fails right away.
    #[inline]
    pub fn with_failure<S: Into<String>>(message: S) -> Self {
        Self {
            events: vec![PresetEvent::Failure(message.into())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_events([
            PresetEvent::Chunk("I have left ".to_string()),
            PresetEvent::Chunk("a message for you.".to_string()),
            PresetEvent::Failure("connection reset".to_string()),
        ]);

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }

    #[test]
    fn test_with_chunks() {
        let response = PresetResponse::with_chunks(["A", "B"]);
        assert_eq!(
            response.events,
            vec![
                PresetEvent::Chunk("A".to_owned()),
                PresetEvent::Chunk("B".to_owned())
            ]
        );
    }
}
