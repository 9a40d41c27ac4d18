use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use vertex_chat_model::{
    ChatClient, ChatSession, ClientError, ClientFactory, ErrorKind,
    ModelVariant, ResponseStream, SessionParams, TextResponse,
};

#[derive(Debug)]
struct FakeClientError(ErrorKind);

impl Display for FakeClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeClientError {}

impl ClientError for FakeClientError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct FakeResponseStream {
    fake_items: VecDeque<String>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl FakeResponseStream {
    fn new(input: &str) -> Self {
        let fake_items = format!("You said {}", input)
            .split(" ")
            .map(ToString::to_string)
            .collect();
        Self {
            fake_items,
            sleep: None,
        }
    }
}

impl ResponseStream for FakeResponseStream {
    type Error = FakeClientError;

    fn poll_next_response(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<TextResponse>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if let Some(mut this_item) = this.fake_items.pop_front() {
                if !this.fake_items.is_empty() {
                    this_item.push(' ');
                }
                return Poll::Ready(Ok(Some(TextResponse::new(this_item))));
            }

            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_response(cx)
    }
}

struct FakeSession;

impl ChatSession for FakeSession {
    type Error = FakeClientError;
    type Stream = FakeResponseStream;

    fn send_message(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<TextResponse, Self::Error>> + Send + 'static
    {
        ready(Ok(TextResponse::new(format!("You said {text}"))))
    }

    fn send_message_streaming(
        &mut self,
        text: &str,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        ready(Ok(FakeResponseStream::new(text)))
    }
}

struct FakeClient(ModelVariant);

impl ChatClient for FakeClient {
    type Error = FakeClientError;
    type Session = FakeSession;

    fn variant(&self) -> ModelVariant {
        self.0
    }

    fn start_chat(
        &self,
        params: SessionParams,
    ) -> Result<Self::Session, Self::Error> {
        if params.context.is_some() && !self.0.supports_context() {
            return Err(FakeClientError(ErrorKind::InvalidRequest));
        }
        Ok(FakeSession)
    }
}

struct FakeFactory;

impl ClientFactory for FakeFactory {
    type Client = FakeClient;

    fn chat_model(
        &self,
        _model_name: &str,
    ) -> Result<FakeClient, FakeClientError> {
        Ok(FakeClient(ModelVariant::Chat))
    }

    fn code_chat_model(
        &self,
        _model_name: &str,
    ) -> Result<FakeClient, FakeClientError> {
        Ok(FakeClient(ModelVariant::CodeChat))
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    #[tokio::test]
    async fn test_streaming() {
        let client = FakeFactory.load_pretrained("chat-bison").unwrap();
        let mut session = client.start_chat(SessionParams::default()).unwrap();
        let mut stream = session
            .send_message_streaming("Good morning")
            .await
            .unwrap();

        let mut resp_message = String::new();
        let mut count = 0;
        loop {
            let resp_fut =
                poll_fn(|cx| Pin::new(&mut stream).poll_next_response(cx));
            match resp_fut.await {
                Ok(Some(resp)) => {
                    resp_message.push_str(&resp.text);
                    count += 1;
                }
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(resp_message, "You said Good morning");
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_send_message() {
        let client = FakeFactory.load_pretrained("chat-bison").unwrap();
        let mut session = client.start_chat(SessionParams::default()).unwrap();
        let resp = session.send_message("Hi").await.unwrap();
        assert_eq!(resp.text, "You said Hi");
    }

    #[test]
    fn test_code_model_rejects_context() {
        let client = FakeFactory.load_pretrained("codechat-bison").unwrap();
        assert_eq!(client.variant(), ModelVariant::CodeChat);

        let params = SessionParams {
            context: Some("You are terse".to_owned()),
            ..Default::default()
        };
        let err = client.start_chat(params).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
