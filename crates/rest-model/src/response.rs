use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use vertex_chat_model::{ErrorKind, ResponseStream, TextResponse, TurnMessage};

use crate::Error;
use crate::History;
use crate::io::Sse;
use crate::proto::{self, StreamingPredictResponse};

struct PartialState {
    sse: Sse,
    question: String,
    content: String,
    history: History,
}

impl PartialState {
    /// Records the completed exchange in the session history.
    #[inline]
    fn finish(self) {
        let mut history = self.history.lock();
        history.push(TurnMessage::user(self.question));
        history.push(TurnMessage::bot(self.content));
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextResponse = Result<(Option<TextResponse>, PartialState), Error>;

pin_project! {
    pub struct VertexResponseStream {
        next_response_fut: Option<PinnedFuture<NextResponse>>,
    }
}

impl VertexResponseStream {
    #[inline]
    pub(crate) fn from_sse(sse: Sse, question: String, history: History) -> Self {
        let partial_state = PartialState {
            sse,
            question,
            content: String::new(),
            history,
        };
        let next_response_fut =
            async move { next_response(partial_state).await };
        Self {
            next_response_fut: Some(Box::pin(next_response_fut)),
        }
    }
}

impl ResponseStream for VertexResponseStream {
    type Error = crate::Error;

    fn poll_next_response(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<TextResponse>, Self::Error>> {
        let this = self.project();
        let Some(next_response_fut) = this.next_response_fut else {
            return Poll::Ready(Ok(None));
        };
        let (response, partial_state) =
            match ready!(next_response_fut.as_mut().poll(cx)) {
                Ok((Some(response), partial_state)) => (response, partial_state),
                Ok((None, partial_state)) => {
                    *this.next_response_fut = None;
                    partial_state.finish();
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_response_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next response.
        let next_response_fut =
            async move { next_response(partial_state).await };
        *this.next_response_fut = Some(Box::pin(next_response_fut));

        Poll::Ready(Ok(Some(response)))
    }
}

async fn next_response(mut partial_state: PartialState) -> NextResponse {
    let sse_event = match partial_state.sse.next_event().await {
        Ok(Some(event)) => event,
        Ok(None) => return Ok((None, partial_state)),
        Err(err) => {
            return Err(Error::new(format!("{err:?}"), ErrorKind::Other));
        }
    };
    trace!("got sse event: {sse_event}");

    let chunk = serde_json::from_str::<StreamingPredictResponse>(&sse_event)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    let response = proto::parse_streaming_response(chunk)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    partial_state.content.push_str(&response.text);

    Ok((Some(response), partial_state))
}
