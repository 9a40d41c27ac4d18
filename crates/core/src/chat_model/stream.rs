use std::fmt::{self, Debug};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::Stream;
use pin_project_lite::pin_project;
use vertex_chat_model::ResponseStream;

use super::TokenObserver;
use crate::error::Error;
use crate::message::ChatGenerationChunk;
use crate::stop_words::enforce_stop_words;

pin_project! {
    /// A streamed answer, yielding one [`ChatGenerationChunk`] per partial
    /// response of the model.
    ///
    /// Chunks are pulled from the model only when this stream is polled,
    /// nothing is buffered. The stream is finished after the model ends
    /// the response or after the first error.
    pub struct ChatStream<S> {
        #[pin]
        inner: S,
        stop: Vec<String>,
        on_new_token: Option<TokenObserver>,
        finished: bool,
    }
}

impl<S: ResponseStream> ChatStream<S> {
    #[inline]
    pub(crate) fn new(
        inner: S,
        stop: Vec<String>,
        on_new_token: Option<TokenObserver>,
    ) -> Self {
        Self {
            inner,
            stop,
            on_new_token,
            finished: false,
        }
    }
}

impl<S: ResponseStream> Stream for ChatStream<S> {
    type Item = Result<ChatGenerationChunk, Error>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next_response(cx)) {
            Ok(Some(response)) => {
                trace!("got a partial response: {:?}", response.text);
                let text =
                    enforce_stop_words(&response.text, this.stop.as_slice());
                if let Some(on_new_token) = this.on_new_token {
                    on_new_token(text);
                }
                Poll::Ready(Some(Ok(ChatGenerationChunk::new(text))))
            }
            Ok(None) => {
                trace!("stream finished");
                *this.finished = true;
                Poll::Ready(None)
            }
            Err(err) => {
                error!("got an error: {err:?}");
                *this.finished = true;
                Poll::Ready(Some(Err(Error::client(err))))
            }
        }
    }
}

impl<S> Debug for ChatStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream")
            .field("stop", &self.stop)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
