use super::{Chunks, ChunksError};

#[derive(Debug)]
pub enum Error {
    Chunks(ChunksError),
    InvalidUtf8,
}

/// A type for reading the `data` of server-sent events from a chunk
/// stream.
///
/// Line endings are normalized to line feeds. Comment lines and fields
/// other than `data` are skipped, multiple `data` lines of one event are
/// joined with a line feed. Events without data are skipped.
pub struct Sse {
    buf: String,
    // Bytes of an incomplete UTF-8 sequence split across chunks.
    pending: Vec<u8>,
    chunks: Chunks,
    exhausted: bool,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: String::new(),
            pending: Vec::new(),
            chunks,
            exhausted: false,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(data) = self.try_parse_event() {
                return Ok(Some(data));
            }
            if self.exhausted {
                // A trailing event may come without the final blank line.
                let rest = std::mem::take(&mut self.buf);
                return Ok(parse_data(&rest));
            }

            match self.chunks.next_chunk().await.map_err(Error::Chunks)? {
                Some(bytes) => self.push_bytes(&bytes)?,
                None => {
                    if !self.pending.is_empty() {
                        return Err(Error::InvalidUtf8);
                    }
                    self.exhausted = true;
                }
            }
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.pending.extend_from_slice(bytes);
        let valid_len = match str::from_utf8(&self.pending) {
            Ok(s) => s.len(),
            // The tail may be the start of a multi-byte character.
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => return Err(Error::InvalidUtf8),
        };
        let rest = self.pending.split_off(valid_len);
        let valid = std::mem::replace(&mut self.pending, rest);
        let s = String::from_utf8(valid).map_err(|_| Error::InvalidUtf8)?;
        self.buf.push_str(&s);
        // A CR LF pair may be split across chunks, normalize the whole
        // buffer.
        if self.buf.contains("\r\n") {
            self.buf = self.buf.replace("\r\n", "\n");
        }
        Ok(())
    }

    fn try_parse_event(&mut self) -> Option<String> {
        // Skip events that carry no data.
        while let Some(eol_idx) = self.buf.find("\n\n") {
            let block: String = self.buf.drain(0..eol_idx + 2).collect();
            if let Some(data) = parse_data(&block) {
                return Some(data);
            }
        }
        None
    }
}

fn parse_data(block: &str) -> Option<String> {
    let mut data: Option<String> = None;
    for line in block.lines() {
        let Some(value) = line.strip_prefix("data:") else {
            // Comments and other fields are not needed.
            continue;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);
        match &mut data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn sse_from(chunks: &[&'static [u8]]) -> Sse {
        Sse::new(Chunks::from_vec_deque(
            chunks.iter().copied().map(Bytes::from_static).collect(),
        ))
    }

    #[tokio::test]
    async fn test_normal_events() {
        let mut sse = sse_from(&[b"data: hello\n\n", b"data: bye\r\n\r\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        let mut sse = sse_from(&[b"data:", b" hello\r", b"\n\r", b"\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_utf8() {
        let text = "data: caf\u{e9}\n\n".as_bytes();
        let (head, tail) = text.split_at(text.len() - 3);
        let mut sse = Sse::new(Chunks::from_vec_deque(
            vec![Bytes::copy_from_slice(head), Bytes::copy_from_slice(tail)]
                .into(),
        ));
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "caf\u{e9}");
    }

    #[tokio::test]
    async fn test_skipped_lines() {
        let mut sse = sse_from(&[
            b": keep-alive\n\n",
            b"event: message\nid: 1\ndata: a\ndata: b\n\n",
            b"data: tail",
        ]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "a\nb");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "tail");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let mut sse = sse_from(&[b"data: \xff\xfe\n\n"]);
        assert!(matches!(
            sse.next_event().await.unwrap_err(),
            Error::InvalidUtf8
        ));

        let mut sse = sse_from(&[b"xxxxxx\n"]);
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
