//! Output line discipline
//!
//! Equivalent to `stty onlcr`: every line feed written to the terminal is
//! expanded to CR LF. Content between line feeds is forwarded unchanged as
//! one chunk. Each call is handled on its own; nothing carries over between
//! calls.

use crate::io::CodepointSink;

const CRLF: [char; 2] = ['\r', '\n'];

/// Split `data` into chunks, expanding each LF to CR LF
///
/// Never produces an empty chunk.
pub fn onlcr<F>(data: &[char], mut emit: F)
where
    F: FnMut(&[char]),
{
    let mut prev = 0;
    for (ptr, &c) in data.iter().enumerate() {
        if c == '\n' {
            if ptr > prev {
                emit(&data[prev..ptr]);
            }
            emit(&CRLF);
            prev = ptr + 1;
        }
    }
    if data.len() > prev {
        emit(&data[prev..]);
    }
}

/// Chunks [`onlcr`] produces for `data`
pub fn onlcr_chunks(data: &[char]) -> Vec<Vec<char>> {
    let mut chunks = Vec::new();
    onlcr(data, |chunk| chunks.push(chunk.to_vec()));
    chunks
}

/// Sink adapter applying [`onlcr`] before forwarding
#[derive(Debug)]
pub struct OutputMode<S> {
    sink: S,
}

impl<S: CodepointSink> OutputMode<S> {
    /// Wrap `sink`
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Normalize `data` and forward the chunks to the sink
    pub fn accept(&mut self, data: &[char]) {
        let sink = &mut self.sink;
        onlcr(data, |chunk| sink.accept(chunk));
    }

    /// Wrapped sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Unwrap, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: CodepointSink> CodepointSink for OutputMode<S> {
    fn accept(&mut self, codepoints: &[char]) {
        OutputMode::accept(self, codepoints);
    }
}
