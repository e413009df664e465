//! Two concrete output modes for rendered bytes, plus the HTML-escape wrap.

use std::io;

/// An abstract byte sink the renderer writes to. `write_all` may block on
/// I/O for a streaming sink, or allocate for a buffered one.
pub trait Sink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.write_all(text.as_bytes())
    }
}

/// Streams rendered bytes directly to an `io::Write` implementation.
pub struct WriterSink<'w, W: io::Write> {
    writer: &'w mut W,
}

impl<'w, W: io::Write> WriterSink<'w, W> {
    pub fn new(writer: &'w mut W) -> Self {
        WriterSink { writer }
    }
}

impl<'w, W: io::Write> Sink for WriterSink<'w, W> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }
}

/// Collects rendered bytes into an owned, growable buffer.
#[derive(Default)]
pub struct BufferSink {
    buffer: Vec<u8>,
}

impl BufferSink {
    pub fn new() -> Self {
        BufferSink { buffer: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl Sink for BufferSink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }
}

/// HTML-escapes every byte written through it before forwarding to the
/// wrapped sink: `& " < >` become entities; everything else, including
/// non-ASCII bytes, passes through verbatim.
pub struct EscapingSink<'s> {
    inner: &'s mut dyn Sink,
}

impl<'s> EscapingSink<'s> {
    pub fn new(inner: &'s mut dyn Sink) -> Self {
        EscapingSink { inner }
    }
}

impl<'s> Sink for EscapingSink<'s> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        // Emit the longest unescaped run we can in one write, flushing only
        // when an entity substitution is due.
        let mut start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            let entity: &[u8] = match byte {
                b'&' => b"&amp;",
                b'"' => b"&quot;",
                b'<' => b"&lt;",
                b'>' => b"&gt;",
                _ => continue,
            };
            if start < i {
                self.inner.write_all(&bytes[start..i])?;
            }
            self.inner.write_all(entity)?;
            start = i + 1;
        }
        if start < bytes.len() {
            self.inner.write_all(&bytes[start..])?;
        }
        Ok(())
    }
}
