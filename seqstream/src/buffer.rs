/// Decoded text waiting to be parsed. Grows at the back as input arrives and
/// shrinks from the front as the parsers consume it.
#[derive(Debug, Clone)]
pub(crate) struct TextBuffer {
    text: String,
    at_line_start: bool,
    consumed: usize,
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(4096),
            at_line_start: true,
            consumed: 0,
        }
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    #[inline]
    #[must_use]
    pub fn peek(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the first character of the buffer begins a new line.
    #[inline]
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Stream offset of the first character of the buffer.
    #[inline]
    #[must_use]
    pub fn stream_offset(&self) -> usize {
        self.consumed
    }

    /// Removes `len` bytes from the front of the buffer.
    ///
    /// # Panics
    /// Panics if `len` is out of bounds or not on a character boundary.
    pub fn consume(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        self.at_line_start = self.text.as_bytes()[len - 1] == b'\n';
        self.text.drain(..len);
        self.consumed += len;
    }

    pub fn consume_all(&mut self) {
        self.consume(self.text.len());
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
