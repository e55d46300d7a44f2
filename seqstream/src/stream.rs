use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::time::Instant;

use encoding_rs::{CoderResult, Decoder, Encoder, Encoding};
use log::{debug, info};

use crate::alphabet::AlphabetKind;
use crate::emitter::{Emitted, RecordEmitter};
use crate::error::{SequenceStreamError, SequenceStreamResult, UnexpectedCharacterError};
use crate::params::SequenceStreamParams;
use crate::parser::SequenceParser;
use crate::progress::{format_stats, ByteNum, ProgressNotifier};

/// Default number of bytes read at once by [`SequenceStreamReader`].
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A single piece of stream output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutput {
    /// Record separator, encoded in the output encoding.
    Header(Vec<u8>),
    /// Sequence text, encoded in the output encoding.
    Sequence(Vec<u8>),
    /// Non-fatal report of characters outside of the expected alphabet.
    Diagnostic(UnexpectedCharacterError),
}

impl StreamOutput {
    /// Returns the encoded bytes, or `None` for a diagnostic.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            StreamOutput::Header(data) | StreamOutput::Sequence(data) => Some(data),
            StreamOutput::Diagnostic(_) => None,
        }
    }
}

fn encoding_for_label(label: &str) -> SequenceStreamResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SequenceStreamError::UnknownEncoding(label.to_owned()))
}

/// Streaming, format-detecting sequence parser.
///
/// Bytes are pushed in chunks of any size; the output does not depend on
/// how the input was split.
///
/// # Examples
/// ```
/// use seqstream::alphabet::AlphabetKind;
/// use seqstream::stream::SequenceStream;
///
/// let mut stream = SequenceStream::with_alphabet(AlphabetKind::Dna);
/// let mut data = Vec::new();
/// for chunk in [&b">seq1\nAC"[..], &b"GT\n\n>seq2\nTTTT"[..]] {
///     for output in stream.push(chunk).unwrap() {
///         data.extend_from_slice(output.data().unwrap_or_default());
///     }
/// }
/// for output in stream.finish().unwrap() {
///     data.extend_from_slice(output.data().unwrap_or_default());
/// }
///
/// assert_eq!(data, b"\nACGT\nTTTT");
/// ```
pub struct SequenceStream {
    parser: SequenceParser,
    decoder: Decoder,
    encoder: Encoder,
    progress_notifier: Arc<dyn ProgressNotifier>,
    bytes_processed: ByteNum,
    start_time: Instant,
    closed: bool,
}

impl SequenceStream {
    /// Creates a new `SequenceStream`.
    ///
    /// # Errors
    /// Returns [`SequenceStreamError::UnknownEncoding`] if either of the
    /// configured encodings is not recognized.
    pub fn new(params: SequenceStreamParams) -> SequenceStreamResult<Self> {
        let input_encoding = encoding_for_label(params.input_encoding())?;
        let output_encoding = encoding_for_label(params.output_encoding())?;

        Ok(Self::with_encodings(params, input_encoding, output_encoding))
    }

    /// Creates a UTF-8 stream expecting the given alphabet, with all the
    /// other params at their defaults.
    #[must_use]
    pub fn with_alphabet(alphabet: AlphabetKind) -> Self {
        let params = SequenceStreamParams::builder().alphabet(alphabet).build();
        Self::with_encodings(params, encoding_rs::UTF_8, encoding_rs::UTF_8)
    }

    fn with_encodings(
        params: SequenceStreamParams,
        input_encoding: &'static Encoding,
        output_encoding: &'static Encoding,
    ) -> Self {
        debug!(
            "Creating sequence stream: alphabet {}, input {}, output {}",
            params.alphabet(),
            input_encoding.name(),
            output_encoding.output_encoding().name()
        );

        let emitter = RecordEmitter::new(params.header.clone(), params.validator());
        Self {
            parser: SequenceParser::new(emitter, params.max_buffer()),
            decoder: input_encoding.new_decoder_with_bom_removal(),
            encoder: output_encoding.new_encoder(),
            progress_notifier: params.progress_notifier,
            bytes_processed: ByteNum::ZERO,
            start_time: Instant::now(),
            closed: false,
        }
    }

    /// Decodes and parses a chunk of input, returning the outputs produced.
    ///
    /// # Errors
    /// Returns an error if the input turned out to be unparseable; the
    /// stream is closed afterwards. Outputs produced by the failing chunk
    /// before the failure can still be retrieved with
    /// [`take_outputs`](Self::take_outputs).
    pub fn push(&mut self, data: &[u8]) -> SequenceStreamResult<Vec<StreamOutput>> {
        self.ensure_open()?;

        let text = self.decode(data, false);
        self.bytes_processed += ByteNum::new(data.len());
        self.feed(&text)
    }

    /// Parses a chunk of already decoded text, bypassing the input decoder.
    pub fn push_str(&mut self, text: &str) -> SequenceStreamResult<Vec<StreamOutput>> {
        self.ensure_open()?;

        self.bytes_processed += ByteNum::new(text.len());
        self.feed(text)
    }

    /// Flushes the decoder and processes the rest of the buffered input.
    /// The stream is closed afterwards.
    pub fn finish(&mut self) -> SequenceStreamResult<Vec<StreamOutput>> {
        self.ensure_open()?;

        let text = self.decode(&[], true);
        let result = self.parser.push(&text).and_then(|_| self.parser.finish());
        self.closed = true;
        result?;

        let mut outputs = self.take_outputs();
        let tail = self.encode("", true);
        if !tail.is_empty() {
            outputs.push(StreamOutput::Sequence(tail));
        }

        info!(
            "Extracted {} records from {}",
            self.parser.records(),
            format_stats(self.start_time, self.bytes_processed)
        );
        Ok(outputs)
    }

    /// Returns the outputs produced but not returned yet.
    #[must_use]
    pub fn take_outputs(&mut self) -> Vec<StreamOutput> {
        let outputs = self.parser.take_outputs();
        let mut encoded = Vec::with_capacity(outputs.len());
        for output in outputs {
            encoded.push(match output {
                Emitted::Header(text) => StreamOutput::Header(self.encode(&text, false)),
                Emitted::Sequence(text) => StreamOutput::Sequence(self.encode(&text, false)),
                Emitted::Diagnostic(error) => StreamOutput::Diagnostic(error),
            });
        }
        encoded
    }

    /// Number of record headers emitted so far.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.parser.records()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> SequenceStreamResult<()> {
        if self.closed {
            Err(SequenceStreamError::Closed)
        } else {
            Ok(())
        }
    }

    fn feed(&mut self, text: &str) -> SequenceStreamResult<Vec<StreamOutput>> {
        let records_before = self.parser.records();
        if let Err(e) = self.parser.push(text) {
            self.closed = true;
            return Err(e);
        }

        let records = self.parser.records() - records_before;
        if records > 0 {
            self.progress_notifier.records_found(records);
        }
        Ok(self.take_outputs())
    }

    fn decode(&mut self, data: &[u8], last: bool) -> String {
        let mut text = String::new();
        let mut input = data;

        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(input.len())
                .unwrap_or(input.len() * 3 + 16);
            text.reserve(needed);

            let (result, read, _) = self.decoder.decode_to_string(input, &mut text, last);
            input = &input[read..];
            match result {
                CoderResult::InputEmpty => return text,
                CoderResult::OutputFull => {}
            }
        }
    }

    fn encode(&mut self, text: &str, last: bool) -> Vec<u8> {
        let mut data = Vec::new();
        let mut input = text;

        loop {
            let needed = self
                .encoder
                .max_buffer_length_from_utf8_if_no_unmappables(input.len())
                .unwrap_or(input.len() * 4);
            // room for a numeric character reference of an unmappable char
            data.reserve(needed + 16);

            let (result, read, _) = self.encoder.encode_from_utf8_to_vec(input, &mut data, last);
            input = &input[read..];
            match result {
                CoderResult::InputEmpty => return data,
                CoderResult::OutputFull => {}
            }
        }
    }
}

impl Debug for SequenceStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceStream")
            .field("parser", &self.parser)
            .field("input_encoding", &self.decoder.encoding().name())
            .field("output_encoding", &self.encoder.encoding().name())
            .field("bytes_processed", &self.bytes_processed)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Iterator pulling input from a reader through a [`SequenceStream`].
///
/// # Examples
/// ```
/// use seqstream::params::SequenceStreamParams;
/// use seqstream::stream::{SequenceStream, SequenceStreamReader, StreamOutput};
///
/// let input = b"LOCUS x\nORIGIN\n 1 acgt\n//\n";
/// let stream = SequenceStream::new(SequenceStreamParams::default()).unwrap();
/// let outputs: Vec<_> = SequenceStreamReader::new(input.as_slice(), stream)
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(outputs.last(), Some(&StreamOutput::Sequence(b"ACGT".to_vec())));
/// ```
#[derive(Debug)]
pub struct SequenceStreamReader<R> {
    reader: R,
    stream: SequenceStream,
    chunk: Vec<u8>,
    pending: VecDeque<StreamOutput>,
    error: Option<SequenceStreamError>,
    done: bool,
}

impl<R: Read> SequenceStreamReader<R> {
    #[must_use]
    pub fn new(reader: R, stream: SequenceStream) -> Self {
        Self::with_chunk_size(reader, stream, DEFAULT_CHUNK_SIZE)
    }

    #[must_use]
    pub fn with_chunk_size(reader: R, stream: SequenceStream, chunk_size: usize) -> Self {
        Self {
            reader,
            stream,
            chunk: vec![0; chunk_size.max(1)],
            pending: VecDeque::new(),
            error: None,
            done: false,
        }
    }

    #[must_use]
    pub fn stream(&self) -> &SequenceStream {
        &self.stream
    }

    fn read_chunk(&mut self) {
        let result = match self.reader.read(&mut self.chunk) {
            Ok(0) => {
                self.done = true;
                self.stream.finish()
            }
            Ok(len) => {
                self.stream
                    .progress_notifier
                    .processed_bytes(ByteNum::new(len));
                self.stream.push(&self.chunk[..len])
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => return,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(outputs) => self.pending.extend(outputs),
            Err(e) => {
                self.pending.extend(self.stream.take_outputs());
                self.error = Some(e);
                self.done = true;
            }
        }
    }
}

impl<R: Read> Iterator for SequenceStreamReader<R> {
    type Item = SequenceStreamResult<StreamOutput>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(output) = self.pending.pop_front() {
                return Some(Ok(output));
            }
            if let Some(error) = self.error.take() {
                return Some(Err(error));
            }
            if self.done {
                return None;
            }

            self.read_chunk();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::alphabet::AlphabetKind;
    use crate::error::SequenceStreamError;
    use crate::params::SequenceStreamParams;
    use crate::stream::{SequenceStream, StreamOutput};

    #[test]
    fn test_unknown_encoding() {
        let params = SequenceStreamParams::builder()
            .input_encoding("no-such-encoding")
            .build();
        assert!(matches!(
            SequenceStream::new(params),
            Err(SequenceStreamError::UnknownEncoding(label)) if label == "no-such-encoding"
        ));
    }

    #[test]
    fn test_closed_after_finish() {
        let mut stream = SequenceStream::with_alphabet(AlphabetKind::Dna);
        stream.push(b">a\nAC").unwrap();
        stream.finish().unwrap();

        assert!(stream.is_closed());
        assert!(matches!(stream.push(b"x"), Err(SequenceStreamError::Closed)));
        assert!(matches!(stream.finish(), Err(SequenceStreamError::Closed)));
    }

    #[test]
    fn test_push_str() {
        let mut stream = SequenceStream::with_alphabet(AlphabetKind::Rna);
        let mut outputs = stream.push_str(">a\nACGU\n").unwrap();
        outputs.extend(stream.finish().unwrap());

        assert_eq!(
            outputs,
            vec![
                StreamOutput::Header(b"\n".to_vec()),
                StreamOutput::Sequence(b"ACGU".to_vec())
            ]
        );
        assert_eq!(stream.records(), 1);
    }

    #[test]
    fn test_output_data() {
        assert_eq!(StreamOutput::Header(b"\n".to_vec()).data(), Some(&b"\n"[..]));
    }
}
