//! Detection and dispatch loop.

use log::{debug, trace};

use crate::buffer::TextBuffer;
use crate::detect::{dispatch, DetectionInput, Dispatch, SequenceFormat};
use crate::emitter::{Emitted, RecordEmitter};
use crate::error::{SequenceStreamError, SequenceStreamResult};
use crate::format::{fasta, genbank, sbol, ParserMode, Step, StepContext};

/// Number of consecutive loop iterations without consuming any input after
/// which the loop yields.
const MAX_IDLE_STEPS: usize = 2;

/// Format-detecting parser fed with decoded text.
#[derive(Debug)]
pub(crate) struct SequenceParser {
    buffer: TextBuffer,
    mode: ParserMode,
    emitter: RecordEmitter,
    max_buffer: usize,
    saw_fasta_header: bool,
    ever_activated: bool,
}

impl SequenceParser {
    #[must_use]
    pub fn new(emitter: RecordEmitter, max_buffer: usize) -> Self {
        Self {
            buffer: TextBuffer::new(),
            mode: ParserMode::Undetermined,
            emitter,
            max_buffer,
            saw_fasta_header: false,
            ever_activated: false,
        }
    }

    pub fn push(&mut self, text: &str) -> SequenceStreamResult<()> {
        self.buffer.append(text);
        self.run(false)
    }

    /// Processes the rest of the buffer as if no more input will arrive.
    pub fn finish(&mut self) -> SequenceStreamResult<()> {
        self.run(true)?;

        if !self.buffer.is_empty() {
            trace!("Dropping {} trailing bytes", self.buffer.len());
            self.buffer.consume_all();
        }
        self.mode = ParserMode::Undetermined;
        Ok(())
    }

    #[must_use]
    pub fn take_outputs(&mut self) -> Vec<Emitted> {
        self.emitter.take_outputs()
    }

    #[must_use]
    pub fn records(&self) -> u64 {
        self.emitter.headers_emitted()
    }

    #[must_use]
    pub fn format(&self) -> Option<SequenceFormat> {
        self.mode.format()
    }

    fn run(&mut self, eof: bool) -> SequenceStreamResult<()> {
        let mut idle_steps = 0;

        loop {
            let offset_before = self.buffer.stream_offset();
            let step = if let ParserMode::Undetermined = self.mode {
                self.detect_format(eof)?
            } else {
                self.step_active(eof)?
            };

            match step {
                Step::Stalled => return Ok(()),
                Step::Finished => self.mode = ParserMode::Undetermined,
                Step::Advanced => {}
            }

            if self.buffer.stream_offset() == offset_before {
                idle_steps += 1;
                if idle_steps > MAX_IDLE_STEPS {
                    return Ok(());
                }
            } else {
                idle_steps = 0;
            }
        }
    }

    fn detect_format(&mut self, eof: bool) -> SequenceStreamResult<Step> {
        let input = DetectionInput::new(
            self.buffer.peek(),
            self.buffer.at_line_start(),
            self.saw_fasta_header,
            eof,
        );

        match dispatch(&input) {
            Dispatch::Activate { format, offset } => {
                self.check_ceiling(offset)?;
                debug!(
                    "Detected {} at offset {}",
                    format,
                    self.buffer.stream_offset() + offset
                );

                self.buffer.consume(offset);
                self.mode = ParserMode::activate(format);
                self.ever_activated = true;
                if format == SequenceFormat::Fasta {
                    self.saw_fasta_header = true;
                }
                Ok(Step::Advanced)
            }
            Dispatch::Wait { offset } => {
                self.check_ceiling(offset)?;
                self.buffer.consume(offset);
                Ok(Step::Stalled)
            }
            Dispatch::Discard => {
                self.check_ceiling(self.buffer.len())?;
                self.buffer.consume_all();
                Ok(Step::Stalled)
            }
        }
    }

    fn step_active(&mut self, eof: bool) -> SequenceStreamResult<Step> {
        let alphabet = self.emitter.alphabet();
        let mut ctx = StepContext {
            buffer: &mut self.buffer,
            emitter: &mut self.emitter,
            alphabet,
            eof,
        };

        match &mut self.mode {
            ParserMode::Undetermined => Ok(Step::Stalled),
            ParserMode::Fasta(state) => Ok(fasta::step(state, &mut ctx)),
            ParserMode::Genbank(state) => genbank::step(state, &mut ctx),
            ParserMode::Sbol(state) => Ok(sbol::step(state, &mut ctx)),
        }
    }

    /// Fails if no format was ever found and the candidate position is past
    /// the configured limit.
    fn check_ceiling(&self, offset: usize) -> SequenceStreamResult<()> {
        if !self.ever_activated && self.buffer.stream_offset() + offset > self.max_buffer {
            return Err(SequenceStreamError::NoFormatDetected(self.max_buffer));
        }

        Ok(())
    }
}
