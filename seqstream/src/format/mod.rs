//! Resumable per-format sub-parsers.

use crate::alphabet::AlphabetKind;
use crate::buffer::TextBuffer;
use crate::detect::SequenceFormat;
use crate::emitter::RecordEmitter;
use crate::format::fasta::FastaState;
use crate::format::genbank::GenbankState;
use crate::format::sbol::SbolState;

pub(crate) mod fasta;
pub(crate) mod genbank;
pub(crate) mod sbol;

/// Sub-parser currently fed by the dispatch loop.
#[derive(Debug, Clone, Default)]
pub(crate) enum ParserMode {
    #[default]
    Undetermined,
    Fasta(FastaState),
    Genbank(GenbankState),
    Sbol(SbolState),
}

impl ParserMode {
    #[must_use]
    pub fn activate(format: SequenceFormat) -> Self {
        match format {
            SequenceFormat::Fasta => ParserMode::Fasta(FastaState::default()),
            SequenceFormat::Genbank => ParserMode::Genbank(GenbankState::default()),
            SequenceFormat::Sbol => ParserMode::Sbol(SbolState::default()),
        }
    }

    #[must_use]
    pub fn format(&self) -> Option<SequenceFormat> {
        match self {
            ParserMode::Undetermined => None,
            ParserMode::Fasta(_) => Some(SequenceFormat::Fasta),
            ParserMode::Genbank(_) => Some(SequenceFormat::Genbank),
            ParserMode::Sbol(_) => Some(SequenceFormat::Sbol),
        }
    }
}

/// Outcome of a single sub-parser step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    /// Some of the buffer was consumed; the sub-parser may continue.
    Advanced,
    /// The record ended; detection should run again.
    Finished,
    /// Nothing can be done until more input arrives.
    Stalled,
}

impl Step {
    #[must_use]
    pub(crate) fn progressed(consumed: usize) -> Self {
        if consumed > 0 {
            Step::Advanced
        } else {
            Step::Stalled
        }
    }
}

pub(crate) struct StepContext<'a> {
    pub buffer: &'a mut TextBuffer,
    pub emitter: &'a mut RecordEmitter,
    pub alphabet: AlphabetKind,
    pub eof: bool,
}

/// Removes whitespace, and additionally digits if `strip_digits` is set.
#[must_use]
pub(crate) fn strip_sequence(text: &str, strip_digits: bool) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace() && !(strip_digits && ch.is_ascii_digit()))
        .collect()
}
