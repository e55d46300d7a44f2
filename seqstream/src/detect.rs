//! Format detection.
//!
//! Each detector is a pure check over the currently buffered text. A
//! detector either finds its start token, reports the earliest offset at
//! which the token could still appear once more input arrives, or rules its
//! format out for the whole buffer.

use std::fmt::{Display, Formatter};

use crate::scan::{indent_len, line_starts, TokenMatch};
use crate::tag_walker::find_root_token;

pub(crate) const GENBANK_START: &[u8] = b"LOCUS";

/// Sequence formats recognized in the input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SequenceFormat {
    /// `>`-delimited records.
    Fasta,
    /// `LOCUS`-started keyword sections.
    Genbank,
    /// RDF/XML sequence documents.
    Sbol,
}

impl SequenceFormat {
    /// Formats in order of their tie-breaking priority.
    pub const DETECTION_ORDER: [SequenceFormat; 3] = [
        SequenceFormat::Fasta,
        SequenceFormat::Genbank,
        SequenceFormat::Sbol,
    ];

    /// Priority of the format when two formats start at the same offset;
    /// lower wins.
    #[must_use]
    pub const fn priority(&self) -> usize {
        match self {
            SequenceFormat::Fasta => 0,
            SequenceFormat::Genbank => 1,
            SequenceFormat::Sbol => 2,
        }
    }

    /// Probes `input` for the start of this format.
    ///
    /// # Examples
    /// ```
    /// use seqstream::detect::{Detection, DetectionInput, SequenceFormat};
    ///
    /// let input = DetectionInput::new("junk\nLOCUS  X\n", true, false, false);
    /// assert_eq!(SequenceFormat::Genbank.detect(&input), Detection::Found(5));
    /// assert_eq!(SequenceFormat::Fasta.detect(&input), Detection::Pending(14));
    /// assert_eq!(SequenceFormat::Sbol.detect(&input), Detection::Absent);
    /// ```
    #[must_use]
    pub fn detect(&self, input: &DetectionInput) -> Detection {
        match self {
            SequenceFormat::Fasta => detect_fasta(input),
            SequenceFormat::Genbank => detect_genbank(input),
            SequenceFormat::Sbol => detect_sbol(input),
        }
    }
}

impl Display for SequenceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceFormat::Fasta => write!(f, "FASTA"),
            SequenceFormat::Genbank => write!(f, "GenBank"),
            SequenceFormat::Sbol => write!(f, "SBOL"),
        }
    }
}

/// Outcome of probing the buffer for a single format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Detection {
    /// The format starts at the given offset.
    Found(usize),
    /// The format can not be ruled out from the given offset on until more
    /// input arrives.
    Pending(usize),
    /// The format does not start anywhere in the buffer.
    Absent,
}

/// Buffered text together with the stream state the detectors depend on.
#[derive(Copy, Clone, Debug)]
pub struct DetectionInput<'a> {
    text: &'a str,
    at_line_start: bool,
    saw_fasta_header: bool,
    eof: bool,
}

impl<'a> DetectionInput<'a> {
    /// Creates a new `DetectionInput`.
    ///
    /// `at_line_start` tells whether `text` begins a line,
    /// `saw_fasta_header` whether a FASTA record was already seen in the
    /// stream, and `eof` whether no more input will follow.
    #[must_use]
    pub fn new(text: &'a str, at_line_start: bool, saw_fasta_header: bool, eof: bool) -> Self {
        Self {
            text,
            at_line_start,
            saw_fasta_header,
            eof,
        }
    }
}

fn detect_fasta(input: &DetectionInput) -> Detection {
    let bytes = input.text.as_bytes();

    for start in line_starts(input.text, input.at_line_start) {
        match bytes.get(start) {
            None if input.eof => return Detection::Absent,
            None => return Detection::Pending(start),
            Some(b'>') => return Detection::Found(start),
            Some(b';') if !input.saw_fasta_header => return Detection::Found(start),
            Some(_) => {}
        }
    }

    Detection::Absent
}

fn detect_genbank(input: &DetectionInput) -> Detection {
    let bytes = input.text.as_bytes();

    for start in line_starts(input.text, input.at_line_start) {
        let rest = &bytes[start..];
        let (line, complete) = match memchr::memchr(b'\n', rest) {
            Some(end) => (&rest[..end], true),
            None => (rest, false),
        };

        let indent = indent_len(line);
        let keyword = &line[indent..];
        if keyword.starts_with(GENBANK_START) {
            return Detection::Found(start + indent);
        }
        if !complete && !input.eof && GENBANK_START.starts_with(keyword) {
            return Detection::Pending(start);
        }
    }

    Detection::Absent
}

fn detect_sbol(input: &DetectionInput) -> Detection {
    match find_root_token(input.text.as_bytes()) {
        TokenMatch::Complete(offset) => Detection::Found(offset),
        TokenMatch::Partial(offset) if !input.eof => Detection::Pending(offset),
        TokenMatch::Partial(_) | TokenMatch::Absent => Detection::Absent,
    }
}

/// Decision taken by the dispatch loop after probing all the formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Dispatch {
    /// Start parsing `format`, discarding everything before `offset`.
    Activate {
        format: SequenceFormat,
        offset: usize,
    },
    /// Discard everything before `offset` and wait for more input.
    Wait { offset: usize },
    /// No format can start in the buffer; discard all of it.
    Discard,
}

/// Runs all the detectors and picks the format to activate.
#[must_use]
pub(crate) fn dispatch(input: &DetectionInput) -> Dispatch {
    let mut found: Option<(usize, SequenceFormat)> = None;
    let mut pending: Option<(usize, SequenceFormat)> = None;

    for format in SequenceFormat::DETECTION_ORDER {
        let (slot, offset) = match format.detect(input) {
            Detection::Found(offset) => (&mut found, offset),
            Detection::Pending(offset) => (&mut pending, offset),
            Detection::Absent => continue,
        };

        let is_better = match slot {
            Some((best, best_format)) => {
                (offset, format.priority()) < (*best, best_format.priority())
            }
            None => true,
        };
        if is_better {
            *slot = Some((offset, format));
        }
    }

    match (found, pending) {
        (Some((offset, format)), Some((pending_offset, pending_format)))
            if (pending_offset, pending_format.priority()) < (offset, format.priority()) =>
        {
            Dispatch::Wait {
                offset: pending_offset,
            }
        }
        (Some((offset, format)), _) => Dispatch::Activate { format, offset },
        (None, Some((offset, _))) => Dispatch::Wait { offset },
        (None, None) => Dispatch::Discard,
    }
}

#[cfg(test)]
mod tests {
    use crate::detect::{dispatch, Detection, DetectionInput, Dispatch, SequenceFormat};

    fn input(text: &str) -> DetectionInput<'_> {
        DetectionInput::new(text, true, false, false)
    }

    fn eof_input(text: &str) -> DetectionInput<'_> {
        DetectionInput::new(text, true, false, true)
    }

    #[test]
    fn test_fasta_found() {
        let fasta = SequenceFormat::Fasta;
        assert_eq!(fasta.detect(&input(">seq\nACGT")), Detection::Found(0));
        assert_eq!(fasta.detect(&input("x\n>seq\n")), Detection::Found(2));
        assert_eq!(fasta.detect(&input(";comment\n")), Detection::Found(0));
        assert_eq!(fasta.detect(&eof_input(">seq")), Detection::Found(0));
    }

    #[test]
    fn test_fasta_semicolon_only_first() {
        let text = ";comment\n";
        let after_header = DetectionInput::new(text, true, true, false);
        assert_eq!(
            SequenceFormat::Fasta.detect(&after_header),
            Detection::Pending(9)
        );
    }

    #[test]
    fn test_fasta_pending_and_absent() {
        let fasta = SequenceFormat::Fasta;
        assert_eq!(fasta.detect(&input("")), Detection::Pending(0));
        assert_eq!(fasta.detect(&input("abc\n")), Detection::Pending(4));
        assert_eq!(fasta.detect(&input("abc")), Detection::Absent);
        assert_eq!(fasta.detect(&eof_input("abc\n")), Detection::Absent);

        let mid_line = DetectionInput::new(">not a header", false, false, false);
        assert_eq!(fasta.detect(&mid_line), Detection::Absent);
    }

    #[test]
    fn test_genbank() {
        let genbank = SequenceFormat::Genbank;
        assert_eq!(genbank.detect(&input("LOCUS x\n")), Detection::Found(0));
        assert_eq!(genbank.detect(&input("a\n \tLOCUS")), Detection::Found(4));
        assert_eq!(genbank.detect(&input("a\n LOC")), Detection::Pending(2));
        assert_eq!(genbank.detect(&input("a\n")), Detection::Pending(2));
        assert_eq!(genbank.detect(&eof_input("a\n LOC")), Detection::Absent);
        assert_eq!(genbank.detect(&input("a LOCUS")), Detection::Absent);
        assert_eq!(genbank.detect(&eof_input("LOCX\n")), Detection::Absent);
        // the empty line after the newline may still become a keyword line
        assert_eq!(genbank.detect(&input("LOCX\n")), Detection::Pending(5));
    }

    #[test]
    fn test_sbol() {
        let sbol = SequenceFormat::Sbol;
        assert_eq!(
            sbol.detect(&input("<?xml?><RDF:RDF x>")),
            Detection::Found(7)
        );
        assert_eq!(sbol.detect(&input("abc<rdf:r")), Detection::Pending(3));
        assert_eq!(sbol.detect(&eof_input("abc<rdf:r")), Detection::Absent);
        assert_eq!(sbol.detect(&input("abc")), Detection::Absent);
    }

    #[test]
    fn test_sbol_requires_delimiter() {
        let sbol = SequenceFormat::Sbol;
        assert_eq!(sbol.detect(&input("<rdf:RDFx>")), Detection::Absent);
        assert_eq!(sbol.detect(&input("<rdf:RDFx><rdf:RDF\n")), Detection::Found(10));
        assert_eq!(sbol.detect(&input("<rdf:RDF/>")), Detection::Found(0));
        assert_eq!(sbol.detect(&input("ac<rdf:RDF")), Detection::Pending(2));
        assert_eq!(sbol.detect(&eof_input("ac<rdf:RDF")), Detection::Absent);
    }

    #[test]
    fn test_display() {
        assert_eq!(SequenceFormat::Fasta.to_string(), "FASTA");
        assert_eq!(SequenceFormat::Genbank.to_string(), "GenBank");
        assert_eq!(SequenceFormat::Sbol.to_string(), "SBOL");
    }

    #[test]
    fn test_dispatch_earliest_wins() {
        let text = "abcd <rdf:RDF>\n>seq\n";
        assert_eq!(
            dispatch(&input(text)),
            Dispatch::Activate {
                format: SequenceFormat::Sbol,
                offset: 5
            }
        );
    }

    #[test]
    fn test_dispatch_priority() {
        let priorities: Vec<_> = SequenceFormat::DETECTION_ORDER
            .iter()
            .map(SequenceFormat::priority)
            .collect();
        assert_eq!(priorities, vec![0, 1, 2]);

        assert_eq!(
            dispatch(&input(">x<rdf:rdf>\n")),
            Dispatch::Activate {
                format: SequenceFormat::Fasta,
                offset: 0
            }
        );
    }

    #[test]
    fn test_dispatch_waits_for_earlier_pending() {
        // the partial `LOC` line could still become GenBank before the SBOL
        // token, but here the SBOL token comes first
        assert_eq!(
            dispatch(&input("<rdf:RDF>\nLOC")),
            Dispatch::Activate {
                format: SequenceFormat::Sbol,
                offset: 0
            }
        );
        assert_eq!(
            dispatch(&input("junk\nLO")),
            Dispatch::Wait { offset: 5 }
        );
        assert_eq!(dispatch(&input("junk")), Dispatch::Discard);
        assert_eq!(dispatch(&eof_input("junk\nLO")), Dispatch::Discard);
    }
}
