use log::{debug, trace};

use crate::detect::GENBANK_START;
use crate::format::{strip_sequence, Step, StepContext};
use crate::scan::{indent_len, TokenMatch};
use crate::tag_walker::find_root_token;

/// Where the body cursor sits relative to the current line.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum LinePosition {
    #[default]
    Start,
    Sequence,
    Comment,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FastaState {
    got_header: bool,
    line: LinePosition,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum LineKind {
    Blank,
    Header,
    SectionStart,
    Comment,
    Sequence,
    Undecided,
}

impl LineKind {
    fn ends_record(self) -> bool {
        matches!(self, LineKind::Blank | LineKind::Header | LineKind::SectionStart)
    }
}

/// Classifies a line (without its trailing newline). `complete` is set if
/// the line can not grow anymore.
fn classify_line(line: &[u8], complete: bool) -> LineKind {
    match line.first() {
        Some(b'>') => return LineKind::Header,
        Some(b';') => return LineKind::Comment,
        _ => {}
    }

    let content = line.strip_suffix(b"\r").unwrap_or(line);
    if content.is_empty() {
        return if complete {
            LineKind::Blank
        } else {
            LineKind::Undecided
        };
    }

    let keyword = &line[indent_len(line)..];
    if keyword.starts_with(GENBANK_START) {
        LineKind::SectionStart
    } else if !complete && GENBANK_START.starts_with(keyword) {
        LineKind::Undecided
    } else {
        LineKind::Sequence
    }
}

pub(crate) fn step(state: &mut FastaState, ctx: &mut StepContext) -> Step {
    if state.got_header {
        read_body(state, ctx)
    } else {
        read_header(state, ctx)
    }
}

fn read_header(state: &mut FastaState, ctx: &mut StepContext) -> Step {
    let text = ctx.buffer.peek();
    let header_end = match memchr::memchr(b'\n', text.as_bytes()) {
        Some(pos) => pos + 1,
        None if ctx.eof => text.len(),
        None => return Step::Stalled,
    };

    trace!("Skipping FASTA header line: {}", text[..header_end].trim_end());
    ctx.buffer.consume(header_end);
    ctx.emitter.emit_header();
    state.got_header = true;
    state.line = LinePosition::Start;

    Step::Advanced
}

fn read_body(state: &mut FastaState, ctx: &mut StepContext) -> Step {
    let text = ctx.buffer.peek();
    let bytes = text.as_bytes();

    // the body can not extend past the start of an SBOL document
    let (limit, hard_end) = match find_root_token(bytes) {
        TokenMatch::Complete(pos) => (pos, true),
        TokenMatch::Partial(pos) if !ctx.eof => (pos, false),
        TokenMatch::Partial(_) | TokenMatch::Absent => (bytes.len(), ctx.eof),
    };

    let mut pos = 0;
    let mut sequence = String::new();
    let mut finished = false;
    while pos < limit {
        let rest = &bytes[pos..limit];
        let newline = memchr::memchr(b'\n', rest);

        if state.line == LinePosition::Start {
            let line = newline.map_or(rest, |end| &rest[..end]);
            let kind = classify_line(line, newline.is_some() || hard_end);
            if kind.ends_record() {
                finished = true;
                break;
            }
            state.line = match kind {
                LineKind::Comment => LinePosition::Comment,
                LineKind::Sequence => LinePosition::Sequence,
                _ => break,
            };
        }

        let end = match newline {
            Some(end) => pos + end + 1,
            None => limit,
        };

        if state.line == LinePosition::Sequence {
            sequence.push_str(&text[pos..end]);
        }
        if newline.is_some() {
            state.line = LinePosition::Start;
        }
        pos = end;
    }

    if hard_end && pos == limit {
        finished = true;
    }

    ctx.buffer.consume(pos);
    ctx.emitter.emit_sequence(&strip_sequence(&sequence, false));

    if finished {
        debug!("FASTA record finished");
        Step::Finished
    } else {
        Step::progressed(pos)
    }
}
