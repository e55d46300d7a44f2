use log::{debug, trace};
use memchr::memmem;

use crate::alphabet::AlphabetKind;
use crate::detect::GENBANK_START;
use crate::error::{SequenceStreamError, SequenceStreamResult};
use crate::format::{strip_sequence, Step, StepContext};
use crate::scan::line_starts;

const ORIGIN_MARKER: &[u8] = b"ORIGIN";
const TRANSLATION_MARKER: &[u8] = b"/translation=\"";
const TRANSLATION_END: u8 = b'"';
const RECORD_END: &[u8] = b"//";

#[derive(Clone, Debug, Default)]
pub(crate) struct GenbankState {
    found_section_start: bool,
    found_origin: bool,
    found_translation: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Marker {
    Origin,
    Translation,
    RecordEnd,
}

pub(crate) fn step(state: &mut GenbankState, ctx: &mut StepContext) -> SequenceStreamResult<Step> {
    if !state.found_section_start {
        let keyword_len = GENBANK_START.len().min(ctx.buffer.len());
        ctx.buffer.consume(keyword_len);
        state.found_section_start = true;
        return Ok(Step::Advanced);
    }

    if state.found_origin {
        Ok(read_origin(state, ctx))
    } else if state.found_translation {
        Ok(read_translation(state, ctx))
    } else {
        find_section(state, ctx)
    }
}

fn find_marker(text: &str, at_line_start: bool, alphabet: AlphabetKind) -> Option<(usize, Marker)> {
    let bytes = text.as_bytes();

    let line_marker = line_starts(text, at_line_start).find_map(|start| {
        let line = &bytes[start..];
        if line.starts_with(ORIGIN_MARKER) {
            Some((start, Marker::Origin))
        } else if line.starts_with(RECORD_END) {
            Some((start, Marker::RecordEnd))
        } else {
            None
        }
    });

    let translation = if alphabet.accepts_translations() {
        memmem::find(bytes, TRANSLATION_MARKER).map(|pos| (pos, Marker::Translation))
    } else {
        None
    };

    match (line_marker, translation) {
        (Some(line_marker), Some(translation)) if translation.0 < line_marker.0 => {
            Some(translation)
        }
        (Some(line_marker), _) => Some(line_marker),
        (None, translation) => translation,
    }
}

fn find_section(state: &mut GenbankState, ctx: &mut StepContext) -> SequenceStreamResult<Step> {
    let text = ctx.buffer.peek();
    let bytes = text.as_bytes();

    match find_marker(text, ctx.buffer.at_line_start(), ctx.alphabet) {
        Some((_, Marker::Origin)) if ctx.alphabet == AlphabetKind::AminoAcid => {
            Err(SequenceStreamError::UnsupportedTranslationInOriginContext)
        }
        Some((pos, Marker::Origin)) => {
            // the rest of the ORIGIN line is not part of the sequence
            let line_end = match memchr::memchr(b'\n', &bytes[pos..]) {
                Some(end) => pos + end + 1,
                None if ctx.eof => bytes.len(),
                None => {
                    ctx.buffer.consume(pos);
                    return Ok(Step::progressed(pos));
                }
            };

            trace!("GenBank origin section found");
            ctx.buffer.consume(line_end);
            ctx.emitter.emit_header();
            state.found_origin = true;
            Ok(Step::Advanced)
        }
        Some((pos, Marker::Translation)) => {
            trace!("GenBank translation found");
            ctx.buffer.consume(pos + TRANSLATION_MARKER.len());
            ctx.emitter.emit_header();
            state.found_translation = true;
            Ok(Step::Advanced)
        }
        Some((pos, Marker::RecordEnd)) => {
            debug!("GenBank record finished");
            ctx.buffer.consume(pos + RECORD_END.len());
            Ok(Step::Finished)
        }
        None if ctx.eof => {
            ctx.buffer.consume_all();
            Ok(Step::Finished)
        }
        None => {
            // the last line may still turn out to contain a marker
            let keep_from = memchr::memrchr(b'\n', bytes).map_or(0, |pos| pos + 1);
            ctx.buffer.consume(keep_from);
            Ok(Step::progressed(keep_from))
        }
    }
}

fn read_origin(state: &mut GenbankState, ctx: &mut StepContext) -> Step {
    let text = ctx.buffer.peek();
    let bytes = text.as_bytes();

    match memmem::find(bytes, RECORD_END) {
        Some(end) => {
            let sequence = strip_sequence(&text[..end], true);
            ctx.buffer.consume(end + RECORD_END.len());
            ctx.emitter.emit_sequence(&sequence);
            state.found_origin = false;

            debug!("GenBank record finished");
            Step::Finished
        }
        None if ctx.eof => {
            let sequence = strip_sequence(text, true);
            ctx.buffer.consume_all();
            ctx.emitter.emit_sequence(&sequence);
            Step::Finished
        }
        None => {
            // a trailing `/` may be the first half of the terminator
            let end = match bytes.last() {
                Some(b'/') => bytes.len() - 1,
                _ => bytes.len(),
            };
            let sequence = strip_sequence(&text[..end], true);
            ctx.buffer.consume(end);
            ctx.emitter.emit_sequence(&sequence);
            Step::progressed(end)
        }
    }
}

fn read_translation(state: &mut GenbankState, ctx: &mut StepContext) -> Step {
    let text = ctx.buffer.peek();

    match memchr::memchr(TRANSLATION_END, text.as_bytes()) {
        Some(end) => {
            let sequence = strip_sequence(&text[..end], true);
            ctx.buffer.consume(end + 1);
            ctx.emitter.emit_sequence(&sequence);
            state.found_translation = false;
            Step::Advanced
        }
        None => {
            let sequence = strip_sequence(text, true);
            let len = text.len();
            ctx.buffer.consume_all();
            ctx.emitter.emit_sequence(&sequence);
            if ctx.eof {
                Step::Finished
            } else {
                Step::progressed(len)
            }
        }
    }
}
