use log::debug;

use crate::format::{strip_sequence, Step, StepContext};
use crate::tag_walker::{TagCursor, TagEvent, TagWalker, TaggedEvent};

#[derive(Clone, Debug, Default)]
pub(crate) struct SbolState {
    cursor: TagCursor,
    /// Set until the current `sbol:elements` element yields any sequence.
    header_pending: bool,
}

pub(crate) fn step(state: &mut SbolState, ctx: &mut StepContext) -> Step {
    let mut consumed = 0;
    let mut ended = false;

    let walker = TagWalker::new(
        ctx.buffer.peek(),
        ctx.eof,
        ctx.buffer.stream_offset(),
        &mut state.cursor,
    );
    for TaggedEvent { event, consumed: offset } in walker {
        consumed = offset;
        match event {
            TagEvent::ContentStart => state.header_pending = true,
            TagEvent::Text(text) => {
                let sequence = strip_sequence(&text, false);
                if sequence.is_empty() {
                    continue;
                }
                if state.header_pending {
                    ctx.emitter.emit_header();
                    state.header_pending = false;
                }
                ctx.emitter.emit_sequence(&sequence);
            }
            TagEvent::End => ended = true,
            TagEvent::Markup => {}
        }
    }

    ctx.buffer.consume(consumed);
    if ended {
        debug!("SBOL document finished");
        Step::Finished
    } else if ctx.eof {
        ctx.buffer.consume_all();
        Step::Finished
    } else {
        Step::progressed(consumed)
    }
}
