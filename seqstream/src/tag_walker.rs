//! Pull adapter over the `quick-xml` tokenizer for SBOL documents.
//!
//! The walker tokenizes the markup available in the buffer and reports,
//! for every event, the buffer offset up to which the text may be dropped.
//! The element path (`rdf:RDF` → `sbol:Sequence` → `sbol:elements`) is
//! tracked in a [`TagCursor`] that outlives a single walk, so that parsing
//! can resume at the next chunk.

use log::{debug, trace, warn};
use quick_xml::errors::SyntaxError;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::scan::{find_delimited, TokenMatch};

/// Start token of an SBOL document, lowercase.
pub(crate) const SBOL_ROOT_TOKEN: &[u8] = b"<rdf:rdf";

const ROOT_ELEMENT: &str = "rdf:rdf";
const RECORD_ELEMENT: &str = "sbol:sequence";
const CONTENT_ELEMENT: &str = "sbol:elements";

/// Finds the start tag of an SBOL root element. The token must be followed
/// by whitespace, `>` or `/`, so that `<rdf:RDFx>` does not match.
pub(crate) fn find_root_token(text: &[u8]) -> TokenMatch {
    find_delimited(text, SBOL_ROOT_TOKEN, |byte| {
        byte.is_ascii_whitespace() || byte == b'>' || byte == b'/'
    })
}

/// Position of the walker in the element path.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum TagDepth {
    #[default]
    Outside,
    Root,
    Record,
    Content,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TagCursor {
    depth: TagDepth,
}

impl TagCursor {
    #[must_use]
    pub fn depth(&self) -> TagDepth {
        self.depth
    }

    fn open(&mut self, name: &str) -> Opened {
        let (depth, opened) = match (self.depth, name) {
            (TagDepth::Outside, ROOT_ELEMENT) => (TagDepth::Root, Opened::Other),
            (TagDepth::Outside, _) => (TagDepth::Outside, Opened::NotRoot),
            (TagDepth::Root, RECORD_ELEMENT) => (TagDepth::Record, Opened::Other),
            (TagDepth::Record, CONTENT_ELEMENT) => (TagDepth::Content, Opened::Content),
            (depth, _) => (depth, Opened::Other),
        };
        self.depth = depth;
        opened
    }

    /// Returns `true` if the root element was closed.
    fn close(&mut self, name: &str) -> bool {
        let (depth, ended) = match (self.depth, name) {
            (TagDepth::Content, CONTENT_ELEMENT) => (TagDepth::Record, false),
            (TagDepth::Record, RECORD_ELEMENT) => (TagDepth::Root, false),
            (TagDepth::Root, ROOT_ELEMENT) => (TagDepth::Outside, true),
            (depth, _) => (depth, false),
        };
        self.depth = depth;
        ended
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Opened {
    /// The document does not start with the root element.
    NotRoot,
    Content,
    Other,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum TagEvent {
    /// An `sbol:elements` element was opened.
    ContentStart,
    /// Character data inside `sbol:elements`.
    Text(String),
    /// The root element was closed, or the document does not start with
    /// it.
    End,
    /// Any other markup or character data.
    Markup,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TaggedEvent {
    pub event: TagEvent,
    /// Offset in the walked text up to which everything was processed.
    pub consumed: usize,
}

/// Iterator over the events of the markup currently available.
pub(crate) struct TagWalker<'a, 'c> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    base: usize,
    stream_offset: usize,
    eof: bool,
    cursor: &'c mut TagCursor,
    pending_close: Option<String>,
    done: bool,
}

impl<'a, 'c> TagWalker<'a, 'c> {
    /// Creates a walker over `text`. Unless `eof` is set, only the markup up
    /// to the last `>` is tokenized, as anything after it may be incomplete.
    #[must_use]
    pub fn new(text: &'a str, eof: bool, stream_offset: usize, cursor: &'c mut TagCursor) -> Self {
        let input = if eof {
            text
        } else {
            match memchr::memrchr(b'>', text.as_bytes()) {
                Some(pos) => &text[..=pos],
                None => "",
            }
        };

        Self {
            input,
            reader: Self::reader(input),
            base: 0,
            stream_offset,
            eof,
            cursor,
            pending_close: None,
            done: false,
        }
    }

    fn reader(input: &'a str) -> Reader<&'a [u8]> {
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        reader
    }

    fn offset(&self) -> usize {
        self.base + self.reader.buffer_position() as usize
    }

    fn event(&mut self, event: TagEvent) -> Option<TaggedEvent> {
        if event == TagEvent::End {
            self.done = true;
        }

        Some(TaggedEvent {
            event,
            consumed: self.offset(),
        })
    }

    fn open(&mut self, name: &str) -> Option<TaggedEvent> {
        match self.cursor.open(name) {
            Opened::NotRoot => {
                debug!("Element <{}> is not an SBOL document root", name);
                self.event(TagEvent::End)
            }
            Opened::Content => self.event(TagEvent::ContentStart),
            Opened::Other => self.event(TagEvent::Markup),
        }
    }

    fn close(&mut self, name: &str) -> Option<TaggedEvent> {
        if self.cursor.close(name) {
            self.event(TagEvent::End)
        } else {
            self.event(TagEvent::Markup)
        }
    }

    fn text(&mut self, start: usize, content: String) -> Option<TaggedEvent> {
        if !self.eof && self.offset() == self.input.len() {
            // a `>` in character data; the text may continue in the next chunk
            self.done = true;
            return Some(TaggedEvent {
                event: TagEvent::Markup,
                consumed: start,
            });
        }

        if self.cursor.depth() == TagDepth::Content {
            self.event(TagEvent::Text(content))
        } else {
            self.event(TagEvent::Markup)
        }
    }

    /// Skips to the next `<` following the malformed markup.
    fn recover(&mut self, error: &quick_xml::Error, start: usize) -> Option<TaggedEvent> {
        let error_pos = self.base + self.reader.error_position() as usize;
        warn!(
            "Ignoring malformed SBOL markup at offset {}: {}",
            self.stream_offset + error_pos,
            error
        );

        let search_from = (error_pos.max(start) + 1).min(self.input.len());
        let next = memchr::memchr(b'<', &self.input.as_bytes()[search_from..])
            .map_or(self.input.len(), |pos| search_from + pos);

        self.base = next;
        self.reader = Self::reader(&self.input[next..]);
        Some(TaggedEvent {
            event: TagEvent::Markup,
            consumed: next,
        })
    }
}

fn element_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_lowercase()
}

impl<'a, 'c> Iterator for TagWalker<'a, 'c> {
    type Item = TaggedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_close.take() {
            return self.close(&name);
        }
        if self.done {
            return None;
        }

        let start = self.offset();
        match self.reader.read_event() {
            Ok(Event::Eof) => {
                self.done = true;
                None
            }
            Ok(Event::Start(tag)) => {
                let name = element_name(tag.name().as_ref());
                trace!("Opening SBOL element <{}>", name);
                self.open(&name)
            }
            Ok(Event::Empty(tag)) => {
                let name = element_name(tag.name().as_ref());
                let event = self.open(&name);
                if !self.done {
                    self.pending_close = Some(name);
                }
                event
            }
            Ok(Event::End(tag)) => {
                let name = element_name(tag.name().as_ref());
                self.close(&name)
            }
            Ok(Event::Text(text)) => {
                let content = match text.unescape() {
                    Ok(content) => content.into_owned(),
                    Err(_) => String::from_utf8_lossy(&text).into_owned(),
                };
                self.text(start, content)
            }
            Ok(Event::CData(data)) => {
                let content = String::from_utf8_lossy(&data).into_owned();
                self.text(start, content)
            }
            Ok(_) => self.event(TagEvent::Markup),
            Err(quick_xml::Error::Syntax(SyntaxError::InvalidBangMarkup)) => {
                let error = quick_xml::Error::Syntax(SyntaxError::InvalidBangMarkup);
                self.recover(&error, start)
            }
            Err(quick_xml::Error::Syntax(_)) if !self.eof => {
                // unclosed markup; wait for the rest of it
                self.done = true;
                None
            }
            Err(error) => self.recover(&error, start),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scan::TokenMatch;
    use crate::tag_walker::{find_root_token, TagCursor, TagDepth, TagEvent, TagWalker};

    fn texts(text: &str, eof: bool, cursor: &mut TagCursor) -> (Vec<TagEvent>, usize) {
        let mut consumed = 0;
        let events = TagWalker::new(text, eof, 0, cursor)
            .map(|event| {
                consumed = event.consumed;
                event.event
            })
            .filter(|event| !matches!(event, TagEvent::Markup | TagEvent::ContentStart))
            .collect();
        (events, consumed)
    }

    #[test]
    fn test_walk_document() {
        let text = "<rdf:RDF><sbol:Sequence><sbol:elements>acgt</sbol:elements>\
                    </sbol:Sequence></rdf:RDF>trailing";
        let mut cursor = TagCursor::default();
        let (events, consumed) = texts(text, true, &mut cursor);

        assert_eq!(
            events,
            vec![TagEvent::Text("acgt".to_owned()), TagEvent::End]
        );
        assert_eq!(&text[consumed..], "trailing");
        assert_eq!(cursor.depth(), TagDepth::Outside);
    }

    #[test]
    fn test_text_outside_content_ignored() {
        let text = "<rdf:RDF><sbol:Sequence><sbol:displayId>x</sbol:displayId>";
        let mut cursor = TagCursor::default();
        let (events, consumed) = texts(text, false, &mut cursor);

        assert!(events.is_empty());
        assert_eq!(consumed, text.len());
        assert_eq!(cursor.depth(), TagDepth::Record);
    }

    #[test]
    fn test_incomplete_input_held_back() {
        let text = "<rdf:RDF><sbol:Sequence><sbol:elements>ac";
        let mut cursor = TagCursor::default();
        let (events, consumed) = texts(text, false, &mut cursor);

        assert!(events.is_empty());
        assert_eq!(&text[consumed..], "ac");
        assert_eq!(cursor.depth(), TagDepth::Content);

        let (events, consumed) = texts("acgt</sbol:elements", false, &mut cursor);
        assert!(events.is_empty());
        assert_eq!(consumed, 0);

        let (events, _) = texts("acgt</sbol:elements>", false, &mut cursor);
        assert_eq!(events, vec![TagEvent::Text("acgt".to_owned())]);
        assert_eq!(cursor.depth(), TagDepth::Record);
    }

    #[test]
    fn test_text_with_gt_held_back() {
        let mut cursor = TagCursor::default();
        let (_, consumed) = texts("<rdf:RDF><sbol:Sequence><sbol:elements>", false, &mut cursor);
        assert_eq!(consumed, 39);

        let (events, consumed) = texts("ac>gt", false, &mut cursor);
        assert!(events.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_names_case_insensitive() {
        let text = "<RDF:rdf><SBOL:sequence><SBOL:Elements>gg</SBOL:Elements>";
        let mut cursor = TagCursor::default();
        let (events, _) = texts(text, false, &mut cursor);
        assert_eq!(events, vec![TagEvent::Text("gg".to_owned())]);
    }

    #[test]
    fn test_empty_root_ends() {
        let mut cursor = TagCursor::default();
        let (events, consumed) = texts("<rdf:RDF/>", false, &mut cursor);
        assert_eq!(events, vec![TagEvent::End]);
        assert_eq!(consumed, 10);
    }

    #[test]
    fn test_other_root_ends() {
        let text = "<rdf:RDFx>junk</rdf:RDFx><rdf:RDF>";
        let mut cursor = TagCursor::default();
        let (events, consumed) = texts(text, false, &mut cursor);
        assert_eq!(events, vec![TagEvent::End]);
        assert_eq!(consumed, 10);
        assert_eq!(cursor.depth(), TagDepth::Outside);
    }

    #[test]
    fn test_content_start_reported() {
        let text = "<rdf:RDF><sbol:Sequence><sbol:elements>a<!-- x -->c</sbol:elements>";
        let mut cursor = TagCursor::default();
        let events: Vec<_> = TagWalker::new(text, false, 0, &mut cursor)
            .map(|event| event.event)
            .filter(|event| *event != TagEvent::Markup)
            .collect();

        assert_eq!(
            events,
            vec![
                TagEvent::ContentStart,
                TagEvent::Text("a".to_owned()),
                TagEvent::Text("c".to_owned()),
            ]
        );
    }

    #[test]
    fn test_find_root_token() {
        assert_eq!(find_root_token(b"x<RDF:RDF "), TokenMatch::Complete(1));
        assert_eq!(find_root_token(b"<rdf:RDF/>"), TokenMatch::Complete(0));
        assert_eq!(find_root_token(b"<rdf:RDFx><rdf:RDF>"), TokenMatch::Complete(10));
        assert_eq!(find_root_token(b"<rdf:RDFx"), TokenMatch::Absent);
        assert_eq!(find_root_token(b"ac<rdf:RDF"), TokenMatch::Partial(2));
        assert_eq!(find_root_token(b"ac<rd"), TokenMatch::Partial(2));
    }

    #[test]
    fn test_malformed_markup_skipped() {
        let text = "<rdf:RDF><sbol:Sequence><!bogus><sbol:elements>tt</sbol:elements>";
        let mut cursor = TagCursor::default();
        let (events, _) = texts(text, false, &mut cursor);
        assert_eq!(events, vec![TagEvent::Text("tt".to_owned())]);
    }
}
