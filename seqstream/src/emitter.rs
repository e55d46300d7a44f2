//! Record framing: header injection and sequence payloads.

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use log::trace;

use crate::alphabet::{AlphabetKind, AlphabetValidator};
use crate::error::UnexpectedCharacterError;

/// Value returned by a header generator.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// Plain header text.
    Text(String),
    /// Structured header, serialized as JSON.
    Structured(serde_json::Value),
}

impl Display for HeaderValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Text(text) => write!(f, "{}", text),
            HeaderValue::Structured(value) => write!(f, "{}", value),
        }
    }
}

impl From<String> for HeaderValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for HeaderValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for HeaderValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

type HeaderGenerator = Arc<dyn Fn(u64) -> HeaderValue + Send + Sync>;

/// Header written in front of every extracted record.
#[derive(Clone, Default)]
pub enum Header {
    /// Records are separated by a bare newline.
    #[default]
    None,
    /// The same text is used for every record.
    Text(String),
    /// The header is generated from the number of headers emitted so far.
    Generator(HeaderGenerator),
}

impl Header {
    /// Creates a generator header from the closure.
    #[must_use]
    pub fn generator<F>(generator: F) -> Self
    where
        F: Fn(u64) -> HeaderValue + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(generator))
    }

    /// Creates a header from a template. Every `{}` in the template is
    /// replaced by the header counter; a template without `{}` is used
    /// verbatim.
    ///
    /// # Examples
    /// ```
    /// use seqstream::emitter::Header;
    ///
    /// let header = Header::from_template("seq_{}");
    /// assert_eq!(header.render(3).unwrap(), "seq_3");
    /// ```
    #[must_use]
    pub fn from_template(template: &str) -> Self {
        if template.contains("{}") {
            let template = template.to_owned();
            Self::generator(move |counter| template.replace("{}", &counter.to_string()).into())
        } else {
            Self::Text(template.to_owned())
        }
    }

    /// Returns the header text for the given counter value, or `None` if
    /// no header is configured.
    #[must_use]
    pub fn render(&self, counter: u64) -> Option<String> {
        match self {
            Header::None => None,
            Header::Text(text) => Some(text.clone()),
            Header::Generator(generator) => Some(generator(counter).to_string()),
        }
    }
}

impl Debug for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Header::None => write!(f, "None"),
            Header::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Header::Generator(_) => write!(f, "Generator(..)"),
        }
    }
}

/// A single piece of output, before being encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Emitted {
    Header(String),
    Sequence(String),
    Diagnostic(UnexpectedCharacterError),
}

/// Frames the extracted sequence text into output records.
#[derive(Debug)]
pub(crate) struct RecordEmitter {
    header: Header,
    validator: AlphabetValidator,
    headers_emitted: u64,
    outputs: Vec<Emitted>,
}

impl RecordEmitter {
    #[must_use]
    pub fn new(header: Header, validator: AlphabetValidator) -> Self {
        Self {
            header,
            validator,
            headers_emitted: 0,
            outputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn alphabet(&self) -> AlphabetKind {
        self.validator.kind()
    }

    #[must_use]
    pub fn headers_emitted(&self) -> u64 {
        self.headers_emitted
    }

    pub fn emit_header(&mut self) {
        let framed = match self.header.render(self.headers_emitted) {
            Some(text) => format!("\n>{}", text),
            None => "\n".to_owned(),
        };
        self.headers_emitted += 1;

        trace!("Emitting header #{}", self.headers_emitted);
        self.outputs.push(Emitted::Header(framed));
    }

    /// Upper-cases and sanitizes the text, then emits it. Text that is empty
    /// after sanitizing produces no output.
    pub fn emit_sequence(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let sanitized = self.validator.sanitize(text.to_uppercase());
        if let Some(diagnostic) = sanitized.diagnostic {
            self.outputs.push(Emitted::Diagnostic(diagnostic));
        }
        if !sanitized.text.is_empty() {
            self.outputs.push(Emitted::Sequence(sanitized.text));
        }
    }

    #[must_use]
    pub fn take_outputs(&mut self) -> Vec<Emitted> {
        std::mem::take(&mut self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use crate::alphabet::{AlphabetChars, AlphabetKind, AlphabetValidator};
    use crate::emitter::{Emitted, Header, HeaderValue, RecordEmitter};

    fn emitter(header: Header, kind: AlphabetKind) -> RecordEmitter {
        let validator =
            AlphabetValidator::new(kind, &AlphabetChars::default(), false, false, true);
        RecordEmitter::new(header, validator)
    }

    #[test]
    fn test_no_header() {
        let mut emitter = emitter(Header::None, AlphabetKind::Dna);
        emitter.emit_header();
        emitter.emit_sequence("acgt");

        assert_eq!(
            emitter.take_outputs(),
            vec![
                Emitted::Header("\n".to_owned()),
                Emitted::Sequence("ACGT".to_owned())
            ]
        );
        assert!(emitter.take_outputs().is_empty());
    }

    #[test]
    fn test_text_header() {
        let mut emitter = emitter(Header::Text("seq".to_owned()), AlphabetKind::Dna);
        emitter.emit_header();
        emitter.emit_header();

        assert_eq!(
            emitter.take_outputs(),
            vec![
                Emitted::Header("\n>seq".to_owned()),
                Emitted::Header("\n>seq".to_owned())
            ]
        );
        assert_eq!(emitter.headers_emitted(), 2);
    }

    #[test]
    fn test_generator_counter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let header = Header::generator(move |counter| {
            seen_clone.lock().unwrap().push(counter);
            HeaderValue::from(format!("record {}", counter))
        });

        let mut emitter = emitter(header, AlphabetKind::Auto);
        for _ in 0..4 {
            emitter.emit_header();
        }

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(
            emitter.take_outputs().last(),
            Some(&Emitted::Header("\n>record 3".to_owned()))
        );
    }

    #[test]
    fn test_structured_header() {
        let header = Header::generator(|counter| json!({ "id": counter }).into());

        let mut emitter = emitter(header, AlphabetKind::Auto);
        emitter.emit_header();

        assert_eq!(
            emitter.take_outputs(),
            vec![Emitted::Header("\n>{\"id\":0}".to_owned())]
        );
    }

    #[test]
    fn test_from_template() {
        assert_eq!(Header::from_template("x_{}").render(5).unwrap(), "x_5");
        assert_eq!(Header::from_template("plain").render(5).unwrap(), "plain");
        assert!(Header::None.render(0).is_none());
        assert_eq!(format!("{:?}", Header::from_template("{}")), "Generator(..)");
    }

    #[test]
    fn test_diagnostic_before_sequence() {
        let mut emitter = emitter(Header::None, AlphabetKind::Dna);
        emitter.emit_sequence("acxgt");
        emitter.emit_sequence("");

        let outputs = emitter.take_outputs();
        assert_eq!(outputs.len(), 2);
        assert!(matches!(&outputs[0], Emitted::Diagnostic(e) if e.characters() == "X"));
        assert_eq!(outputs[1], Emitted::Sequence("ACXGT".to_owned()));
    }
}
