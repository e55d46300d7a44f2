use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alphabet::{AlphabetChars, AlphabetKind, AlphabetValidator};
use crate::emitter::{Header, HeaderValue};
use crate::error::SequenceStreamResult;
use crate::progress::{DummyProgressNotifier, ProgressNotifier};

/// Default number of bytes after which the stream fails when no format
/// could be detected.
pub const DEFAULT_MAX_BUFFER: usize = 50_000;
/// Default input text encoding.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Sequence stream params.
#[derive(Debug, Clone)]
pub struct SequenceStreamParams {
    pub(crate) alphabet: AlphabetKind,
    pub(crate) convert_to_expected: bool,
    pub(crate) strip_unexpected: bool,
    pub(crate) error_on_unexpected: bool,
    pub(crate) header: Header,
    pub(crate) input_encoding: String,
    pub(crate) output_encoding: Option<String>,
    pub(crate) chars: AlphabetChars,
    pub(crate) max_buffer: usize,
    pub(crate) progress_notifier: Arc<dyn ProgressNotifier>,
}

impl SequenceStreamParams {
    /// Returns new builder for `SequenceStreamParams`.
    #[must_use]
    pub fn builder() -> SequenceStreamParamsBuilder {
        SequenceStreamParamsBuilder::new()
    }

    #[must_use]
    pub fn alphabet(&self) -> AlphabetKind {
        self.alphabet
    }

    #[must_use]
    pub fn input_encoding(&self) -> &str {
        &self.input_encoding
    }

    /// Output encoding label; same as the input encoding unless set
    /// explicitly.
    #[must_use]
    pub fn output_encoding(&self) -> &str {
        self.output_encoding
            .as_deref()
            .unwrap_or(&self.input_encoding)
    }

    #[must_use]
    pub fn max_buffer(&self) -> usize {
        self.max_buffer
    }

    #[must_use]
    pub(crate) fn validator(&self) -> AlphabetValidator {
        AlphabetValidator::new(
            self.alphabet,
            &self.chars,
            self.convert_to_expected,
            self.strip_unexpected,
            self.error_on_unexpected,
        )
    }
}

impl Default for SequenceStreamParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A builder for `SequenceStreamParams`.
#[derive(Debug, Clone)]
pub struct SequenceStreamParamsBuilder {
    alphabet: AlphabetKind,
    convert_to_expected: bool,
    strip_unexpected: bool,
    error_on_unexpected: bool,
    header: Header,
    input_encoding: String,
    output_encoding: Option<String>,
    chars: AlphabetChars,
    max_buffer: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl SequenceStreamParamsBuilder {
    /// Returns a new instance of `SequenceStreamParamsBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alphabet: AlphabetKind::default(),
            convert_to_expected: false,
            strip_unexpected: false,
            error_on_unexpected: true,
            header: Header::None,
            input_encoding: DEFAULT_ENCODING.to_owned(),
            output_encoding: None,
            chars: AlphabetChars::default(),
            max_buffer: DEFAULT_MAX_BUFFER,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Sets the kind of sequences expected in the input.
    pub fn alphabet(&mut self, alphabet: AlphabetKind) -> &mut Self {
        let mut new = self;
        new.alphabet = alphabet;
        new
    }

    /// Converts `U` to `T` for DNA, and `T` to `U` for RNA.
    pub fn convert_to_expected(&mut self, convert_to_expected: bool) -> &mut Self {
        let mut new = self;
        new.convert_to_expected = convert_to_expected;
        new
    }

    /// Removes the characters that are not allowed by the alphabet.
    pub fn strip_unexpected(&mut self, strip_unexpected: bool) -> &mut Self {
        let mut new = self;
        new.strip_unexpected = strip_unexpected;
        new
    }

    /// Reports the first run of characters not allowed by the alphabet.
    pub fn error_on_unexpected(&mut self, error_on_unexpected: bool) -> &mut Self {
        let mut new = self;
        new.error_on_unexpected = error_on_unexpected;
        new
    }

    pub fn header(&mut self, header: Header) -> &mut Self {
        let mut new = self;
        new.header = header;
        new
    }

    pub fn header_text<S: Into<String>>(&mut self, text: S) -> &mut Self {
        self.header(Header::Text(text.into()))
    }

    pub fn header_generator<F>(&mut self, generator: F) -> &mut Self
    where
        F: Fn(u64) -> HeaderValue + Send + Sync + 'static,
    {
        self.header(Header::generator(generator))
    }

    /// Sets the input encoding label, as understood by the WHATWG Encoding
    /// Standard (e.g. `utf-8`, `latin1`, `shift_jis`).
    pub fn input_encoding<S: Into<String>>(&mut self, input_encoding: S) -> &mut Self {
        let mut new = self;
        new.input_encoding = input_encoding.into();
        new
    }

    pub fn output_encoding<S: Into<String>>(&mut self, output_encoding: S) -> &mut Self {
        let mut new = self;
        new.output_encoding = Some(output_encoding.into());
        new
    }

    pub fn dna_chars<S: Into<String>>(&mut self, dna_chars: S) -> &mut Self {
        let mut new = self;
        new.chars.dna = dna_chars.into();
        new
    }

    pub fn rna_chars<S: Into<String>>(&mut self, rna_chars: S) -> &mut Self {
        let mut new = self;
        new.chars.rna = rna_chars.into();
        new
    }

    pub fn amino_acid_chars<S: Into<String>>(&mut self, amino_acid_chars: S) -> &mut Self {
        let mut new = self;
        new.chars.amino_acid = amino_acid_chars.into();
        new
    }

    /// Sets the number of bytes after which the stream fails if no format
    /// has been detected yet.
    pub fn max_buffer(&mut self, max_buffer: usize) -> &mut Self {
        let mut new = self;
        new.max_buffer = max_buffer;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    /// Builds and returns [`SequenceStreamParams`].
    pub fn build(&mut self) -> SequenceStreamParams {
        SequenceStreamParams {
            alphabet: self.alphabet,
            convert_to_expected: self.convert_to_expected,
            strip_unexpected: self.strip_unexpected,
            error_on_unexpected: self.error_on_unexpected,
            header: self.header.clone(),
            input_encoding: self.input_encoding.clone(),
            output_encoding: self.output_encoding.clone(),
            chars: self.chars.clone(),
            max_buffer: self.max_buffer,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for SequenceStreamParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable stream configuration, e.g. loaded from a JSON file.
///
/// Field names are camel-cased; `type`, `aaChars` and
/// `maxBufferBeforeGivingUp` are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SequenceStreamConfig {
    #[serde(alias = "type")]
    pub alphabet: AlphabetKind,
    pub convert_to_expected: bool,
    pub strip_unexpected: bool,
    pub error_on_unexpected: bool,
    /// Header template; `{}` is replaced by the header counter.
    pub header: Option<String>,
    pub input_encoding: String,
    pub output_encoding: Option<String>,
    pub dna_chars: String,
    pub rna_chars: String,
    #[serde(alias = "aaChars")]
    pub amino_acid_chars: String,
    #[serde(alias = "maxBufferBeforeGivingUp")]
    pub max_buffer: usize,
}

impl SequenceStreamConfig {
    /// Reads the configuration from JSON.
    ///
    /// # Examples
    /// ```
    /// use seqstream::alphabet::AlphabetKind;
    /// use seqstream::params::SequenceStreamConfig;
    ///
    /// let json = r#"{"alphabet": "rna", "convertToExpected": true}"#;
    /// let config = SequenceStreamConfig::from_reader(json.as_bytes()).unwrap();
    /// assert_eq!(config.alphabet, AlphabetKind::Rna);
    /// assert!(config.convert_to_expected);
    /// assert!(config.error_on_unexpected);
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> SequenceStreamResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Returns a params builder initialized from this configuration.
    #[must_use]
    pub fn to_builder(&self) -> SequenceStreamParamsBuilder {
        let mut builder = SequenceStreamParamsBuilder::new();
        builder
            .alphabet(self.alphabet)
            .convert_to_expected(self.convert_to_expected)
            .strip_unexpected(self.strip_unexpected)
            .error_on_unexpected(self.error_on_unexpected)
            .input_encoding(self.input_encoding.clone())
            .dna_chars(self.dna_chars.clone())
            .rna_chars(self.rna_chars.clone())
            .amino_acid_chars(self.amino_acid_chars.clone())
            .max_buffer(self.max_buffer);
        if let Some(header) = &self.header {
            builder.header(Header::from_template(header));
        }
        if let Some(output_encoding) = &self.output_encoding {
            builder.output_encoding(output_encoding.clone());
        }

        builder
    }
}

impl Default for SequenceStreamConfig {
    fn default() -> Self {
        let chars = AlphabetChars::default();
        Self {
            alphabet: AlphabetKind::default(),
            convert_to_expected: false,
            strip_unexpected: false,
            error_on_unexpected: true,
            header: None,
            input_encoding: DEFAULT_ENCODING.to_owned(),
            output_encoding: None,
            dna_chars: chars.dna,
            rna_chars: chars.rna,
            amino_acid_chars: chars.amino_acid,
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}
