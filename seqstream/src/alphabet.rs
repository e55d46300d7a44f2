use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnexpectedCharacterError;

/// Default set of characters allowed in DNA sequences.
pub const DEFAULT_DNA_CHARS: &str = "TGACRYMKSWHBVDN-";
/// Default set of characters allowed in RNA sequences.
pub const DEFAULT_RNA_CHARS: &str = "UGACRYMKSWHBVDN-";
/// Default set of characters allowed in amino acid sequences.
pub const DEFAULT_AMINO_ACID_CHARS: &str = "ABCDEFGHIKLMNPQRSTUVWYZX*-";

/// Kind of sequence expected in the input.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlphabetKind {
    /// Any of DNA, RNA or amino acids.
    #[default]
    Auto,
    /// Deoxyribonucleic acid.
    Dna,
    /// Ribonucleic acid.
    Rna,
    /// Amino acids (protein sequences).
    #[serde(alias = "aa")]
    AminoAcid,
    /// Either DNA or RNA.
    #[serde(alias = "na")]
    NucleicAcid,
}

impl AlphabetKind {
    /// All the alphabet kinds, in the order they are listed to the user.
    pub const VALUES: [AlphabetKind; 5] = [
        AlphabetKind::Auto,
        AlphabetKind::Dna,
        AlphabetKind::Rna,
        AlphabetKind::AminoAcid,
        AlphabetKind::NucleicAcid,
    ];

    /// Returns the canonical name of the kind.
    ///
    /// # Examples
    /// ```
    /// use seqstream::alphabet::AlphabetKind;
    ///
    /// assert_eq!(AlphabetKind::AminoAcid.name(), "amino-acid");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            AlphabetKind::Auto => "auto",
            AlphabetKind::Dna => "dna",
            AlphabetKind::Rna => "rna",
            AlphabetKind::AminoAcid => "amino-acid",
            AlphabetKind::NucleicAcid => "nucleic-acid",
        }
    }

    /// Whether protein translations embedded in GenBank records should be
    /// extracted for this kind.
    #[must_use]
    pub(crate) const fn accepts_translations(&self) -> bool {
        matches!(self, AlphabetKind::AminoAcid | AlphabetKind::Auto)
    }
}

impl Display for AlphabetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when parsing an [`AlphabetKind`] fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAlphabetKindError(String);

impl Display for ParseAlphabetKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid alphabet kind: `{}`", self.0)
    }
}

impl Error for ParseAlphabetKindError {}

impl FromStr for AlphabetKind {
    type Err = ParseAlphabetKindError;

    /// Parses the alphabet kind, ignoring case.
    ///
    /// # Examples
    /// ```
    /// use seqstream::alphabet::AlphabetKind;
    ///
    /// assert_eq!("DNA".parse::<AlphabetKind>(), Ok(AlphabetKind::Dna));
    /// assert_eq!("aa".parse::<AlphabetKind>(), Ok(AlphabetKind::AminoAcid));
    /// assert!("protein".parse::<AlphabetKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(AlphabetKind::Auto),
            "dna" => Ok(AlphabetKind::Dna),
            "rna" => Ok(AlphabetKind::Rna),
            "amino-acid" | "aa" => Ok(AlphabetKind::AminoAcid),
            "nucleic-acid" | "na" => Ok(AlphabetKind::NucleicAcid),
            _ => Err(ParseAlphabetKindError(s.to_owned())),
        }
    }
}

/// Set of literal characters.
#[derive(Debug, Clone)]
pub(crate) struct CharClass {
    ascii: [bool; 128],
    other: Vec<char>,
}

impl CharClass {
    #[must_use]
    pub fn new(chars: &str) -> Self {
        let mut class = Self {
            ascii: [false; 128],
            other: Vec::new(),
        };
        class.extend(chars);
        class
    }

    #[must_use]
    pub fn union(mut self, chars: &str) -> Self {
        self.extend(chars);
        self
    }

    fn extend(&mut self, chars: &str) {
        for ch in chars.chars() {
            if ch.is_ascii() {
                self.ascii[ch as usize] = true;
            } else if !self.other.contains(&ch) {
                self.other.push(ch);
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        if ch.is_ascii() {
            self.ascii[ch as usize]
        } else {
            self.other.contains(&ch)
        }
    }
}

/// Character sets configured for each of the base alphabets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphabetChars {
    pub dna: String,
    pub rna: String,
    pub amino_acid: String,
}

impl Default for AlphabetChars {
    fn default() -> Self {
        Self {
            dna: DEFAULT_DNA_CHARS.to_owned(),
            rna: DEFAULT_RNA_CHARS.to_owned(),
            amino_acid: DEFAULT_AMINO_ACID_CHARS.to_owned(),
        }
    }
}

/// Result of running [`AlphabetValidator::sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sanitized {
    pub text: String,
    pub diagnostic: Option<UnexpectedCharacterError>,
}

/// Converts, validates and strips upper-cased sequence text.
#[derive(Debug, Clone)]
pub(crate) struct AlphabetValidator {
    kind: AlphabetKind,
    convert: bool,
    strip: bool,
    report: bool,
    allowed: CharClass,
    error_raised: bool,
}

impl AlphabetValidator {
    #[must_use]
    pub fn new(
        kind: AlphabetKind,
        chars: &AlphabetChars,
        convert: bool,
        strip: bool,
        report: bool,
    ) -> Self {
        let allowed = match kind {
            AlphabetKind::Dna | AlphabetKind::Rna if convert => {
                CharClass::new(&chars.dna).union(&chars.rna)
            }
            AlphabetKind::Dna => CharClass::new(&chars.dna),
            AlphabetKind::Rna => CharClass::new(&chars.rna),
            AlphabetKind::AminoAcid => CharClass::new(&chars.amino_acid),
            AlphabetKind::NucleicAcid => CharClass::new(&chars.dna).union(&chars.rna),
            AlphabetKind::Auto => CharClass::new(&chars.dna)
                .union(&chars.rna)
                .union(&chars.amino_acid),
        };

        Self {
            kind,
            convert,
            strip,
            report,
            allowed,
            error_raised: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    /// Applies the DNA/RNA conversion, then reports (once per validator) and
    /// optionally removes the characters outside of the allowed set.
    pub fn sanitize(&mut self, text: String) -> Sanitized {
        let text = match (self.convert, self.kind) {
            (true, AlphabetKind::Dna) => text.replace('U', "T"),
            (true, AlphabetKind::Rna) => text.replace('T', "U"),
            _ => text,
        };

        let diagnostic = if self.report && !self.error_raised {
            self.first_unexpected_run(&text).map(|run| {
                self.error_raised = true;
                UnexpectedCharacterError::new(run)
            })
        } else {
            None
        };

        let text = if self.strip {
            text.chars().filter(|&ch| self.allowed.contains(ch)).collect()
        } else {
            text
        };

        Sanitized { text, diagnostic }
    }

    fn first_unexpected_run(&self, text: &str) -> Option<String> {
        let start = text.find(|ch| !self.allowed.contains(ch))?;
        let run = text[start..]
            .chars()
            .take_while(|&ch| !self.allowed.contains(ch))
            .collect();
        Some(run)
    }
}

#[cfg(test)]
mod tests {
    use crate::alphabet::{AlphabetChars, AlphabetKind, AlphabetValidator, CharClass};

    fn validator(kind: AlphabetKind, convert: bool, strip: bool) -> AlphabetValidator {
        AlphabetValidator::new(kind, &AlphabetChars::default(), convert, strip, true)
    }

    #[test]
    fn test_kind_from_str() {
        for kind in AlphabetKind::VALUES {
            assert_eq!(kind.name().parse::<AlphabetKind>(), Ok(kind));
            assert_eq!(kind.to_string().to_uppercase().parse::<AlphabetKind>(), Ok(kind));
        }
        assert_eq!("NA".parse::<AlphabetKind>(), Ok(AlphabetKind::NucleicAcid));
        assert!("".parse::<AlphabetKind>().is_err());
        assert_eq!(AlphabetKind::default(), AlphabetKind::Auto);
    }

    #[test]
    fn test_kind_serde() {
        let kind: AlphabetKind = serde_json::from_str("\"amino-acid\"").unwrap();
        assert_eq!(kind, AlphabetKind::AminoAcid);
        let kind: AlphabetKind = serde_json::from_str("\"na\"").unwrap();
        assert_eq!(kind, AlphabetKind::NucleicAcid);
        assert_eq!(
            serde_json::to_string(&AlphabetKind::NucleicAcid).unwrap(),
            "\"nucleic-acid\""
        );
    }

    #[test]
    fn test_char_class() {
        let class = CharClass::new("AC").union("Gé");
        assert!(class.contains('A'));
        assert!(class.contains('G'));
        assert!(class.contains('é'));
        assert!(!class.contains('T'));
        assert!(!class.contains('ü'));
    }

    #[test]
    fn test_conversion() {
        let mut dna = validator(AlphabetKind::Dna, true, false);
        assert_eq!(dna.sanitize("ACGU".to_owned()).text, "ACGT");

        let mut rna = validator(AlphabetKind::Rna, true, false);
        assert_eq!(rna.sanitize("ACGT".to_owned()).text, "ACGU");

        let mut no_convert = validator(AlphabetKind::Dna, false, false);
        assert_eq!(no_convert.sanitize("ACGU".to_owned()).text, "ACGU");
    }

    #[test]
    fn test_conversion_round_trip() {
        let mut to_rna = validator(AlphabetKind::Rna, true, false);
        let mut to_dna = validator(AlphabetKind::Dna, true, false);

        let original = "GATTACANRYT".to_owned();
        let rna = to_rna.sanitize(original.clone()).text;
        assert_eq!(rna, "GAUUACANRYU");
        assert_eq!(to_dna.sanitize(rna).text, original);
    }

    #[test]
    fn test_diagnostic_raised_once() {
        let mut dna = validator(AlphabetKind::Dna, false, false);

        let first = dna.sanitize("ACXJGT".to_owned());
        assert_eq!(first.text, "ACXJGT");
        assert_eq!(first.diagnostic.unwrap().characters(), "XJ");

        let second = dna.sanitize("QQ".to_owned());
        assert!(second.diagnostic.is_none());
    }

    #[test]
    fn test_no_diagnostic_when_disabled() {
        let mut dna =
            AlphabetValidator::new(AlphabetKind::Dna, &AlphabetChars::default(), false, true, false);

        let result = dna.sanitize("ACXGT".to_owned());
        assert_eq!(result.text, "ACGT");
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn test_strip() {
        let mut rna = validator(AlphabetKind::Rna, false, true);
        let result = rna.sanitize("ACGTU".to_owned());
        assert_eq!(result.text, "ACGU");
        assert_eq!(result.diagnostic.unwrap().characters(), "T");
    }

    #[test]
    fn test_conversion_widens_allowed_set() {
        let mut dna = validator(AlphabetKind::Dna, true, true);
        let result = dna.sanitize("ACGU".to_owned());
        assert_eq!(result.text, "ACGT");
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn test_effective_sets() {
        let mut nucleic = validator(AlphabetKind::NucleicAcid, false, true);
        assert_eq!(nucleic.sanitize("ACGTUEQ".to_owned()).text, "ACGTU");

        let mut amino = validator(AlphabetKind::AminoAcid, false, true);
        assert_eq!(amino.sanitize("MSSFQ*JO".to_owned()).text, "MSSFQ*");

        let mut auto = validator(AlphabetKind::Auto, false, true);
        assert_eq!(auto.sanitize("ACGUMSQJ".to_owned()).text, "ACGUMSQ");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for kind in AlphabetKind::VALUES {
            let mut first = validator(kind, true, true);
            let mut second = validator(kind, true, true);

            let once = first.sanitize("ACGTU?MSSFQ*J O".to_owned()).text;
            let twice = second.sanitize(once.clone());
            assert_eq!(twice.text, once);
            assert!(twice.diagnostic.is_none());
        }
    }

    #[test]
    fn test_custom_chars() {
        let chars = AlphabetChars {
            dna: "AC".to_owned(),
            ..AlphabetChars::default()
        };
        let mut dna = AlphabetValidator::new(AlphabetKind::Dna, &chars, false, true, true);
        let result = dna.sanitize("ACGT".to_owned());
        assert_eq!(result.text, "AC");
        assert_eq!(result.diagnostic.unwrap().characters(), "GT");
    }
}
