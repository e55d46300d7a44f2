use std::path::PathBuf;

use clap::{Args, Parser, PossibleValue, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use lazy_static::lazy_static;
use seqstream::alphabet::AlphabetKind;
use seqstream::stream::DEFAULT_CHUNK_SIZE;

use crate::opts::{input_stream, InputStream};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug)]
pub struct AlphabetKindCli {
    pub inner: AlphabetKind,
}

impl AlphabetKindCli {
    #[must_use]
    pub fn new(inner: AlphabetKind) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn variants() -> Vec<Self> {
        AlphabetKind::VALUES
            .iter()
            .map(|&inner| AlphabetKindCli::new(inner))
            .collect()
    }
}

lazy_static! {
    static ref ALPHABET_KIND_CLI_VARIANTS: Vec<AlphabetKindCli> = AlphabetKindCli::variants();
}

impl ValueEnum for AlphabetKindCli {
    fn value_variants<'a>() -> &'a [Self] {
        &ALPHABET_KIND_CLI_VARIANTS
    }

    fn to_possible_value<'a>(&self) -> Option<PossibleValue<'a>> {
        let value = PossibleValue::new(self.inner.name());
        let value = match self.inner {
            AlphabetKind::AminoAcid => value.alias("aa"),
            AlphabetKind::NucleicAcid => value.alias("na"),
            _ => value,
        };
        Some(value)
    }
}

impl From<&AlphabetKindCli> for AlphabetKind {
    fn from(kind: &AlphabetKindCli) -> Self {
        kind.inner
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Input file to read; `-` is the standard input
    #[clap(default_value_t, value_parser = input_stream)]
    pub input: InputStream,

    /// Output file path; `-` is the standard output
    #[clap(short, long, value_parser)]
    pub output: Option<PathBuf>,

    /// JSON configuration file; other options take precedence over it
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Kind of sequences expected in the input
    #[clap(short, long, arg_enum, ignore_case = true)]
    pub alphabet: Option<AlphabetKindCli>,

    /// Convert T to U for RNA, and U to T for DNA
    #[clap(long, value_parser)]
    pub convert: bool,

    /// Remove the characters not allowed by the alphabet
    #[clap(long, value_parser)]
    pub strip_unexpected: bool,

    /// Don't warn about characters not allowed by the alphabet
    #[clap(long, value_parser)]
    pub no_error_on_unexpected: bool,

    /// Header written in front of every record; `{}` is replaced by the
    /// record number
    #[clap(long, value_parser, value_name = "TEMPLATE")]
    pub header: Option<String>,

    /// Input text encoding label (e.g. `utf-8`, `latin1`)
    #[clap(long, value_parser, value_name = "ENCODING")]
    pub input_encoding: Option<String>,

    /// Output text encoding label; same as the input encoding by default
    #[clap(long, value_parser, value_name = "ENCODING")]
    pub output_encoding: Option<String>,

    /// Give up if no known format starts within this many bytes
    #[clap(long, value_parser, value_name = "BYTES")]
    pub max_buffer: Option<usize>,

    /// Number of bytes read from the input at once
    #[clap(default_value_t = DEFAULT_CHUNK_SIZE, long, value_parser, value_name = "BYTES")]
    pub chunk_size: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the sequences from a FASTA, GenBank or SBOL file
    Convert(ConvertArgs),

    /// Print the number of records and residue statistics of a file
    Stats {
        /// Input file to read; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Kind of sequences expected in the input
        #[clap(short, long, arg_enum, ignore_case = true)]
        alphabet: Option<AlphabetKindCli>,
    },
}
