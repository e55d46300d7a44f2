use itertools::Itertools;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::SequenceStreamResult;
use crate::params::SequenceStreamParams;
use crate::stream::{SequenceStream, StreamOutput};

pub const FASTA_TWO_RECORDS_STR: &str = ">seq1\nACGT\n\n>seq2\nTTTT";

pub const GENBANK_RECORD_STR: &str = "LOCUS       SCU49845     5028 bp    DNA             PLN       21-JUN-1999
DEFINITION  Saccharomyces cerevisiae TCP1-beta gene, partial cds.
FEATURES             Location/Qualifiers
     CDS             <1..206
                     /codon_start=3
                     /product=\"TCP1-beta\"
                     /translation=\"SSIYNGISTSGLDLNNGTIADMRQLGIVESYKLKRAVVSSASEA
                     AEVLLRVDNIIRARPRTANRQHM\"
ORIGIN
        1 gatcctccat atacaacggt atctccacct caggtttaga tctcaacaac ggaaccattg
       61 ccgacatgag acagttaggt atcgtcgaga gttacaagct aaaacgagca gtagtcagct
//
";

pub const GENBANK_RECORD_TRANSLATION: &str =
    "SSIYNGISTSGLDLNNGTIADMRQLGIVESYKLKRAVVSSASEAAEVLLRVDNIIRARPRTANRQHM";
pub const GENBANK_RECORD_ORIGIN: &str = "GATCCTCCATATACAACGGTATCTCCACCTCAGGTTTAGATCTCAACAACGGAACCATTG\
CCGACATGAGACAGTTAGGTATCGTCGAGAGTTACAAGCTAAAACGAGCAGTAGTCAGCT";

pub const SBOL_DOCUMENT_STR: &str = r#"<?xml version="1.0" ?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:sbol="http://sbols.org/v2#">
  <sbol:Sequence rdf:about="http://example.com/seq1">
    <sbol:displayId>seq1</sbol:displayId>
    <sbol:elements>aattggcc
      ggccaatt</sbol:elements>
    <sbol:encoding rdf:resource="http://www.chem.qmul.ac.uk/iubmb/misc/naseq.html"/>
  </sbol:Sequence>
  <sbol:Sequence rdf:about="http://example.com/seq2">
    <sbol:elements>tttt</sbol:elements>
  </sbol:Sequence>
</rdf:RDF>
"#;

pub const MIXED_DOCUMENT_STR: &str = r#"Some preamble that is not a sequence.
>first record
ACGT
acgt

LOCUS       X 12 bp DNA
ORIGIN
        1 ggggcccc aaaa
//
<rdf:RDF><sbol:Sequence><sbol:elements>uuuu</sbol:elements></sbol:Sequence></rdf:RDF>
>last record
TTGG"#;

lazy_static! {
    pub static ref LARGE_FASTA: String = create_random_fasta(200, 300);
}

fn create_random_fasta(records: usize, max_len: usize) -> String {
    const RESIDUES: [char; 5] = ['A', 'C', 'G', 'T', 'N'];

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);
    (0..records)
        .map(|i| {
            let len = rng.gen_range(1..=max_len);
            let sequence: String = (0..len)
                .map(|_| RESIDUES[rng.gen_range(0..RESIDUES.len())])
                .collect();
            let lines = sequence
                .as_bytes()
                .chunks(60)
                .map(|line| String::from_utf8_lossy(line).into_owned())
                .join("\n");
            format!(">seq{} random\n{}\n", i, lines)
        })
        .join("\n")
}

/// Feeds `input` to a new stream in chunks of `chunk_size` bytes and
/// returns all the outputs.
pub fn collect_outputs(
    params: SequenceStreamParams,
    input: &[u8],
    chunk_size: usize,
) -> SequenceStreamResult<Vec<StreamOutput>> {
    let mut stream = SequenceStream::new(params)?;
    let mut outputs = Vec::new();
    for chunk in input.chunks(chunk_size.max(1)) {
        outputs.extend(stream.push(chunk)?);
    }
    outputs.extend(stream.finish()?);

    Ok(outputs)
}

/// Concatenates the data of all the header and sequence outputs.
#[must_use]
pub fn outputs_data(outputs: &[StreamOutput]) -> Vec<u8> {
    outputs
        .iter()
        .filter_map(StreamOutput::data)
        .flatten()
        .copied()
        .collect()
}

/// Same as [`outputs_data`], but lossily converted into a string.
#[must_use]
pub fn outputs_text(outputs: &[StreamOutput]) -> String {
    String::from_utf8_lossy(&outputs_data(outputs)).into_owned()
}
