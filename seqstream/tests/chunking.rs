use seqstream::_internal_test_data::{
    collect_outputs, outputs_data, FASTA_TWO_RECORDS_STR, GENBANK_RECORD_STR, LARGE_FASTA,
    MIXED_DOCUMENT_STR, SBOL_DOCUMENT_STR,
};
use seqstream::alphabet::AlphabetKind;
use seqstream::params::SequenceStreamParams;
use seqstream::stream::SequenceStream;

fn params(alphabet: AlphabetKind) -> SequenceStreamParams {
    SequenceStreamParams::builder()
        .alphabet(alphabet)
        .header_text("record")
        .build()
}

fn parse_split(params: SequenceStreamParams, input: &[u8], split: usize) -> Vec<u8> {
    let mut stream = SequenceStream::new(params).unwrap();
    let mut outputs = stream.push(&input[..split]).unwrap();
    outputs.extend(stream.push(&input[split..]).unwrap());
    outputs.extend(stream.finish().unwrap());

    outputs_data(&outputs)
}

fn assert_every_split_point(alphabet: AlphabetKind, input: &str) {
    let input = input.as_bytes();
    let expected = outputs_data(&collect_outputs(params(alphabet), input, input.len()).unwrap());
    assert!(!expected.is_empty());

    for split in 0..=input.len() {
        assert_eq!(
            parse_split(params(alphabet), input, split),
            expected,
            "split at {}",
            split
        );
    }
}

#[test]
fn test_fasta_every_split_point() {
    assert_every_split_point(AlphabetKind::Dna, FASTA_TWO_RECORDS_STR);
}

#[test]
fn test_genbank_every_split_point() {
    assert_every_split_point(AlphabetKind::Auto, GENBANK_RECORD_STR);
    assert_every_split_point(AlphabetKind::Dna, GENBANK_RECORD_STR);
}

#[test]
fn test_sbol_every_split_point() {
    assert_every_split_point(AlphabetKind::Auto, SBOL_DOCUMENT_STR);
}

#[test]
fn test_sbol_lookalikes_every_split_point() {
    let input = "<rdf:RDFx>junk</rdf:RDFx>\n>a\nAC<rdf:RDFy\nGT\n\n\
        <rdf:RDF><sbol:Sequence><sbol:elements>ac<!-- x -->gt</sbol:elements>\
        </sbol:Sequence></rdf:RDF>\n>b\nTT";
    assert_every_split_point(AlphabetKind::Auto, input);
}

#[test]
fn test_mixed_every_split_point() {
    assert_every_split_point(AlphabetKind::Auto, MIXED_DOCUMENT_STR);
}

#[test]
fn test_crlf_every_split_point() {
    let input = MIXED_DOCUMENT_STR.replace('\n', "\r\n");
    assert_every_split_point(AlphabetKind::Auto, &input);
}

#[test]
fn test_mixed_chunk_sizes() {
    let input = MIXED_DOCUMENT_STR.as_bytes();
    let expected = outputs_data(&collect_outputs(params(AlphabetKind::Auto), input, 4096).unwrap());

    for chunk_size in 1..=input.len() {
        let outputs = collect_outputs(params(AlphabetKind::Auto), input, chunk_size).unwrap();
        assert_eq!(outputs_data(&outputs), expected, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_large_fasta_chunk_sizes() {
    let input = LARGE_FASTA.as_bytes();
    let expected = outputs_data(&collect_outputs(params(AlphabetKind::Dna), input, input.len()).unwrap());

    for chunk_size in [1, 2, 3, 7, 60, 61, 64, 1000, 4096] {
        let outputs = collect_outputs(params(AlphabetKind::Dna), input, chunk_size).unwrap();
        assert_eq!(outputs_data(&outputs), expected, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_utf8_split_inside_character() {
    let params = || {
        SequenceStreamParams::builder()
            .alphabet(AlphabetKind::Dna)
            .strip_unexpected(true)
            .build()
    };
    let input = ">sé\nACéGT\n".as_bytes();

    let expected = outputs_data(&collect_outputs(params(), input, input.len()).unwrap());
    assert_eq!(expected, b"\nACGT");
    for split in 0..=input.len() {
        assert_eq!(parse_split(params(), input, split), expected, "split at {}", split);
    }
}

#[test]
fn test_latin1_round_trip() {
    let params = SequenceStreamParams::builder()
        .alphabet(AlphabetKind::Dna)
        .input_encoding("latin1")
        .build();
    let input = b">a\nAC\xe9GT\n";
    let outputs = collect_outputs(params, input, 1).unwrap();

    assert_eq!(outputs_data(&outputs), b"\nAC\xc9GT");
}

#[test]
fn test_latin1_to_utf8() {
    let params = SequenceStreamParams::builder()
        .alphabet(AlphabetKind::Dna)
        .input_encoding("latin1")
        .output_encoding("utf-8")
        .build();
    let input = b">a\nAC\xe9GT\n";
    let outputs = collect_outputs(params, input, 3).unwrap();

    assert_eq!(outputs_data(&outputs), "\nACÉGT".as_bytes());
}

#[test]
fn test_utf16_input() {
    let text = ">a\nACGT\n";
    let mut input = vec![0xff, 0xfe];
    input.extend(text.encode_utf16().flat_map(u16::to_le_bytes));

    let params = SequenceStreamParams::builder()
        .alphabet(AlphabetKind::Dna)
        .input_encoding("utf-16le")
        .build();
    let outputs = collect_outputs(params, &input, 3).unwrap();

    assert_eq!(outputs_data(&outputs), b"\nACGT");
}
