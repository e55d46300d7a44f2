use criterion::{criterion_group, criterion_main, Criterion};
use seqstream::_internal_test_data::{collect_outputs, LARGE_FASTA, MIXED_DOCUMENT_STR};
use seqstream::alphabet::AlphabetKind;
use seqstream::params::SequenceStreamParams;

fn parse_large_fasta(c: &mut Criterion) {
    let params = SequenceStreamParams::builder()
        .alphabet(AlphabetKind::Dna)
        .build();

    c.bench_function("Parse random FASTA in 64KiB chunks", |b| {
        b.iter(|| {
            let outputs = collect_outputs(params.clone(), LARGE_FASTA.as_bytes(), 64 * 1024);
            assert!(!outputs.unwrap().is_empty());
        })
    });
    c.bench_function("Parse random FASTA in 16B chunks", |b| {
        b.iter(|| {
            let outputs = collect_outputs(params.clone(), LARGE_FASTA.as_bytes(), 16);
            assert!(!outputs.unwrap().is_empty());
        })
    });
}

fn parse_mixed(c: &mut Criterion) {
    let input = MIXED_DOCUMENT_STR.repeat(100);

    c.bench_function("Parse mixed formats in 1KiB chunks", |b| {
        b.iter(|| {
            let outputs = collect_outputs(SequenceStreamParams::default(), input.as_bytes(), 1024);
            assert!(!outputs.unwrap().is_empty());
        })
    });
}

criterion_group!(benches, parse_large_fasta, parse_mixed);
criterion_main!(benches);
