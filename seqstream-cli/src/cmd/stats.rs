use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use log::warn;
use seqstream::alphabet::AlphabetKind;
use seqstream::params::SequenceStreamParams;
use seqstream::progress::ProgressNotifier;
use seqstream::stream::{SequenceStream, SequenceStreamReader, StreamOutput};

use crate::PROGRESS_BAR;

pub(crate) fn stats<R: Read>(
    reader: R,
    alphabet: AlphabetKind,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<()> {
    let params = SequenceStreamParams::builder()
        .alphabet(alphabet)
        .output_encoding("utf-8")
        .progress_notifier(progress_notifier)
        .build();
    let stream = SequenceStream::new(params).context("Could not create the sequence stream")?;
    let mut stream_reader = SequenceStreamReader::new(reader, stream);
    let mut stats = SequenceStats::new();

    for output in &mut stream_reader {
        match output.context("Could not extract sequences from the input")? {
            StreamOutput::Sequence(data) => stats.process_sequence(&data),
            StreamOutput::Header(_) => {}
            StreamOutput::Diagnostic(diagnostic) => warn!("{}", diagnostic),
        }
    }
    stats.records = stream_reader.stream().records();

    PROGRESS_BAR.finish();
    stats.print_stats();

    Ok(())
}

#[derive(Debug, Default)]
struct SequenceStats {
    records: u64,
    residues: BTreeMap<char, u64>,
    total: u64,
}

impl SequenceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_sequence(&mut self, data: &[u8]) {
        for residue in String::from_utf8_lossy(data).chars() {
            *self.residues.entry(residue).or_default() += 1;
            self.total += 1;
        }
    }

    #[must_use]
    pub fn percentage(&self, residue: char) -> f32 {
        if self.total == 0 {
            return 0.0;
        }

        let count = self.residues.get(&residue).copied().unwrap_or(0);
        count as f32 / self.total as f32
    }

    pub fn print_stats(&self) {
        eprintln!("Records: {}", self.records);
        eprintln!("Residues: {}", self.total);
        for &residue in self.residues.keys() {
            eprintln!("  {}: {:.4}%", residue, self.percentage(residue) * 100.0);
        }
    }
}
