use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use log::warn;
use seqstream::emitter::Header;
use seqstream::params::{SequenceStreamConfig, SequenceStreamParams};
use seqstream::progress::ProgressNotifier;
use seqstream::stream::{SequenceStream, SequenceStreamReader, StreamOutput};

use crate::cli::ConvertArgs;

/// Builds the stream params from the configuration file (if any),
/// overridden by the command line options.
pub(crate) fn stream_params(
    args: &ConvertArgs,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<SequenceStreamParams> {
    let config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Could not open config file {}", path.display()))?;
            SequenceStreamConfig::from_reader(BufReader::new(file))
                .with_context(|| format!("Could not parse config file {}", path.display()))?
        }
        None => SequenceStreamConfig::default(),
    };

    let mut builder = config.to_builder();
    builder.progress_notifier(progress_notifier);
    if let Some(alphabet) = &args.alphabet {
        builder.alphabet(alphabet.into());
    }
    if args.convert {
        builder.convert_to_expected(true);
    }
    if args.strip_unexpected {
        builder.strip_unexpected(true);
    }
    if args.no_error_on_unexpected {
        builder.error_on_unexpected(false);
    }
    if let Some(header) = &args.header {
        builder.header(Header::from_template(header));
    }
    if let Some(input_encoding) = &args.input_encoding {
        builder.input_encoding(input_encoding.clone());
    }
    if let Some(output_encoding) = &args.output_encoding {
        builder.output_encoding(output_encoding.clone());
    }
    if let Some(max_buffer) = args.max_buffer {
        builder.max_buffer(max_buffer);
    }

    Ok(builder.build())
}

pub fn convert<R: Read, W: Write>(
    reader: R,
    writer: W,
    params: SequenceStreamParams,
    chunk_size: usize,
) -> anyhow::Result<()> {
    let stream = SequenceStream::new(params).context("Could not create the sequence stream")?;
    let mut writer = BufWriter::new(writer);

    for output in SequenceStreamReader::with_chunk_size(reader, stream, chunk_size) {
        match output.context("Could not extract sequences from the input")? {
            StreamOutput::Header(data) | StreamOutput::Sequence(data) => writer
                .write_all(&data)
                .context("Could not write to the output")?,
            StreamOutput::Diagnostic(diagnostic) => warn!("{}", diagnostic),
        }
    }

    writer.flush()?;

    Ok(())
}
