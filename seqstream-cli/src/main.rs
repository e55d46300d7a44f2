#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{convert, stats};
use human_panic::setup_panic;
use lazy_static::lazy_static;
use seqstream::alphabet::AlphabetKind;

use crate::logging::init_logging;
use crate::opts::OutputWriter;
use crate::progress_bar::StreamProgressBar;

mod cli;
mod cmd;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: StreamProgressBar = StreamProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    match &cli.command {
        Commands::Convert(args) => {
            let reader = args.input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let output = OutputWriter::from_option(&args.output)?;

            let params = convert::stream_params(args, Arc::new(PROGRESS_BAR.clone()))?;
            convert::convert(
                reader.into_read(),
                output.into_write(),
                params,
                args.chunk_size,
            )
            .with_context(|| format!("Failed to convert {}", args.input))?;
        }
        Commands::Stats { input, alphabet } => {
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));

            let alphabet = alphabet.as_ref().map_or(AlphabetKind::Auto, AlphabetKind::from);
            stats::stats(
                reader.into_read(),
                alphabet,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to compute file statistics")?;
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}
