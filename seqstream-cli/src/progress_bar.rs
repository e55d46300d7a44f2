use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use seqstream::progress::{ByteNum, ProgressNotifier};

#[derive(Debug, Default)]
struct StreamProgressBarState {
    total_bytes: u64,
    records: u64,
    initialized: bool,
}

/// Progress bar (or spinner, if the input size is unknown) tracking the
/// number of bytes read and records found.
#[derive(Debug, Clone)]
pub(crate) struct StreamProgressBar {
    bar: ProgressBar,
    state: Arc<Mutex<StreamProgressBarState>>,
}

impl StreamProgressBar {
    pub fn new() -> StreamProgressBar {
        let init_bar = ProgressBar::hidden();
        init_bar.set_style(ProgressStyle::default_spinner());
        init_bar.enable_steady_tick(Duration::from_millis(50));
        init_bar.set_message("Initializing...");

        Self {
            bar: init_bar,
            state: Arc::new(Mutex::new(StreamProgressBarState::default())),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    #[inline]
    fn init(&self) {
        let mut state = self.state.lock().unwrap();
        if state.initialized {
            return;
        }

        if state.total_bytes == 0 {
            self.bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {bytes}/? ({bytes_per_sec}) {msg}")
                    .expect("Invalid progress bar template"),
            );
        } else {
            self.bar.set_length(state.total_bytes);
            self.bar.set_style(
                ProgressStyle::default_bar()
                    .template("{wide_bar} {bytes}/{total_bytes} [ETA {eta}] {msg}")
                    .expect("Invalid progress bar template"),
            );
        }
        self.bar.set_position(0);
        self.bar.set_message("0 records");
        state.initialized = true;
    }

    pub fn set_total_bytes(&self, length: u64) {
        let mut state = self.state.lock().unwrap();

        state.initialized = false;
        state.total_bytes = length;
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl ProgressNotifier for StreamProgressBar {
    fn processed_bytes(&self, bytes: ByteNum) {
        self.init();
        self.bar.inc(bytes.get() as u64);
    }

    fn records_found(&self, records: u64) {
        self.init();
        let mut state = self.state.lock().unwrap();
        state.records += records;
        self.bar.set_message(format!("{} records", state.records));
    }
}
