pub mod alphabet;
mod buffer;
pub mod detect;
pub mod emitter;
pub mod error;
mod format;
pub mod params;
mod parser;
pub mod progress;
mod scan;
pub mod stream;
mod tag_walker;

#[doc(hidden)]
pub mod _internal_test_data;
