//! Process-wide tracing setup shared by the cerc binaries.
//!
//! Filtering follows `RUST_LOG`; the output format follows `RUST_LOG_FORMAT`
//! (`json` for JSON lines, anything else for the compact human format).

mod subscriber;

pub use subscriber::{LogFormat, init, init_with_level};
pub use tracing::level_filters::LevelFilter;
