//! Full-circle synthetic monitoring.
//!
//! A probe is an HTTP request carrying a one-time token and a response URL.
//! It only succeeds once the probed system calls back on that URL with the
//! token, which proves the whole path through the system works, not just
//! the first hop.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cerc::reporter::LogReporter;
//! use cerc::{Cerc, Options, Pathway};
//!
//! # async fn run() -> Result<(), cerc::error::StartError> {
//! let options = Options {
//!     address: ":8080".into(),
//!     pathways: vec![Pathway::new("orders", "http://orders.internal/probe", "POST")],
//!     ..Options::default()
//! };
//! let cerc = Cerc::new(options, Arc::new(LogReporter::new()))?;
//! cerc.start();
//! // mount `cerc.router()` on an actix-web server
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod callback;
pub mod duration;
pub mod error;
pub mod options;
pub mod pathway;
pub mod report;
pub mod reporter;
pub mod response_url;
pub mod runner;
pub mod selftest;
pub mod service;
pub mod token;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use auth::BasicCredentials;
pub use options::{HttpsOptions, Options};
pub use pathway::{BasicAuth, Pathway, Timeouts};
pub use report::{ProbeResult, Report};
pub use reporter::{CompositeReporter, Reporter};
pub use service::{Cerc, CercRouter};
