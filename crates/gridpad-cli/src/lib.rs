//! Command-line host for gridpad.
//!
//! The binary is a thin wrapper: argument parsing lives in [`config`], and all
//! table state flows through [`session::Session`].

pub mod config;
pub mod download;
pub mod logging;
pub mod session;

pub use config::{Args, Command, ExportFormat, DEFAULT_EXPORT_NAME};
pub use session::{Notice, Session};
