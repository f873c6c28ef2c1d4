//! CLI module for the gateway binary.
//!
//! ```ignore
//! use chatgate::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Version => handle_version_command(),
//!     CliCommand::Serve { bind } => { /* start the gateway */ }
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use version::{handle_version_command, version_line, VERSION};
