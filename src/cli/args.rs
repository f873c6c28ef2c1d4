//! Command-line argument parsing for the gateway binary.
//!
//! Everything except the listen address comes from the environment.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Run the gateway (default), optionally overriding the listen address
    Serve { bind: Option<String> },
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use chatgate::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatgate".to_string(), "--bind".to_string(), "0.0.0.0:8080".to_string()];
/// assert_eq!(
///     parse_args(args.into_iter()),
///     CliCommand::Serve { bind: Some("0.0.0.0:8080".to_string()) }
/// );
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut bind = None;
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--bind" | "-b" => bind = args.next(),
            other => {
                if let Some(addr) = other.strip_prefix("--bind=") {
                    bind = Some(addr.to_string());
                }
            }
        }
    }

    CliCommand::Serve { bind }
}
