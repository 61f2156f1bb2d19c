//! Command-line argument parsing for the streamtap CLI.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

use std::time::Duration;

use thiserror::Error;

use crate::config::{Method, DEFAULT_RETRY_DELAY};

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream a URL to stdout
    Stream(CliOptions),
}

/// Options for a streaming run.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub url: String,
    /// Print chunks as received instead of JSON-encoded SSE events
    pub raw: bool,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub data: Option<String>,
    pub retry: u32,
    pub retry_delay: Duration,
    /// Number of `-v` flags
    pub verbose: u8,
}

impl CliOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw: false,
            method: Method::Get,
            headers: Vec::new(),
            data: None,
            retry: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            verbose: 0,
        }
    }
}

/// Argument errors, reported with the usage text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("missing URL")]
    MissingUrl,
    #[error("unexpected argument: {0}")]
    Unexpected(String),
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("{0} requires a value")]
    MissingValue(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
}

/// Usage text for `--help` and argument errors.
pub const USAGE: &str = "\
Usage: streamtap [OPTIONS] <URL>

Stream an HTTP response body to stdout. By default the body is parsed as
Server-Sent Events and each event is printed as one JSON line.

Options:
  -r, --raw                 Print body chunks as received
  -X, --method <METHOD>     Request method (default GET)
  -H, --header <K:V>        Add a request header (repeatable)
  -d, --data <BODY>         Request body
      --retry <N>           Retry failed connection attempts N times
      --retry-delay <MS>    Delay between attempts in milliseconds (default 1000)
  -v                        Increase log verbosity (repeatable)
  -V, --version             Print version
  -h, --help                Print this help

Environment:
  STREAMTAP_BASE_URL        Base URL joined with relative URLs
  STREAMTAP_TIMEOUT_SECS    Timeout for non-streaming requests
  STREAMTAP_LOG             Log filter directives (default warn)";

/// Parse command-line arguments and return the appropriate command.
///
/// `--version` and `--help` win over everything else on the line.
///
/// # Examples
///
/// ```
/// use streamtap::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["streamtap".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let args: Vec<String> = args.skip(1).collect();

    for arg in &args {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            _ => {}
        }
    }

    let mut url = None;
    let mut options = CliOptions::new("");
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--raw" | "-r" => options.raw = true,
            "-v" | "-vv" | "-vvv" => options.verbose += (arg.len() - 1) as u8,
            "--method" | "-X" => {
                let value = take_value(&mut iter, &arg)?;
                options.method = value
                    .parse()
                    .map_err(|_| invalid(&arg, &value))?;
            }
            "--header" | "-H" => {
                let value = take_value(&mut iter, &arg)?;
                options.headers.push(parse_header(&arg, &value)?);
            }
            "--data" | "-d" => options.data = Some(take_value(&mut iter, &arg)?),
            "--retry" => {
                let value = take_value(&mut iter, &arg)?;
                options.retry = value.parse().map_err(|_| invalid(&arg, &value))?;
            }
            "--retry-delay" => {
                let value = take_value(&mut iter, &arg)?;
                let millis: u64 = value.parse().map_err(|_| invalid(&arg, &value))?;
                options.retry_delay = Duration::from_millis(millis);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(ArgsError::UnknownFlag(arg));
            }
            _ if url.is_none() => url = Some(arg),
            _ => return Err(ArgsError::Unexpected(arg)),
        }
    }

    options.url = url.ok_or(ArgsError::MissingUrl)?;
    Ok(CliCommand::Stream(options))
}

fn take_value<I>(iter: &mut I, flag: &str) -> Result<String, ArgsError>
where
    I: Iterator<Item = String>,
{
    iter.next()
        .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
}

fn parse_header(flag: &str, value: &str) -> Result<(String, String), ArgsError> {
    let (name, header_value) = value.split_once(':').ok_or_else(|| invalid(flag, value))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid(flag, value));
    }
    Ok((name.to_string(), header_value.trim().to_string()))
}

fn invalid(flag: &str, value: &str) -> ArgsError {
    ArgsError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}
