//! Command-line surface
//!
//! Flags are accepted both in the single-dash long form (`-key-path x`,
//! `-timeout=3`) and the usual `--key-path x`. Single-dash forms are
//! rewritten by [`normalize_args`] before clap sees them.

pub mod exec;

use std::ffi::OsString;

use clap::Parser;
use secrecy::SecretString;

use crate::config::{KeySource, OutputMode, Params, DEFAULT_SSH_PROGRAM};
use crate::error::Result;

/// Long flags that take a value
const VALUE_FLAGS: &[&str] = &["key-path", "key", "user", "host", "timeout", "cmd", "ssh-program"];

/// Long flags without a value
const SWITCH_FLAGS: &[&str] = &["strict", "verbose", "quiet", "help", "version"];

#[derive(Parser)]
#[command(name = "ssh-exec")]
#[command(version)]
#[command(about = "Run a single command on a remote host through ssh, with a deadline", long_about = None)]
pub struct Cli {
    /// Absolute path to an ssh private key in the local system
    #[arg(
        long = "key-path",
        value_name = "PATH",
        default_value = "",
        hide_default_value = true,
        allow_hyphen_values = true
    )]
    pub key_path: String,

    /// Raw ssh private key
    #[arg(
        long = "key",
        value_name = "KEY",
        default_value = "",
        hide_default_value = true,
        allow_hyphen_values = true
    )]
    pub key: String,

    /// User to log in as
    #[arg(long, default_value = "", hide_default_value = true, allow_hyphen_values = true)]
    pub user: String,

    /// Host to log in
    #[arg(long, default_value = "", hide_default_value = true, allow_hyphen_values = true)]
    pub host: String,

    /// Execution timeout in seconds (0 or unset: 5)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Command to be executed via the ssh session
    #[arg(
        long = "cmd",
        value_name = "COMMAND",
        default_value = "",
        hide_default_value = true,
        allow_hyphen_values = true
    )]
    pub cmd: String,

    /// ssh client binary
    #[arg(long = "ssh-program", value_name = "PROGRAM", default_value = DEFAULT_SSH_PROGRAM)]
    pub ssh_program: String,

    /// Exit with the session's status instead of always succeeding
    #[arg(long)]
    pub strict: bool,

    /// Also show the remote stdout and log at debug level
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Hide all ssh output
    #[arg(long)]
    pub quiet: bool,
}

impl Cli {
    /// Validate flags into run parameters
    pub fn into_params(self) -> Result<Params> {
        let key = KeySource::resolve(&self.key_path, SecretString::new(self.key))?;

        Ok(Params::new(key, self.cmd)?
            .with_destination(self.user, self.host)
            .with_timeout(self.timeout)
            .with_output(OutputMode::from_flags(self.quiet, self.verbose))
            .with_strict(self.strict)
            .with_program(self.ssh_program))
    }
}

/// Rewrite `-flag` and `-flag=value` into `--flag` forms for known long
/// flags. Values following a flag and everything after `--` are untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut expect_value = false;
    let mut passthrough = false;

    for (index, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();

        if index == 0 || passthrough || expect_value {
            expect_value = false;
            normalized.push(arg);
            continue;
        }

        if arg == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        match long_flag(text) {
            Some((name, has_inline_value)) => {
                expect_value = VALUE_FLAGS.contains(&name) && !has_inline_value;
                if text.starts_with("--") {
                    normalized.push(arg);
                } else {
                    normalized.push(OsString::from(format!("-{}", text)));
                }
            }
            None => normalized.push(arg),
        }
    }

    normalized
}

/// Known long flag name in `text`, and whether it carries `=value`
fn long_flag(text: &str) -> Option<(&str, bool)> {
    let body = text
        .strip_prefix("--")
        .or_else(|| text.strip_prefix('-'))?;

    let (name, has_inline_value) = match body.split_once('=') {
        Some((name, _)) => (name, true),
        None => (body, false),
    };

    let known = VALUE_FLAGS.contains(&name) || SWITCH_FLAGS.contains(&name);
    known.then_some((name, has_inline_value))
}
