//! Invocation parameters for a single run

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{Result, SshExecError};

use super::{DEFAULT_SSH_PROGRAM, DEFAULT_TIMEOUT_SECS};

/// Where the private key comes from
#[derive(Debug)]
pub enum KeySource {
    /// Existing key file, handed to the client untouched
    Path(PathBuf),
    /// Raw key material, written to a temporary file for the run
    Raw(SecretString),
}

impl KeySource {
    /// Pick the key source. Raw material wins when both are given.
    pub fn resolve(key_path: &str, raw_key: SecretString) -> Result<Self> {
        let has_raw = !raw_key.expose_secret().is_empty();

        match (key_path.is_empty(), has_raw) {
            (true, false) => Err(SshExecError::MissingKey),
            (false, false) => Ok(Self::Path(PathBuf::from(key_path))),
            (path_empty, true) => {
                if !path_empty {
                    debug!(key_path, "raw key supplied, key path ignored");
                }
                Ok(Self::Raw(raw_key))
            }
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Which client streams reach the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Nothing from the client is shown
    Quiet,
    /// stderr only
    #[default]
    Normal,
    /// stderr and stdout
    Verbose,
}

impl OutputMode {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    pub fn shows_stderr(self) -> bool {
        self != Self::Quiet
    }

    pub fn shows_stdout(self) -> bool {
        self == Self::Verbose
    }
}

/// Validated parameters of one run
#[derive(Debug)]
pub struct Params {
    pub key: KeySource,
    pub user: String,
    pub host: String,
    /// Deadline for the whole session
    pub timeout: Duration,
    /// Text written to the client's stdin
    pub command: String,
    pub output: OutputMode,
    /// Propagate the session outcome into the exit code
    pub strict: bool,
    /// Client binary, looked up in PATH when not a path
    pub program: String,
}

impl Params {
    /// Create parameters with defaults for everything but key and command
    pub fn new(key: KeySource, command: impl Into<String>) -> Result<Self> {
        let command = command.into();
        if command.is_empty() {
            return Err(SshExecError::MissingCommand);
        }

        Ok(Self {
            key,
            user: String::new(),
            host: String::new(),
            timeout: resolve_timeout(None),
            command,
            output: OutputMode::default(),
            strict: false,
            program: DEFAULT_SSH_PROGRAM.to_string(),
        })
    }

    pub fn with_destination(mut self, user: impl Into<String>, host: impl Into<String>) -> Self {
        self.user = user.into();
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout = resolve_timeout(secs);
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Destination in the form the client expects (user@host)
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Unset and zero both mean the default deadline
pub fn resolve_timeout(secs: Option<u64>) -> Duration {
    match secs {
        None | Some(0) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        Some(n) => Duration::from_secs(n),
    }
}
