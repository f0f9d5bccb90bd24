//! Run configuration for ssh-exec
//!
//! There are no configuration files: everything comes from flags.
//! This module holds the validated parameter set and its defaults.

mod params;

pub use params::{resolve_timeout, KeySource, OutputMode, Params};

/// Deadline used when the timeout is unset or zero
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Client binary, resolved through PATH
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
