//! ssh-exec - run one command on a remote host through the system ssh client
//!
//! This crate:
//! - Accepts a private key as a file path or as raw key material
//! - Materializes raw keys into a short-lived file that is always removed
//! - Feeds the command to the client's stdin and enforces a hard deadline
//! - Reports the session outcome and maps it to an exit code

pub mod cli;
pub mod config;
pub mod error;
pub mod key;
pub mod ssh;

pub use error::{Result, SshExecError};
