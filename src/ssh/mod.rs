//! Remote command execution through the system ssh client

mod client;
mod session;

pub use client::SshClient;
pub use session::{
    execute, SessionOutcome, INTERRUPTED_EXIT_CODE, TIMEOUT_EXIT_CODE, UNKNOWN_FAILURE_EXIT_CODE,
};
