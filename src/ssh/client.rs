//! External ssh client invocation

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::OutputMode;

/// How to launch the system ssh client for one session
#[derive(Debug, Clone)]
pub struct SshClient {
    program: String,
    identity: PathBuf,
    destination: String,
}

impl SshClient {
    pub fn new(program: impl Into<String>, identity: &Path, destination: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            identity: identity.to_path_buf(),
            destination: destination.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Client arguments: `-i <identity> user@host`
    pub fn args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-i"),
            self.identity.clone().into_os_string(),
            OsString::from(&self.destination),
        ]
    }

    /// Build the client process. stdin is always piped; stdout and stderr
    /// follow the output mode. The process dies with its handle.
    pub fn command(&self, output: OutputMode) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args())
            .stdin(Stdio::piped())
            .stdout(passthrough(output.shows_stdout()))
            .stderr(passthrough(output.shows_stderr()))
            .kill_on_drop(true);
        cmd
    }
}

fn passthrough(enabled: bool) -> Stdio {
    if enabled {
        Stdio::inherit()
    } else {
        Stdio::null()
    }
}
