//! Supervised ssh session: deliver the command, wait under a deadline

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tracing::{debug, warn};

use crate::config::OutputMode;
use crate::error::{Result, SshExecError};

use super::SshClient;

/// Exit code used in strict mode when the deadline kills the session
pub const TIMEOUT_EXIT_CODE: u8 = 124;

/// Exit code used in strict mode when the client gave no exit code
pub const UNKNOWN_FAILURE_EXIT_CODE: u8 = 255;

/// Exit code for a session cut short by Ctrl-C
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Client exited with status zero
    Success,
    /// Deadline elapsed and the client was killed
    TimedOut,
    /// Client could not start, exited non-zero or died by a signal
    Failed { reason: String, code: Option<i32> },
    /// Ctrl-C arrived and the client was killed
    Interrupted,
}

impl SessionOutcome {
    /// Process exit code for this outcome.
    ///
    /// Without `strict` every outcome except an interrupt maps to zero.
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            Self::Interrupted => INTERRUPTED_EXIT_CODE,
            _ if !strict => 0,
            Self::Success => 0,
            Self::TimedOut => TIMEOUT_EXIT_CODE,
            Self::Failed { code: Some(code), .. } => (*code & 0xff) as u8,
            Self::Failed { code: None, .. } => UNKNOWN_FAILURE_EXIT_CODE,
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Success
        } else {
            Self::Failed {
                reason: status.to_string(),
                code: status.code(),
            }
        }
    }

    fn from_io(err: io::Error) -> Self {
        Self::Failed {
            reason: err.to_string(),
            code: None,
        }
    }
}

enum Wake {
    Exited(io::Result<ExitStatus>),
    Deadline,
    Interrupted,
}

/// Run one session: start the client, write `command` to its stdin, close
/// it and wait at most `deadline` for the client to exit.
///
/// Only a missing stdin handle is an error; everything else that can go
/// wrong with the client is reported as a [`SessionOutcome`].
pub async fn execute(
    client: &SshClient,
    command: &str,
    deadline: Duration,
    output: OutputMode,
) -> Result<SessionOutcome> {
    let mut child = match client.command(output).spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!(program = client.program(), error = %e, "ssh did not start");
            return Ok(SessionOutcome::from_io(e));
        }
    };

    let stdin = child.stdin.take().ok_or(SshExecError::StdinUnavailable)?;
    debug!(pid = ?child.id(), deadline = ?deadline, "ssh started");

    let wake = tokio::select! {
        status = deliver_and_wait(&mut child, stdin, command) => Wake::Exited(status),
        _ = tokio::time::sleep(deadline) => Wake::Deadline,
        Ok(()) = tokio::signal::ctrl_c() => Wake::Interrupted,
    };

    match wake {
        Wake::Exited(Ok(status)) => Ok(SessionOutcome::from_status(status)),
        Wake::Exited(Err(e)) => Ok(SessionOutcome::from_io(e)),
        Wake::Deadline => {
            terminate(&mut child).await;
            Ok(SessionOutcome::TimedOut)
        }
        Wake::Interrupted => {
            terminate(&mut child).await;
            Ok(SessionOutcome::Interrupted)
        }
    }
}

async fn deliver_and_wait(
    child: &mut Child,
    mut stdin: ChildStdin,
    command: &str,
) -> io::Result<ExitStatus> {
    // A client that already exited closes the pipe; its status tells the rest
    if let Err(e) = stdin.write_all(command.as_bytes()).await {
        debug!(error = %e, "could not deliver command to ssh");
    }
    drop(stdin);

    child.wait().await
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "could not kill ssh");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_lenient() {
        let failed = SessionOutcome::Failed {
            reason: "exit status: 255".into(),
            code: Some(255),
        };

        assert_eq!(SessionOutcome::Success.exit_code(false), 0);
        assert_eq!(SessionOutcome::TimedOut.exit_code(false), 0);
        assert_eq!(failed.exit_code(false), 0);
        assert_eq!(SessionOutcome::Interrupted.exit_code(false), 130);
    }

    #[test]
    fn test_exit_codes_strict() {
        let exited = SessionOutcome::Failed {
            reason: "exit status: 3".into(),
            code: Some(3),
        };
        let no_code = SessionOutcome::Failed {
            reason: "No such file or directory (os error 2)".into(),
            code: None,
        };

        assert_eq!(SessionOutcome::Success.exit_code(true), 0);
        assert_eq!(SessionOutcome::TimedOut.exit_code(true), 124);
        assert_eq!(exited.exit_code(true), 3);
        assert_eq!(no_code.exit_code(true), 255);
        assert_eq!(SessionOutcome::Interrupted.exit_code(true), 130);
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};
        use std::time::Instant;

        fn fake_ssh(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-ssh");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn client(program: &Path) -> SshClient {
            SshClient::new(
                program.to_string_lossy(),
                Path::new("/keys/id_ed25519"),
                "alice@example.com",
            )
        }

        #[tokio::test]
        async fn test_command_delivered_on_stdin() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ssh(
                dir.path(),
                r#"cat > "$(dirname "$0")/stdin"
printf '%s\n' "$@" > "$(dirname "$0")/args""#,
            );

            let outcome = execute(
                &client(&program),
                "echo hi",
                Duration::from_secs(10),
                OutputMode::Quiet,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SessionOutcome::Success);
            assert_eq!(fs::read_to_string(dir.path().join("stdin")).unwrap(), "echo hi");
            assert_eq!(
                fs::read_to_string(dir.path().join("args")).unwrap(),
                "-i\n/keys/id_ed25519\nalice@example.com\n"
            );
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_failure() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ssh(dir.path(), "cat > /dev/null\nexit 3");

            let outcome = execute(
                &client(&program),
                "false",
                Duration::from_secs(10),
                OutputMode::Quiet,
            )
            .await
            .unwrap();

            assert_eq!(
                outcome,
                SessionOutcome::Failed {
                    reason: "exit status: 3".into(),
                    code: Some(3),
                }
            );
        }

        #[tokio::test]
        async fn test_deadline_kills_client() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_ssh(dir.path(), "cat > /dev/null\nexec sleep 30");

            let started = Instant::now();
            let outcome = execute(
                &client(&program),
                "sleep 30",
                Duration::from_millis(300),
                OutputMode::Quiet,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SessionOutcome::TimedOut);
            assert!(started.elapsed() < Duration::from_secs(10));
        }

        #[tokio::test]
        async fn test_missing_program_is_failure() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("no-such-ssh");

            let outcome = execute(
                &client(&missing),
                "ls",
                Duration::from_secs(1),
                OutputMode::Quiet,
            )
            .await
            .unwrap();

            assert!(matches!(outcome, SessionOutcome::Failed { code: None, .. }));
        }
    }
}
