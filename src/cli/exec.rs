//! Run one command on the remote host

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Params;
use crate::error::{Result, SshExecError};
use crate::key::KeyFile;
use crate::ssh::{self, SessionOutcome, SshClient};

/// Run a single session. A temporary key lands in the current directory.
pub fn run(params: Params) -> Result<SessionOutcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SshExecError::Runtime)?;

    runtime.block_on(run_session(&params, Path::new(".")))
}

/// Prepare the key, run ssh, report the outcome and remove the key
pub async fn run_session(params: &Params, key_dir: &Path) -> Result<SessionOutcome> {
    let key_file = KeyFile::materialize(&params.key, key_dir)?;

    let client = SshClient::new(&params.program, key_file.path(), params.destination());
    debug!(
        destination = %params.destination(),
        raw_key = params.key.is_raw(),
        "running remote command"
    );

    let outcome = ssh::execute(&client, &params.command, params.timeout, params.output).await?;
    report(&outcome);

    // Failing to remove the key is fatal, even after a successful session
    key_file.cleanup()?;

    Ok(outcome)
}

fn report(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Success => debug!("session finished"),
        SessionOutcome::TimedOut => info!("timeout is reached"),
        SessionOutcome::Failed { reason, .. } => warn!("exited from a session: {}", reason),
        SessionOutcome::Interrupted => warn!("interrupted, ssh session terminated"),
    }
}
