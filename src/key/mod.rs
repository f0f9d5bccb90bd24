//! Private key materialization
//!
//! A key given by path is used as-is. Raw key material is written to a
//! temporary file next to the working directory for the duration of a run:
//! - the file gets a random name with a fixed prefix
//! - its content is the key followed by exactly one newline
//! - `cleanup` removes it and reports failure; dropping the guard on any
//!   other path removes it best-effort

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::KeySource;
use crate::error::{Result, SshExecError};

/// Name prefix of temporary key files
pub const TEMP_KEY_PREFIX: &str = "ssh-exec-key-";

/// Key file handed to the client with `-i`
#[derive(Debug)]
pub enum KeyFile {
    /// Caller-owned file, never touched
    Borrowed(PathBuf),
    /// Run-owned file, removed at the end
    Temporary(NamedTempFile),
}

impl KeyFile {
    /// Resolve the key source into a file, creating one in `dir` for raw keys
    pub fn materialize(source: &KeySource, dir: &Path) -> Result<Self> {
        match source {
            KeySource::Path(path) => Ok(Self::Borrowed(path.clone())),
            KeySource::Raw(secret) => {
                let file = write_temporary(secret, dir)?;
                debug!(path = %file.path().display(), "temporary key file created");
                Ok(Self::Temporary(file))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Borrowed(path) => path,
            Self::Temporary(file) => file.path(),
        }
    }

    /// Remove the temporary file, if any
    pub fn cleanup(self) -> Result<()> {
        match self {
            Self::Borrowed(_) => Ok(()),
            Self::Temporary(file) => {
                let temp_path = file.into_temp_path();
                let path = temp_path.to_path_buf();
                match temp_path.close() {
                    Ok(()) => debug!(path = %path.display(), "temporary key file removed"),
                    // Already gone counts as removed
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        debug!(path = %path.display(), "temporary key file already removed")
                    }
                    Err(e) => return Err(SshExecError::TempKeyRemove(e)),
                }
                Ok(())
            }
        }
    }
}

fn write_temporary(secret: &SecretString, dir: &Path) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_KEY_PREFIX)
        .tempfile_in(dir)
        .map_err(SshExecError::TempKeyCreate)?;

    // ssh rejects key files without a trailing newline
    let key = secret.expose_secret().as_bytes();
    let mut content = Zeroizing::new(Vec::with_capacity(key.len() + 1));
    content.extend_from_slice(key);
    content.push(b'\n');

    file.write_all(&content).map_err(SshExecError::TempKeyWrite)?;
    file.flush().map_err(SshExecError::TempKeyWrite)?;

    Ok(file)
}
