use thiserror::Error;

pub type Result<T> = std::result::Result<T, SshExecError>;

#[derive(Debug, Error)]
pub enum SshExecError {
    #[error("key path nor raw key are provided")]
    MissingKey,

    #[error("command is not provided")]
    MissingCommand,

    #[error("could not create temporary ssh key file: {0}")]
    TempKeyCreate(#[source] std::io::Error),

    #[error("could not write ssh key content: {0}")]
    TempKeyWrite(#[source] std::io::Error),

    #[error("could not remove temporary key file: {0}")]
    TempKeyRemove(#[source] std::io::Error),

    #[error("could not link stdin to remote ssh")]
    StdinUnavailable,

    #[error("could not start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
