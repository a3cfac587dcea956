// error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("pipe: {0}")]
    Pipe(#[source] nix::Error),

    #[error("waitpid: {0}")]
    Wait(#[source] nix::Error),

    #[error("No commands in history")]
    NoHistory,

    #[error("expected argument to \"cd\"")]
    CdMissingArgument,

    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error: expected a file name after `{0}`")]
    MissingRedirectTarget(String),

    #[error("syntax error: {0}")]
    Pipeline(&'static str),

    #[error("{0}: argument contains a NUL byte")]
    NulByte(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Fatal errors end the interpreter; everything else is reported and the
    /// loop carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Fork(_) | ShellError::Pipe(_))
    }
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
