// Consistent exit codes for the outline CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error
//   3  = node not found or operation rejected
//   12 = persistence conflict (document changed underneath us)

use std::process;

use outline_store::{OutlineError, PersistError, Rejection};

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Rejected = 3,
    Conflict = 12,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(outline_err) = cause.downcast_ref::<OutlineError>() {
                return match outline_err {
                    OutlineError::Rejected(_) => Self::Rejected,
                    OutlineError::Persist(persist) => Self::from_persist(persist),
                };
            }
            if cause.downcast_ref::<Rejection>().is_some() {
                return Self::Rejected;
            }
            if let Some(persist) = cause.downcast_ref::<PersistError>() {
                return Self::from_persist(persist);
            }
            if cause.downcast_ref::<UsageError>().is_some() {
                return Self::Usage;
            }
        }
        Self::Error
    }

    fn from_persist(err: &PersistError) -> Self {
        match err {
            PersistError::Conflict { .. } => Self::Conflict,
            PersistError::MissingSource(_) => Self::Rejected,
            PersistError::Io { .. } | PersistError::Json(_) => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

/// Bad arguments that clap could not catch, e.g. malformed `--data` JSON.
#[derive(Debug)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UsageError {}
