//! Error taxonomy for the interpreter.
//!
//! None of these errors end the interactive loop. Each one is reported on the
//! diagnostics stream and the scheduler moves on to the next sub-command (or the
//! next line, for [`ParseError::TooManyCommands`]).

use crate::tokenizer::{MAX_ARG_SLOTS, MAX_COMMANDS};
use nix::errno::Errno;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised by the tokenizer when a line or segment exceeds a fixed bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("too many commands on one line (max {})", MAX_COMMANDS)]
    TooManyCommands,
    #[error("too many arguments for command (max {})", MAX_ARG_SLOTS)]
    TooManyArguments,
}

/// Failures of the `cd` built-in.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("cd: too many arguments")]
    TooManyArguments,
    #[error("cd: HOME environment variable not set")]
    MissingHome,
    #[error("cd: {}: {source}", .target.display())]
    ChangeDirectoryFailed {
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures observed by the parent while trying to start a child.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("fork failed: {0}")]
    ResourceExhausted(Errno),
    #[error("attempted to execute an empty command")]
    EmptyCommand,
    #[error("{0}: argument contains an interior NUL byte")]
    InvalidArgument(String),
}

/// Failure to replace the child's program image. Only ever constructed inside
/// the forked child, right before it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("command not found")]
    ProgramNotFound,
    #[error("permission denied")]
    NotExecutable,
    #[error("{}", .0.desc())]
    Failed(Errno),
}

impl ExecError {
    pub fn from_errno(errno: Errno) -> Self {
        match errno {
            Errno::ENOENT | Errno::ENOTDIR => ExecError::ProgramNotFound,
            Errno::EACCES | Errno::ENOEXEC | Errno::EISDIR => ExecError::NotExecutable,
            other => ExecError::Failed(other),
        }
    }

    /// Exit status of a child whose exec failed, following the usual shell
    /// convention: 127 for a missing program, 126 for one that can't be run.
    pub fn exit_code(self) -> i32 {
        match self {
            ExecError::ProgramNotFound => 127,
            ExecError::NotExecutable | ExecError::Failed(_) => 126,
        }
    }

    /// Static description, safe to use between fork and exit.
    pub fn message(self) -> &'static str {
        match self {
            ExecError::ProgramNotFound => "command not found",
            ExecError::NotExecutable => "permission denied",
            ExecError::Failed(errno) => errno.desc(),
        }
    }
}
