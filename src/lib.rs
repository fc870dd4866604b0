//! A small interactive command interpreter.
//!
//! A line of input is split on `;` into sub-commands and each sub-command on blanks into an
//! argument vector. `cd` and `quit` run inside the interpreter; anything else is started
//! with fork + exec. Every external command on a line runs concurrently with the others,
//! and the interpreter reaps all of them before it reads the next line.
//!
//! There is no quoting, piping, redirection, job control or variable expansion.
//!
//! The main entry point is [`Interpreter`]. [`Scheduler`] is the per-line core and can be
//! driven with any [`ProcessControl`] implementation.

mod builtin;
pub mod env;
pub mod error;
mod interpreter;
pub mod launcher;
pub mod prompt;
mod scheduler;
pub mod tokenizer;

#[cfg(test)]
mod test_support;

pub use builtin::Builtin;
pub use interpreter::{Config, Interpreter};
pub use launcher::{ChildHandle, ChildStatus, ForkExec, ProcessControl};
pub use scheduler::{BatchState, LoopSignal, MAX_CHILDREN, PendingBatch, Reaped, Scheduler};
