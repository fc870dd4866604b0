use crate::env::Environment;
use crate::error::BuiltinError;
use crate::scheduler::LoopSignal;
use std::path::Path;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run directly in the interpreter's process and never spawn a child. They are
/// recognized by their first argument before the launcher is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Change the working directory of the interpreter, and so of every later child.
    Cd,
    /// Leave the interpreter once the children already started on this line are reaped.
    Quit,
}

impl Builtin {
    const ALL: [Builtin; 2] = [Builtin::Cd, Builtin::Quit];

    /// Find the builtin reserved under `name`, if any.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Canonical name of the command, e.g. "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Quit => "quit",
        }
    }

    /// Run the builtin with its full argument vector (`args[0]` is the command name).
    ///
    /// `quit` only signals termination; draining the batch is the scheduler's job.
    pub fn execute(self, args: &[&str], env: &mut Environment) -> Result<LoopSignal, BuiltinError> {
        debug!(builtin = self.name(), ?args, "running builtin");
        match self {
            Builtin::Cd => {
                change_directory(args.get(1..).unwrap_or_default(), env)?;
                Ok(LoopSignal::Continue)
            }
            // Extra arguments are accepted and ignored.
            Builtin::Quit => Ok(LoopSignal::Terminate),
        }
    }
}

/// `cd [dir]`: no operand means `$HOME`; the operand is used verbatim, with no `~` or
/// variable expansion.
fn change_directory(operands: &[&str], env: &mut Environment) -> Result<(), BuiltinError> {
    let target = match operands {
        [] => env.get_var("HOME").ok_or(BuiltinError::MissingHome)?.to_owned(),
        [dir] => (*dir).to_owned(),
        _ => return Err(BuiltinError::TooManyArguments),
    };
    let target = Path::new(&target);
    env.set_current_dir(target).map_err(|source| BuiltinError::ChangeDirectoryFailed {
        target: target.to_path_buf(),
        source,
    })
}
