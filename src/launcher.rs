use crate::error::{ExecError, SpawnError};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Identity of a spawned child that has not been reaped yet.
///
/// Handles are neither `Clone` nor `Copy`: waiting consumes the handle, so a
/// child can be waited for at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct ChildHandle(Pid);

impl ChildHandle {
    pub fn new(pid: Pid) -> Self {
        Self(pid)
    }

    pub fn pid(&self) -> Pid {
        self.0
    }
}

impl fmt::Display for ChildHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a reaped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Exited(i32),
    Signaled(i32),
}

impl ChildStatus {
    pub fn success(self) -> bool {
        self == ChildStatus::Exited(0)
    }

    /// Converts a terminal wait status; stop/continue notifications yield `None`.
    fn from_wait(status: WaitStatus) -> Option<(Pid, Self)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, ChildStatus::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => {
                Some((pid, ChildStatus::Signaled(signal as i32)))
            }
            _ => None,
        }
    }
}

/// Process creation and reaping, as seen by the scheduler.
///
/// [`ForkExec`] is the real implementation. The trait exists so the scheduler's ordering
/// and backpressure rules can be driven without touching the process table.
pub trait ProcessControl {
    /// Start `argv[0]` with `argv` as its argument list.
    fn launch(&mut self, argv: &[&str]) -> Result<ChildHandle, SpawnError>;

    /// Block until `child` terminates.
    fn wait(&mut self, child: ChildHandle) -> Result<ChildStatus, Errno>;

    /// Block until any child terminates and report which one it was.
    fn wait_any(&mut self) -> Result<(Pid, ChildStatus), Errno>;
}

/// Launches programs by forking the interpreter and replacing the child's image with
/// `execvp`, so `PATH` lookup, the environment and the working directory all come from
/// the interpreter process.
#[derive(Debug, Default)]
pub struct ForkExec;

impl ProcessControl for ForkExec {
    fn launch(&mut self, argv: &[&str]) -> Result<ChildHandle, SpawnError> {
        let program = *argv.first().ok_or(SpawnError::EmptyCommand)?;
        // Everything the child needs is built before forking; after fork it only execs,
        // writes and exits.
        let args = argv
            .iter()
            .map(|arg| {
                CString::new(*arg).map_err(|_| SpawnError::InvalidArgument(program.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let _ = io::stdout().flush();

        // SAFETY: the child branch calls only execvp, write(2) and _exit(2).
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!(pid = %child, program, "spawned child");
                Ok(ChildHandle(child))
            }
            Ok(ForkResult::Child) => exec_or_die(program, &args),
            Err(errno) => Err(SpawnError::ResourceExhausted(errno)),
        }
    }

    fn wait(&mut self, child: ChildHandle) -> Result<ChildStatus, Errno> {
        loop {
            match wait::waitpid(child.0, None) {
                Ok(status) => {
                    if let Some((_, status)) = ChildStatus::from_wait(status) {
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => {}
                Err(errno) => return Err(errno),
            }
            trace!(pid = %child, "wait interrupted, retrying");
        }
    }

    fn wait_any(&mut self) -> Result<(Pid, ChildStatus), Errno> {
        loop {
            match wait::wait() {
                Ok(status) => {
                    if let Some(reaped) = ChildStatus::from_wait(status) {
                        return Ok(reaped);
                    }
                }
                Err(Errno::EINTR) => {}
                Err(errno) => return Err(errno),
            }
        }
    }
}

/// Runs in the forked child. Never returns into shell logic: either the program image is
/// replaced or the child exits with a failure status.
fn exec_or_die(program: &str, args: &[CString]) -> ! {
    let errno = match unistd::execvp(&args[0], args) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    let error = ExecError::from_errno(errno);
    let stderr = io::stderr();
    let parts: [&[u8]; 5] = [
        b"myshell: ",
        program.as_bytes(),
        b": ",
        error.message().as_bytes(),
        b"\n",
    ];
    for part in parts {
        let _ = unistd::write(&stderr, part);
    }
    // SAFETY: _exit skips atexit handlers and stdio flushing, which belong to the parent.
    unsafe { libc::_exit(error.exit_code()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RestoreCwd, cwd_lock};

    fn run(argv: &[&str]) -> ChildStatus {
        let mut launcher = ForkExec;
        let child = launcher.launch(argv).expect("launch");
        launcher.wait(child).expect("wait")
    }

    #[test]
    fn test_true_exits_successfully() {
        assert!(run(&["true"]).success());
    }

    #[test]
    fn test_arguments_reach_the_program() {
        assert_eq!(run(&["sh", "-c", "exit 3"]), ChildStatus::Exited(3));
    }

    #[test]
    fn test_missing_program_exits_non_zero() {
        assert_eq!(
            run(&["not-a-real-binary-2b9c"]),
            ChildStatus::Exited(ExecError::ProgramNotFound.exit_code())
        );
    }

    #[test]
    fn test_non_executable_file_exits_non_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("script");
        std::fs::write(&script, b"#!/bin/sh\nexit 0\n").unwrap();
        let status = run(&[script.to_str().unwrap()]);
        assert_eq!(status, ChildStatus::Exited(ExecError::NotExecutable.exit_code()));
    }

    #[test]
    fn test_empty_command_is_a_contract_violation() {
        assert_eq!(ForkExec.launch(&[]), Err(SpawnError::EmptyCommand));
    }

    #[test]
    fn test_interior_nul_is_rejected_before_forking() {
        assert_eq!(
            ForkExec.launch(&["echo", "a\0b"]),
            Err(SpawnError::InvalidArgument("echo".to_owned()))
        );
    }

    #[test]
    fn test_child_inherits_working_directory() {
        let _guard = cwd_lock();
        let _restore = RestoreCwd::capture();
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        assert!(run(&["touch", "marker"]).success());

        assert!(tmp.path().join("marker").exists());
    }
}
