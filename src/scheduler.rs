//! Execution of one input line.
//!
//! A line goes `Idle → Dispatching → Draining → Idle`. While dispatching, every
//! sub-command is handled left to right: builtins run in place, everything else is
//! launched and its handle joins the [`PendingBatch`]. Children from the same line run
//! concurrently. Before [`Scheduler::process_line`] returns, the batch is drained, so the
//! next line is never read while a child of the current one is still alive.

use crate::builtin::Builtin;
use crate::env::Environment;
use crate::launcher::{ChildHandle, ChildStatus, ForkExec, ProcessControl};
use crate::tokenizer::{split_arguments, split_commands};
use nix::errno::Errno;
use nix::unistd::Pid;
use std::fmt::Display;
use std::io::Write;
use tracing::{debug, trace, warn};

/// Maximum number of children tracked at once for a single line.
///
/// Equal to `MAX_COMMANDS`, so a single line never reaches the backpressure wait in `admit`.
pub const MAX_CHILDREN: usize = 10;

/// What the interactive loop should do after a line has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Dispatching,
    Draining,
}

/// Children spawned for the current line that have not been reaped yet, in spawn order.
#[derive(Debug, Default)]
pub struct PendingBatch {
    handles: Vec<ChildHandle>,
}

impl PendingBatch {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn is_full(&self) -> bool {
        self.handles.len() >= MAX_CHILDREN
    }

    fn push(&mut self, child: ChildHandle) {
        self.handles.push(child);
    }

    /// Forget a child that was reaped by a wait-for-any.
    fn remove(&mut self, pid: Pid) -> Option<ChildHandle> {
        let index = self.handles.iter().position(|handle| handle.pid() == pid)?;
        Some(self.handles.remove(index))
    }

    fn take(&mut self) -> Vec<ChildHandle> {
        std::mem::take(&mut self.handles)
    }
}

/// Outcome of waiting for one child during a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub status: Result<ChildStatus, Errno>,
}

/// Runs input lines: builtin dispatch, concurrent launch, and the final barrier wait.
pub struct Scheduler<P: ProcessControl = ForkExec> {
    control: P,
    batch: PendingBatch,
    state: BatchState,
}

impl Default for Scheduler<ForkExec> {
    fn default() -> Self {
        Self::new(ForkExec)
    }
}

impl<P: ProcessControl> Scheduler<P> {
    pub fn new(control: P) -> Self {
        Self {
            control,
            batch: PendingBatch::default(),
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn pending(&self) -> &PendingBatch {
        &self.batch
    }

    pub fn control(&self) -> &P {
        &self.control
    }

    /// Process one line of input, already stripped of its newline.
    ///
    /// Errors never escape: each one is written to `diagnostics` and processing continues
    /// with the next sub-command, or with the next line when the line itself could not be
    /// split. Only `quit` yields [`LoopSignal::Terminate`], and only after the children
    /// already spawned on this line have been reaped.
    pub fn process_line(
        &mut self,
        line: &str,
        env: &mut Environment,
        diagnostics: &mut dyn Write,
    ) -> LoopSignal {
        let commands = match split_commands(line) {
            Ok(commands) => commands,
            Err(err) => {
                report(diagnostics, err);
                return LoopSignal::Continue;
            }
        };

        self.enter(BatchState::Dispatching);
        let signal = self.dispatch(&commands, env, diagnostics);
        for reaped in self.drain() {
            debug!(pid = %reaped.pid, status = ?reaped.status, "reaped child");
        }
        signal
    }

    fn dispatch(
        &mut self,
        commands: &[&str],
        env: &mut Environment,
        diagnostics: &mut dyn Write,
    ) -> LoopSignal {
        for segment in commands {
            let args = match split_arguments(segment) {
                Ok(args) => args,
                Err(err) => {
                    report(diagnostics, format_args!("{err}: {segment}"));
                    continue;
                }
            };
            let Some(&name) = args.first() else {
                continue;
            };

            if let Some(builtin) = Builtin::lookup(name) {
                match builtin.execute(&args, env) {
                    Ok(LoopSignal::Terminate) => return LoopSignal::Terminate,
                    Ok(LoopSignal::Continue) => {}
                    Err(err) => report(diagnostics, err),
                }
                continue;
            }

            match self.control.launch(&args) {
                Ok(child) => self.admit(child, diagnostics),
                Err(err) => report(diagnostics, err),
            }
        }
        LoopSignal::Continue
    }

    /// Add a freshly spawned child to the batch. When the batch is already at capacity,
    /// one child (whichever finishes first) is reaped before the new one is accepted.
    fn admit(&mut self, child: ChildHandle, diagnostics: &mut dyn Write) {
        if self.batch.is_full() {
            report(diagnostics, "too many concurrent commands, waiting...");
            match self.control.wait_any() {
                Ok((pid, status)) if pid == child.pid() => {
                    debug!(%pid, ?status, "new child finished during backpressure wait");
                    return;
                }
                Ok((pid, status)) => {
                    debug!(%pid, ?status, "reaped child during backpressure wait");
                    if self.batch.remove(pid).is_none() {
                        warn!(%pid, "reaped a child that was not in the pending batch");
                    }
                }
                Err(errno) => warn!(%errno, "backpressure wait failed"),
            }
        }
        trace!(pid = %child, pending = self.batch.len() + 1, "tracking child");
        self.batch.push(child);
    }

    /// Wait for every pending child in spawn order and return to `Idle`.
    ///
    /// Exit statuses are returned to the caller rather than reported; the interactive
    /// loop only logs them.
    pub fn drain(&mut self) -> Vec<Reaped> {
        self.enter(BatchState::Draining);
        let reaped = self
            .batch
            .take()
            .into_iter()
            .map(|child| {
                let pid = child.pid();
                let status = self.control.wait(child);
                if let Err(errno) = status {
                    warn!(%pid, %errno, "wait for child failed");
                }
                Reaped { pid, status }
            })
            .collect();
        self.enter(BatchState::Idle);
        reaped
    }

    fn enter(&mut self, state: BatchState) {
        trace!(from = ?self.state, to = ?state, "batch state");
        self.state = state;
    }
}

fn report(diagnostics: &mut dyn Write, message: impl Display) {
    let _ = writeln!(diagnostics, "myshell: {message}");
}
