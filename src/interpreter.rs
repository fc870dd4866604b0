use crate::env::Environment;
use crate::launcher::{ForkExec, ProcessControl};
use crate::prompt::{self, DEFAULT_PROMPT_SYMBOL};
use crate::scheduler::{LoopSignal, Scheduler};
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Settings for the interactive loop.
#[derive(Debug, Clone)]
pub struct Config {
    /// Text printed after the working directory in the prompt.
    pub prompt_symbol: String,
    /// Print the prompt and the exit message.
    pub chatty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_symbol: DEFAULT_PROMPT_SYMBOL.to_owned(),
            chatty: true,
        }
    }
}

/// A minimal shell: reads lines, hands each one to the [`Scheduler`], and stops on `quit`
/// or end of input.
///
/// Example
/// ```no_run
/// use myshell::{Interpreter, LoopSignal};
/// let mut sh = Interpreter::default();
/// assert_eq!(sh.process_line("echo hello ; echo world"), LoopSignal::Continue);
/// assert_eq!(sh.process_line("quit"), LoopSignal::Terminate);
/// ```
pub struct Interpreter<P: ProcessControl = ForkExec> {
    env: Environment,
    scheduler: Scheduler<P>,
    config: Config,
}

impl Interpreter<ForkExec> {
    /// Create an interpreter that launches real processes and sees the real environment.
    pub fn new(config: Config) -> Self {
        Self::with_control(Environment::from_process(), ForkExec, config)
    }
}

impl Default for Interpreter<ForkExec> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<P: ProcessControl> Interpreter<P> {
    pub fn with_control(env: Environment, control: P, config: Config) -> Self {
        Self {
            env,
            scheduler: Scheduler::new(control),
            config,
        }
    }

    /// Process one line; diagnostics go to standard error.
    pub fn process_line(&mut self, line: &str) -> LoopSignal {
        if line.is_empty() {
            return LoopSignal::Continue;
        }
        debug!(line, "processing line");
        let mut stderr = io::stderr().lock();
        self.scheduler.process_line(line, &mut self.env, &mut stderr)
    }

    /// Current prompt string.
    pub fn prompt(&self) -> String {
        prompt::render(&self.env, &self.config.prompt_symbol, &mut io::stderr())
    }

    /// Read-eval loop on a terminal, with line editing.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new().context("failed to initialise line editor")?;

        loop {
            let prompt = if self.config.chatty { self.prompt() } else { String::new() };
            match rl.readline(&prompt) {
                Ok(line) => {
                    if self.process_line(&line) == LoopSignal::Terminate {
                        self.farewell(&mut io::stdout())?;
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(err).context("failed to read input line"),
            }
        }

        Ok(())
    }

    /// Read-eval loop over any line source, without line editing. Used when standard input
    /// is not a terminal.
    pub fn run_plain(&mut self, mut input: impl BufRead, mut output: impl Write) -> Result<()> {
        let mut line = Vec::new();
        loop {
            if self.config.chatty {
                write!(output, "{}", self.prompt())?;
            }
            output.flush()?;

            line.clear();
            let read = input
                .read_until(b'\n', &mut line)
                .context("failed to read input line")?;
            if read == 0 {
                if self.config.chatty {
                    writeln!(output)?;
                }
                return Ok(());
            }

            // Bytes that aren't UTF-8 become U+FFFD; the rest of the line still runs.
            let bytes = line.strip_suffix(b"\n".as_slice()).unwrap_or(&line);
            let text = String::from_utf8_lossy(bytes);
            if self.process_line(&text) == LoopSignal::Terminate {
                return self.farewell(&mut output);
            }
        }
    }

    fn farewell(&self, output: &mut dyn Write) -> Result<()> {
        if self.config.chatty {
            writeln!(output, "Exiting myshell.")?;
        }
        Ok(())
    }
}
