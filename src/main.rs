use anyhow::Result;
use argh::FromArgs;
use myshell::prompt::DEFAULT_PROMPT_SYMBOL;
use myshell::{Config, Interpreter};
use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// Interactive shell: runs `;`-separated commands concurrently and waits for all of them
/// before prompting again.
struct Args {
    #[argh(option, default = "DEFAULT_PROMPT_SYMBOL.to_owned()")]
    /// text printed after the working directory in the prompt.
    prompt: String,

    #[argh(switch)]
    /// read commands from standard input without line editing (the default when standard
    /// input is not a terminal).
    plain: bool,

    #[argh(switch, short = 'q')]
    /// do not print the prompt or the exit message.
    quiet: bool,
}

fn main() -> Result<()> {
    // Respects RUST_LOG, defaults to warn.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Args = argh::from_env();
    let mut interpreter = Interpreter::new(Config {
        prompt_symbol: args.prompt,
        chatty: !args.quiet,
    });

    let stdin = io::stdin();
    if args.plain || !stdin.is_terminal() {
        interpreter.run_plain(stdin.lock(), io::stdout().lock())
    } else {
        interpreter.repl()
    }
}
