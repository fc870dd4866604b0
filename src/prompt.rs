use crate::env::Environment;
use std::io::Write;

/// Suffix printed after the working directory when no other is configured.
pub const DEFAULT_PROMPT_SYMBOL: &str = " myshell> ";

/// Marker shown in place of the working directory when it can't be read.
const UNKNOWN_DIR: &str = "?";

/// Build the prompt string: the current working directory followed by `symbol`.
///
/// A working directory that can't be read (for instance because it was removed from under
/// the shell) degrades to `?` and a diagnostic instead of failing the loop.
pub fn render(env: &Environment, symbol: &str, diagnostics: &mut dyn Write) -> String {
    match env.current_dir() {
        Ok(cwd) => format!("{}{symbol}", cwd.display()),
        Err(err) => {
            let _ = writeln!(diagnostics, "myshell: getcwd error: {err}");
            format!("{UNKNOWN_DIR}{symbol}")
        }
    }
}
