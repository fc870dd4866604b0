use std::collections::HashMap;
use std::env as stdenv;
use std::io;
use std::path::{Path, PathBuf};

/// The interpreter's view of process-wide state.
///
/// The working directory is global to the process: `cd` is the only thing that changes it,
/// every child spawned afterwards inherits it, and the prompt reads it. [`Environment`]
/// funnels those accesses through one place instead of scattering `std::env` calls.
///
/// Variables are snapshotted once at startup. Only `HOME` is ever looked up; children get
/// the real process environment through exec.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process variables.
    pub fn from_process() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Build an environment from an explicit set of variables.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Current working directory of the whole process.
    pub fn current_dir(&self) -> io::Result<PathBuf> {
        stdenv::current_dir()
    }

    /// Change the working directory of the whole process.
    pub fn set_current_dir(&mut self, target: &Path) -> io::Result<()> {
        stdenv::set_current_dir(target)
    }
}
