//! Helpers shared by unit tests.
//!
//! The working directory belongs to the whole test process, so every test that reads or
//! changes it holds [`cwd_lock`] for its duration.

use std::env as stdenv;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

static CWD_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Puts the working directory back where it was when dropped.
pub(crate) struct RestoreCwd(PathBuf);

impl RestoreCwd {
    pub(crate) fn capture() -> Self {
        Self(stdenv::current_dir().expect("cwd"))
    }
}

impl Drop for RestoreCwd {
    fn drop(&mut self) {
        let _ = stdenv::set_current_dir(&self.0);
    }
}
