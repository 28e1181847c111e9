//! smallsh - a small interactive shell.
//!
//! A line is parsed into a [`command::Command`], its `$$` markers are expanded,
//! and it either runs as a built-in (`exit`, `cd`, `status`) or is forked and
//! exec'd by [`launch::launch`], in the foreground or the background.
//! SIGTSTP toggles foreground-only mode, during which `&` is ignored, and
//! background children are reported by the SIGCHLD listener once they finish.

pub mod builtin;
pub mod command;
pub mod config;
pub mod error;
pub mod expand;
pub mod jobmode;
pub mod launch;
pub mod prompt;
pub mod reap;
pub mod redirect;
pub mod shell;
pub mod signal;

pub use error::{ShErr, ShResult};
pub use shell::Shell;
