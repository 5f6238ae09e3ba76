//! User input and interaction handling.
//!
//! Variable resolution and the install flow depend only on the [`Prompter`]
//! trait; the dialoguer-backed implementation lives here so tests can swap
//! in a scripted fake. Every primitive can signal cancellation, returned as
//! `Ok(None)`.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input, Select};
use std::io;

/// Request/response surface for interactive prompts.
pub trait Prompter {
    /// Free-text input with a default shown as placeholder and fallback.
    /// Returns `Ok(None)` if the user cancelled.
    fn input(&self, question: &str, default: &str) -> Result<Option<String>>;

    /// Yes/no confirmation. Returns `Ok(None)` if the user cancelled.
    fn confirm(&self, question: &str, default: bool) -> Result<Option<bool>>;

    /// Single choice among items, returning the selected index.
    /// Returns `Ok(None)` if the user cancelled.
    fn select(&self, question: &str, items: &[String], default: usize) -> Result<Option<usize>>;
}

/// Interactive prompts rendered with dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

/// Maps a dialoguer error onto the cancellation contract: an interrupted
/// read means the user aborted, anything else is a real IO failure.
fn map_dialoguer_error<T>(err: dialoguer::Error) -> Result<Option<T>> {
    match err {
        dialoguer::Error::IO(io_err) if io_err.kind() == io::ErrorKind::Interrupted => Ok(None),
        dialoguer::Error::IO(io_err) => Err(Error::IoError(io_err)),
    }
}

impl Prompter for DialoguerPrompter {
    fn input(&self, question: &str, default: &str) -> Result<Option<String>> {
        let mut input = Input::<String>::new().with_prompt(question).allow_empty(true);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        match input.interact_text() {
            Ok(value) => Ok(Some(value)),
            Err(err) => map_dialoguer_error(err),
        }
    }

    fn confirm(&self, question: &str, default: bool) -> Result<Option<bool>> {
        match Confirm::new().with_prompt(question).default(default).interact_opt() {
            Ok(answer) => Ok(answer),
            Err(err) => map_dialoguer_error(err),
        }
    }

    fn select(&self, question: &str, items: &[String], default: usize) -> Result<Option<usize>> {
        match Select::new().with_prompt(question).items(items).default(default).interact_opt() {
            Ok(answer) => Ok(answer),
            Err(err) => map_dialoguer_error(err),
        }
    }
}
