//! Post-install command execution.
//!
//! Declared install steps run strictly sequentially in the destination
//! directory through the platform shell; each must exit zero before the
//! next starts. The first failure stops the sequence and is reported as a
//! warning on the overall result, never as a retroactive install failure.

use crate::error::{Error, Result};
use crate::generator::progress_message;
use crate::model::InstallStep;
use crate::prompt::Prompter;
use log::info;
use std::path::Path;
use std::process::Command;

/// Asks the user to confirm running the template's declared install steps.
/// A template can execute arbitrary shell commands, so this is never
/// implicit unless `skip_check` is set. Cancelling counts as declining.
pub fn confirm_steps_execution(
    prompter: &dyn Prompter,
    steps: &[InstallStep],
    skip_check: bool,
) -> Result<bool> {
    if steps.is_empty() {
        return Ok(false);
    }
    if skip_check {
        return Ok(true);
    }
    let answer = prompter.confirm(
        "This template declares post-install commands that will run on your system. Execute them?",
        false,
    )?;
    Ok(answer.unwrap_or(false))
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut shell = Command::new("sh");
    shell.arg("-c").arg(command);
    shell
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut shell = Command::new("cmd");
    shell.arg("/C").arg(command);
    shell
}

fn run_command(command: &str, working_dir: &Path) -> Result<()> {
    let status = shell_command(command).current_dir(working_dir).status()?;
    if !status.success() {
        return Err(Error::CommandError {
            command: command.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Runs install steps one at a time in `working_dir`, stopping at the first
/// non-zero exit.
pub fn run_install_steps(steps: &[InstallStep], working_dir: &Path) -> Result<()> {
    for step in steps {
        let message = progress_message(&step.command);
        info!("{message}");
        println!("{message}");
        run_command(&step.command, working_dir)?;
    }
    Ok(())
}
