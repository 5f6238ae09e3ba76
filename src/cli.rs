//! Command-line interface implementation for Stencil.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for Stencil.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stencil: install a templated codebase with your own values", long_about = None)]
pub struct Args {
    /// Path to the template directory (must contain a template.stencil file)
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Force overwrite of existing output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read pre-supplied answers as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Resolve variables from their declared defaults without prompting
    #[arg(short, long)]
    pub defaults: bool,

    /// Skip the confirmation prompt before executing post-install commands.
    /// The template's declared commands will run without asking first.
    #[arg(long)]
    pub skip_steps_check: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
