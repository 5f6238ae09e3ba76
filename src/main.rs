//! Stencil's main application entry point and orchestration logic.
//! Handles command-line argument parsing, the install pipeline
//! (resolve -> copy/replace -> post-install) and result reporting.

use std::fs;
use std::io::Read;

use stencil::{
    cli::{get_args, Args},
    error::{default_error_handler, Error, Result},
    installer::install,
    model::{InstallResult, DEFINITION_FILE},
    parser::parse,
    prompt::DialoguerPrompter,
    resolver::{answers_from_json, resolve, ResolvedValues},
    runner::{confirm_steps_execution, run_install_steps},
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Off
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn read_presupplied_answers(from_stdin: bool) -> Result<ResolvedValues> {
    if !from_stdin {
        return Ok(ResolvedValues::new());
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    answers_from_json(&buffer)
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads and parses the template definition file
/// 2. Collects pre-supplied answers when requested
/// 3. Resolves template variables (prompting unless --defaults)
/// 4. Mirrors the template tree into the output directory with substitution
/// 5. Confirms and executes post-install commands
fn run(args: Args) -> Result<()> {
    if !args.template.is_dir() {
        return Err(Error::InvalidTemplate { path: args.template.display().to_string() });
    }

    let definition_path = args.template.join(DEFINITION_FILE);
    let content = fs::read_to_string(&definition_path).map_err(|_| Error::DefinitionNotFound {
        path: definition_path.display().to_string(),
    })?;
    let template = parse(&content);

    let presupplied = read_presupplied_answers(args.stdin)?;
    let prompter = DialoguerPrompter::new();

    let Some(values) = resolve(&template, &presupplied, &prompter, args.defaults)? else {
        println!("Installation cancelled.");
        return Ok(());
    };

    let stats =
        install(&args.template, &args.output_dir, &template.replacements, &values, args.force)?;

    let mut errors = Vec::new();
    if confirm_steps_execution(&prompter, &template.install_steps, args.skip_steps_check)? {
        if let Err(err) = run_install_steps(&template.install_steps, &args.output_dir) {
            log::warn!("{err}");
            errors.push(err.to_string());
        }
    }

    let result = InstallResult {
        success: true,
        output_path: args.output_dir.clone(),
        files_created: stats.files_created,
        replacements_applied: stats.files_changed,
        errors,
    };

    println!(
        "Created {} files ({} customized) in '{}'.",
        result.files_created,
        result.replacements_applied,
        result.output_path.display()
    );
    for warning in &result.errors {
        eprintln!("warning: {warning}");
    }

    Ok(())
}
