//! Implementation of `scout check`.

use std::process::ExitCode;

use scout_config::{ConfigWarning, discover_config_files};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, success, warning},
};

/// Exit codes for `scout check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings but is usable.
    pub const WARNINGS: ExitCode = ExitCode::FAILURE;
}

/// Validates the configuration and prints warnings with hints.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);

    println!("Checking configuration...");
    println!();

    if config_files.is_empty() {
        println!("{}", dim("No configuration files found, using defaults."));
        println!();
        println!("Run {} to create a configuration file.", subheader("scout init"));
    } else {
        println!("{}", subheader("Config files:"));
        for path in &config_files {
            println!("   {}", path.display());
        }
        println!();
    }

    let warnings = ctx.config.validate();
    if warnings.is_empty() {
        println!("{}", success("No issues found."));
        return exit_codes::OK;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    exit_codes::WARNINGS
}

/// Prints hints for resolving the reported warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|w| match w {
            ConfigWarning::EndpointNotHttp { .. } => {
                "Endpoints must be http:// or https:// base addresses."
            }
            ConfigWarning::ZeroTimeout { .. } => {
                "Timeouts are in milliseconds; use e.g. 10000 for ten seconds."
            }
            ConfigWarning::CycleShorterThanRequest { .. } => {
                "Raise [search] cycle_timeout above request_timeout so slow requests can finish."
            }
            ConfigWarning::UnknownReturnType { .. } => {
                "Set [search] return_type to scene, level or room."
            }
            ConfigWarning::EmptyIdField => {
                "Set [search] id_field to the record field that identifies a result."
            }
            ConfigWarning::ZeroLimit => "Set [search] limit to the number of records to print.",
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    println!("Hints:");
    for hint in hints {
        println!("   {}", dim(hint));
    }
}
