//! Implementation of `scout status`.

use std::process::ExitCode;

use scout_config::{discover_config_files, is_global_config};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Shows configuration files, endpoints, timeouts, feature toggles, and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    let config_files = discover_config_files(&ctx.cwd);
    println!("{}", subheader("Config files:"));
    if config_files.is_empty() {
        println!("   {}", dim("(none, using defaults)"));
    } else {
        for path in &config_files {
            let scope = if is_global_config(path) { "global" } else { "local" };
            println!("   {} {}", path.display(), dim(&format!("({scope})")));
        }
    }
    println!();

    println!("{}", subheader("Endpoints:"));
    println!("   data API        {}", config.endpoints.database_url);
    println!("   interpretation  {}", config.endpoints.nlp_url);
    println!("   images          {}", config.endpoints.img_url);
    println!();

    println!("{}", subheader("Search:"));
    println!(
        "   request timeout {}ms",
        config.search.request_timeout.as_millis()
    );
    println!(
        "   cycle timeout   {}ms",
        config.search.cycle_timeout.as_millis()
    );
    println!("   return type     {}", config.search.return_type);
    println!("   id field        {}", config.search.id_field);
    println!("   limit           {}", config.search.limit);
    println!();

    println!("{}", subheader("Features:"));
    println!("   autosuggest     {}", on_off(config.features.autosuggest));
    println!("   visualization   {}", on_off(config.features.visualization));
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();
    println!("{}", dim("Run 'scout check' for hints."));

    ExitCode::FAILURE
}

/// Renders a toggle.
fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
