//! Implementation of `scout search`.

use std::process::ExitCode;

use scout_config::Config;
use scout_search::{Interpretation, Interpreter, data_url, http_controller};
use tokio::runtime::Runtime;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{dim, output_search, subheader},
};

/// Runs one search cycle and prints the merged results.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let mut config = ctx.config.clone();
    if let Some(url) = &cmd.database_url {
        config.endpoints.database_url = url.clone();
    }
    if let Some(url) = &cmd.nlp_url {
        config.endpoints.nlp_url = url.clone();
    }
    let limit = cmd.limit.unwrap_or(config.search.limit);
    let query = cmd.query_text();

    let runtime = match ctx.runtime() {
        Ok(runtime) => runtime,
        Err(code) => return code,
    };

    let controller = match http_controller(&config) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(entity) = cmd.return_type {
        controller.set_return_type(entity);
    }

    if cmd.explain {
        return explain(&runtime, controller.interpreter(), &config, &query);
    }

    let outcome = runtime.block_on(controller.search_for(query));
    output_search(&controller.snapshot(), &outcome, limit, cmd.json)
}

/// Resolves the query and prints the calls it maps to, without dispatching them.
fn explain(
    runtime: &Runtime,
    interpreter: &impl Interpreter,
    config: &Config,
    query: &str,
) -> ExitCode {
    println!("{}", subheader("Query:"));
    println!("   {query}");
    println!();

    let calls = match runtime.block_on(interpreter.resolve(query)) {
        Ok(Interpretation::Resolved(calls)) => calls,
        Ok(Interpretation::NotFound) => {
            println!("{}", dim("The interpretation service could not resolve this query."));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: interpretation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", subheader(&format!("Resolved calls ({}):", calls.len())));
    if calls.is_empty() {
        println!("   {}", dim("(none)"));
    }
    for call in &calls {
        let mode = if call.to_include { "+" } else { "-" };
        match data_url(&config.endpoints.database_url, call) {
            Ok(url) => println!("   {mode} {url}"),
            Err(e) => println!("   {mode} {} {}", call.endpoint, dim(&format!("({e})"))),
        }
    }
    println!();
    println!("{}", dim("+ selects records, - excludes them from the merged list"));

    ExitCode::SUCCESS
}
