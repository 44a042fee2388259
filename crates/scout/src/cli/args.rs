//! Clap argument definitions for the `scout` CLI.

use clap::{ArgAction, Args, Parser, Subcommand};
use scout_results::EntityType;
use url::Url;

/// Parses a service base address, ensuring the path ends in `/` so endpoints join beneath it.
fn parse_base_url(s: &str) -> Result<Url, String> {
    let mut url = Url::parse(s.trim()).map_err(|e| format!("invalid URL '{s}': {e}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("'{s}' cannot be used as a base address"));
    }
    if !url.path().ends_with('/') {
        let normalized = format!("{}/", url.path());
        url.set_path(&normalized);
    }
    Ok(url)
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "scout", version)]
#[command(about = "Natural-language search over house scenes, levels and rooms")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments for `scout search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Free-text query; multiple words are joined with spaces
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Entity type to list: scene, level or room [default: scene]
    #[arg(short = 't', long = "type")]
    pub return_type: Option<EntityType>,

    /// Maximum records to print per entity type [default: 10]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print the final search state as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the resolved calls and the URLs they map to, without dispatching them
    #[arg(long)]
    pub explain: bool,

    /// Data API base address, overriding configuration
    #[arg(long, value_parser = parse_base_url)]
    pub database_url: Option<Url>,

    /// Interpretation service base address, overriding configuration
    #[arg(long, value_parser = parse_base_url)]
    pub nlp_url: Option<Url>,
}

impl SearchCommand {
    /// The query words joined into one string.
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

/// Arguments for `scout init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.scout.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `scout` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one search and print the merged results
    #[command(after_help = "\
EXAMPLES:
  scout search two bedroom house with a piano
  scout search -t room kitchen with an island
  scout search --json modern loft
  scout search --explain houses without a garage")]
    Search(SearchCommand),

    /// Initialize scout configuration in current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,

    /// Validate configuration and diagnose issues
    Check,

    /// Show configuration files, endpoints and feature toggles
    Status,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use scout_config::SearchSettings;

    use super::*;

    /// Gets help text for a subcommand's argument.
    fn get_arg_help(cmd: &clap::Command, subcmd: &str, arg: &str) -> String {
        cmd.get_subcommands()
            .find(|c| c.get_name() == subcmd)
            .and_then(|c| c.get_arguments().find(|a| a.get_id() == arg))
            .and_then(|a| a.get_help().map(|h| h.to_string()))
            .unwrap_or_default()
    }

    /// Help text defaults must track the configuration defaults.
    #[test]
    fn cli_help_defaults_match_config() {
        let cmd = Cli::command();
        let defaults = SearchSettings::default();

        let limit_help = get_arg_help(&cmd, "search", "limit");
        assert!(
            limit_help.contains(&format!("[default: {}]", defaults.limit)),
            "search --limit help should contain default {}: {limit_help}",
            defaults.limit
        );

        let type_help = get_arg_help(&cmd, "search", "return_type");
        assert!(
            type_help.contains(&format!("[default: {}]", defaults.return_type)),
            "search --type help should contain default {}: {type_help}",
            defaults.return_type
        );
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_words_are_joined() {
        let cli =
            Cli::try_parse_from(["scout", "search", "two", "bedrooms", "-t", "rooms"]).unwrap();
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.query_text(), "two bedrooms");
        assert_eq!(cmd.return_type, Some(EntityType::Room));
    }

    #[test]
    fn base_urls_gain_trailing_slash() {
        assert_eq!(
            parse_base_url("http://db.test:5000/v1").unwrap().as_str(),
            "http://db.test:5000/v1/"
        );
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }
}
