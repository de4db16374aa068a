//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Output format for decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Selected playbook, flags and follow-ups
    Summary,
    /// Every layer's opinion, conflicts and events
    Full,
    /// JSON output
    Json,
}

/// CLI arguments for playbook-arbiter
#[derive(Parser, Debug)]
#[command(name = "playbook-arbiter")]
#[command(author, version, about = "Reconcile governance layers into one playbook decision")]
#[command(long_about = r#"
playbook-arbiter routes a request to a playbook and asks every configured
governance layer (preflight, node, cost, memory, policy) for its opinion.
The opinions are reconciled into a single decision that is persisted to the
decision log, with follow-up events for branch exploration or human review.

Configuration files are loaded from (in priority order):
1. ARBITER_* environment variables (ARBITER_COORDINATOR__MAX_ID_ATTEMPTS=5)
2. --config <path>     Explicit config file
3. ./arbiter.toml      Project-level config
4. ~/.config/playbook-arbiter/config.toml   Global config

Example:
  playbook-arbiter decide "Draft a blog post about Rust" --workspace ws-1 --context topic=rust
  playbook-arbiter show 3f2b9c1e-...
  playbook-arbiter replay 3f2b9c1e-... -o json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make, persist and announce a decision for a request
    Decide {
        /// The user request to route
        input: String,

        /// Workspace the request belongs to
        #[arg(short, long, default_value = "default")]
        workspace: String,

        /// Project within the workspace
        #[arg(short, long)]
        project: Option<String>,

        /// Requesting user
        #[arg(short, long)]
        user: Option<String>,

        /// Context entry passed to every layer (repeatable, `key=value`)
        #[arg(short, long = "context", value_name = "KEY=VALUE", value_parser = parse_context_pair)]
        context: Vec<(String, Value)>,
    },

    /// Print a stored decision
    Show {
        /// Decision id
        decision_id: String,
    },

    /// Re-run synthesis over a stored decision and compare
    Replay {
        /// Decision id
        decision_id: String,
    },

    /// Show configuration sources and validation issues
    Config,
}

/// Parse `key=value`; the value is read as JSON when it parses, else as a string.
pub fn parse_context_pair(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_context_pair() {
        assert_eq!(
            parse_context_pair("topic=rust").unwrap(),
            ("topic".to_string(), json!("rust"))
        );
        assert_eq!(
            parse_context_pair("budget=12.5").unwrap(),
            ("budget".to_string(), json!(12.5))
        );
        assert_eq!(
            parse_context_pair("query=a=b").unwrap(),
            ("query".to_string(), json!("a=b"))
        );
        assert!(parse_context_pair("novalue").is_err());
        assert!(parse_context_pair("=x").is_err());
    }

    #[test]
    fn test_parse_decide_command() {
        let cli = Cli::try_parse_from([
            "playbook-arbiter",
            "decide",
            "write a blog post",
            "--workspace",
            "ws-1",
            "-c",
            "topic=rust",
            "-o",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Decide {
                input,
                workspace,
                project,
                context,
                ..
            } => {
                assert_eq!(input, "write a blog post");
                assert_eq!(workspace, "ws-1");
                assert!(project.is_none());
                assert_eq!(context, vec![("topic".to_string(), json!("rust"))]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_replay_defaults_to_summary() {
        let cli = Cli::try_parse_from(["playbook-arbiter", "replay", "d-1"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Summary);
        assert!(matches!(cli.command, Command::Replay { decision_id } if decision_id == "d-1"));
    }
}
