//! CLI argument definitions using clap
//!
//! - hdb init                         # Set up the project directory
//! - hdb config <action>              # Manage environments
//! - hdb api <operation> [--k=v ...]  # Run any operations API call
//! - hdb components list|drop|reset   # Manage deployed components
//! - hdb logs [-f filter] [--tail]    # Read instance logs
//! - hdb <command> [args ...]         # deploy/restart/run/dev or any operation

use clap::{Args, Parser, Subcommand};
use hdb_core::api::logs::DEFAULT_LOOKBACK_MINUTES;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hdb")]
#[command(about = "HarperDB helper - deploy, operate and query remote HarperDB instances")]
#[command(
    long_about = r#"HarperDB helper - deploy, operate and query remote HarperDB instances

USAGE:
  hdb init                          # Create .env.harperdb / .hdbconfig.json
  hdb config add-env                # Add an environment
  hdb config use DEV                # Make DEV the default environment
  hdb deploy                        # Deploy the current component
  hdb api describe_all              # Run an operations API call
  hdb --env=PROD --instance=node1 restart

TARGET SELECTION (first match wins):
  HDB_ENV + HDB_INSTANCE environment variables
  --env + --instance flags
  the saved default, confirmed within 3 seconds
  interactive selection"#
)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted before or after any subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Environment to use for this command
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Instance URL to use for this command
    #[arg(long, global = true)]
    pub instance: Option<String>,

    /// Restart the instance after the command succeeds
    #[arg(long, global = true)]
    pub restart: bool,

    /// Project directory holding the configuration files
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration files in the project directory
    Init,

    /// Manage HarperDB configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run any HarperDB API operation with custom parameters
    #[command(after_help = "Parameters use the --key=value format. \
--json='{...}' is merged over the simple parameters.")]
    Api {
        /// The API operation to execute
        operation: String,

        /// Write the result to a file instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Operation parameters (--key=value, --json='{...}')
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "PARAMS")]
        params: Vec<String>,
    },

    /// List, drop, or reset components deployed on the instance
    Components {
        #[command(subcommand)]
        action: ComponentsAction,
    },

    /// Retrieve logs with filtering and lookback duration
    Logs(LogsArgs),

    /// deploy, deploy_component, restart, run, dev, or any API operation
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Create missing configuration files
    Init,

    /// Add new environment credentials
    AddEnv,

    /// Add an instance to an environment
    AddInstance,

    /// Selection happens when running commands
    Select,

    /// List all configured environments and instances
    List,

    /// Set the default environment (and instance)
    Use {
        /// Environment name
        name: Option<String>,
    },
}

#[derive(Subcommand, Clone, Copy, Debug)]
pub enum ComponentsAction {
    /// List all components
    List,

    /// Interactively select components to drop
    Drop,

    /// Drop every component except the built-in ones
    Reset,
}

#[derive(Args, Clone, Debug)]
pub struct LogsArgs {
    /// Filter messages by keyword or /regex/
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Lookback duration in minutes
    #[arg(long, short = 't', default_value_t = DEFAULT_LOOKBACK_MINUTES)]
    pub lookback: u64,

    /// Only show entries of this level
    #[arg(long, short = 'l')]
    pub level: Option<String>,

    /// Keep polling for new entries
    #[arg(long)]
    pub tail: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["hdb", "logs", "--env", "dev", "--instance", "a", "-t", "5"]);
        assert_eq!(cli.global.env.as_deref(), Some("dev"));
        assert_eq!(cli.global.instance.as_deref(), Some("a"));
        match cli.command {
            Commands::Logs(args) => {
                assert_eq!(args.lookback, 5);
                assert!(!args.tail);
            }
            _ => panic!("expected logs"),
        }
    }

    #[test]
    fn test_api_keeps_hyphenated_params() {
        let cli = Cli::parse_from(["hdb", "api", "describe_table", "--schema=data", "--table=dog"]);
        match cli.command {
            Commands::Api { operation, params, .. } => {
                assert_eq!(operation, "describe_table");
                assert_eq!(params, vec!["--schema=data", "--table=dog"]);
            }
            _ => panic!("expected api"),
        }
    }

    #[test]
    fn test_unknown_command_is_external() {
        let cli = Cli::parse_from(["hdb", "deploy", "project=app"]);
        match cli.command {
            Commands::External(argv) => assert_eq!(argv, vec!["deploy", "project=app"]),
            _ => panic!("expected external"),
        }
    }

    #[test]
    fn test_logs_default_lookback() {
        let cli = Cli::parse_from(["hdb", "logs"]);
        match cli.command {
            Commands::Logs(args) => assert_eq!(args.lookback, DEFAULT_LOOKBACK_MINUTES),
            _ => panic!("expected logs"),
        }
    }
}
