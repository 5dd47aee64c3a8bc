//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Synchronize environment declarations with the remote platform
#[derive(Parser, Debug)]
#[command(name = "envsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Directory holding one folder per environment
    ///
    /// Defaults to `environment_templates` in the current or parent
    /// directory. `environment_templates` is appended when missing.
    #[arg(long, env = "TARGET_DIRECTORY", global = true)]
    pub target_directory: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Number of environments reconciled at once
    #[arg(
        long,
        default_value_t = 1,
        global = true,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub concurrency: u16,

    /// The command to run (defaults to `sync`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where and how to reach the remote platform
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// URL of the platform instance
    #[arg(long, env = "DOMINO_URL", global = true)]
    pub host: Option<String>,

    /// User API key
    #[arg(long, env = "DOMINO_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Service account token
    #[arg(long, env = "DOMINO_AUTH_TOKEN", hide_env_values = true, global = true)]
    pub auth_token: Option<String>,

    /// Address of the local API proxy; host and credentials are then not needed
    #[arg(long, env = "DOMINO_API_PROXY", global = true)]
    pub api_proxy: Option<String>,

    /// Owner of the project the run belongs to
    #[arg(long, env = "DOMINO_PROJECT_OWNER", global = true)]
    pub project_owner: Option<String>,

    /// Name of the project the run belongs to
    #[arg(long, env = "DOMINO_PROJECT_NAME", global = true)]
    pub project_name: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create or revise every declared environment
    Sync {
        /// Only read remote state and report what would change
        #[arg(long)]
        dry_run: bool,

        /// Output the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Archive a remote environment by name
    Archive {
        /// Environment name
        name: String,

        /// Only look the environment up
        #[arg(long)]
        dry_run: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Sync {
            dry_run: false,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sync_is_optional() {
        let cli = Cli::try_parse_from(["envsync", "--concurrency", "3"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.concurrency, 3);
    }

    #[test]
    fn parses_sync_flags() {
        let cli = Cli::try_parse_from(["envsync", "sync", "--dry-run", "--json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Sync {
                dry_run: true,
                json: true
            })
        );
    }

    #[test]
    fn parses_archive_with_global_flags() {
        let cli = Cli::try_parse_from([
            "envsync",
            "archive",
            "legacy",
            "--host",
            "platform.example.com",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Archive {
                name: "legacy".into(),
                dry_run: false
            })
        );
        assert_eq!(cli.connection.host.as_deref(), Some("platform.example.com"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(Cli::try_parse_from(["envsync", "--concurrency", "0"]).is_err());
    }
}
