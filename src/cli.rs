//! Command-line interface

use clap::{Parser, Subcommand};
use core_runtime::logging::{LogFormat, LogLevel, LoggingConfig};
use core_sync::ROOT_FOLDER_ID;

/// Environment variable consulted when `--user` is not given
pub const USER_ENV: &str = "BOX_SYNC_USER";

#[derive(Parser, Debug)]
#[command(name = "box-sync", version, about = "Upload local files and directories to Box")]
pub struct Cli {
    /// Local user whose Box credentials are used
    #[arg(long, global = true, env = USER_ENV)]
    pub user: Option<String>,

    /// Skip the keychain consent prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Log output format: pretty, json or compact
    #[arg(long, global = true, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate with Box and store the credentials
    Auth,

    /// Create a folder path such as /A/B/C under a parent folder
    Mkdir {
        /// Slash separated folder names
        path: String,

        /// Folder id to create the path under
        #[arg(long, default_value = ROOT_FOLDER_ID)]
        root: String,
    },

    /// Upload a file, or the top-level files of a directory
    Upload {
        /// Destination Box folder id
        folder_id: String,

        /// Local file or directory
        local_path: String,

        /// Replace remote files that have the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// Remove the stored credentials for the user
    Forget,
}

impl Cli {
    /// The user from `--user`/`BOX_SYNC_USER`, else the OS login name
    pub fn resolve_user(&self) -> Option<String> {
        resolve_user(self.user.clone(), |key| std::env::var(key).ok())
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_level(LogLevel::from_verbosity(self.verbose))
            .with_target(self.verbose > 1);

        match self.log_format {
            Some(format) => config.with_format(format),
            None => config.with_format(LogFormat::Compact),
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse().map_err(|e: core_runtime::Error| e.to_string())
}

fn resolve_user<F>(explicit: Option<String>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .into_iter()
        .chain(["USER", "USERNAME"].into_iter().filter_map(|key| lookup(key)))
        .map(|user| user.trim().to_string())
        .find(|user| !user.is_empty())
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
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "box-sync", "--user", "alice", "upload", "123", "/data/reports/", "--overwrite",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(
            cli.command,
            Command::Upload {
                folder_id: "123".to_string(),
                local_path: "/data/reports/".to_string(),
                overwrite: true,
            }
        );
    }

    #[test]
    fn test_mkdir_defaults_to_root() {
        let cli = Cli::try_parse_from(["box-sync", "mkdir", "/A/B/C/", "-y", "-vv"]).unwrap();

        assert!(cli.yes);
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command,
            Command::Mkdir {
                path: "/A/B/C/".to_string(),
                root: "0".to_string(),
            }
        );
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from(["box-sync", "--log-format", "json", "auth"]).unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.logging_config().format, LogFormat::Json);

        assert!(Cli::try_parse_from(["box-sync", "--log-format", "xml", "auth"]).is_err());
    }

    #[test]
    fn test_resolve_user_fallbacks() {
        let env = |key: &str| match key {
            "USER" => Some("login".to_string()),
            "USERNAME" => Some("winlogin".to_string()),
            _ => None,
        };

        assert_eq!(resolve_user(Some("alice".into()), env), Some("alice".into()));
        assert_eq!(resolve_user(None, env), Some("login".into()));
        assert_eq!(resolve_user(Some("  ".into()), env), Some("login".into()));
        assert_eq!(
            resolve_user(None, |key| (key == "USERNAME").then(|| "winlogin".to_string())),
            Some("winlogin".into())
        );
        assert_eq!(resolve_user(None, |_| None), None);
    }
}
