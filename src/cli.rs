//! CLI definitions for hostwatch.
//!
//! Every flag can also be set through its environment variable.

use std::path::PathBuf;

use clap::Parser;

use hostwatch::config::{DEFAULT_UNIT_PREFIXES, split_list};
use hostwatch::{AuthorizedUsers, ConfigError, WatchConfig};

/// hostwatch CLI.
#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(about = "Telegram bot serving live host reports and host alerts")]
#[command(version)]
pub(crate) struct Cli {
    /// Bot API token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Comma-separated Telegram user ids allowed to use the bot
    #[arg(long, env = "ALLOWED_USERS", default_value = "")]
    pub allowed_users: String,

    /// Comma-separated directories whose processes are watched
    #[arg(long, env = "WATCH_DIRS", default_value = "")]
    pub watch_dirs: String,

    /// Comma-separated systemd units to watch
    #[arg(long, env = "WATCH_UNITS", default_value = "")]
    pub watch_units: String,

    /// Comma-separated unit name prefixes, used when no units are listed
    /// (blank means "kab-,tg_")
    #[arg(long, env = "WATCH_UNIT_PREFIXES", default_value = "")]
    pub watch_unit_prefixes: String,

    /// Directory scanned for unit files during discovery
    #[arg(long, default_value = "/etc/systemd/system")]
    pub unit_dir: PathBuf,

    /// Root of the procfs mount
    #[arg(long, default_value = "/proc")]
    pub proc_root: PathBuf,
}

impl Cli {
    /// Returns the trimmed bot token; a blank one is rejected.
    pub fn token(&self) -> Result<String, ConfigError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(token.to_string())
    }

    pub fn users(&self) -> Result<AuthorizedUsers, ConfigError> {
        AuthorizedUsers::parse(&self.allowed_users)
    }

    pub fn watch_config(&self) -> WatchConfig {
        let mut unit_prefixes = split_list(&self.watch_unit_prefixes);
        if unit_prefixes.is_empty() {
            unit_prefixes = DEFAULT_UNIT_PREFIXES.map(String::from).to_vec();
        }
        WatchConfig {
            dirs: split_list(&self.watch_dirs),
            units: split_list(&self.watch_units),
            unit_prefixes,
            unit_dir: self.unit_dir.clone(),
            proc_root: self.proc_root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["hostwatch"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn blank_token_is_rejected() {
        let cli = parse(&["--token", "   ", "--allowed-users", "1"]);
        assert_eq!(cli.token(), Err(ConfigError::MissingToken));
    }

    #[test]
    fn users_are_validated() {
        let cli = parse(&["--token", "t", "--allowed-users", "10, 20"]);
        assert_eq!(cli.token().unwrap(), "t");
        let users = cli.users().unwrap();
        assert_eq!(users.iter().collect::<Vec<_>>(), vec![10, 20]);

        let cli = parse(&["--token", "t", "--allowed-users", "10,x"]);
        assert_eq!(cli.users().unwrap().iter().collect::<Vec<_>>(), vec![10]);

        let cli = parse(&["--token", "t", "--allowed-users", "x"]);
        assert_eq!(cli.users(), Err(ConfigError::NoUsers));
    }

    #[test]
    fn watch_lists_are_split() {
        let cli = parse(&[
            "--token",
            "t",
            "--watch-dirs",
            "/opt/a, /opt/b",
            "--watch-unit-prefixes",
            "app-",
            "--proc-root",
            "/host/proc",
        ]);
        let watch = cli.watch_config();
        assert_eq!(watch.dirs, vec!["/opt/a", "/opt/b"]);
        assert!(watch.units.is_empty());
        assert_eq!(watch.unit_prefixes, vec!["app-"]);
        assert_eq!(watch.proc_root, PathBuf::from("/host/proc"));
    }

    #[test]
    fn blank_prefixes_fall_back_to_defaults() {
        let cli = parse(&["--token", "t", "--watch-unit-prefixes", " , "]);
        assert_eq!(cli.watch_config().unit_prefixes, vec!["kab-", "tg_"]);
    }
}
