//! # Runtime configuration.
//!
//! Provides [`Config`] (timers and limits of the engine) and [`WatchConfig`]
//! (what the background watchers look at).
//!
//! Config is used in three places:
//! 1. **Engine creation**: `Engine::builder(config, ...)`
//! 2. **Live tasks**: refresh period and deadline
//! 3. **Transport**: message length limit, request and poll timeouts
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for units on shutdown
//! - empty `WatchConfig::dirs` → the directory watcher is not started
//! - empty `WatchConfig::units` → units are discovered by prefix; none found →
//!   the unit watcher is not started

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ProbeError;
use crate::probe::discover_units;

/// Global configuration for the hostwatch runtime.
///
/// ## Field semantics
/// - `refresh`: period of every live report loop
/// - `live_deadline`: a live report stops updating after this long
/// - `reboot_period` / `dir_period` / `unit_period`: watcher poll periods
/// - `max_message_chars`: outbound texts longer than this are truncated
/// - `grace`: maximum wait for units to stop on shutdown
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Period between two refreshes of one live report.
    pub refresh: Duration,

    /// Lifetime of a live report, measured from its start.
    pub live_deadline: Duration,

    /// Poll period of the reboot watcher.
    pub reboot_period: Duration,

    /// Poll period of the directory-presence watcher.
    pub dir_period: Duration,

    /// Poll period of the unit-status watcher.
    pub unit_period: Duration,

    /// Maximum number of characters in one outbound message.
    ///
    /// Longer texts are cut and suffixed with an ellipsis marker.
    pub max_message_chars: usize,

    /// Maximum time to wait for units after a shutdown signal.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events skip the
    /// oldest ones.
    pub bus_capacity: usize,

    /// Overall timeout of one outbound Bot API request.
    pub request_timeout: Duration,

    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout: Duration,

    /// Delay before retrying a failed `getUpdates`.
    pub poll_retry: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `refresh = 2s`, `live_deadline = 10min`
    /// - all watcher periods `30s`
    /// - `max_message_chars = 3800`
    /// - `grace = 5s`, `bus_capacity = 1024`
    /// - `request_timeout = 40s`, `poll_timeout = 30s`, `poll_retry = 3s`
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(2),
            live_deadline: Duration::from_secs(10 * 60),
            reboot_period: Duration::from_secs(30),
            dir_period: Duration::from_secs(30),
            unit_period: Duration::from_secs(30),
            max_message_chars: 3800,
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            request_timeout: Duration::from_secs(40),
            poll_timeout: Duration::from_secs(30),
            poll_retry: Duration::from_secs(3),
        }
    }
}

/// Unit name prefixes used for discovery when none are configured.
pub const DEFAULT_UNIT_PREFIXES: [&str; 2] = ["kab-", "tg_"];

/// What the background watchers observe.
#[derive(Clone, Debug)]
pub struct WatchConfig {
    /// Directories whose processes are counted, in configured order.
    pub dirs: Vec<String>,

    /// Service units whose status is tracked, in configured order.
    pub units: Vec<String>,

    /// Name prefixes used to discover units when `units` is empty.
    ///
    /// Defaults to [`DEFAULT_UNIT_PREFIXES`].
    pub unit_prefixes: Vec<String>,

    /// Directory scanned for `*.service` files during discovery.
    pub unit_dir: PathBuf,

    /// Root of the procfs mount.
    pub proc_root: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            units: Vec::new(),
            unit_prefixes: DEFAULT_UNIT_PREFIXES.map(String::from).to_vec(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl WatchConfig {
    /// Units to watch: the configured list, or the ones discovered under
    /// `unit_dir` by prefix when the list is empty.
    pub fn resolve_units(&self) -> Result<Vec<String>, ProbeError> {
        if !self.units.is_empty() {
            return Ok(self.units.clone());
        }
        discover_units(&self.unit_dir, &self.unit_prefixes)
    }
}

/// Splits a comma-separated list, trimming items and dropping blanks.
///
/// # Example
/// ```
/// assert_eq!(
///     hostwatch::config::split_list(" /opt/a, ,/opt/b "),
///     vec!["/opt/a".to_string(), "/opt/b".to_string()]
/// );
/// ```
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.refresh, Duration::from_secs(2));
        assert_eq!(cfg.live_deadline, Duration::from_secs(600));
        assert_eq!(cfg.reboot_period, Duration::from_secs(30));
        assert_eq!(cfg.dir_period, Duration::from_secs(30));
        assert_eq!(cfg.unit_period, Duration::from_secs(30));
        assert_eq!(cfg.max_message_chars, 3800);
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn configured_units_win_over_discovery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app-web.service"), "").unwrap();
        std::fs::write(dir.path().join("app-db.service"), "").unwrap();
        std::fs::write(dir.path().join("other.service"), "").unwrap();

        let mut watch = WatchConfig {
            unit_prefixes: vec!["app-".into()],
            unit_dir: dir.path().to_path_buf(),
            ..WatchConfig::default()
        };
        assert_eq!(
            watch.resolve_units().unwrap(),
            vec!["app-db.service", "app-web.service"]
        );

        watch.units = vec!["nginx.service".into()];
        assert_eq!(watch.resolve_units().unwrap(), vec!["nginx.service"]);
    }

    #[test]
    fn default_prefixes_discover_kab_and_tg_units() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["kab-web.service", "tg_bot.service", "nginx.service"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let watch = WatchConfig {
            unit_dir: dir.path().to_path_buf(),
            ..WatchConfig::default()
        };
        assert_eq!(
            watch.resolve_units().unwrap(),
            vec!["kab-web.service", "tg_bot.service"]
        );
    }

    #[test]
    fn split_list_keeps_order() {
        assert_eq!(split_list("b,a,c"), vec!["b", "a", "c"]);
        assert!(split_list("  ,, ").is_empty());
    }
}
