//! # systemd unit readers.
//!
//! - [`unit_status`] asks `systemctl is-active` for the textual state of a unit.
//! - [`discover_units`] lists unit files by name prefix.

use std::collections::BTreeSet;
use std::path::Path;

use tokio::process::Command;

use crate::error::ProbeError;

/// Fallback status when `systemctl` prints nothing.
const UNKNOWN: &str = "unknown";

/// Returns the status reported by `systemctl is-active <unit>`.
///
/// Inactive, failed and unknown units exit non-zero; for those a non-blank
/// stderr wins. Otherwise the trimmed stdout is used, then `"unknown"`.
/// Only a failure to spawn `systemctl` is an error.
pub async fn unit_status(unit: &str) -> Result<String, ProbeError> {
    let output = Command::new("systemctl")
        .arg("is-active")
        .arg(unit)
        .kill_on_drop(true)
        .output()
        .await?;
    Ok(status_from_output(
        output.status.success(),
        &output.stdout,
        &output.stderr,
    ))
}

fn status_from_output(success: bool, stdout: &[u8], stderr: &[u8]) -> String {
    let trimmed = |raw: &[u8]| String::from_utf8_lossy(raw).trim().to_string();
    if !success {
        let err = trimmed(stderr);
        if !err.is_empty() {
            return err;
        }
    }
    let out = trimmed(stdout);
    if out.is_empty() {
        UNKNOWN.to_string()
    } else {
        out
    }
}

/// Lists `*.service` entries in `dir` whose name starts with any of `prefixes`.
///
/// Only directories are skipped, so linked unit files count. Result is
/// de-duplicated and sorted. With no prefixes nothing matches.
pub fn discover_units(dir: &Path, prefixes: &[String]) -> Result<Vec<String>, ProbeError> {
    if prefixes.is_empty() {
        return Ok(Vec::new());
    }

    let mut found = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.ends_with(".service") && prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            found.insert(name);
        }
    }
    Ok(found.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stderr_wins_only_on_failure() {
        assert_eq!(status_from_output(true, b"active\n", b""), "active");
        assert_eq!(
            status_from_output(false, b"inactive\n", b"Unit x.service could not be found.\n"),
            "Unit x.service could not be found."
        );
        assert_eq!(status_from_output(false, b"failed\n", b"  "), "failed");
        assert_eq!(status_from_output(true, b"active", b"warning"), "active");
        assert_eq!(status_from_output(false, b"", b""), "unknown");
    }

    #[test]
    fn discovers_prefixed_service_files() {
        let dir = TempDir::new().unwrap();
        for name in [
            "tg_bot.service",
            "app-web.service",
            "app-web.timer",
            "other.service",
            "app-api.service",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("app-dir.service")).unwrap();

        let units = discover_units(
            dir.path(),
            &["app-".to_string(), "tg_".to_string(), "app-".to_string()],
        )
        .unwrap();
        assert_eq!(
            units,
            vec!["app-api.service", "app-web.service", "tg_bot.service"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn linked_unit_files_are_discovered() {
        let dir = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let unit = target.path().join("api.service");
        std::fs::write(&unit, "").unwrap();
        std::os::unix::fs::symlink(&unit, dir.path().join("kab-api.service")).unwrap();
        std::fs::write(dir.path().join("kab-web.service"), "").unwrap();

        let units = discover_units(dir.path(), &["kab-".to_string()]).unwrap();
        assert_eq!(units, vec!["kab-api.service", "kab-web.service"]);
    }

    #[test]
    fn no_prefixes_discovers_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.service"), "").unwrap();
        assert!(discover_units(dir.path(), &[]).unwrap().is_empty());
    }
}
