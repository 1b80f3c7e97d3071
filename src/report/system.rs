//! # System status report.
//!
//! CPU load over a short sample, memory, swap, local disks, uptime and OS name.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReportError;
use crate::notify::escape_html;
use crate::probe::{MemInfo, Mount, Procfs};

use super::format::{bytes, percentage, share, status_emoji, uptime};
use super::reporter::{Reporter, run_blocking};

/// Filesystems shown in the disk section.
const DISK_FS: [&str; 7] = ["ext2", "ext3", "ext4", "xfs", "btrfs", "zfs", "vfat"];

/// Gap between the two CPU counter samples.
const CPU_SAMPLE: Duration = Duration::from_millis(150);

/// Capacity of one mounted filesystem.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Disk {
    pub mountpoint: String,
    pub total: u64,
    pub free: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct StatusSnapshot {
    pub cpu: f64,
    pub mem: MemInfo,
    pub disks: Vec<Disk>,
    pub uptime: Duration,
    pub os: String,
}

/// Reports CPU, memory, swap, disks, uptime and OS.
pub struct StatusReporter {
    procfs: Procfs,
    os_release: PathBuf,
}

impl StatusReporter {
    /// Creates a reporter reading from `procfs` and `/etc/os-release`.
    pub fn new(procfs: Procfs) -> Self {
        Self {
            procfs,
            os_release: PathBuf::from("/etc/os-release"),
        }
    }

    /// Overrides the os-release file location.
    pub fn with_os_release(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release = path.into();
        self
    }

    async fn snapshot(&self) -> Result<StatusSnapshot, ReportError> {
        let procfs = self.procfs.clone();
        let before = run_blocking(move || Ok(procfs.cpu_times()?)).await?;
        tokio::time::sleep(CPU_SAMPLE).await;

        let procfs = self.procfs.clone();
        let os_release = self.os_release.clone();
        run_blocking(move || {
            let cpu = procfs.cpu_times()?.usage_since(&before);
            Ok(StatusSnapshot {
                cpu,
                mem: procfs.meminfo()?,
                disks: disks(&procfs.mounts()?),
                uptime: procfs.uptime()?,
                os: os_name(&os_release),
            })
        })
        .await
    }
}

#[async_trait]
impl Reporter for StatusReporter {
    fn name(&self) -> &str {
        "status"
    }

    async fn report(&self) -> Result<String, ReportError> {
        Ok(render(&self.snapshot().await?))
    }
}

/// First occurrence of each allowed local mount, sorted by mountpoint.
fn disks(mounts: &[Mount]) -> Vec<Disk> {
    let mut seen = HashSet::new();
    let mut out: Vec<Disk> = mounts
        .iter()
        .filter(|m| DISK_FS.contains(&m.fstype.as_str()))
        .filter(|m| seen.insert(m.mountpoint.clone()))
        .filter_map(|m| {
            let (total, free) = fs_capacity(&m.mountpoint)?;
            (total > 0).then(|| Disk {
                mountpoint: m.mountpoint.clone(),
                total,
                free,
            })
        })
        .collect();
    out.sort_by(|a, b| a.mountpoint.cmp(&b.mountpoint));
    out
}

#[cfg(unix)]
fn fs_capacity(path: &str) -> Option<(u64, u64)> {
    let st = nix::sys::statvfs::statvfs(path).ok()?;
    let frag = st.fragment_size() as u64;
    Some((st.blocks() as u64 * frag, st.blocks_available() as u64 * frag))
}

#[cfg(not(unix))]
fn fs_capacity(_path: &str) -> Option<(u64, u64)> {
    None
}

/// `PRETTY_NAME` from an os-release file, else the compile-time OS name.
fn os_name(path: &std::path::Path) -> String {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| {
            text.lines()
                .find_map(|line| line.strip_prefix("PRETTY_NAME="))
                .map(|v| v.trim().trim_matches('"').to_string())
        })
        .unwrap_or_else(|| std::env::consts::OS.to_string())
}

pub(crate) fn render(s: &StatusSnapshot) -> String {
    let mut b = String::new();
    let mem_used = s.mem.mem_total.saturating_sub(s.mem.mem_available);
    let mem_pct = share(mem_used, s.mem.mem_total);

    let _ = writeln!(b, "📊 <b>Server status</b>\n");
    let _ = writeln!(b, "🖥 <b>CPU:</b> {}", status_emoji(s.cpu));
    let _ = writeln!(b, "{}\n", percentage(s.cpu));
    let _ = writeln!(b, "💾 <b>RAM:</b> {}", status_emoji(mem_pct));
    let _ = writeln!(b, "{}", percentage(mem_pct));
    let _ = writeln!(b, "Used: {} / {}\n", bytes(mem_used), bytes(s.mem.mem_total));

    if s.mem.swap_total > 0 {
        let swap_used = s.mem.swap_total.saturating_sub(s.mem.swap_free);
        let swap_pct = share(swap_used, s.mem.swap_total);
        let _ = writeln!(b, "🧠 <b>SWAP:</b> {}", status_emoji(swap_pct));
        let _ = writeln!(b, "{}", percentage(swap_pct));
        let _ = writeln!(b, "Used: {} / {}\n", bytes(swap_used), bytes(s.mem.swap_total));
    }

    let _ = writeln!(b, "💿 <b>Disks:</b>");
    for d in &s.disks {
        let pct = share(d.total.saturating_sub(d.free), d.total);
        let _ = writeln!(b, "{} <code>{}</code>", status_emoji(pct), escape_html(&d.mountpoint));
        let _ = writeln!(b, "  {}", percentage(pct));
        let _ = writeln!(b, "  {} free of {}", bytes(d.free), bytes(d.total));
    }

    let _ = writeln!(b, "\n⏱ <b>Uptime:</b> {}", uptime(s.uptime.as_secs()));
    let _ = write!(b, "🖥 <b>OS:</b> {}", escape_html(&s.os));
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn snapshot(swap_total: u64) -> StatusSnapshot {
        StatusSnapshot {
            cpu: 12.5,
            mem: MemInfo {
                mem_total: 8 * 1024 * 1024 * 1024,
                mem_available: 2 * 1024 * 1024 * 1024,
                swap_total,
                swap_free: swap_total / 2,
            },
            disks: vec![Disk {
                mountpoint: "/".into(),
                total: 100 * 1024 * 1024 * 1024,
                free: 10 * 1024 * 1024 * 1024,
            }],
            uptime: Duration::from_secs(90_061),
            os: "Debian <12>".into(),
        }
    }

    #[test]
    fn renders_every_section() {
        let text = render(&snapshot(1024 * 1024 * 1024));
        assert!(text.starts_with("📊 <b>Server status</b>"));
        assert!(text.contains("🖥 <b>CPU:</b> 🟢\n█░░░░░░░░░ 12.5%"));
        assert!(text.contains("💾 <b>RAM:</b> 🟡\n███████░░░ 75.0%\nUsed: 6.0 GB / 8.0 GB"));
        assert!(text.contains("🧠 <b>SWAP:</b>"));
        assert!(text.contains("🔴 <code>/</code>\n  █████████░ 90.0%\n  10.0 GB free of 100.0 GB"));
        assert!(text.contains("⏱ <b>Uptime:</b> 1d 1h 1m"));
        assert!(text.ends_with("🖥 <b>OS:</b> Debian &lt;12&gt;"));
    }

    #[test]
    fn swap_section_is_omitted_without_swap() {
        assert!(!render(&snapshot(0)).contains("SWAP"));
    }

    #[test]
    fn os_name_reads_pretty_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 24.04 LTS\"\n").unwrap();
        assert_eq!(os_name(&path), "Ubuntu 24.04 LTS");
        assert_eq!(os_name(&dir.path().join("missing")), std::env::consts::OS);
    }

    #[test]
    fn disks_skip_foreign_filesystems_and_duplicates() {
        let mounts = vec![
            Mount { mountpoint: "/proc".into(), fstype: "proc".into() },
            Mount { mountpoint: "/".into(), fstype: "ext4".into() },
            Mount { mountpoint: "/".into(), fstype: "ext4".into() },
        ];
        let found = disks(&mounts);
        assert!(found.iter().all(|d| d.mountpoint == "/"));
        assert!(found.len() <= 1);
    }
}
