//! # Procfs readers.
//!
//! [`Procfs`] reads the kernel-exposed files the reporters and watchers need.
//! The root is configurable so tests can point it at a fake tree.
//!
//! All methods are blocking; async callers run them on a blocking worker
//! (`tokio::task::spawn_blocking`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ProbeError;

/// Cumulative CPU counters from the aggregate `cpu` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    /// idle + iowait jiffies.
    pub idle: u64,
    /// Sum of all jiffies.
    pub total: u64,
}

impl CpuTimes {
    /// Busy share between two samples, in percent.
    pub fn usage_since(&self, earlier: &CpuTimes) -> f64 {
        let total = self.total.saturating_sub(earlier.total) as f64;
        let idle = self.idle.saturating_sub(earlier.idle) as f64;
        if total == 0.0 {
            return 0.0;
        }
        (total - idle) / total * 100.0
    }
}

/// Memory figures in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_available: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// One line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub mountpoint: String,
    pub fstype: String,
}

/// Per-interface counters from `net/dev`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_drops: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub tx_drops: u64,
}

impl NetCounters {
    /// Adds `other` into `self`.
    pub fn accumulate(&mut self, other: &NetCounters) {
        self.rx_bytes += other.rx_bytes;
        self.rx_packets += other.rx_packets;
        self.rx_errors += other.rx_errors;
        self.rx_drops += other.rx_drops;
        self.tx_bytes += other.tx_bytes;
        self.tx_packets += other.tx_packets;
        self.tx_errors += other.tx_errors;
        self.tx_drops += other.tx_drops;
    }
}

/// Name and resident memory of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcInfo {
    pub pid: u32,
    pub name: String,
    pub rss_kb: u64,
}

/// Reader rooted at a procfs mount.
#[derive(Debug, Clone)]
pub struct Procfs {
    root: PathBuf,
}

impl Default for Procfs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl Procfs {
    /// Creates a reader rooted at `root` (normally `/proc`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root this reader was created with.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, rel: impl AsRef<Path>) -> Result<String, ProbeError> {
        Ok(fs::read_to_string(self.root.join(rel))?)
    }

    /// Boot time in seconds since the Unix epoch (`btime` in `stat`).
    pub fn boot_time(&self) -> Result<i64, ProbeError> {
        let stat = self.read("stat")?;
        stat.lines()
            .find_map(|line| line.strip_prefix("btime "))
            .and_then(|rest| rest.trim().parse::<i64>().ok())
            .ok_or_else(|| ProbeError::missing("btime in stat"))
    }

    /// Aggregate CPU counters (`cpu` line in `stat`).
    pub fn cpu_times(&self) -> Result<CpuTimes, ProbeError> {
        let stat = self.read("stat")?;
        let line = stat
            .lines()
            .find(|line| line.starts_with("cpu "))
            .ok_or_else(|| ProbeError::missing("cpu line in stat"))?;
        let values: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(|v| v.parse().unwrap_or(0))
            .collect();
        if values.len() < 4 {
            return Err(ProbeError::missing("cpu counters"));
        }
        let idle = values[3] + values.get(4).copied().unwrap_or(0);
        Ok(CpuTimes {
            idle,
            total: values.iter().sum(),
        })
    }

    /// Memory and swap figures (`meminfo`), converted to bytes.
    ///
    /// Fails when MemTotal or MemAvailable is absent.
    pub fn meminfo(&self) -> Result<MemInfo, ProbeError> {
        let text = self.read("meminfo")?;
        let mut fields: BTreeMap<&str, u64> = BTreeMap::new();
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                if let Ok(kb) = value.parse::<u64>() {
                    fields.insert(name.trim_end_matches(':'), kb * 1024);
                }
            }
        }
        let get = |name: &str| fields.get(name).copied().unwrap_or(0);

        let info = MemInfo {
            mem_total: get("MemTotal"),
            mem_available: get("MemAvailable"),
            swap_total: get("SwapTotal"),
            swap_free: get("SwapFree"),
        };
        if info.mem_total == 0 || info.mem_available == 0 {
            return Err(ProbeError::missing("MemTotal/MemAvailable in meminfo"));
        }
        Ok(info)
    }

    /// Time since boot (`uptime`).
    pub fn uptime(&self) -> Result<Duration, ProbeError> {
        let text = self.read("uptime")?;
        let secs = text
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| ProbeError::missing("seconds in uptime"))?;
        Ok(Duration::from_secs(secs as u64))
    }

    /// Mount table (`mounts`).
    pub fn mounts(&self) -> Result<Vec<Mount>, ProbeError> {
        let text = self.read("mounts")?;
        Ok(text
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let _device = parts.next()?;
                let mountpoint = parts.next()?.to_string();
                let fstype = parts.next()?.to_string();
                Some(Mount { mountpoint, fstype })
            })
            .collect())
    }

    /// Interface counters (`net/dev`), keyed by interface name.
    pub fn net_dev(&self) -> Result<BTreeMap<String, NetCounters>, ProbeError> {
        let text = self.read("net/dev")?;
        let mut out = BTreeMap::new();
        for line in text.lines().skip(2) {
            let Some((name, rest)) = line.split_once(':') else {
                continue;
            };
            let fields: Vec<u64> = rest
                .split_whitespace()
                .map(|v| v.parse().unwrap_or(0))
                .collect();
            if fields.len() < 16 {
                continue;
            }
            out.insert(
                name.trim().to_string(),
                NetCounters {
                    rx_bytes: fields[0],
                    rx_packets: fields[1],
                    rx_errors: fields[2],
                    rx_drops: fields[3],
                    tx_bytes: fields[8],
                    tx_packets: fields[9],
                    tx_errors: fields[10],
                    tx_drops: fields[11],
                },
            );
        }
        Ok(out)
    }

    fn pids(&self) -> Result<Vec<u32>, ProbeError> {
        let mut pids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let Ok(entry) = entry else { continue };
            if let Some(pid) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                pids.push(pid);
            }
        }
        Ok(pids)
    }

    /// Every readable process with its name and VmRSS.
    ///
    /// Processes that vanish or hide their status mid-scan are skipped.
    pub fn processes(&self) -> Result<Vec<ProcInfo>, ProbeError> {
        Ok(self
            .pids()?
            .into_iter()
            .filter_map(|pid| self.process_status(pid))
            .collect())
    }

    fn process_status(&self, pid: u32) -> Option<ProcInfo> {
        let text = self.read(format!("{pid}/status")).ok()?;
        let mut name = None;
        let mut rss_kb = 0;
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("Name:") {
                name = rest.split_whitespace().next().map(str::to_string);
            } else if let Some(rest) = line.strip_prefix("VmRSS:") {
                rss_kb = rest
                    .split_whitespace()
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
            }
        }
        Some(ProcInfo {
            pid,
            name: name.filter(|n| !n.is_empty())?,
            rss_kb,
        })
    }

    /// Counts, for each directory, the processes whose executable path or
    /// command line contains it. Result order matches `dirs`.
    pub fn count_by_dirs(&self, dirs: &[String]) -> Result<Vec<usize>, ProbeError> {
        let mut counts = vec![0; dirs.len()];
        for pid in self.pids()? {
            let exe = fs::read_link(self.root.join(format!("{pid}/exe")))
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let cmdline = fs::read(self.root.join(format!("{pid}/cmdline")))
                .map(|raw| String::from_utf8_lossy(&raw).replace('\0', " "))
                .unwrap_or_default();
            if exe.is_empty() && cmdline.is_empty() {
                continue;
            }
            for (count, dir) in counts.iter_mut().zip(dirs) {
                if exe.contains(dir.as_str()) || cmdline.contains(dir.as_str()) {
                    *count += 1;
                }
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn boot_time_reads_btime() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "stat", "cpu  1 2 3 4 5\nbtime 1700000000\nprocesses 12\n");
        assert_eq!(Procfs::new(dir.path()).boot_time().unwrap(), 1_700_000_000);
    }

    #[test]
    fn boot_time_missing_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "stat", "cpu  1 2 3 4 5\n");
        assert!(matches!(
            Procfs::new(dir.path()).boot_time(),
            Err(ProbeError::Missing(_))
        ));
        let empty = TempDir::new().unwrap();
        assert!(matches!(
            Procfs::new(empty.path()).boot_time(),
            Err(ProbeError::Io(_))
        ));
    }

    #[test]
    fn cpu_usage_between_samples() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "stat", "cpu  100 0 100 700 100 0 0 0\n");
        let before = Procfs::new(dir.path()).cpu_times().unwrap();
        assert_eq!(before, CpuTimes { idle: 800, total: 1000 });

        let after = CpuTimes { idle: 850, total: 1100 };
        assert!((after.usage_since(&before) - 50.0).abs() < f64::EPSILON);
        assert_eq!(before.usage_since(&before), 0.0);
    }

    #[test]
    fn meminfo_converts_to_bytes() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "meminfo",
            "MemTotal:       2048 kB\nMemFree:  10 kB\nMemAvailable:   1024 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n",
        );
        let info = Procfs::new(dir.path()).meminfo().unwrap();
        assert_eq!(info.mem_total, 2048 * 1024);
        assert_eq!(info.mem_available, 1024 * 1024);
        assert_eq!(info.swap_total, 0);
    }

    #[test]
    fn net_dev_skips_headers() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "net/dev",
            "Inter-|   Receive                                                |  Transmit\n \
             face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n    \
             lo: 100 2 0 0 0 0 0 0 100 2 0 0 0 0 0 0\n  \
             eth0: 5000 40 1 2 0 0 0 0 7000 50 3 4 0 0 0 0\n",
        );
        let stats = Procfs::new(dir.path()).net_dev().unwrap();
        assert_eq!(stats.len(), 2);
        let eth0 = stats["eth0"];
        assert_eq!(eth0.rx_bytes, 5000);
        assert_eq!(eth0.tx_drops, 4);
    }

    #[test]
    fn counts_processes_by_cmdline_and_exe() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "1/cmdline", "/opt/app/bin/server\0--port\08080\0");
        write(root, "2/cmdline", "python3\0/opt/app/worker.py\0");
        write(root, "3/cmdline", "/usr/bin/sleep\0");
        fs::create_dir_all(root.join("4")).unwrap();
        std::os::unix::fs::symlink("/srv/bot/run", root.join("4/exe")).unwrap();
        write(root, "self/cmdline", "/opt/app/ignored\0");

        let dirs = vec!["/opt/app".to_string(), "/srv/bot".to_string(), "/nope".to_string()];
        let counts = Procfs::new(root).count_by_dirs(&dirs).unwrap();
        assert_eq!(counts, vec![2, 1, 0]);
    }

    #[test]
    fn processes_need_a_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "10/status", "Name:\tnginx\nVmRSS:\t2048 kB\n");
        write(dir.path(), "11/status", "Name:\t\n");
        let procs = Procfs::new(dir.path()).processes().unwrap();
        assert_eq!(
            procs,
            vec![ProcInfo {
                pid: 10,
                name: "nginx".into(),
                rss_kb: 2048,
            }]
        );
    }
}
