//! # Network report.
//!
//! Totals over every interface in `net/dev`, then one block per interface
//! with link details from sysfs and addresses from `getifaddrs`.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ReportError;
use crate::notify::escape_html;
use crate::probe::{NetCounters, Procfs};

use super::format::bytes;
use super::reporter::{Reporter, run_blocking};

/// Link details of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub state: String,
    pub speed: String,
    pub mtu: u32,
    pub mac: Option<String>,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            state: "unknown".into(),
            speed: "n/a".into(),
            mtu: 0,
            mac: None,
            ipv4: Vec::new(),
            ipv6: Vec::new(),
        }
    }
}

/// Reports traffic counters and interface details.
pub struct NetworkReporter {
    procfs: Procfs,
    sys_net: PathBuf,
}

impl NetworkReporter {
    /// Creates a reporter reading from `procfs` and `/sys/class/net`.
    pub fn new(procfs: Procfs) -> Self {
        Self {
            procfs,
            sys_net: PathBuf::from("/sys/class/net"),
        }
    }

    /// Overrides the sysfs network class directory.
    pub fn with_sys_net(mut self, path: impl Into<PathBuf>) -> Self {
        self.sys_net = path.into();
        self
    }
}

#[async_trait]
impl Reporter for NetworkReporter {
    fn name(&self) -> &str {
        "network"
    }

    async fn report(&self) -> Result<String, ReportError> {
        let procfs = self.procfs.clone();
        let sys_net = self.sys_net.clone();
        run_blocking(move || {
            let stats = procfs.net_dev()?;
            let mut addrs = addresses();
            let links = stats
                .keys()
                .map(|name| {
                    let (ipv4, ipv6) = addrs.remove(name).unwrap_or_default();
                    (name.clone(), Link { ipv4, ipv6, ..link(&sys_net, name) })
                })
                .collect();
            Ok(render(&stats, &links))
        })
        .await
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Operstate, speed, MTU and MAC from sysfs.
fn link(sys_net: &Path, name: &str) -> Link {
    let dir = sys_net.join(name);
    let mut out = Link::default();
    if let Some(state) = read_trimmed(&dir.join("operstate")) {
        out.state = state;
    }
    // Reading `speed` fails with EINVAL on links that are down.
    if let Some(speed) = read_trimmed(&dir.join("speed")) {
        out.speed = format!("{speed} Mbps");
    }
    out.mtu = read_trimmed(&dir.join("mtu"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    out.mac = read_trimmed(&dir.join("address")).filter(|mac| mac != "00:00:00:00:00:00");
    out
}

/// IPv4 and IPv6 addresses per interface.
#[cfg(unix)]
fn addresses() -> HashMap<String, (Vec<String>, Vec<String>)> {
    use std::net::{SocketAddrV4, SocketAddrV6};

    let mut out: HashMap<String, (Vec<String>, Vec<String>)> = HashMap::new();
    let Ok(ifaddrs) = nix::ifaddrs::getifaddrs() else {
        return out;
    };
    for ifa in ifaddrs {
        let Some(addr) = ifa.address else { continue };
        let entry = out.entry(ifa.interface_name).or_default();
        if let Some(sin) = addr.as_sockaddr_in() {
            entry.0.push(SocketAddrV4::from(*sin).ip().to_string());
        } else if let Some(sin6) = addr.as_sockaddr_in6() {
            entry.1.push(SocketAddrV6::from(*sin6).ip().to_string());
        }
    }
    out
}

#[cfg(not(unix))]
fn addresses() -> HashMap<String, (Vec<String>, Vec<String>)> {
    HashMap::new()
}

pub(crate) fn render(stats: &BTreeMap<String, NetCounters>, links: &BTreeMap<String, Link>) -> String {
    let mut total = NetCounters::default();
    for counters in stats.values() {
        total.accumulate(counters);
    }

    let mut b = String::new();
    let _ = writeln!(b, "🌐 <b>Network statistics</b>\n");
    let _ = writeln!(b, "📤 Sent: {}", bytes(total.tx_bytes));
    let _ = writeln!(b, "📥 Received: {}", bytes(total.rx_bytes));
    let _ = writeln!(b, "📦 Packets sent: {}", total.tx_packets);
    let _ = writeln!(b, "📦 Packets received: {}", total.rx_packets);
    let _ = writeln!(b, "❗ Errors: in {} / out {}", total.rx_errors, total.tx_errors);
    let _ = writeln!(b, "🚫 Drops: in {} / out {}\n", total.rx_drops, total.tx_drops);
    let _ = writeln!(b, "🧩 <b>Interfaces:</b>");

    let fallback = Link::default();
    for (name, st) in stats {
        let link = links.get(name).unwrap_or(&fallback);
        let _ = writeln!(
            b,
            "\n<b>{}</b> ({}, {}, MTU {})",
            escape_html(name),
            escape_html(&link.state),
            escape_html(&link.speed),
            link.mtu
        );
        let _ = writeln!(b, "  ↗ {} | ↘ {}", bytes(st.tx_bytes), bytes(st.rx_bytes));
        let _ = writeln!(b, "  pkts ↗ {} | ↘ {}", st.tx_packets, st.rx_packets);
        if let Some(mac) = &link.mac {
            let _ = writeln!(b, "  MAC: {}", escape_html(mac));
        }
        if !link.ipv4.is_empty() {
            let _ = writeln!(b, "  IPv4: {}", link.ipv4.join(", "));
        }
        if !link.ipv6.is_empty() {
            let _ = writeln!(b, "  IPv6: {}", link.ipv6.join(", "));
        }
    }
    b
}
