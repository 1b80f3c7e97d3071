//! Readers for host state: procfs files and systemd units.
//!
//! Both the reporters and the watchers read through these, so a test can point
//! either at a fake tree.

mod procfs;
mod systemd;

pub use procfs::{CpuTimes, MemInfo, Mount, NetCounters, ProcInfo, Procfs};
pub use systemd::{discover_units, unit_status};
