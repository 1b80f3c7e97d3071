//! Reboot detection from the kernel boot timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::ProbeError;
use crate::probe::Procfs;

use super::Watch;

const KEY: &str = "boot";

/// Watches `btime`; any change after the first sample is a reboot.
pub struct RebootWatch {
    procfs: Procfs,
}

impl RebootWatch {
    /// Creates a watch reading from `procfs`.
    pub fn new(procfs: Procfs) -> Self {
        Self { procfs }
    }
}

fn local_time(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}

#[async_trait]
impl Watch for RebootWatch {
    type Value = i64;

    fn name(&self) -> &str {
        "reboot"
    }

    fn keys(&self) -> Vec<String> {
        vec![KEY.to_string()]
    }

    async fn sample(&self, _key: &str) -> Result<i64, ProbeError> {
        self.procfs.boot_time()
    }

    fn classify(&self, _key: &str, _prev: &i64, cur: &i64) -> Option<String> {
        Some(format!(
            "🔄 <b>Server reboot detected</b>\n\n⏱ Rebooted at: {}",
            local_time(*cur)
        ))
    }
}
