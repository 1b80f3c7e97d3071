//! # Process report: the heaviest processes by resident memory.

use std::fmt::Write as _;

use async_trait::async_trait;

use crate::error::ReportError;
use crate::notify::escape_html;
use crate::probe::{ProcInfo, Procfs};

use super::format::{bytes, share};
use super::reporter::{Reporter, run_blocking};

/// Number of processes listed.
const TOP: usize = 10;

/// Reports the top processes by VmRSS with their share of total memory.
pub struct ProcessReporter {
    procfs: Procfs,
}

impl ProcessReporter {
    /// Creates a reporter reading from `procfs`.
    pub fn new(procfs: Procfs) -> Self {
        Self { procfs }
    }
}

#[async_trait]
impl Reporter for ProcessReporter {
    fn name(&self) -> &str {
        "process"
    }

    async fn report(&self) -> Result<String, ReportError> {
        let procfs = self.procfs.clone();
        run_blocking(move || {
            let total = procfs.meminfo()?.mem_total;
            Ok(render(top(procfs.processes()?), total))
        })
        .await
    }
}

/// Largest first; ties broken by pid.
fn top(mut procs: Vec<ProcInfo>) -> Vec<ProcInfo> {
    procs.sort_by(|a, b| b.rss_kb.cmp(&a.rss_kb).then(a.pid.cmp(&b.pid)));
    procs.truncate(TOP);
    procs
}

fn render(procs: Vec<ProcInfo>, mem_total: u64) -> String {
    let mut b = String::new();
    let _ = writeln!(b, "📋 <b>Top {TOP} heaviest processes</b>\n");
    for (i, p) in procs.iter().enumerate() {
        let rss = p.rss_kb * 1024;
        let _ = writeln!(b, "{}. <b>{}</b>", i + 1, escape_html(&p.name));
        let _ = writeln!(
            b,
            "   PID: {} | RAM: {:.1}% ({})",
            p.pid,
            share(rss, mem_total),
            bytes(rss)
        );
    }
    b
}
