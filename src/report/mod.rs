//! Report producers shown by live tasks.
//!
//! - [`Reporter`] / [`ReporterFn`] / [`ReporterRef`]: the contract
//! - [`StatusReporter`], [`NetworkReporter`], [`ProcessReporter`]: host reports

mod format;
mod network;
mod process;
mod reporter;
mod system;

pub use network::NetworkReporter;
pub use process::ProcessReporter;
pub use reporter::{Reporter, ReporterFn, ReporterRef};
pub use system::StatusReporter;
