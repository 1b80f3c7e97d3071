//! Background watchers.
//!
//! - [`Baselines`]: per-key edge detection shared by every watcher
//! - [`Watch`] / [`Watcher`]: the watched-condition contract and its loop
//! - [`RebootWatch`], [`DirWatch`], [`UnitWatch`]: the built-in conditions

mod baseline;
mod dirs;
mod reboot;
mod units;
mod watcher;

pub use baseline::{Baseline, Baselines};
pub use dirs::DirWatch;
pub use reboot::RebootWatch;
pub use units::UnitWatch;
pub use watcher::{Watch, Watcher};
