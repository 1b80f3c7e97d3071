//! Service unit status tracking.

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::notify::escape_html;
use crate::probe::unit_status;

use super::Watch;

const ACTIVE: &str = "active";

/// Tracks `systemctl is-active` per unit; alerts on leaving and re-entering
/// the active state.
pub struct UnitWatch {
    units: Vec<String>,
}

impl UnitWatch {
    /// Creates a watch over `units` (notification order is kept).
    pub fn new(units: Vec<String>) -> Self {
        Self { units }
    }
}

#[async_trait]
impl Watch for UnitWatch {
    type Value = String;

    fn name(&self) -> &str {
        "units"
    }

    fn keys(&self) -> Vec<String> {
        self.units.clone()
    }

    async fn sample(&self, key: &str) -> Result<String, ProbeError> {
        unit_status(key).await
    }

    fn classify(&self, key: &str, prev: &String, cur: &String) -> Option<String> {
        let unit = escape_html(key);
        match (prev.as_str() == ACTIVE, cur.as_str() == ACTIVE) {
            (true, false) => Some(format!(
                "⚠️ <b>Unit is not active</b>\n\n<code>{unit}</code>\nStatus: {}",
                escape_html(cur)
            )),
            (false, true) => Some(format!(
                "✅ <b>Unit is active again</b>\n\n<code>{unit}</code>"
            )),
            _ => None,
        }
    }
}
