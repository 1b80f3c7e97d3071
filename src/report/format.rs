//! Shared formatting helpers for report text.

/// Number of cells in a percentage bar.
const BAR_CELLS: usize = 10;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count with a binary unit and one decimal (`"1.5 GB"`).
pub fn bytes(value: u64) -> String {
    let mut val = value as f64;
    let mut unit = 0;
    while val >= 1024.0 && unit < UNITS.len() - 1 {
        val /= 1024.0;
        unit += 1;
    }
    format!("{val:.1} {}", UNITS[unit])
}

/// Renders a 10-cell bar followed by the value (`"█████░░░░░ 50.0%"`).
pub fn percentage(value: f64) -> String {
    let filled = ((BAR_CELLS as f64 * value / 100.0) as isize).clamp(0, BAR_CELLS as isize) as usize;
    format!(
        "{}{} {value:.1}%",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled)
    )
}

/// Traffic-light emoji for a load percentage.
pub fn status_emoji(value: f64) -> &'static str {
    if value < 50.0 {
        "🟢"
    } else if value < 80.0 {
        "🟡"
    } else {
        "🔴"
    }
}

/// Formats whole seconds as `"Nd Nh Nm"`.
pub fn uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;
    format!("{days}d {hours}h {mins}m")
}

/// `part` as a percentage of `whole`; zero when `whole` is zero.
pub fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pick_the_largest_unit() {
        assert_eq!(bytes(0), "0.0 B");
        assert_eq!(bytes(1023), "1023.0 B");
        assert_eq!(bytes(1536), "1.5 KB");
        assert_eq!(bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(bytes(u64::MAX), "16777216.0 TB");
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(percentage(0.0), "░░░░░░░░░░ 0.0%");
        assert_eq!(percentage(55.0), "█████░░░░░ 55.0%");
        assert_eq!(percentage(140.0), "██████████ 140.0%");
        assert_eq!(percentage(-3.0), "░░░░░░░░░░ -3.0%");
    }

    #[test]
    fn emoji_thresholds() {
        assert_eq!(status_emoji(49.9), "🟢");
        assert_eq!(status_emoji(50.0), "🟡");
        assert_eq!(status_emoji(80.0), "🔴");
    }

    #[test]
    fn uptime_breakdown() {
        assert_eq!(uptime(59), "0d 0h 0m");
        assert_eq!(uptime(90_061), "1d 1h 1m");
    }
}
