//! Human-readable durations for log rows and messages.

use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

/// Format a duration as `Ns`, `MmSs` or `HhMmSs`.
///
/// Anything below one second is `"0s"`; otherwise the value is rounded to the
/// nearest second before being split into units.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        return "0s".to_string();
    }

    let total = round_to_secs(d);
    if total < MINUTE {
        format!("{}s", total)
    } else if total < HOUR {
        format!("{}m{}s", total / MINUTE, total % MINUTE)
    } else {
        format!(
            "{}h{}m{}s",
            total / HOUR,
            (total % HOUR) / MINUTE,
            total % MINUTE
        )
    }
}

// Half-way values round up.
fn round_to_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_millis() >= 500 {
        secs + 1
    } else {
        secs
    }
}
