//! Human-readable intervals.

/// Describe when an item comes back, e.g. `"in 3 days"`.
///
/// Anything under 1/60 of a day reads as one minute.
pub fn format_interval(days: f64) -> String {
    if days < 1.0 / 60.0 {
        return "in 1 minute".to_string();
    }
    let (amount, unit) = if days < 1.0 / 24.0 {
        (days * 24.0 * 60.0, "minute")
    } else if days < 1.0 {
        (days * 24.0, "hour")
    } else if days < 30.0 {
        (days, "day")
    } else {
        (days / 30.0, "month")
    };

    let amount = amount.round() as u64;
    if amount == 1 {
        format!("in 1 {unit}")
    } else {
        format!("in {amount} {unit}s")
    }
}
