//! Lap / qualifying / pit-stop duration parsing.
//!
//! Scoped strictly to duration fields (q1/q2/q3, pit-stop duration, lap
//! time). Speed columns and other numeric text go through the coercion layer
//! instead.

/// Convert a duration string to elapsed seconds.
///
/// Accepted forms are `M:SS.mmm` (minutes and seconds) and a bare seconds
/// value. Anything else, including strings with more than one `:`, coerces
/// to `None`; this function never aborts the pipeline.
pub fn duration_seconds(value: Option<&str>) -> Option<f64> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    let mut parts = s.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(minutes), Some(seconds), None) => {
            let minutes: i64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            Some(minutes as f64 * 60.0 + seconds)
        }
        (Some(seconds), None, None) => seconds.parse::<f64>().ok(),
        // More than one separator: not a lap-scale duration
        _ => None,
    }
}

/// Format seconds back into the `M:SS.mmm` form used in the source data.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as i64;
    let remainder = seconds - minutes as f64 * 60.0;
    format!("{}:{:06.3}", minutes, remainder)
}
