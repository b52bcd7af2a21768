use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, used wherever a wall-clock
/// timestamp needs to be logged or compared rather than measured with
/// `Instant`.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis() as i64
}
