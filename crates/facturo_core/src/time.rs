//! Wall-clock helper shared by model constructors.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns current Unix epoch milliseconds.
///
/// Clocks set before the epoch collapse to `0` instead of failing.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::now_epoch_ms;

    #[test]
    fn now_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }
}
