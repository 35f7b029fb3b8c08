//! AQI trend helpers.

/// Percent change of the current AQI relative to an explicit previous
/// reading.
///
/// The caller supplies the previous value (typically the latest stored
/// sample); when no previous reading exists, or it was zero, there is no
/// meaningful baseline and the change is reported as 0.
#[must_use]
pub fn percent_change(previous: Option<u16>, current: u16) -> f64 {
    match previous {
        Some(prev) if prev > 0 => {
            (f64::from(current) - f64::from(prev)) / f64::from(prev) * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_basic() {
        assert!((percent_change(Some(100), 150) - 50.0).abs() < 1e-9);
        assert!((percent_change(Some(200), 150) - (-25.0)).abs() < 1e-9);
        assert!((percent_change(Some(150), 150)).abs() < 1e-9);
    }

    #[test]
    fn test_percent_change_no_baseline() {
        assert_eq!(percent_change(None, 150), 0.0);
        assert_eq!(percent_change(Some(0), 150), 0.0);
    }
}
