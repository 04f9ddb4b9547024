//! Buffered edge computation
//!
//! `buffered.end(null)` does not reliably report the range around the play
//! head, so the edge is found by walking every range.

use crate::{types::TimeRanges, Result};

/// End of the buffered range that contains `current_time`
///
/// Falls back to the end of the first reported range when the play head is at
/// zero or lies in no range. Fails only when no range is reported at all.
pub fn buffered_edge(buffered: &TimeRanges, current_time: f64) -> Result<f64> {
    let mut edge = buffered.end(0)?;

    if current_time != 0.0 {
        if let Some(range) = buffered.iter().rev().find(|r| r.contains(current_time)) {
            edge = range.end;
        }
    }

    Ok(edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn ranges() -> TimeRanges {
        TimeRanges::from(vec![(0.0, 5.0), (8.0, 12.0)])
    }

    #[test]
    fn test_edge_in_second_range() {
        assert_eq!(buffered_edge(&ranges(), 10.0).unwrap(), 12.0);
    }

    #[test]
    fn test_edge_in_first_range() {
        assert_eq!(buffered_edge(&ranges(), 2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_edge_at_zero_uses_first_range() {
        assert_eq!(buffered_edge(&ranges(), 0.0).unwrap(), 5.0);
    }

    #[test]
    fn test_edge_in_gap_uses_first_range() {
        assert_eq!(buffered_edge(&ranges(), 6.5).unwrap(), 5.0);
    }

    #[test]
    fn test_edge_unordered_ranges() {
        let buffered = TimeRanges::from(vec![(20.0, 30.0), (0.0, 4.0), (10.0, 15.0)]);
        assert_eq!(buffered_edge(&buffered, 12.0).unwrap(), 15.0);
        assert_eq!(buffered_edge(&buffered, 40.0).unwrap(), 30.0);
    }

    #[test]
    fn test_edge_on_range_boundary() {
        assert_eq!(buffered_edge(&ranges(), 8.0).unwrap(), 12.0);
        assert_eq!(buffered_edge(&ranges(), 5.0).unwrap(), 5.0);
    }

    #[test]
    fn test_empty_ranges_fail() {
        let err = buffered_edge(&TimeRanges::new(), 3.0).unwrap_err();
        assert!(matches!(err, Error::TimeRange { index: 0, len: 0 }));
    }
}
