//! Crowd-level aggregation
//!
//! Two modes derive a single [`CrowdLevel`] for a venue:
//! - count mode: raw per-bucket counts (local tallies)
//! - weighted mode: per-report linear time decay over a 30 minute window
//!
//! All functions are pure; `now` is always a parameter so results are
//! reproducible under test.

use crate::domain::types::{CrowdLevel, CrowdReport, CrowdTally, WeightedTally};
use chrono::{DateTime, Utc};

/// Reports older than this contribute nothing to the weighted mode
pub const REPORT_EXPIRY_MINUTES: f64 = 30.0;

/// Per-refresh shrink factor applied to local tallies
pub const LOCAL_DECAY_FACTOR: f64 = 0.8;

/// Ordered tie-break shared by both aggregation modes.
///
/// Busy wins any tie against both other buckets; Moderate beats Quiet on a
/// tie only while strictly above Busy; Quiet is the fallback, including the
/// all-zero case. The `>=`/`>` asymmetry is deliberate and load-bearing:
/// a Quiet/Moderate tie with equal Busy resolves to Quiet.
fn pick_level(quiet: f64, moderate: f64, busy: f64) -> CrowdLevel {
    if busy >= quiet && busy >= moderate {
        CrowdLevel::Busy
    } else if moderate >= quiet && moderate > busy {
        CrowdLevel::Moderate
    } else {
        CrowdLevel::Quiet
    }
}

/// Derive a crowd level from raw counts (local mode)
///
/// Total over all non-negative inputs; the all-zero tally is Quiet.
pub fn level_from_counts(tally: &CrowdTally) -> CrowdLevel {
    pick_level(f64::from(tally.quiet), f64::from(tally.moderate), f64::from(tally.busy))
}

/// Linear decay weight for a report of the given age
///
/// 1.0 at age zero, 0.0 at 30 minutes or older, linear in between.
/// Future-dated reports (clock skew) clamp to 1.0 so a skewed clock can
/// never outweigh a fresh report.
pub fn report_weight(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_minutes = (now - created_at).num_milliseconds() as f64 / 60_000.0;
    (1.0 - age_minutes / REPORT_EXPIRY_MINUTES).clamp(0.0, 1.0)
}

/// Sum decay weights per bucket for a venue's report set
///
/// Tolerates stale reports in the input: anything past the expiry window is
/// zero-weighted, so callers may prefilter for efficiency but do not have to.
pub fn weighted_tally(reports: &[CrowdReport], now: DateTime<Utc>) -> WeightedTally {
    let mut tally = WeightedTally::default();
    for report in reports {
        tally.add(report.level, report_weight(report.created_at, now));
    }
    tally
}

/// Derive a crowd level from timestamped reports (shared mode)
///
/// An empty set is Quiet - there is no Unknown state, "no signal" and
/// "genuinely quiet" are indistinguishable by policy.
pub fn level_from_reports(reports: &[CrowdReport], now: DateTime<Utc>) -> CrowdLevel {
    if reports.is_empty() {
        return CrowdLevel::Quiet;
    }
    let tally = weighted_tally(reports, now);
    pick_level(tally.quiet, tally.moderate, tally.busy)
}

/// Shrink a local tally by one refresh tick
///
/// Each bucket becomes `floor(count * 0.8)`, never below zero, so stale
/// local counts fade out across refreshes instead of accumulating forever.
pub fn decay_tally(tally: &CrowdTally) -> CrowdTally {
    let decay = |count: u32| (f64::from(count) * LOCAL_DECAY_FACTOR).floor() as u32;
    CrowdTally::new(decay(tally.quiet), decay(tally.moderate), decay(tally.busy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::VenueId;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn report(level: CrowdLevel, age_minutes: i64) -> CrowdReport {
        CrowdReport {
            id: format!("r-{}-{}", level.as_str(), age_minutes),
            venue_id: VenueId::from("1"),
            level,
            created_at: fixed_now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_all_zero_tally_is_quiet() {
        assert_eq!(level_from_counts(&CrowdTally::default()), CrowdLevel::Quiet);
    }

    #[test]
    fn test_busy_wins_all_equal_tie() {
        assert_eq!(level_from_counts(&CrowdTally::new(5, 5, 5)), CrowdLevel::Busy);
    }

    #[test]
    fn test_busy_wins_tie_against_moderate() {
        assert_eq!(level_from_counts(&CrowdTally::new(3, 5, 5)), CrowdLevel::Busy);
    }

    #[test]
    fn test_moderate_wins_when_strictly_above_busy() {
        assert_eq!(level_from_counts(&CrowdTally::new(3, 5, 4)), CrowdLevel::Moderate);
    }

    #[test]
    fn test_moderate_busy_tie_falls_through_to_quiet() {
        // moderate is not strictly above busy, so the moderate clause fails
        // and quiet keeps its majority
        assert_eq!(level_from_counts(&CrowdTally::new(5, 4, 4)), CrowdLevel::Quiet);
    }

    #[test]
    fn test_quiet_moderate_tie_goes_to_moderate() {
        // moderate >= quiet and strictly above busy
        assert_eq!(level_from_counts(&CrowdTally::new(5, 5, 0)), CrowdLevel::Moderate);
    }

    #[test]
    fn test_plain_majorities() {
        assert_eq!(level_from_counts(&CrowdTally::new(9, 2, 1)), CrowdLevel::Quiet);
        assert_eq!(level_from_counts(&CrowdTally::new(2, 9, 1)), CrowdLevel::Moderate);
        assert_eq!(level_from_counts(&CrowdTally::new(1, 2, 9)), CrowdLevel::Busy);
    }

    #[test]
    fn test_empty_report_set_is_quiet() {
        assert_eq!(level_from_reports(&[], fixed_now()), CrowdLevel::Quiet);
    }

    #[test]
    fn test_weight_boundaries() {
        let now = fixed_now();
        assert_eq!(report_weight(now, now), 1.0);
        assert_eq!(report_weight(now - Duration::minutes(30), now), 0.0);
        assert_eq!(report_weight(now - Duration::minutes(90), now), 0.0);
    }

    #[test]
    fn test_weight_monotonically_non_increasing() {
        let now = fixed_now();
        let mut prev = f64::INFINITY;
        for age in 0..=40 {
            let w = report_weight(now - Duration::minutes(age), now);
            assert!(w <= prev, "weight increased at age {age}");
            assert!((0.0..=1.0).contains(&w));
            prev = w;
        }
    }

    #[test]
    fn test_future_dated_report_clamps_to_one() {
        let now = fixed_now();
        assert_eq!(report_weight(now + Duration::minutes(10), now), 1.0);
    }

    #[test]
    fn test_fresh_quiet_outweighs_old_busy() {
        let now = fixed_now();
        let reports = [report(CrowdLevel::Busy, 29), report(CrowdLevel::Quiet, 1)];
        assert_eq!(level_from_reports(&reports, now), CrowdLevel::Quiet);
    }

    #[test]
    fn test_weighted_scores_scenario() {
        let now = fixed_now();
        let reports = [report(CrowdLevel::Busy, 5), report(CrowdLevel::Quiet, 28)];

        let tally = weighted_tally(&reports, now);
        assert!((tally.busy - 0.8333).abs() < 1e-3);
        assert!((tally.quiet - 0.0667).abs() < 1e-3);
        assert_eq!(tally.moderate, 0.0);

        assert_eq!(level_from_reports(&reports, now), CrowdLevel::Busy);
    }

    #[test]
    fn test_expired_reports_do_not_shift_the_result() {
        let now = fixed_now();
        // A pile of expired busy reports against one live quiet one.
        let reports = [
            report(CrowdLevel::Busy, 31),
            report(CrowdLevel::Busy, 45),
            report(CrowdLevel::Busy, 120),
            report(CrowdLevel::Quiet, 2),
        ];
        assert_eq!(level_from_reports(&reports, now), CrowdLevel::Quiet);
    }

    #[test]
    fn test_weighted_tie_break_matches_count_mode() {
        let now = fixed_now();
        // Equal weights in every bucket: busy wins, as in count mode.
        let reports = [
            report(CrowdLevel::Quiet, 10),
            report(CrowdLevel::Moderate, 10),
            report(CrowdLevel::Busy, 10),
        ];
        assert_eq!(level_from_reports(&reports, now), CrowdLevel::Busy);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let now = fixed_now();
        let reports = [report(CrowdLevel::Moderate, 3), report(CrowdLevel::Quiet, 7)];
        let first = level_from_reports(&reports, now);
        let second = level_from_reports(&reports, now);
        assert_eq!(first, second);

        let tally = CrowdTally::new(4, 2, 2);
        assert_eq!(level_from_counts(&tally), level_from_counts(&tally));
    }

    #[test]
    fn test_decay_tally_floors() {
        let decayed = decay_tally(&CrowdTally::new(10, 4, 2));
        assert_eq!(decayed, CrowdTally::new(8, 3, 1));
    }

    #[test]
    fn test_decay_tally_bottoms_out_at_zero() {
        let mut tally = CrowdTally::new(1, 1, 1);
        tally = decay_tally(&tally);
        assert_eq!(tally, CrowdTally::new(0, 0, 0));
        // Stays at zero once drained
        assert_eq!(decay_tally(&tally), CrowdTally::new(0, 0, 0));
    }
}
