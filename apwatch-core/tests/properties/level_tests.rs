//! Property-based tests for fullness levels

use apwatch_core::snapshot::{ApView, MAX_LEVEL, SsidView, level_for};
use proptest::prelude::*;

// ========== Strategies ==========

fn arb_ssid_view() -> impl Strategy<Value = SsidView> {
    ("[a-z]{2,8}", 0u32..500, 0u32..100)
        .prop_map(|(name, count, max_count)| SsidView::new(name, count, max_count))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ========== Level bounds ==========
    //
    // Every level is within 0..=10 whatever the count and threshold.

    #[test]
    fn level_is_bounded(count in any::<u32>(), max_count in any::<u32>()) {
        let level = level_for(count, max_count);
        prop_assert!(level <= MAX_LEVEL);
    }

    #[test]
    fn level_is_zero_without_threshold(count in any::<u32>()) {
        prop_assert_eq!(level_for(count, 0), 0);
        prop_assert_eq!(SsidView::new("corp", count, 0).level, 0);
    }

    #[test]
    fn level_matches_integer_percentage(count in 0u32..10_000, max_count in 1u32..10_000) {
        let expected = (u64::from(count) * 100 / u64::from(max_count) / 10).min(10);
        prop_assert_eq!(u64::from(level_for(count, max_count)), expected);
    }

    #[test]
    fn level_grows_with_count(count in 0u32..1_000, extra in 0u32..1_000, max_count in 1u32..500) {
        prop_assert!(level_for(count, max_count) <= level_for(count + extra, max_count));
    }

    #[test]
    fn full_or_over_capacity_is_max_level(max_count in 1u32..1_000, over in 0u32..1_000) {
        prop_assert_eq!(level_for(max_count + over, max_count), MAX_LEVEL);
    }

    // ========== Access point level ==========
    //
    // An access point is as full as its fullest SSID, 0 without SSIDs.

    #[test]
    fn ap_level_is_max_of_ssids(ssids in prop::collection::vec(arb_ssid_view(), 0..6)) {
        let expected = ssids.iter().map(|s| s.level).max().unwrap_or(0);
        let ap = ApView::new("ap_01", "6", "12", ssids);
        prop_assert_eq!(ap.level, expected);
    }
}

#[test]
fn ap_without_ssids_is_level_zero() {
    let ap = ApView::new("ap_01", "-", "-", Vec::new());
    assert_eq!(ap.level, 0);
}
