//! Property-Based Tests for Series Merging
//!
//! Property: merging an incoming series SHALL keep every stored reading
//! strictly before the first incoming timestamp, followed by the whole
//! incoming series.

use proptest::prelude::*;
use riverdata_core::{Reading, Series};
use riverdata_test_utils::generators::{arb_series, arb_series_between, arb_timestamp};

proptest! {
    #[test]
    fn prop_merge_disjoint_concatenates(
        a in arb_series_between(0, 1_000, 40),
        b in arb_series_between(1_000, 2_000, 40),
    ) {
        let merged = a.merge(&b);

        let expected: Vec<Reading> = a.iter().chain(b.iter()).copied().collect();
        prop_assert_eq!(merged.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_merge_overlap_discards_tail(
        a in arb_series(40),
        b in arb_series(40),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!a.is_empty() && !b.is_empty());
        let anchor = a.as_slice()[pick.index(a.len())].timestamp;
        let shift = anchor - b.as_slice()[0].timestamp;
        let b: Series = b.iter().map(|r| (r.timestamp + shift, r.value)).collect();

        let merged = a.merge(&b);

        let expected: Vec<Reading> = a
            .iter()
            .filter(|r| r.timestamp < anchor)
            .chain(b.iter())
            .copied()
            .collect();
        prop_assert_eq!(merged.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_merge_identity(a in arb_series(40)) {
        prop_assert_eq!(a.merge(&Series::new()), a.clone());
        prop_assert_eq!(Series::new().merge(&a), a);
    }

    #[test]
    fn prop_merge_preserves_ordering(a in arb_series(40), b in arb_series(40)) {
        let merged = a.merge(&b);
        prop_assert!(merged.as_slice().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn prop_merge_in_place_matches_merge(a in arb_series(40), b in arb_series(40)) {
        let mut in_place = a.clone();
        in_place.merge_in_place(&b);
        prop_assert_eq!(in_place, a.merge(&b));
    }

    #[test]
    fn prop_window_and_evict_split_at_horizon(a in arb_series(40), horizon in arb_timestamp()) {
        let window = a.window(horizon);
        let mut evicted = a.clone();
        let removed = evicted.evict_before(horizon);

        prop_assert_eq!(&window, &evicted);
        prop_assert_eq!(removed + window.len(), a.len());
        prop_assert!(window.iter().all(|r| r.timestamp >= horizon));
    }
}
