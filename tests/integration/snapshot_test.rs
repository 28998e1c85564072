//! Point-in-time snapshot properties over a synthetic universe

use crate::common::{month_ends, store};
use std::collections::{BTreeSet, HashMap};

#[test]
fn test_no_future_rows_for_any_date() {
    let store = store(12);
    for date in store.universe().dates() {
        for n in 1..=4 {
            let snap = store.snapshot(*date, n, n);
            assert!(snap.prices().iter().all(|r| r.date < *date));
            assert!(snap.ratios().iter().all(|r| r.date < *date));
            assert!(snap.price_dates().iter().all(|d| d < date));
        }
    }
}

#[test]
fn test_every_entity_complete_and_consistent() {
    let store = store(12);
    let dates = store.universe().dates().to_vec();

    for date in &dates[3..] {
        let snap = store.snapshot(*date, 3, 2);

        let mut price_rows: HashMap<&str, usize> = HashMap::new();
        for r in snap.prices() {
            *price_rows.entry(r.entity_id.as_str()).or_default() += 1;
        }
        let mut ratio_rows: HashMap<&str, usize> = HashMap::new();
        for r in snap.ratios() {
            *ratio_rows.entry(r.entity_id.as_str()).or_default() += 1;
        }

        assert!(price_rows.values().all(|n| *n == 3), "{date}: {price_rows:?}");
        assert!(ratio_rows.values().all(|n| *n == 2), "{date}: {ratio_rows:?}");

        let price_ids: BTreeSet<&str> = price_rows.keys().copied().collect();
        let ratio_ids: BTreeSet<&str> = ratio_rows.keys().copied().collect();
        assert_eq!(price_ids, ratio_ids);
    }
}

#[test]
fn test_gaps_exclude_entities_while_in_window() {
    let store = store(12);
    let m = month_ends(12);

    // CCC's missing 4th price (m[3]) sits in the 3-date price window of m[4..=6]
    for date in &m[4..=6] {
        assert!(!store.snapshot(*date, 3, 1).contains("CCC"), "{date}");
    }
    assert!(store.snapshot(m[7], 3, 1).contains("CCC"));

    // EEE's missing ratio report at m[5] only matters once it is inside the ratio window
    assert!(store.snapshot(m[5], 1, 2).contains("EEE"));
    assert!(!store.snapshot(m[6], 1, 2).contains("EEE"));
    assert!(!store.snapshot(m[7], 1, 2).contains("EEE"));
    assert!(store.snapshot(m[8], 1, 2).contains("EEE"));

    // FFF has prices from the start but no ratios before m[2]
    assert!(!store.snapshot(m[2], 2, 1).contains("FFF"));
    assert!(store.snapshot(m[3], 2, 1).contains("FFF"));
}

#[test]
fn test_snapshot_is_deterministic() {
    let store = store(12);
    let m = month_ends(12);
    let a = store.snapshot(m[9], 4, 3);
    let b = store.snapshot(m[9], 4, 3);

    assert_eq!(a.prices(), b.prices());
    assert_eq!(a.ratios(), b.ratios());
    assert_eq!(a.summary(), b.summary());
}

#[test]
fn test_reference_date_between_universe_dates() {
    let store = store(6);
    let m = month_ends(6);
    let mid = m[3] - chrono::Days::new(10);

    let snap = store.snapshot(mid, 2, 2);
    assert_eq!(snap.price_dates(), &[m[1], m[2]]);
    assert!(snap.prices().iter().all(|r| r.date <= m[2]));
}
