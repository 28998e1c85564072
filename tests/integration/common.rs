//! Shared panel fixtures

use chrono::{Months, NaiveDate};
use pit_backtest::panel::{PanelStore, PriceEntry, RatioEntry};

pub const ENTITIES: [&str; 6] = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"];

/// Month-end dates starting at January 2020
pub fn month_ends(count: usize) -> Vec<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
    (0..count as u32)
        .map(|i| (first + Months::new(i)).pred_opt().unwrap())
        .collect()
}

/// Deterministic return in [-0.05, 0.05]
pub fn synthetic_return(entity: usize, period: usize) -> f64 {
    ((entity * 7 + period * 3) % 11) as f64 / 100.0 - 0.05
}

/// Six entities over `months` month-ends with a few deliberate holes:
/// CCC misses its 4th price, EEE misses its 6th ratio report and FFF only
/// starts reporting ratios in the 3rd month.
pub fn panel_rows(months: usize) -> (Vec<PriceEntry>, Vec<RatioEntry>, Vec<String>) {
    let dates = month_ends(months);
    let mut prices = Vec::new();
    let mut ratios = Vec::new();

    for (e, id) in ENTITIES.iter().enumerate() {
        for (t, date) in dates.iter().enumerate() {
            if !(*id == "CCC" && t == 3) {
                prices.push(PriceEntry {
                    entity_id: id.to_string(),
                    date: *date,
                    ret: synthetic_return(e, t),
                });
            }
            if !(*id == "EEE" && t == 5) && !(*id == "FFF" && t < 2) {
                ratios.push(RatioEntry {
                    entity_id: id.to_string(),
                    date: *date,
                    features: vec![10.0 + e as f64, 1.0 + t as f64 / 10.0],
                });
            }
        }
    }

    (prices, ratios, vec!["pe".to_string(), "pb".to_string()])
}

pub fn store(months: usize) -> PanelStore {
    let (prices, ratios, names) = panel_rows(months);
    PanelStore::new(prices, ratios, names).unwrap()
}
