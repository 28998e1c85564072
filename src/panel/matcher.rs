//! Completeness filtering and cross-panel reconciliation

use super::{PanelRow, Panel};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Rows dated within `dates`, restricted to entities observed on every one of them
///
/// An entity with a hole anywhere in the window is dropped entirely.
pub fn match_entries<'a, R: PanelRow>(panel: &'a Panel<R>, dates: &[NaiveDate]) -> Vec<&'a R> {
    let candidates: Vec<&R> = dates.iter().flat_map(|d| panel.rows_on(*d)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in &candidates {
        *counts.entry(row.entity_id()).or_default() += 1;
    }

    candidates
        .into_iter()
        .filter(|row| counts.get(row.entity_id()).copied().unwrap_or(0) >= dates.len())
        .collect()
}

/// Restrict both row sets to the entities present in both
pub fn reconcile<'a, P: PanelRow, Q: PanelRow>(
    prices: Vec<&'a P>,
    ratios: Vec<&'a Q>,
) -> (Vec<&'a P>, Vec<&'a Q>) {
    let price_ids: HashSet<&str> = prices.iter().map(|r| r.entity_id()).collect();
    let ratio_ids: HashSet<&str> = ratios.iter().map(|r| r.entity_id()).collect();
    let shared: HashSet<&str> = price_ids.intersection(&ratio_ids).copied().collect();

    let prices = prices
        .into_iter()
        .filter(|r| shared.contains(r.entity_id()))
        .collect();
    let ratios = ratios
        .into_iter()
        .filter(|r| shared.contains(r.entity_id()))
        .collect();

    (prices, ratios)
}
