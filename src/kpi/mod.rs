//! KPI catalog computed from the fact table.
//!
//! Each category is an independent pure reduction over the same immutable
//! fact rows and returns its own record. [`KpiCatalog::compute`] composes
//! them; serialized, the catalog is one flat object of metric name to value.
//!
//! Zero or undefined denominators resolve to [`Measure::Undefined`] unless a
//! metric documents a zero fallback.

pub mod business;
pub mod geographic;
pub mod operational;
pub mod revenue;
pub mod strategic;
pub mod temporal;
pub mod weather;

pub use crate::measure::Measure;
pub use business::BusinessKpis;
pub use geographic::GeographicKpis;
pub use operational::OperationalKpis;
pub use revenue::RevenueKpis;
pub use strategic::StrategicKpis;
pub use temporal::TemporalKpis;
pub use weather::WeatherKpis;

use crate::config::PipelineConfig;
use crate::schema::FactRow;
use crate::stats::group_by;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::Hash;

/// Scalar breakdown keyed by a categorical value.
pub type Breakdown = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCatalog {
    #[serde(flatten)]
    pub revenue: RevenueKpis,
    #[serde(flatten)]
    pub operational: OperationalKpis,
    #[serde(flatten)]
    pub temporal: TemporalKpis,
    #[serde(flatten)]
    pub weather: WeatherKpis,
    #[serde(flatten)]
    pub geographic: GeographicKpis,
    #[serde(flatten)]
    pub business: BusinessKpis,
    #[serde(flatten)]
    pub strategic: StrategicKpis,
}

impl KpiCatalog {
    #[tracing::instrument(skip_all, fields(rows = fact.len()))]
    pub fn compute(fact: &[FactRow], config: &PipelineConfig) -> Self {
        KpiCatalog {
            revenue: revenue::compute(fact),
            operational: operational::compute(fact),
            temporal: temporal::compute(fact),
            weather: weather::compute(fact),
            geographic: geographic::compute(fact, config),
            business: business::compute(fact, config),
            strategic: strategic::compute(fact, config),
        }
    }
}

/// A key and its score in a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub key: String,
    pub value: f64,
}

/// Sorts descending by value and keeps the first `n`.
///
/// The sort is stable, so ties keep the input order; callers pass groups in
/// first-encountered order, which makes ties break by first-encountered key.
pub fn top_n(mut entries: Vec<Ranked>, n: usize) -> Vec<Ranked> {
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    entries.truncate(n);
    entries
}

pub(crate) fn sum_by<K, F, V>(fact: &[FactRow], key: F, value: V) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&FactRow) -> K,
    V: Fn(&FactRow) -> f64,
{
    let mut sums = BTreeMap::new();
    for row in fact {
        *sums.entry(key(row)).or_insert(0.0) += value(row);
    }
    sums
}

pub(crate) fn count_by<K, F>(fact: &[FactRow], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&FactRow) -> K,
{
    let mut counts = BTreeMap::new();
    for row in fact {
        *counts.entry(key(row)).or_insert(0) += 1;
    }
    counts
}

/// Mean of `value` per key. Every group is non-empty, so every mean is defined.
pub(crate) fn mean_by<K, F, V>(fact: &[FactRow], key: F, value: V) -> BTreeMap<K, f64>
where
    K: Ord + Clone,
    F: Fn(&FactRow) -> K,
    V: Fn(&FactRow) -> f64,
{
    let sums = sum_by(fact, &key, &value);
    let counts = count_by(fact, &key);
    sums.into_iter()
        .map(|(k, sum)| {
            let n = counts.get(&k).copied().unwrap_or(1);
            (k, sum / n as f64)
        })
        .collect()
}

/// Groups rows by key in first-encountered order and scores each group.
pub(crate) fn ranked_groups<K, F, S>(fact: &[FactRow], key: F, score: S) -> Vec<Ranked>
where
    K: Eq + Hash + Clone + ToString,
    F: Fn(&FactRow) -> K,
    S: Fn(&[&FactRow]) -> Option<f64>,
{
    group_by(fact, key)
        .into_iter()
        .filter_map(|(k, rows)| {
            score(&rows).map(|value| Ranked {
                key: k.to_string(),
                value,
            })
        })
        .collect()
}

pub(crate) fn mean_of(fact: &[FactRow], value: impl Fn(&FactRow) -> f64) -> Measure {
    let total: f64 = fact.iter().map(value).sum();
    Measure::ratio(total, fact.len() as f64)
}

pub(crate) fn share_of(fact: &[FactRow], predicate: impl Fn(&FactRow) -> bool) -> Measure {
    let hits = fact.iter().filter(|r| predicate(r)).count();
    Measure::ratio(hits as f64, fact.len() as f64)
}

pub(crate) fn total_revenue(fact: &[FactRow]) -> f64 {
    fact.iter().map(|r| r.final_price).sum()
}
