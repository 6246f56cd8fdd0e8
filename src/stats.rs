//! Small descriptive-statistics helpers shared by the schema builders and
//! the KPI aggregator.
//!
//! Anything that can divide by zero returns a [`Measure`] instead of NaN.

use crate::measure::Measure;
use std::collections::HashMap;
use std::hash::Hash;

/// Arithmetic mean. Undefined for empty input.
pub fn mean(values: &[f64]) -> Measure {
    Measure::ratio(values.iter().sum::<f64>(), values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator). Undefined below two values.
pub fn sample_std(values: &[f64]) -> Measure {
    if values.len() < 2 {
        return Measure::Undefined;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Measure::new(variance.sqrt())
}

/// Sample standard deviation divided by the mean.
pub fn coefficient_of_variation(values: &[f64]) -> Measure {
    sample_std(values).zip_with(mean(values), |sd, avg| sd / avg)
}

/// Pearson correlation of two equally long series.
///
/// Undefined when fewer than two pairs exist or either series is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Measure {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Measure::Undefined;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }

    Measure::ratio(cov, (vx * vy).sqrt())
}

/// Quantile of an ascending slice with linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Measure {
    if sorted.is_empty() {
        return Measure::Undefined;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Measure::new(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Groups `items` by `key`, preserving first-encountered key order and the
/// input order within each group.
pub fn group_by<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();

    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }

    groups
}

/// Equal-width, right-closed bins spanning the observed range of a series.
///
/// The lowest edge is nudged down by 0.1% of the range so the minimum falls
/// inside the first bin. A constant series collapses to a single bin.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualWidthBins {
    edges: Vec<f64>,
}

impl EqualWidthBins {
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

        let bins = bins.max(1);
        let range = max - min;
        if range == 0.0 {
            return Some(Self {
                edges: vec![min, max],
            });
        }

        let step = range / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| min + step * i as f64).collect();
        edges[0] = min - range * 0.001;
        edges[bins] = max;
        Some(Self { edges })
    }

    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the bin containing `value`, if it lies inside the range.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if self.len() == 1 && self.edges[0] == self.edges[1] {
            return (value == self.edges[0]).then_some(0);
        }
        (0..self.len()).find(|&i| value > self.edges[i] && value <= self.edges[i + 1])
    }

    pub fn label(&self, index: usize) -> String {
        let (lo, hi) = (self.edges[index], self.edges[index + 1]);
        if lo == hi {
            format!("[{lo:.2}, {hi:.2}]")
        } else {
            format!("({lo:.2}, {hi:.2}]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_undefined() {
        assert_eq!(mean(&[]), Measure::Undefined);
        assert_eq!(mean(&[2.0, 4.0]), Measure::Value(3.0));
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[5.0]), Measure::Undefined);
        let sd = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).value().unwrap();
        assert!((sd - 2.138089935).abs() < 1e-6);
    }

    #[test]
    fn test_pearson_perfect_and_degenerate() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        let r = pearson(&xs, &ys).value().unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        assert_eq!(pearson(&xs, &[3.0, 3.0, 3.0, 3.0]), Measure::Undefined);
        assert_eq!(pearson(&[1.0], &[1.0]), Measure::Undefined);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.5), Measure::Value(2.5));
        assert_eq!(quantile(&sorted, 0.0), Measure::Value(1.0));
        assert_eq!(quantile(&sorted, 1.0), Measure::Value(4.0));
        assert_eq!(quantile(&[], 0.5), Measure::Undefined);
    }

    #[test]
    fn test_group_by_keeps_first_encountered_order() {
        let items = ["b1", "a1", "b2", "c1", "a2"];
        let groups = group_by(&items, |s| s.chars().next().unwrap());
        let keys: Vec<char> = groups.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!['b', 'a', 'c']);
        assert_eq!(groups[0].1, vec![&"b1", &"b2"]);
    }

    #[test]
    fn test_equal_width_bins_cover_minimum_and_maximum() {
        let values = [0.0, 1.0, 2.5, 5.0];
        let bins = EqualWidthBins::new(&values, 5).unwrap();
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.index_of(0.0), Some(0));
        assert_eq!(bins.index_of(1.0), Some(0));
        assert_eq!(bins.index_of(1.01), Some(1));
        assert_eq!(bins.index_of(5.0), Some(4));
        assert_eq!(bins.index_of(6.0), None);
    }

    #[test]
    fn test_equal_width_bins_constant_series() {
        let bins = EqualWidthBins::new(&[3.0, 3.0], 5).unwrap();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins.index_of(3.0), Some(0));
        assert_eq!(bins.label(0), "[3.00, 3.00]");
        assert!(EqualWidthBins::new(&[], 5).is_none());
    }
}
