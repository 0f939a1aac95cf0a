//! Range-normalised distances over mixed numeric/nominal instances.
//!
//! Numeric attributes are scaled to `[0, 1]` using the ranges seen at fit
//! time. Nominal attributes contribute 0 when equal and 1 otherwise.
//! Missing values follow the usual convention:
//!
//! - both missing: difference 1
//! - one missing, nominal: difference 1
//! - one missing, numeric: the larger of `x` and `1 - x` for the known,
//!   normalised value `x`

use super::table::{Column, Table};

/// Distance metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric {
    /// Display name, e.g. `EuclideanDistance`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "EuclideanDistance",
            Self::Manhattan => "ManhattanDistance",
        }
    }
}

/// A metric plus the per-attribute ranges it normalises with.
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    metric: Metric,
    columns: Vec<Column>,
    /// `(min, max)` for numeric columns with at least one value.
    ranges: Vec<Option<(f64, f64)>>,
}

impl Distance {
    /// Learn attribute ranges from `table`.
    pub fn fit(metric: Metric, table: &Table) -> Self {
        let ranges = table
            .columns()
            .iter()
            .enumerate()
            .map(|(col, kind)| {
                if !kind.is_numeric() {
                    return None;
                }
                table
                    .rows()
                    .iter()
                    .map(|r| r[col])
                    .filter(|v| !v.is_nan())
                    .fold(None, |acc: Option<(f64, f64)>, v| {
                        Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
                    })
            })
            .collect();

        Self {
            metric,
            columns: table.columns().to_vec(),
            ranges,
        }
    }

    pub const fn metric(&self) -> Metric {
        self.metric
    }

    fn normalise(&self, col: usize, v: f64) -> f64 {
        match self.ranges[col] {
            Some((lo, hi)) if hi > lo => (v - lo) / (hi - lo),
            _ => 0.0,
        }
    }

    /// Per-attribute difference in `[0, 1]` (may exceed 1 for out-of-range values).
    fn difference(&self, col: usize, a: f64, b: f64) -> f64 {
        match self.columns[col] {
            Column::Nominal(_) => {
                if a.is_nan() || b.is_nan() || (a - b).abs() > f64::EPSILON {
                    1.0
                } else {
                    0.0
                }
            }
            Column::Numeric => match (a.is_nan(), b.is_nan()) {
                (true, true) => 1.0,
                (true, false) | (false, true) => {
                    let known = if a.is_nan() { b } else { a };
                    let x = self.normalise(col, known);
                    x.max(1.0 - x)
                }
                (false, false) => (self.normalise(col, a) - self.normalise(col, b)).abs(),
            },
        }
    }

    /// Distance between two encoded instances.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = (0..self.columns.len()).map(|col| self.difference(col, a[col], b[col]));
        match self.metric {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.sum(),
        }
    }

    /// Contribution of one instance to a within-cluster error sum.
    ///
    /// Squared distance for Euclidean, plain distance for Manhattan.
    pub fn error_term(&self, a: &[f64], b: &[f64]) -> f64 {
        let d = self.distance(a, b);
        match self.metric {
            Metric::Euclidean => d * d,
            Metric::Manhattan => d,
        }
    }
}

/// Index of the nearest candidate; ties go to the lowest index.
pub(crate) fn nearest<'a>(
    distance: &Distance,
    row: &[f64],
    candidates: impl IntoIterator<Item = &'a Vec<f64>>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.into_iter().enumerate() {
        let d = distance.distance(row, c);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}
