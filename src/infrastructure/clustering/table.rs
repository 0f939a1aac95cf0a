//! Dense numeric encoding of a [`Dataset`].
//!
//! Numeric cells keep their value, nominal cells become their domain index
//! as `f64`, and missing cells become `NaN`. String attributes cannot be
//! encoded and are rejected up front.

use crate::domain::models::{AttributeKind, Dataset, Value};

use super::error::{Error, Result};

/// Column type of an encoded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Numeric,
    /// Nominal column with the given domain size.
    Nominal(usize),
}

impl Column {
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric)
    }
}

/// Encoded instances plus column types.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    /// Encode every instance of `dataset`.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let columns = dataset
            .attributes()
            .iter()
            .map(|attr| match &attr.kind {
                AttributeKind::Numeric => Ok(Column::Numeric),
                AttributeKind::Nominal(values) => Ok(Column::Nominal(values.len())),
                AttributeKind::Text => Err(Error::UnsupportedAttribute {
                    name: attr.name.clone(),
                    kind: attr.kind.as_str(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = dataset.instances().iter().map(|i| encode(i)).collect();
        Ok(Self { columns, rows })
    }

    /// Build a table directly from encoded rows.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<f64>>) -> Result<Self> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(Error::DimensionMismatch {
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check that `row` has this table's arity.
    pub fn check_row(&self, row: &[f64]) -> Result<()> {
        if row.len() == self.columns.len() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                found: row.len(),
            })
        }
    }

    /// Per-column fill values: mean for numeric columns, mode for nominal.
    ///
    /// A column with no observed values fills with `NaN` (stays missing).
    pub fn means_and_modes(&self) -> Vec<f64> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, kind)| column_summary(*kind, self.rows.iter().map(|r| r[col])))
            .collect()
    }

    /// Copy of this table with missing cells replaced by `fill`.
    pub fn with_missing_replaced(&self, fill: &[f64]) -> Self {
        let rows = self.rows.iter().map(|row| replace_missing(row, fill)).collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Encode one instance. String cells are treated as missing.
pub fn encode(instance: &[Value]) -> Vec<f64> {
    instance.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect()
}

/// Replace `NaN` cells of `row` with the matching entry of `fill`.
pub fn replace_missing(row: &[f64], fill: &[f64]) -> Vec<f64> {
    row.iter()
        .zip(fill)
        .map(|(v, f)| if v.is_nan() { *f } else { *v })
        .collect()
}

/// Mean of a numeric column or mode of a nominal one, ignoring missing values.
///
/// Mode ties resolve to the lowest index.
pub(crate) fn column_summary(kind: Column, values: impl Iterator<Item = f64>) -> f64 {
    match kind {
        Column::Numeric => {
            let (sum, n) = values
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if n == 0 {
                f64::NAN
            } else {
                sum / n as f64
            }
        }
        Column::Nominal(card) => {
            let counts = nominal_counts(card, values);
            mode(&counts).map_or(f64::NAN, |m| m as f64)
        }
    }
}

/// Frequency of each nominal value, ignoring missing cells.
pub(crate) fn nominal_counts(card: usize, values: impl Iterator<Item = f64>) -> Vec<usize> {
    let mut counts = vec![0usize; card];
    for v in values.filter(|v| !v.is_nan()) {
        if let Some(slot) = counts.get_mut(v as usize) {
            *slot += 1;
        }
    }
    counts
}

/// Index of the largest count; `None` when every count is zero.
pub(crate) fn mode(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, &c) in counts.iter().enumerate() {
        if c > 0 && best.is_none_or(|(_, bc)| c > bc) {
            best = Some((i, c));
        }
    }
    best.map(|(i, _)| i)
}
