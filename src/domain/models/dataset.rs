//! Typed tables of instances used as clustering input.
//!
//! A [`Dataset`] is owned by the caller and never mutated by the dispatch
//! core. It renders to ARFF text through [`fmt::Display`], which is also the
//! format used for centroid and standard-deviation snapshots in the result
//! envelope.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "values")]
pub enum AttributeKind {
    /// Real-valued column.
    Numeric,
    /// Categorical column with a fixed, ordered value domain.
    Nominal(Vec<String>),
    /// Free-form text column. No clustering family accepts these.
    Text,
}

impl AttributeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Nominal(_) => "nominal",
            Self::Text => "string",
        }
    }
}

/// Named column of a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    pub fn nominal<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Text,
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self.kind, AttributeKind::Numeric)
    }

    /// Number of values in the domain of a nominal attribute, 0 otherwise.
    pub fn num_values(&self) -> usize {
        match &self.kind {
            AttributeKind::Nominal(values) => values.len(),
            _ => 0,
        }
    }

    /// Index of `label` in the nominal domain.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        match &self.kind {
            AttributeKind::Nominal(values) => values.iter().position(|v| v == label),
            _ => None,
        }
    }
}

/// One cell of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Missing,
    Numeric(f64),
    /// Index into the attribute's nominal domain.
    Nominal(usize),
    Text(String),
}

impl Value {
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view of the cell: the number itself, or the nominal index.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Nominal(i) => Some(*i as f64),
            Self::Missing | Self::Text(_) => None,
        }
    }
}

/// A row of a dataset.
pub type Instance = Vec<Value>;

/// Errors raised while assembling a dataset.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("row {row} has {found} values, expected {expected}")]
    ArityMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, attribute '{attribute}': value does not match a {kind} attribute")]
    TypeMismatch {
        row: usize,
        attribute: String,
        kind: &'static str,
    },

    #[error("duplicate attribute name '{0}'")]
    DuplicateAttribute(String),
}

/// Immutable, labelled table of instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    relation: String,
    attributes: Vec<Attribute>,
    instances: Vec<Instance>,
}

impl Dataset {
    /// Build a dataset, checking arity and cell types of every row.
    pub fn new(
        relation: impl Into<String>,
        attributes: Vec<Attribute>,
        instances: Vec<Instance>,
    ) -> Result<Self, DatasetError> {
        for (i, attr) in attributes.iter().enumerate() {
            if attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(DatasetError::DuplicateAttribute(attr.name.clone()));
            }
        }

        for (row, instance) in instances.iter().enumerate() {
            if instance.len() != attributes.len() {
                return Err(DatasetError::ArityMismatch {
                    row,
                    expected: attributes.len(),
                    found: instance.len(),
                });
            }
            for (value, attr) in instance.iter().zip(&attributes) {
                let ok = match (value, &attr.kind) {
                    (Value::Missing, _)
                    | (Value::Numeric(_), AttributeKind::Numeric)
                    | (Value::Text(_), AttributeKind::Text) => true,
                    (Value::Nominal(idx), AttributeKind::Nominal(domain)) => *idx < domain.len(),
                    _ => false,
                };
                if !ok {
                    return Err(DatasetError::TypeMismatch {
                        row,
                        attribute: attr.name.clone(),
                        kind: attr.kind.as_str(),
                    });
                }
            }
        }

        Ok(Self {
            relation: relation.into(),
            attributes,
            instances,
        })
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// A dataset with the same header and the given rows.
    pub fn with_instances(
        &self,
        relation: impl Into<String>,
        instances: Vec<Instance>,
    ) -> Result<Self, DatasetError> {
        Self::new(relation, self.attributes.clone(), instances)
    }
}

/// Quote an ARFF token if it contains characters that would break parsing.
pub fn quote_arff(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token == "?"
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '{' | '}' | '\'' | '"' | '%'));
    if needs_quotes {
        format!("'{}'", token.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        token.to_string()
    }
}

/// Shortest decimal rendering that parses back to the same `f64`.
pub(crate) fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@relation {}", quote_arff(&self.relation))?;
        writeln!(f)?;
        for attr in &self.attributes {
            write!(f, "@attribute {} ", quote_arff(&attr.name))?;
            match &attr.kind {
                AttributeKind::Numeric => writeln!(f, "numeric")?,
                AttributeKind::Text => writeln!(f, "string")?,
                AttributeKind::Nominal(values) => {
                    let quoted: Vec<String> = values.iter().map(|v| quote_arff(v)).collect();
                    writeln!(f, "{{{}}}", quoted.join(","))?;
                }
            }
        }
        writeln!(f)?;
        write!(f, "@data")?;
        for instance in &self.instances {
            writeln!(f)?;
            let cells: Vec<String> = instance
                .iter()
                .zip(&self.attributes)
                .map(|(value, attr)| match (value, &attr.kind) {
                    (Value::Missing, _) => "?".to_string(),
                    (Value::Numeric(v), _) => format_number(*v),
                    (Value::Nominal(i), AttributeKind::Nominal(domain)) => {
                        domain.get(*i).map_or_else(|| "?".to_string(), |s| quote_arff(s))
                    }
                    (Value::Nominal(i), _) => i.to_string(),
                    (Value::Text(s), _) => quote_arff(s),
                })
                .collect();
            write!(f, "{}", cells.join(","))?;
        }
        Ok(())
    }
}
