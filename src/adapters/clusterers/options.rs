//! Flag/value reader shared by the clusterer adapters.
//!
//! Tokens arrive already split (`["-N", "3", "-O"]`). Each family declares
//! its flags and whether they take a value; the reader walks the tokens
//! once and rejects anything it does not recognise. A value token is taken
//! verbatim, so negative numbers such as `-N -1` work.

use std::str::FromStr;

use crate::domain::errors::ConfigurationError;

/// Whether a flag consumes the following token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Switch,
    Value,
}

/// A parsed flag with its value, if it takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Setting<'a> {
    pub flag: &'static str,
    pub value: Option<&'a str>,
}

impl<'a> Setting<'a> {
    /// The value of a [`Arity::Value`] flag.
    pub fn value(&self) -> Result<&'a str, ConfigurationError> {
        self.value
            .ok_or_else(|| ConfigurationError::MissingValue(self.flag.to_string()))
    }

    pub fn parse<T: FromStr>(&self, what: &str) -> Result<T, ConfigurationError> {
        let raw = self.value()?;
        raw.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
            flag: self.flag.to_string(),
            value: raw.to_string(),
            reason: format!("expected {what}"),
        })
    }

    /// A finite floating-point value.
    pub fn parse_f64(&self) -> Result<f64, ConfigurationError> {
        let v: f64 = self.parse("a number")?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(self.out_of_range("must be finite"))
        }
    }

    /// An integer of at least `min`.
    pub fn parse_at_least(&self, min: usize) -> Result<usize, ConfigurationError> {
        let v: i64 = self.parse("an integer")?;
        usize::try_from(v)
            .ok()
            .filter(|v| *v >= min)
            .ok_or_else(|| self.out_of_range(&format!("must be at least {min}")))
    }

    /// A non-negative random seed.
    pub fn parse_seed(&self) -> Result<u64, ConfigurationError> {
        let v: i64 = self.parse("an integer")?;
        u64::try_from(v).map_err(|_| self.out_of_range("must not be negative"))
    }

    pub fn out_of_range(&self, reason: &str) -> ConfigurationError {
        ConfigurationError::OutOfRange {
            flag: self.flag.to_string(),
            value: self.value.unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(&self, reason: &str) -> ConfigurationError {
        ConfigurationError::InvalidValue {
            flag: self.flag.to_string(),
            value: self.value.unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Split `tokens` into settings according to `flags`.
pub(crate) fn read_settings<'a>(
    tokens: &'a [String],
    flags: &[(&'static str, Arity)],
) -> Result<Vec<Setting<'a>>, ConfigurationError> {
    let mut settings = Vec::new();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        let token = token.trim();
        let Some(&(flag, arity)) = flags.iter().find(|(f, _)| *f == token) else {
            return Err(ConfigurationError::UnknownOption(token.to_string()));
        };
        let value = match arity {
            Arity::Switch => None,
            Arity::Value => Some(
                iter.next()
                    .map(String::as_str)
                    .ok_or_else(|| ConfigurationError::MissingValue(flag.to_string()))?,
            ),
        };
        settings.push(Setting { flag, value });
    }
    Ok(settings)
}
