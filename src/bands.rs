//! Bands - formant target regions per phonetic category.
//!
//! Reference data for the training view: for each category (a vowel, for
//! instance) the frequency ranges where F1 and F2 of a correct production
//! are expected. The envelope renderer highlights these ranges.
//!
//! # JSON format
//!
//! ```json
//! {
//!     "a": { "f1": [638, 657], "f2": [1215, 1353] },
//!     "i": { "f1": [270, 310], "f2": [2200, 2400] }
//! }
//! ```
//!
//! Every band is validated while the table is parsed, so a table that loads
//! successfully never fails at render time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A frequency range of interest, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct FormantBand {
    low: f64,
    high: f64,
}

impl FormantBand {
    /// Create a validated band.
    ///
    /// # Errors
    ///
    /// `Error::InvalidBand` unless both bounds are finite, `low >= 0` and
    /// `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::InvalidBand(format!(
                "bounds must be finite, got [{}, {}]",
                low, high
            )));
        }
        if low < 0.0 {
            return Err(Error::InvalidBand(format!(
                "lower bound must be non-negative, got {}",
                low
            )));
        }
        if low >= high {
            return Err(Error::InvalidBand(format!(
                "lower bound {} must be below upper bound {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Lower bound in Hz.
    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound in Hz.
    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Center frequency in Hz.
    #[inline]
    pub fn center(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// True if `freq` lies within the band (bounds inclusive).
    #[inline]
    pub fn contains(&self, freq: f64) -> bool {
        freq >= self.low && freq <= self.high
    }
}

impl TryFrom<(f64, f64)> for FormantBand {
    type Error = Error;

    fn try_from((low, high): (f64, f64)) -> Result<Self> {
        FormantBand::new(low, high)
    }
}

impl From<FormantBand> for (f64, f64) {
    fn from(band: FormantBand) -> Self {
        (band.low, band.high)
    }
}

/// Expected F1 and F2 regions for one phonetic category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormantTargets {
    pub f1: FormantBand,
    pub f2: FormantBand,
}

impl FormantTargets {
    /// Bands in formant order (F1, F2).
    pub fn bands(&self) -> [FormantBand; 2] {
        [self.f1, self.f2]
    }
}

/// Mapping from category key to formant targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable {
    categories: BTreeMap<String, FormantTargets>,
}

impl BandTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    /// Parse and validate a table from JSON text.
    ///
    /// # Errors
    ///
    /// - `Error::Json` for malformed JSON or an invalid band (the band error
    ///   message is carried inside the JSON error)
    /// - `Error::InvalidParameter` for an empty category key
    pub fn from_json(json: &str) -> Result<Self> {
        let table: BandTable = serde_json::from_str(json)?;
        if table.categories.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::InvalidParameter(
                "band table contains an empty category key".to_string(),
            ));
        }
        log::debug!("loaded band table with {} categories", table.len());
        Ok(table)
    }

    /// Load and validate a table from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize the table to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace a category.
    pub fn insert(&mut self, category: impl Into<String>, targets: FormantTargets) {
        self.categories.insert(category.into(), targets);
    }

    /// Look up a category.
    ///
    /// # Errors
    ///
    /// `Error::UnknownCategory` if the key is not in the table.
    pub fn get(&self, category: &str) -> Result<&FormantTargets> {
        self.categories
            .get(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))
    }

    /// Category keys in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Number of categories.
    #[inline]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True when the table has no categories.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for BandTable {
    /// Built-in table with the open vowel /a/.
    fn default() -> Self {
        let mut table = Self::new();
        table.insert(
            "a",
            FormantTargets {
                f1: FormantBand { low: 638.0, high: 657.0 },
                f2: FormantBand { low: 1215.0, high: 1353.0 },
            },
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_validation() {
        assert!(FormantBand::new(100.0, 200.0).is_ok());
        assert!(matches!(FormantBand::new(200.0, 100.0), Err(Error::InvalidBand(_))));
        assert!(matches!(FormantBand::new(100.0, 100.0), Err(Error::InvalidBand(_))));
        assert!(matches!(FormantBand::new(-1.0, 100.0), Err(Error::InvalidBand(_))));
        assert!(matches!(FormantBand::new(0.0, f64::NAN), Err(Error::InvalidBand(_))));
    }

    #[test]
    fn test_band_contains() {
        let band = FormantBand::new(638.0, 657.0).unwrap();
        assert!(band.contains(638.0));
        assert!(band.contains(650.0));
        assert!(band.contains(657.0));
        assert!(!band.contains(660.0));
        assert_eq!(band.center(), 647.5);
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"{
            "a": { "f1": [638, 657], "f2": [1215, 1353] },
            "i": { "f1": [270, 310], "f2": [2200, 2400] }
        }"#;
        let table = BandTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.categories().collect::<Vec<_>>(), vec!["a", "i"]);

        let i = table.get("i").unwrap();
        assert_eq!(i.f2.low(), 2200.0);
        assert_eq!(i.bands()[0], i.f1);
        assert!(matches!(table.get("u"), Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn test_invalid_band_rejected_at_load() {
        let json = r#"{ "a": { "f1": [657, 638], "f2": [1215, 1353] } }"#;
        assert!(matches!(BandTable::from_json(json), Err(Error::Json(_))));

        let missing = r#"{ "a": { "f1": [638, 657] } }"#;
        assert!(BandTable::from_json(missing).is_err());

        let empty_key = r#"{ " ": { "f1": [638, 657], "f2": [1215, 1353] } }"#;
        assert!(matches!(
            BandTable::from_json(empty_key),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_table_round_trips_through_json() {
        let table = BandTable::default();
        let a = table.get("a").unwrap();
        assert_eq!((a.f1.low(), a.f1.high()), (638.0, 657.0));

        let parsed = BandTable::from_json(&table.to_json().unwrap()).unwrap();
        assert_eq!(parsed, table);
    }
}
