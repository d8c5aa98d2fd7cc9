//! Rate types shared by the fetcher and the exporter

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::pair::CurrencyPair;

/// Raw currency code to rate data as returned by upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateMapping(HashMap<String, Decimal>);

impl RateMapping {
    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

impl<K: Into<String>> FromIterator<(K, Decimal)> for RateMapping {
    fn from_iter<I: IntoIterator<Item = (K, Decimal)>>(iter: I) -> Self {
        RateMapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub pair: CurrencyPair,
    pub value: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// The pair-indexed view of one fetch. Records keep the order of the requested
/// pairs and share one timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSnapshot {
    records: Vec<RateRecord>,
}

impl RateSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(records: Vec<RateRecord>) -> Self {
        RateSnapshot { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RateRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RateSnapshot {
    type Item = &'a RateRecord;
    type IntoIter = std::slice::Iter<'a, RateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// What to do when upstream has no rate for a requested target code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatePolicy {
    /// Record the pair with a value of zero.
    #[default]
    ZeroFill,
    /// Leave the pair out of the snapshot.
    Omit,
    /// Fail the whole fetch.
    Fail,
    /// Reuse the last value seen for the code, or zero if there is none.
    CarryForward,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mapping_lookup() {
        let mapping: RateMapping = [("EUR", Decimal::from_str("0.92").unwrap())]
            .into_iter()
            .collect();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("EUR"), Some(Decimal::from_str("0.92").unwrap()));
        assert_eq!(mapping.get("JPY"), None);
    }

    #[test]
    fn test_policy_names() {
        let policy: MissingRatePolicy = serde_yaml::from_str("carry_forward").unwrap();
        assert_eq!(policy, MissingRatePolicy::CarryForward);
        assert_eq!(MissingRatePolicy::default(), MissingRatePolicy::ZeroFill);
        assert!(serde_yaml::from_str::<MissingRatePolicy>("skip").is_err());
    }
}
