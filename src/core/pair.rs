//! Currency pair parsing and display

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// An ordered `BASE/TARGET` pair. Upstream rates are quoted against a single
/// implicit base, so only `target` takes part in lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    pub base: String,
    pub target: String,
}

impl CurrencyPair {
    pub fn new(base: &str, target: &str) -> Self {
        CurrencyPair {
            base: base.to_string(),
            target: target.to_string(),
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((base, target))
                if !base.is_empty() && !target.is_empty() && !target.contains('/') =>
            {
                Ok(CurrencyPair::new(base, target))
            }
            _ => Err(anyhow::anyhow!("Invalid currency pair: {}", s)),
        }
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> String {
        pair.to_string()
    }
}
