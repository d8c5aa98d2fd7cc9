use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::rate::RateMapping;

/// Last rate seen per currency code, kept for the lifetime of the process.
#[derive(Clone, Default)]
pub struct RateMemory {
    inner: Arc<Mutex<HashMap<String, Decimal>>>,
}

impl RateMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recall(&self, code: &str) -> Option<Decimal> {
        let rates = self.inner.lock().await;
        let value = rates.get(code).copied();
        if value.is_some() {
            debug!(code, "Last known rate HIT");
        } else {
            debug!(code, "Last known rate MISS");
        }
        value
    }

    pub async fn remember(&self, mapping: &RateMapping) {
        let mut rates = self.inner.lock().await;
        for (code, rate) in mapping.iter() {
            rates.insert(code.to_string(), rate);
        }
        debug!(count = mapping.len(), "Stored last known rates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remember_and_recall() {
        let memory = RateMemory::new();
        assert!(memory.recall("EUR").await.is_none());

        let first: RateMapping = [("EUR", Decimal::new(92, 2)), ("JPY", Decimal::new(1601, 1))]
            .into_iter()
            .collect();
        memory.remember(&first).await;
        assert_eq!(memory.recall("EUR").await, Some(Decimal::new(92, 2)));

        // A later mapping overwrites codes it carries and keeps the others
        let second: RateMapping = [("EUR", Decimal::new(93, 2))].into_iter().collect();
        memory.remember(&second).await;
        assert_eq!(memory.recall("EUR").await, Some(Decimal::new(93, 2)));
        assert_eq!(memory.recall("JPY").await, Some(Decimal::new(1601, 1)));
    }
}
