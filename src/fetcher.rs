//! Projects upstream rate mappings onto the configured currency pairs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::core::cache::RateMemory;
use crate::core::{
    CurrencyPair, FetchError, MissingRatePolicy, RateMapping, RateRecord, RateSnapshot, RateSource,
};

pub struct RateFetcher {
    source: Arc<dyn RateSource>,
    policy: MissingRatePolicy,
    last_known: RateMemory,
}

impl RateFetcher {
    pub fn new(source: Arc<dyn RateSource>, policy: MissingRatePolicy) -> Self {
        RateFetcher {
            source,
            policy,
            last_known: RateMemory::new(),
        }
    }

    /// Fetches the latest rates once and builds a snapshot for `pairs`.
    ///
    /// Request failures are logged and produce an empty snapshot. A body that
    /// cannot be decoded is returned as an error.
    #[instrument(skip_all, fields(pairs = pairs.len()))]
    pub async fn fetch(&self, pairs: &[CurrencyPair]) -> Result<RateSnapshot, FetchError> {
        let mapping = match self.source.latest().await {
            Ok(mapping) => mapping,
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Exchange rate request failed");
                return Ok(RateSnapshot::empty());
            }
            Err(e) => return Err(e),
        };

        self.snapshot(&mapping, pairs, Utc::now()).await
    }

    /// Builds the snapshot for one mapping with every record stamped `at`.
    pub async fn snapshot(
        &self,
        mapping: &RateMapping,
        pairs: &[CurrencyPair],
        at: DateTime<Utc>,
    ) -> Result<RateSnapshot, FetchError> {
        let mut records = Vec::with_capacity(pairs.len());
        for pair in pairs {
            if let Some(value) = self.resolve(mapping, pair).await? {
                records.push(RateRecord {
                    pair: pair.clone(),
                    value,
                    timestamp: at,
                });
            }
        }

        if self.policy == MissingRatePolicy::CarryForward {
            self.last_known.remember(mapping).await;
        }

        Ok(RateSnapshot::new(records))
    }

    async fn resolve(
        &self,
        mapping: &RateMapping,
        pair: &CurrencyPair,
    ) -> Result<Option<Decimal>, FetchError> {
        if let Some(rate) = mapping.get(&pair.target) {
            return Ok(Some(rate));
        }

        debug!(%pair, policy = ?self.policy, "No upstream rate for pair");
        match self.policy {
            MissingRatePolicy::ZeroFill => Ok(Some(Decimal::ZERO)),
            MissingRatePolicy::Omit => Ok(None),
            MissingRatePolicy::Fail => Err(FetchError::MissingRate(pair.clone())),
            MissingRatePolicy::CarryForward => Ok(Some(
                self.last_known
                    .recall(&pair.target)
                    .await
                    .unwrap_or(Decimal::ZERO),
            )),
        }
    }
}
