use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::core::errors::{LookupError, LookupResult};
use crate::core::types::{DictionaryResult, LanguagePair};
use crate::middleware::{FlightAborted, SingleFlight};
use crate::services::catalog::pairs_from_codes;
use crate::services::dictionary::api_client::DictionaryApi;
use crate::services::dictionary::store::KeyValueStore;
use crate::utils::Metrics;

/// Store key holding the serialized language pair list
pub const LANGUAGE_PAIRS_KEY: &str = "languageCombinations";

/// Store key for one lookup: the lowercased text joined to the pair code
pub fn cache_key(text: &str, lang: &str) -> String {
    format!("{}-{}", text.to_lowercase(), lang)
}

/// Value produced by a flight, and whether it came from the remote API
type Filled<T> = LookupResult<(T, bool)>;

/// Read-through, write-through cache in front of the remote dictionary.
///
/// Entries never expire. A value that fails to deserialize counts as a miss
/// and is overwritten by the fresh result. Concurrent misses on one key
/// share a single remote call, which runs to completion even if the caller
/// that started it goes away.
pub struct DictionaryGateway {
    backend: Arc<Backend>,
    pair_flights: SingleFlight<Filled<Vec<LanguagePair>>>,
    lookup_flights: SingleFlight<Filled<DictionaryResult>>,
}

/// State shared with in-flight fills
struct Backend {
    api: Arc<dyn DictionaryApi>,
    store: Arc<dyn KeyValueStore>,
    metrics: Option<Metrics>,
}

impl DictionaryGateway {
    pub fn new(
        api: Arc<dyn DictionaryApi>,
        store: Arc<dyn KeyValueStore>,
        metrics: Option<Metrics>,
    ) -> Self {
        if let Some(ref m) = metrics {
            m.update_cache_size(store.len());
        }

        Self {
            backend: Arc::new(Backend {
                api,
                store,
                metrics,
            }),
            pair_flights: SingleFlight::new(),
            lookup_flights: SingleFlight::new(),
        }
    }

    /// Supported language pairs, fetched once per store lifetime
    #[instrument(skip(self))]
    pub async fn fetch_language_pairs(&self) -> LookupResult<Vec<LanguagePair>> {
        if let Some(pairs) = self.backend.cached(LANGUAGE_PAIRS_KEY) {
            self.backend.record_hit();
            return Ok(pairs);
        }

        let backend = Arc::clone(&self.backend);
        let outcome = self
            .pair_flights
            .run(LANGUAGE_PAIRS_KEY, move || async move {
                let fetch = async {
                    backend
                        .api
                        .get_langs()
                        .await
                        .map(|codes| pairs_from_codes(&codes))
                };
                backend.fill(LANGUAGE_PAIRS_KEY, fetch).await
            })
            .await;

        self.backend.settle(outcome)
    }

    /// Dictionary entry for `text` in direction `lang` (e.g. `en-es`).
    ///
    /// The cache key ignores case; the remote call uses `text` as given.
    #[instrument(skip(self))]
    pub async fn translate(&self, text: &str, lang: &str) -> LookupResult<DictionaryResult> {
        let key = cache_key(text, lang);
        if let Some(result) = self.backend.cached(&key) {
            self.backend.record_hit();
            return Ok(result);
        }

        let backend = Arc::clone(&self.backend);
        let flight_key = key.clone();
        let text = text.to_string();
        let lang = lang.to_string();
        let outcome = self
            .lookup_flights
            .run(&key, move || async move {
                let fetch = backend.api.lookup(&text, &lang);
                backend.fill(&flight_key, fetch).await
            })
            .await;

        self.backend.settle(outcome)
    }
}

impl Backend {
    /// Decode a stored value; `Ok(None)` when the key is absent
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        match self.store.get(key) {
            Some(raw) => serde_json::from_str(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Like `read`, treating undecodable payloads as absent
    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read(key) {
            Ok(Some(value)) => {
                debug!("Cache hit for {}", key);
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Discarding malformed cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Body of a single flight: re-check the store, then fetch and write back
    async fn fill<T, Fut>(&self, key: &str, fetch: Fut) -> Filled<T>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = LookupResult<T>>,
    {
        // Another flight for this key may have finished since the caller looked
        if let Ok(Some(value)) = self.read(key) {
            return Ok((value, false));
        }

        debug!("Cache miss for {}, querying remote API", key);
        let value = fetch.await?;
        self.write_back(key, &value);
        Ok((value, true))
    }

    /// A failed write is logged; the caller still gets the fetched value
    fn write_back<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, &serialized) {
            warn!("Failed to write cache entry {}: {}", key, e);
        }

        if let Some(ref m) = self.metrics {
            m.update_cache_size(self.store.len());
        }
    }

    /// Record one hit or miss for a caller that went through a flight
    fn settle<T>(&self, outcome: Result<(Filled<T>, bool), FlightAborted>) -> LookupResult<T> {
        let (filled, joined) = match outcome {
            Ok(outcome) => outcome,
            Err(FlightAborted) => {
                self.record_miss();
                return Err(LookupError::Aborted);
            }
        };

        if joined {
            if let Some(ref m) = self.metrics {
                m.record_coalesced_request();
            }
        }

        match filled {
            Ok((value, true)) => {
                self.record_miss();
                Ok(value)
            }
            Ok((value, false)) => {
                self.record_hit();
                Ok(value)
            }
            Err(e) => {
                self.record_miss();
                Err(e)
            }
        }
    }

    fn record_hit(&self) {
        if let Some(ref m) = self.metrics {
            m.record_cache_hit();
        }
    }

    fn record_miss(&self) {
        if let Some(ref m) = self.metrics {
            m.record_cache_miss();
        }
    }
}
