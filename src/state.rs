use crate::models::DailyCounts;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Shared application context: the HTTP client, the per-(domain, year)
/// fetch cache, and the update generation counter. Cache entries live for
/// the process lifetime unless cleared explicitly.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub default_domain: String,
    cache: Arc<Mutex<HashMap<String, DailyCounts>>>,
    generation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(default_domain: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            default_domain,
            cache: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn cached_counts(&self, key: &str) -> Option<DailyCounts> {
        self.cache.lock().await.get(key).cloned()
    }

    pub async fn store_counts(&self, key: String, counts: DailyCounts) {
        self.cache.lock().await.insert(key, counts);
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Claims a new update generation. An update claimed here is current
    /// until the next claim.
    pub fn begin_update(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
