use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, warn};

use super::client::{CollectionSource, FetchError};

/// The closed set of remote collections this layer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Customers,
    Payments,
    AdvancePayments,
    TattooConsents,
    PiercingConsents,
    Expenses,
    Leads,
}

impl ResourceKey {
    pub const COUNT: usize = 7;

    pub fn all() -> [ResourceKey; Self::COUNT] {
        [
            ResourceKey::Customers,
            ResourceKey::Payments,
            ResourceKey::AdvancePayments,
            ResourceKey::TattooConsents,
            ResourceKey::PiercingConsents,
            ResourceKey::Expenses,
            ResourceKey::Leads,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKey::Customers => "customers",
            ResourceKey::Payments => "payments",
            ResourceKey::AdvancePayments => "advancePayments",
            ResourceKey::TattooConsents => "tattooConsents",
            ResourceKey::PiercingConsents => "piercingConsents",
            ResourceKey::Expenses => "expenses",
            ResourceKey::Leads => "leads",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|key| {
            key.as_str().eq_ignore_ascii_case(s) || key.endpoint().eq_ignore_ascii_case(s)
        })
    }

    /// URL path segment under the API base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceKey::Customers => "customers",
            ResourceKey::Payments => "payments",
            ResourceKey::AdvancePayments => "advance-payments",
            ResourceKey::TattooConsents => "tattoo-consents",
            ResourceKey::PiercingConsents => "piercing-consents",
            ResourceKey::Expenses => "expenses",
            ResourceKey::Leads => "leads",
        }
    }

    /// Staleness/refresh policy. Financial collections go stale quickly and
    /// refresh on their own while enabled; the slower-moving ones only
    /// re-fetch on use.
    pub fn policy(&self) -> CachePolicy {
        match self {
            ResourceKey::Payments | ResourceKey::AdvancePayments | ResourceKey::Expenses => {
                CachePolicy {
                    stale_after: Duration::from_secs(120),
                    refresh_interval: Some(Duration::from_secs(300)),
                }
            }
            ResourceKey::Leads => CachePolicy {
                stale_after: Duration::from_secs(300),
                refresh_interval: None,
            },
            ResourceKey::Customers
            | ResourceKey::TattooConsents
            | ResourceKey::PiercingConsents => CachePolicy {
                stale_after: Duration::from_secs(600),
                refresh_interval: None,
            },
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub stale_after: Duration,
    pub refresh_interval: Option<Duration>,
}

/// A point-in-time view of one cache entry. Cheap to clone; the records are
/// shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub key: ResourceKey,
    pub data: Option<Arc<Vec<Value>>>,
    pub enabled: bool,
    pub loading: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub error: Option<FetchError>,
}

impl CacheSnapshot {
    /// The cached records, empty if nothing has loaded yet.
    pub fn records(&self) -> &[Value] {
        self.data.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Default)]
struct SlotState {
    data: Option<Arc<Vec<Value>>>,
    fetched_at: Option<DateTime<Utc>>,
    invalidated: bool,
    loading: bool,
    error: Option<FetchError>,
}

struct CacheSlot {
    enabled: AtomicBool,
    state: RwLock<SlotState>,
    // Serializes fetches for this key: at most one in flight.
    fetch_gate: Mutex<()>,
}

impl CacheSlot {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            state: RwLock::new(SlotState::default()),
            fetch_gate: Mutex::new(()),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SlotState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SlotState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct CacheInner {
    source: Arc<dyn CollectionSource>,
    slots: [CacheSlot; ResourceKey::COUNT],
}

impl CacheInner {
    fn slot(&self, key: ResourceKey) -> &CacheSlot {
        &self.slots[key.index()]
    }

    fn snapshot(&self, key: ResourceKey) -> CacheSnapshot {
        let slot = self.slot(key);
        let state = slot.read_state();
        CacheSnapshot {
            key,
            data: state.data.clone(),
            enabled: slot.enabled.load(Ordering::Relaxed),
            loading: state.loading,
            fetched_at: state.fetched_at,
            error: state.error.clone(),
        }
    }

    /// Never fetched, explicitly invalidated, or older than the key's
    /// staleness budget.
    fn needs_fetch(&self, key: ResourceKey) -> bool {
        let state = self.slot(key).read_state();
        if state.invalidated {
            return true;
        }
        match state.fetched_at {
            None => true,
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                age.to_std()
                    .map(|age| age > key.policy().stale_after)
                    .unwrap_or(true)
            }
        }
    }

    async fn fetch_now(&self, key: ResourceKey) -> Result<CacheSnapshot, FetchError> {
        let slot = self.slot(key);
        slot.write_state().loading = true;
        debug!(key = %key, "fetching collection");

        let outcome = self.source.fetch_collection(key).await;

        let mut state = slot.write_state();
        state.loading = false;
        match outcome {
            Ok(records) => {
                debug!(key = %key, count = records.len(), "collection fetched");
                state.data = Some(Arc::new(records));
                state.fetched_at = Some(Utc::now());
                state.invalidated = false;
                state.error = None;
            }
            Err(err) if err.is_auth() => {
                // Session is dead; escalate instead of recording a retryable
                // entry error. Cached data stays visible.
                state.error = Some(err.clone());
                drop(state);
                return Err(err);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "fetch failed, serving stale data");
                state.error = Some(err);
            }
        }
        drop(state);
        Ok(self.snapshot(key))
    }

    /// Take the key's gate, re-check freshness, and fetch only if still
    /// needed. Concurrent callers coalesce onto one network call.
    async fn fetch_through_gate(
        &self,
        key: ResourceKey,
        force: bool,
    ) -> Result<CacheSnapshot, FetchError> {
        let _gate = self.slot(key).fetch_gate.lock().await;
        if !force && !self.needs_fetch(key) {
            return Ok(self.snapshot(key));
        }
        self.fetch_now(key).await
    }
}

/// Session-wide registry of cached collections, one entry per
/// [`ResourceKey`], shared by every consumer.
///
/// Reads are stale-while-revalidate: a stale entry keeps serving its data
/// while a fetch replaces it. Fetches run on spawned tasks, so a result is
/// absorbed into the shared entry even if the consumer that triggered it has
/// gone away.
#[derive(Clone)]
pub struct ResourceCache {
    inner: Arc<CacheInner>,
}

impl ResourceCache {
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                slots: std::array::from_fn(|_| CacheSlot::new()),
            }),
        }
    }

    /// The one read path consumers use. `enabled = false` returns the entry
    /// as-is and never touches the network; `enabled = true` fetches when
    /// the entry has never loaded, has gone stale, or was invalidated.
    ///
    /// Transient fetch errors are recorded on the returned snapshot, not
    /// raised; only an auth failure comes back as `Err`.
    pub async fn get_or_fetch(
        &self,
        key: ResourceKey,
        enabled: bool,
    ) -> Result<CacheSnapshot, FetchError> {
        self.set_enabled(key, enabled);
        if !enabled || !self.inner.needs_fetch(key) {
            return Ok(self.peek(key));
        }
        self.run_fetch(key, false).await
    }

    /// Current state without any fetching: the render-with-what-we-have
    /// path.
    pub fn peek(&self, key: ResourceKey) -> CacheSnapshot {
        self.inner.snapshot(key)
    }

    /// Force a fetch regardless of staleness (explicit user retry).
    pub async fn refresh(&self, key: ResourceKey) -> Result<CacheSnapshot, FetchError> {
        self.run_fetch(key, true).await
    }

    /// Mark the entry stale so the next read re-fetches. Data is kept.
    pub fn invalidate(&self, key: ResourceKey) {
        self.inner.slot(key).write_state().invalidated = true;
    }

    pub fn set_enabled(&self, key: ResourceKey, enabled: bool) {
        self.inner
            .slot(key)
            .enabled
            .store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self, key: ResourceKey) -> bool {
        self.inner.slot(key).enabled.load(Ordering::Relaxed)
    }

    /// Spawn the periodic re-fetch task for `key`, if its policy has a
    /// refresh interval. Ticks are skipped while the key is disabled. The
    /// task stops on an auth failure, since the whole session is over at
    /// that point.
    pub fn spawn_refresher(&self, key: ResourceKey) -> Option<JoinHandle<()>> {
        let every = key.policy().refresh_interval?;
        let cache = self.clone();
        Some(tokio::spawn(async move {
            debug!(key = %key, every_secs = every.as_secs(), "starting background refresh");
            let mut ticker = interval(every);
            // The first tick fires immediately; the initial load is the
            // consumer's get_or_fetch, not ours.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !cache.is_enabled(key) {
                    continue;
                }
                if let Err(err) = cache.refresh(key).await {
                    error!(key = %key, error = %err, "stopping background refresh");
                    break;
                }
            }
        }))
    }

    async fn run_fetch(&self, key: ResourceKey, force: bool) -> Result<CacheSnapshot, FetchError> {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.fetch_through_gate(key, force).await });
        task.await.unwrap_or_else(|join_err| {
            Err(FetchError::Transport {
                url: key.as_str().to_string(),
                message: format!("fetch task failed: {join_err}"),
            })
        })
    }
}
