//! Live content queries.
//!
//! A [`LiveQuery`] watches one [`QueryDescriptor`] at a time and publishes a
//! [`QueryState`] through a `tokio::sync::watch` channel. Page code holds the
//! handle, swaps descriptors as navigation changes, and renders whatever the
//! channel currently says.
//!
//! # Lifecycle
//!
//! ```text
//! new / set_descriptor(new key) / refresh
//!        │
//!        ▼
//!    Loading ──fetch ok──▶ Success(T)
//!        │
//!        └────fetch err──▶ Failure(ContentError)   (also logged at warn)
//! ```
//!
//! # Staleness
//!
//! Every issued fetch is tagged with a generation number. Issuing a new fetch
//! bumps the generation and resets the state to `Loading`; a fetch may only
//! write its outcome if its generation is still current and the handle has
//! not been disposed. Both the bump and the check run inside the watch
//! channel's write lock, so they cannot interleave.
//!
//! Ordering is **last-issued-wins**: if the descriptor goes `A → B → A` while
//! all three fetches are in flight, only the third fetch can land. The first
//! `A` is discarded even though its key matches the current one.
//!
//! Dropping the handle (or calling [`LiveQuery::dispose`]) marks it disposed.
//! In-flight fetches keep running to completion but their results go nowhere.

use crate::client::{ContentClient, ContentError};
use crate::query::QueryDescriptor;
use crate::state::QueryState;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};

/// State shared between the handle and its in-flight fetch tasks.
struct Shared<T> {
    state: watch::Sender<QueryState<T>>,
    generation: AtomicU64,
    disposed: AtomicBool,
}

impl<T> Shared<T> {
    /// Start a new generation and reset to `Loading`.
    fn begin(&self) -> u64 {
        let mut issued = 0;
        self.state.send_modify(|state| {
            issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = QueryState::Loading;
        });
        issued
    }

    /// Apply a fetch outcome if `generation` is still current.
    ///
    /// Returns `false` when the outcome was discarded.
    fn settle(&self, generation: u64, outcome: Result<T, ContentError>) -> bool {
        self.state.send_if_modified(|state| {
            if self.disposed.load(Ordering::SeqCst)
                || self.generation.load(Ordering::SeqCst) != generation
            {
                return false;
            }
            *state = outcome.into();
            true
        })
    }

    fn dispose(&self) {
        self.state.send_if_modified(|_| {
            self.disposed.store(true, Ordering::SeqCst);
            false
        });
    }
}

/// Handle to a live, observable content query.
///
/// Must be created inside a tokio runtime: fetches are spawned tasks.
///
/// The first observed state is `Loading` only on a current-thread runtime,
/// where the spawned fetch cannot run until the caller yields. On a
/// multi-thread runtime a client that answers immediately may settle the
/// state before the caller's first [`state`](LiveQuery::state) call.
pub struct LiveQuery<T> {
    client: Arc<dyn ContentClient>,
    descriptor: QueryDescriptor,
    shared: Arc<Shared<T>>,
}

impl<T> LiveQuery<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Start watching `descriptor`. The first fetch is issued immediately.
    pub fn new(client: Arc<dyn ContentClient>, descriptor: QueryDescriptor) -> Self {
        let (state, _) = watch::channel(QueryState::Loading);
        let live = Self {
            client,
            descriptor,
            shared: Arc::new(Shared {
                state,
                generation: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
        };
        live.issue();
        live
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Switch to another descriptor.
    ///
    /// A structurally equal descriptor is ignored and `false` is returned;
    /// otherwise the state resets to `Loading`, one fetch is issued, and
    /// `true` is returned.
    pub fn set_descriptor(&mut self, descriptor: QueryDescriptor) -> bool {
        if descriptor.key() == self.descriptor.key() {
            return false;
        }
        self.descriptor = descriptor;
        self.issue();
        true
    }

    /// Re-issue the current descriptor under a new generation.
    ///
    /// Nothing in this module retries on its own; this is what a caller's
    /// retry policy calls.
    pub fn refresh(&self) {
        self.issue();
    }

    /// Receiver for every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.shared.state.subscribe()
    }

    /// The generation of the most recently issued fetch.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Stop observing. Late results from in-flight fetches are dropped.
    pub fn dispose(self) {
        // Drop does the work.
    }

    fn issue(&self) {
        let generation = self.shared.begin();
        let key = self.descriptor.key().clone();
        debug!(query_key = %key, generation, "Issuing content query");

        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        let descriptor = self.descriptor.clone();
        tokio::spawn(async move {
            let outcome = client
                .fetch(descriptor.query(), descriptor.params())
                .await
                .and_then(|value| serde_json::from_value::<T>(value).map_err(ContentError::from));
            let failure = outcome.as_ref().err().cloned();

            if shared.settle(generation, outcome) {
                if let Some(error) = failure {
                    warn!(query_key = %key, generation, error = %error, "Content query failed");
                }
            } else {
                debug!(query_key = %key, generation, "Discarding stale query result");
            }
        });
    }
}

impl<T> LiveQuery<T>
where
    T: Clone,
{
    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<T> {
        self.shared.state.borrow().clone()
    }

    /// Wait until the current generation settles and return its state.
    ///
    /// Without a request timeout this waits as long as the fetch does.
    pub async fn settled(&self) -> QueryState<T> {
        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(QueryState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}
