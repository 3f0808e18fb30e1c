//! Caches the batch of the current session.
//!
//! The payload is fetched at most once per session: the first call to
//! [load](SessionStore::load) fetches and normalizes it, all subsequent calls return the cached
//! batch. A logout [invalidates](SessionStore::invalidate) the store.
//!
//! As fetching is asynchronous, a logout might happen while a fetch is still in flight. Each
//! invalidation therefore bumps a generation counter. A fetch which completes for an outdated
//! generation is discarded and reported as [LoadError::Invalidated] so that data of a previous
//! session never leaks into the next one.
//!
//! The batch itself is kept in an `ArcSwapOption`, so that readers always see either the
//! previous or the new batch and never block each other.
//!
//! # Example
//! ```
//! # use roster::session::SessionStore;
//! # use roster::source::StaticSource;
//! # use serde_json::json;
//! # #[tokio::main]
//! # async fn main() -> Result<(), roster::errors::LoadError> {
//! let store = SessionStore::new();
//! let source = StaticSource::new(json!([{ "name": "Asha", "city": "Pune" }]));
//!
//! let batch = store.load(&source).await?;
//! assert_eq!(batch.len(), 1);
//! assert_eq!(store.current().is_some(), true);
//!
//! store.invalidate();
//! assert_eq!(store.current().is_none(), true);
//! # Ok(())
//! # }
//! ```
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::batch::Batch;
use crate::errors::{LoadError, LoadResult};
use crate::source::PayloadSource;

/// Stores the batch of the current session.
pub struct SessionStore {
    batch: ArcSwapOption<Batch>,
    generation: AtomicUsize,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new()
    }
}

impl SessionStore {
    /// Creates a new and empty store.
    pub fn new() -> Self {
        SessionStore {
            batch: ArcSwapOption::empty(),
            generation: AtomicUsize::new(0),
        }
    }

    /// Returns the cached batch if one is present.
    pub fn current(&self) -> Option<Arc<Batch>> {
        self.batch.load_full()
    }

    /// Replaces the cached batch with the given one and returns it.
    pub fn replace(&self, batch: Batch) -> Arc<Batch> {
        let batch = Arc::new(batch);
        self.batch.store(Some(batch.clone()));

        batch
    }

    /// Drops the cached batch and discards all fetches which are currently in flight.
    pub fn invalidate(&self) {
        let _ = self.generation.fetch_add(1, Ordering::SeqCst);
        self.batch.store(None);
        log::info!("Session invalidated - cached data has been dropped.");
    }

    /// Returns the cached batch or fetches and normalizes a new one from the given source.
    ///
    /// A failed fetch leaves the store untouched and yields [LoadError::Transport]. If the store
    /// is invalidated while the fetch is in flight, the result is discarded and
    /// [LoadError::Invalidated] is returned.
    pub async fn load(&self, source: &dyn PayloadSource) -> LoadResult<Arc<Batch>> {
        if let Some(batch) = self.current() {
            return Ok(batch);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let watch = Instant::now();

        let payload = match source.fetch().await {
            Ok(payload) => payload,
            Err(error) => {
                log::error!("Failed to fetch data from {}: {:#}", source, error);
                return Err(LoadError::from(error));
            }
        };

        let batch = Batch::from_payload(&payload);
        if self.generation.load(Ordering::SeqCst) != generation {
            log::info!(
                "Discarding {} records from {} as the session was invalidated meanwhile.",
                batch.len(),
                source
            );
            return Err(LoadError::Invalidated);
        }

        log::info!(
            "Loaded {} records from {} in {} ms.",
            batch.len(),
            source,
            watch.elapsed().as_millis()
        );

        Ok(self.replace(batch))
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::LoadError;
    use crate::session::SessionStore;
    use crate::source::{PayloadSource, StaticSource};
    use serde_json::{json, Value};
    use std::fmt::{Display, Formatter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts its fetches and optionally fails or logs out while fetching.
    struct TestSource {
        fetches: AtomicUsize,
        fail: bool,
        logout: Option<Arc<SessionStore>>,
    }

    impl TestSource {
        fn new(fail: bool, logout: Option<Arc<SessionStore>>) -> Self {
            TestSource {
                fetches: AtomicUsize::new(0),
                fail,
                logout,
            }
        }
    }

    impl Display for TestSource {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "test source")
        }
    }

    #[async_trait::async_trait]
    impl PayloadSource for TestSource {
        async fn fetch(&self) -> anyhow::Result<Value> {
            let _ = self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(store) = &self.logout {
                store.invalidate();
            }
            if self.fail {
                Err(anyhow::anyhow!("connection refused"))
            } else {
                Ok(json!([{ "name": "Asha" }, { "name": "Ravi" }]))
            }
        }
    }

    #[test]
    fn batches_are_fetched_once_per_session() {
        crate::testing::test_async(async {
            let store = SessionStore::new();
            let source = TestSource::new(false, None);

            let first = store.load(&source).await.unwrap();
            let second = store.load(&source).await.unwrap();
            assert_eq!(Arc::ptr_eq(&first, &second), true);
            assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

            store.invalidate();
            let third = store.load(&source).await.unwrap();
            assert_eq!(third.len(), 2);
            assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn failed_fetches_leave_the_store_untouched() {
        crate::testing::test_async(async {
            let store = SessionStore::new();

            let result = store.load(&TestSource::new(true, None)).await;
            assert_eq!(matches!(result, Err(LoadError::Transport(_))), true);
            assert_eq!(store.current().is_none(), true);

            let _ = store.replace(crate::batch::Batch::from_payload(&json!([{ "name": "x" }])));
            let result = store.load(&TestSource::new(true, None)).await;
            assert_eq!(result.unwrap().len(), 1);
        });
    }

    #[test]
    fn fetches_completing_after_a_logout_are_discarded() {
        crate::testing::test_async(async {
            let store = Arc::new(SessionStore::new());
            let source = TestSource::new(false, Some(store.clone()));

            let result = store.load(&source).await;
            assert_eq!(matches!(result, Err(LoadError::Invalidated)), true);
            assert_eq!(store.current().is_none(), true);

            let result = store.load(&StaticSource::new(json!([]))).await;
            assert_eq!(result.unwrap().is_empty(), true);
        });
    }
}
