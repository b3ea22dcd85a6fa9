// Season cache with in-flight deduplication.
//
// At most one fetch per season is ever running. The first caller starts a
// shared future and registers it as pending; later callers clone and await
// the same future. The fetch moves its own entry from pending to completed
// (or just drops it on failure) under the same lock, so check-and-insert is
// atomic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{join_all, BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::source::{FetchError, StatsSource};
use crate::stats::season::StatRow;

pub type SeasonRows = Arc<Vec<StatRow>>;
pub type SeasonResult = Result<SeasonRows, FetchError>;

type PendingFetch = Shared<BoxFuture<'static, SeasonResult>>;

#[derive(Default)]
struct CacheState {
    completed: HashMap<i32, SeasonRows>,
    pending: HashMap<i32, PendingFetch>,
}

/// Season rows keyed by year, fetched through a [`StatsSource`].
///
/// Created by the caller and handed to the orchestrator; cloning shares the
/// same state.
#[derive(Clone)]
pub struct SeasonCache {
    source: Arc<dyn StatsSource>,
    state: Arc<Mutex<CacheState>>,
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    // The state is two maps updated in single statements; a panic elsewhere
    // cannot leave them half-written.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SeasonCache {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn source(&self) -> &Arc<dyn StatsSource> {
        &self.source
    }

    /// Rows for `year`, from the cache, an in-flight fetch, or a new fetch.
    pub async fn season(&self, year: i32) -> SeasonResult {
        let fetch = {
            let mut state = lock(&self.state);
            if let Some(rows) = state.completed.get(&year) {
                return Ok(Arc::clone(rows));
            }
            match state.pending.get(&year) {
                Some(pending) => {
                    debug!("joining in-flight fetch for {year}");
                    pending.clone()
                }
                None => {
                    let fetch = self.start_fetch(year);
                    state.pending.insert(year, fetch.clone());
                    fetch
                }
            }
        };
        fetch.await
    }

    fn start_fetch(&self, year: i32) -> PendingFetch {
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        async move {
            let result = source.fetch_season(year).await.map(Arc::new);
            let mut state = lock(&shared);
            state.pending.remove(&year);
            match &result {
                Ok(rows) => {
                    state.completed.insert(year, Arc::clone(rows));
                }
                Err(e) => warn!("fetch for {year} failed: {e}"),
            }
            result
        }
        .boxed()
        .shared()
    }

    /// Fetch several seasons concurrently. Results come back in `years` order.
    pub async fn seasons(&self, years: &[i32]) -> Vec<(i32, SeasonResult)> {
        let results = join_all(years.iter().map(|&year| self.season(year))).await;
        years.iter().copied().zip(results).collect()
    }

    /// Drop a completed season so the next request refetches it. An
    /// in-flight fetch is left alone.
    pub fn invalidate(&self, year: i32) {
        if lock(&self.state).completed.remove(&year).is_some() {
            debug!("invalidated cached season {year}");
        }
    }
}
