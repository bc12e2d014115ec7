//! Last-request-wins searches for interactive filter changes.
//!
//! Every [`SearchSession::search`] call is tagged with a generation number
//! taken from a monotonically increasing counter. When a search finishes it
//! publishes its results only if no newer search has been issued in the
//! meantime; otherwise it reports [`SessionOutcome::Superseded`] and the
//! displayed results stay as they are. Subscribers observe published results
//! through a [`tokio::sync::watch`] channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use log::{debug, info};
use tokio::sync::watch;

use crate::{PlaceProvider, ProximityMatcher, SearchOutcome, SearchQuery};

/// Results currently on display.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Generation of the search that produced these results.
    pub generation: u64,
    /// Query that produced these results.
    pub query: SearchQuery,
    /// Places and per-category failures.
    pub outcome: SearchOutcome,
}

/// What happened to one [`SearchSession::search`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Results were published.
    Applied {
        /// Generation of the published search.
        generation: u64,
    },
    /// A newer search was issued first; results were discarded.
    Superseded {
        /// Generation of the discarded search.
        generation: u64,
    },
    /// The same query is already running as the latest search.
    DuplicateInFlight,
}

#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    generation: u64,
    query: SearchQuery,
    limit: Option<usize>,
}

/// Clears the in-flight slot when its search finishes or is dropped.
struct InFlightGuard<'a> {
    slot: &'a Mutex<Option<InFlight>>,
    generation: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = lock(self.slot);
        if in_flight
            .as_ref()
            .is_some_and(|running| running.generation == self.generation)
        {
            *in_flight = None;
        }
    }
}

fn lock(slot: &Mutex<Option<InFlight>>) -> MutexGuard<'_, Option<InFlight>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Runs searches for one interactive view and keeps only the latest results.
///
/// The session is shared by reference; overlapping `search` calls are
/// expected.
#[derive(Debug)]
pub struct SearchSession<P> {
    matcher: ProximityMatcher<P>,
    generation: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
    displayed: watch::Sender<Option<SessionSnapshot>>,
}

impl<P> SearchSession<P>
where
    P: PlaceProvider,
{
    /// Create a session with nothing displayed.
    pub fn new(matcher: ProximityMatcher<P>) -> Self {
        let (displayed, _) = watch::channel(None);
        Self {
            matcher,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            displayed,
        }
    }

    /// Matcher used for searches.
    pub fn matcher(&self) -> &ProximityMatcher<P> {
        &self.matcher
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.displayed.subscribe()
    }

    /// Snapshot currently on display, if any search has been applied.
    pub fn current(&self) -> Option<SessionSnapshot> {
        self.displayed.borrow().clone()
    }

    /// Generation of the most recently issued search; zero before the first.
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether the most recently issued search is still running.
    pub fn is_loading(&self) -> bool {
        self.lock_in_flight().is_some()
    }

    /// Run `query` and publish its results unless a newer search overtakes it.
    pub async fn search(&self, query: SearchQuery, limit: Option<usize>) -> SessionOutcome {
        let generation = {
            let mut in_flight = self.lock_in_flight();
            if in_flight
                .as_ref()
                .is_some_and(|running| running.query == query && running.limit == limit)
            {
                debug!("identical search already in flight; ignoring");
                return SessionOutcome::DuplicateInFlight;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *in_flight = Some(InFlight {
                generation,
                query: query.clone(),
                limit,
            });
            generation
        };

        // Released on completion and when the caller drops this future.
        let guard = InFlightGuard {
            slot: &self.in_flight,
            generation,
        };

        debug!("search generation {generation} started");
        let outcome = self.matcher.find_nearby(&query, limit).await;
        drop(guard);

        let snapshot = SessionSnapshot {
            generation,
            query,
            outcome,
        };
        // The check runs under the channel's write lock, so a newer search
        // can never be overwritten by an older one.
        let applied = self.displayed.send_if_modified(|displayed| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *displayed = Some(snapshot);
            true
        });

        if applied {
            debug!("search generation {generation} applied");
            SessionOutcome::Applied { generation }
        } else {
            info!(
                "discarding results of search generation {generation}; generation {} is newer",
                self.latest_generation()
            );
            SessionOutcome::Superseded { generation }
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        lock(&self.in_flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;
    use std::time::Duration;

    use crate::test_support::{StubPlaceProvider, north_of, raw_place};
    use crate::{Category, GeoPoint, Meters};

    #[fixture]
    fn origin() -> GeoPoint {
        GeoPoint::new(1.3, 103.8).expect("valid origin")
    }

    fn query(origin: GeoPoint, radius: f64) -> SearchQuery {
        SearchQuery::new(origin, BTreeSet::from([Category::School]), Meters::new(radius))
            .expect("valid query")
    }

    fn session(origin: &GeoPoint) -> SearchSession<StubPlaceProvider> {
        let (lat, lon) = north_of(origin, 1500.0);
        let provider = StubPlaceProvider::new()
            .with_places(Category::School, vec![raw_place("s", Category::School, lat, lon)])
            .with_radius_delay(Meters::new(1000.0), Duration::from_secs(3))
            .with_radius_delay(Meters::new(2000.0), Duration::from_secs(1));
        SearchSession::new(ProximityMatcher::new(provider))
    }

    #[rstest]
    #[tokio::test]
    async fn first_search_is_applied(origin: GeoPoint) {
        let session = session(&origin);
        assert!(session.current().is_none());
        let outcome = session.search(query(origin, 500.0), None).await;
        assert_eq!(outcome, SessionOutcome::Applied { generation: 1 });
        let snapshot = session.current().expect("results displayed");
        assert_eq!(snapshot.generation, 1);
        assert!(!session.is_loading());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn older_search_does_not_overwrite_newer(origin: GeoPoint) {
        let session = session(&origin);
        let mut updates = session.subscribe();

        let (first, second) = tokio::join!(
            session.search(query(origin, 1000.0), None),
            async {
                tokio::task::yield_now().await;
                session.search(query(origin, 2000.0), None).await
            }
        );

        assert_eq!(first, SessionOutcome::Superseded { generation: 1 });
        assert_eq!(second, SessionOutcome::Applied { generation: 2 });
        let snapshot = session.current().expect("results displayed");
        assert_eq!(snapshot.query.radius(), Meters::new(2000.0));
        assert_eq!(snapshot.outcome.places.len(), 1);
        assert!(updates.has_changed().expect("session alive"));
        let seen = updates.borrow_and_update().clone().expect("published");
        assert_eq!(seen.generation, 2);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn identical_search_in_flight_is_rejected(origin: GeoPoint) {
        let session = session(&origin);
        let (first, second) = tokio::join!(
            session.search(query(origin, 1000.0), None),
            async {
                tokio::task::yield_now().await;
                assert!(session.is_loading());
                session.search(query(origin, 1000.0), None).await
            }
        );
        assert_eq!(first, SessionOutcome::Applied { generation: 1 });
        assert_eq!(second, SessionOutcome::DuplicateInFlight);
        assert_eq!(session.latest_generation(), 1);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn dropped_search_releases_the_in_flight_slot(origin: GeoPoint) {
        let session = session(&origin);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            session.search(query(origin, 1000.0), None),
        )
        .await;
        assert!(abandoned.is_err(), "search should still be waiting on the provider");
        assert!(!session.is_loading());
        assert!(session.current().is_none());

        let retried = session.search(query(origin, 1000.0), None).await;
        assert_eq!(retried, SessionOutcome::Applied { generation: 2 });
        assert!(!session.is_loading());
    }
}
