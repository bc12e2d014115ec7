//! Concurrent per-category queries against a [`PlaceProvider`].
//!
//! A search issues one provider call per selected category. The calls run
//! concurrently and are joined before any filtering happens. Each call is
//! bounded by a timeout and may be retried, but a failing category never
//! aborts the search: it contributes no candidates and is reported in the
//! [`CandidateBatch`] outcomes instead.

use std::time::Duration;

use futures_util::future::join_all;
use log::{debug, warn};

use crate::{
    Candidate, Category, GeoPoint, Meters, PlaceProvider, ProviderError, RawPlace, SearchQuery,
};

/// Default deadline for one category's provider call, retries included.
pub const DEFAULT_CATEGORY_TIMEOUT: Duration = Duration::from_secs(8);

/// Bounded retry for retryable provider errors.
///
/// Retries run inside the per-category deadline, so they never extend the
/// time a search can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per category, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub const NONE: Self = Self {
        max_attempts: 1,
        backoff: Duration::ZERO,
    };

    /// Create a policy making up to `max_attempts` attempts.
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(1_u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// Tuning for [`query_candidates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutOptions {
    /// Deadline for one category's call, retries included.
    pub timeout: Duration,
    /// Retry policy for retryable errors.
    pub retry: RetryPolicy,
}

impl Default for FanOutOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CATEGORY_TIMEOUT,
            retry: RetryPolicy::NONE,
        }
    }
}

impl FanOutOptions {
    /// Set the per-category deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Result of one category's provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutcome {
    /// Category that was queried.
    pub category: Category,
    /// Number of places returned, or the error that ended the call.
    pub result: Result<usize, ProviderError>,
}

/// A category whose provider call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFailure {
    /// Category that was queried.
    pub category: Category,
    /// Error that ended the call.
    pub error: ProviderError,
}

/// Candidates gathered by a fan-out, with per-category outcomes.
///
/// Candidates appear in fan-out order: categories in [`Category`] order, and
/// provider order within a category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateBatch {
    /// Adapted candidates from every successful category.
    pub candidates: Vec<Candidate>,
    /// One outcome per queried category, in fan-out order.
    pub outcomes: Vec<CategoryOutcome>,
}

impl CandidateBatch {
    /// Whether every queried category answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    /// Categories whose call failed, in fan-out order.
    pub fn failures(&self) -> impl Iterator<Item = CategoryFailure> + '_ {
        self.outcomes.iter().filter_map(|outcome| {
            outcome.result.as_ref().err().map(|error| CategoryFailure {
                category: outcome.category,
                error: error.clone(),
            })
        })
    }
}

/// Query `provider` once per category in `query` and join the results.
///
/// An empty category selection makes no provider calls and returns an empty
/// batch.
pub async fn query_candidates<P>(
    provider: &P,
    query: &SearchQuery,
    options: &FanOutOptions,
) -> CandidateBatch
where
    P: PlaceProvider + ?Sized,
{
    if query.categories().is_empty() {
        debug!("no categories selected; skipping provider fan-out");
        return CandidateBatch::default();
    }

    let origin = query.origin();
    let radius = query.radius();
    let calls = query
        .categories()
        .iter()
        .map(|&category| fetch_category(provider, origin, radius, category, options));
    let results = join_all(calls).await;

    let mut batch = CandidateBatch::default();
    for (category, result) in results {
        match result {
            Ok(places) => {
                debug!("{category}: provider returned {} places", places.len());
                batch.outcomes.push(CategoryOutcome {
                    category,
                    result: Ok(places.len()),
                });
                batch.candidates.extend(
                    places
                        .into_iter()
                        .map(|place| Candidate::from_raw(place, category)),
                );
            }
            Err(error) => {
                warn!("{category}: nearby search failed, continuing without it: {error}");
                batch.outcomes.push(CategoryOutcome {
                    category,
                    result: Err(error),
                });
            }
        }
    }
    batch
}

async fn fetch_category<P>(
    provider: &P,
    origin: GeoPoint,
    radius: Meters,
    category: Category,
    options: &FanOutOptions,
) -> (Category, Result<Vec<RawPlace>, ProviderError>)
where
    P: PlaceProvider + ?Sized,
{
    debug!("{category}: querying provider within {radius}");
    let attempts = fetch_with_retry(provider, origin, radius, category, options.retry);
    let result = match tokio::time::timeout(options.timeout, attempts).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ProviderError::Timeout {
            timeout_ms: u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    };
    (category, result)
}

async fn fetch_with_retry<P>(
    provider: &P,
    origin: GeoPoint,
    radius: Meters,
    category: Category,
    retry: RetryPolicy,
) -> Result<Vec<RawPlace>, ProviderError>
where
    P: PlaceProvider + ?Sized,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match provider.nearby(&origin, radius, category).await {
            Ok(places) => return Ok(places),
            Err(error) if error.is_retryable() && attempt < max_attempts => {
                let delay = retry.backoff_for(attempt);
                debug!("{category}: attempt {attempt} failed ({error}); retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
