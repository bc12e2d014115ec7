//! Behavioural tests for [`MapClient`] and [`FixtureProvider`].

use camino::Utf8PathBuf;
use proximity_core::{
    Category, GeoPoint, Meters, PlaceProvider, ProviderError, ProximityMatcher, SearchOutcome,
    SearchQuery,
};
use proximity_data::{ConfigError, FixtureProvider, MapClient, MapClientConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::time::Duration;

const API_KEY: &str = "behaviour-secret-key";

#[derive(Debug, Default)]
struct MapsWorld {
    config: RefCell<Option<MapClientConfig>>,
    client: RefCell<Option<Result<MapClient, ConfigError>>>,
    nearby: RefCell<Option<Result<Vec<proximity_core::RawPlace>, ProviderError>>>,
    fixture: RefCell<Option<FixtureProvider>>,
    outcome: RefCell<Option<SearchOutcome>>,
}

#[fixture]
fn world() -> MapsWorld {
    MapsWorld::default()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

fn origin() -> GeoPoint {
    GeoPoint::new(1.3, 103.8).expect("valid origin")
}

// --- Given steps ---

#[given("a maps configuration with a blank API key")]
fn blank_key(world: &MapsWorld) {
    *world.config.borrow_mut() = Some(MapClientConfig::new(" "));
}

#[given("a maps configuration with base URL {base_url}")]
fn with_base_url(world: &MapsWorld, base_url: String) {
    let config = MapClientConfig::new(API_KEY)
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(2));
    *world.config.borrow_mut() = Some(config);
}

#[given("the recorded response {name}")]
fn recorded_response(world: &MapsWorld, name: String) {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let provider = FixtureProvider::from_path(&path).expect("fixture should load");
    *world.fixture.borrow_mut() = Some(provider);
}

// --- When steps ---

#[when("I initialise the maps client")]
fn initialise(world: &MapsWorld) {
    let config = world
        .config
        .borrow_mut()
        .take()
        .expect("configuration must be set");
    *world.client.borrow_mut() = Some(MapClient::init(config));
}

#[when("I request nearby schools")]
fn request_schools(world: &MapsWorld) {
    let client = world.client.borrow();
    let client = client
        .as_ref()
        .expect("client must be initialised")
        .as_ref()
        .expect("client should build");
    let result = runtime().block_on(client.nearby(
        &origin(),
        Meters::new(1000.0),
        Category::School,
    ));
    *world.nearby.borrow_mut() = Some(result);
}

#[when("I search for {names} within {radius} metres")]
fn search_fixture(world: &MapsWorld, names: String, radius: f64) {
    let provider = world
        .fixture
        .borrow_mut()
        .take()
        .expect("fixture must be loaded");
    let categories = names
        .split(',')
        .map(|name| name.parse::<Category>().expect("known category"))
        .collect();
    let query =
        SearchQuery::new(origin(), categories, Meters::new(radius)).expect("valid query");
    let matcher = ProximityMatcher::new(provider);
    let outcome = runtime().block_on(matcher.find_nearby(&query, None));
    *world.outcome.borrow_mut() = Some(outcome);
}

// --- Then steps ---

#[then("a missing API key error is returned")]
fn missing_key(world: &MapsWorld) {
    let client = world.client.borrow();
    assert!(
        matches!(client.as_ref(), Some(Err(ConfigError::MissingApiKey))),
        "expected MissingApiKey, got {client:?}"
    );
}

#[then("an invalid base URL error is returned")]
fn invalid_base_url(world: &MapsWorld) {
    let client = world.client.borrow();
    assert!(
        matches!(client.as_ref(), Some(Err(ConfigError::InvalidBaseUrl { .. }))),
        "expected InvalidBaseUrl, got {client:?}"
    );
}

#[then("the request fails with a transport error")]
fn transport_error(world: &MapsWorld) {
    let nearby = world.nearby.borrow();
    assert!(
        matches!(
            nearby.as_ref(),
            Some(Err(
                ProviderError::Network { .. } | ProviderError::Timeout { .. }
            ))
        ),
        "expected a transport error, got {nearby:?}"
    );
}

#[then("the error does not mention the API key")]
fn error_is_redacted(world: &MapsWorld) {
    let nearby = world.nearby.borrow();
    let error = nearby
        .as_ref()
        .and_then(|result| result.as_ref().err())
        .expect("request should have failed");
    assert!(!error.to_string().contains(API_KEY));
    assert!(!format!("{error:?}").contains(API_KEY));
}

#[then("the results are {ids}")]
fn results_are(world: &MapsWorld, ids: String) {
    let outcome = world.outcome.borrow();
    let outcome = outcome.as_ref().expect("search should have run");
    let actual: Vec<_> = outcome.places.iter().map(|p| p.id.as_str()).collect();
    let expected: Vec<_> = ids.split(',').collect();
    assert_eq!(actual, expected);
    assert!(outcome.failures.is_empty());
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/map_client.feature", name = $title)]
        fn $fn_name(world: MapsWorld) {
            let _ = world;
        }
    };
}

register_scenario!(rejecting_missing_api_key, "rejecting a missing API key");
register_scenario!(rejecting_invalid_base_url, "rejecting an invalid base URL");
register_scenario!(
    reporting_unreachable_service,
    "reporting an unreachable service without leaking the key"
);
register_scenario!(searching_recorded_response, "searching a recorded response");
