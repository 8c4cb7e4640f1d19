use route_fairness::config::{Destinations, LOCUST_ST, VALLEY_RECYCLING};
use route_fairness::dataset::{Dataset, PickupId, RouteId};
use route_fairness::geography::{Coordinate, Path, StaticPathProvider};
use route_fairness::output::{pickup_table, route_table};
use route_fairness::resolver::{PathResolver, ResolveError};
use route_fairness::scoring::{DifficultyScorer, Scores};

const ROUTES: &str = include_str!("fixtures/routes.csv");
const PICKUPS: &str = include_str!("fixtures/pickups.tsv");

fn fixture_provider() -> StaticPathProvider {
    StaticPathProvider::new()
        .with_path(Coordinate::new(-72.64, 42.32), Path::from_metrics(10.0, 4.0, 1000.0))
        .with_path(Coordinate::new(-72.63, 42.33), Path::from_metrics(30.0, 0.0, 3000.0))
        .with_path(Coordinate::new(-72.61, 42.31), Path::from_metrics(20.0, 8.0, 2000.0))
        .with_path(Coordinate::new(-72.60, 42.30), Path::from_metrics(20.0, 2.0, 1500.0))
}

async fn score_fixtures() -> Scores {
    let dataset = Dataset::from_readers(ROUTES.as_bytes(), PICKUPS.as_bytes()).unwrap();
    let resolver = PathResolver::new(fixture_provider(), Destinations::default());
    let resolved = resolver.resolve_all(dataset).await.unwrap();
    DifficultyScorer::default()
        .compute_difficulty(&resolved, &["ascent", "descent", "distance"])
        .unwrap()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("missing score");
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

#[tokio::test]
async fn test_full_pipeline() {
    let scores = score_fixtures().await;

    let routes = &scores.routes.routes;
    let ids: Vec<_> = routes.iter().map(|r| r.id.0.as_str()).collect();
    assert_eq!(ids, ["R1", "R3"]);
    assert_eq!(scores.routes.dropped, [RouteId("R2".into()), RouteId("R4".into())]);

    let north = &routes[0];
    assert_eq!(north.num_pickups, 2);
    assert_close(north.score("ascent"), 0.5);
    assert_close(north.score("descent"), 0.75);
    assert_close(north.score("distance"), 0.5);

    let east = &routes[1];
    assert_eq!(east.num_pickups, 2);
    assert_close(east.score("ascent"), 0.5);
    assert_close(east.score("descent"), 0.375);
    assert_close(east.score("distance"), 0.375);

    let p2 = &scores.pickups.pickups[1];
    assert_eq!(p2.label, "48 Elm St");
    assert_eq!(p2.score("ascent"), Some(1.0));
    assert_eq!(p2.score("descent"), Some(1.0));
    assert_eq!(
        scores.pickups.unscored().collect::<Vec<_>>(),
        [&PickupId("P3".into())]
    );
}

#[tokio::test]
async fn test_pickups_routed_to_their_destination() {
    let dataset = Dataset::from_readers(ROUTES.as_bytes(), PICKUPS.as_bytes()).unwrap();
    let resolver = PathResolver::new(fixture_provider(), Destinations::default());
    resolver.resolve_all(dataset).await.unwrap();

    let ends: Vec<_> = resolver.provider().calls().into_iter().map(|(_, end)| end).collect();
    // P3 is on an unmapped route and never requested
    assert_eq!(ends, [LOCUST_ST, LOCUST_ST, VALLEY_RECYCLING, VALLEY_RECYCLING]);
}

#[tokio::test]
async fn test_destination_override() {
    let destinations =
        Destinations::from_json(r#"{"Locust": [-72.0, 42.0], "Unknown": [-72.1, 42.1]}"#).unwrap();
    let provider = fixture_provider().with_fallback(Path::from_metrics(0.0, 0.0, 0.0));
    let dataset = Dataset::from_readers(ROUTES.as_bytes(), PICKUPS.as_bytes()).unwrap();
    let resolver = PathResolver::new(provider, destinations);

    let resolved = resolver.resolve_all(dataset).await.unwrap();
    let scores = DifficultyScorer::default()
        .compute_difficulty(&resolved, &["ascent"])
        .unwrap();

    // Valley is no longer mapped; Unknown now is
    let ids: Vec<_> = scores.routes.routes.iter().map(|r| r.id.0.as_str()).collect();
    assert_eq!(ids, ["R1", "R2"]);
}

#[tokio::test]
async fn test_routing_failure_fails_the_load() {
    // P5 has no path
    let provider = StaticPathProvider::new()
        .with_path(Coordinate::new(-72.64, 42.32), Path::from_metrics(10.0, 4.0, 1000.0))
        .with_path(Coordinate::new(-72.63, 42.33), Path::from_metrics(30.0, 0.0, 3000.0))
        .with_path(Coordinate::new(-72.61, 42.31), Path::from_metrics(20.0, 8.0, 2000.0));
    let dataset = Dataset::from_readers(ROUTES.as_bytes(), PICKUPS.as_bytes()).unwrap();
    let resolver = PathResolver::new(provider, Destinations::default());

    match resolver.resolve_all(dataset).await {
        Err(ResolveError::Routing { total, failures }) => {
            assert_eq!(total, 5);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].pickup_id, PickupId("P5".into()));
        }
        other => panic!("expected routing failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_scoring_is_deterministic() {
    let first = score_fixtures().await;
    let second = score_fixtures().await;

    assert_eq!(first, second);
    assert_eq!(route_table(&first.routes), route_table(&second.routes));
    assert_eq!(pickup_table(&first.pickups), pickup_table(&second.pickups));
}

#[test]
fn test_load_fixture_files() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
    let dataset = Dataset::load(&format!("{dir}/routes.csv"), &format!("{dir}/pickups.tsv")).unwrap();

    assert_eq!(dataset.routes().len(), 4);
    assert_eq!(dataset.pickups().len(), 5);
    assert_eq!(dataset.pickups()[1].street, "Elm St");
}

#[test]
fn test_missing_file_is_a_load_error() {
    let err = Dataset::load("does/not/exist.csv", "nor/this.tsv").unwrap_err();
    assert!(err.to_string().contains("route table"));
}
