use revgeo::{
    Config, Coordinate, DatasetFormat, ExecutionMode, GeocodeError, Geocoder, MemorySource, Place,
    PrecisionTier, Registry,
};
use std::io::Write;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn cities() -> Vec<Place> {
    vec![
        Place::new(Coordinate::new(-33.86785, 151.20732))
            .with_attribute("name", Some("Sydney"))
            .with_attribute("cc", Some("AU")),
        Place::new(Coordinate::new(51.5074, -0.1278))
            .with_attribute("name", Some("London"))
            .with_attribute("cc", Some("GB")),
        Place::new(Coordinate::new(40.7128, -74.0060))
            .with_attribute("name", Some("New York"))
            .with_attribute("cc", Some("US")),
        Place::new(Coordinate::new(35.6895, 139.6917))
            .with_attribute("name", Some("Tokyo"))
            .with_attribute("cc", Some("JP")),
        Place::new(Coordinate::new(-22.9068, -43.1729))
            .with_attribute("name", Some("Rio de Janeiro"))
            .with_attribute("cc", Some("BR")),
    ]
}

fn names(places: &[Arc<Place>]) -> Vec<&str> {
    places.iter().map(|p| p.get("name").unwrap()).collect()
}

/// Deterministic grid of places, each tagged with its store position.
fn grid(rows: usize, cols: usize) -> Vec<Place> {
    let mut places = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let lat = -80.0 + 160.0 * r as f64 / rows as f64;
            let lon = -170.0 + 340.0 * c as f64 / cols as f64;
            let id = (r * cols + c).to_string();
            places.push(Place::new(Coordinate::new(lat, lon)).with_attribute("id", Some(id)));
        }
    }
    places
}

fn queries(n: usize) -> Vec<Coordinate> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let lat = (state % 18_000) as f64 / 100.0 - 90.0;
            let lon = ((state >> 20) % 36_000) as f64 / 100.0 - 180.0;
            Coordinate::new(lat, lon)
        })
        .collect()
}

#[test]
fn test_sydney_london_both_modes() {
    init_logging();
    let registry = Registry::with_source(
        Config::default().with_workers(2),
        MemorySource::new(cities()),
    );

    let sequential = registry
        .lookup_many(
            vec![(-33.86, 151.20), (51.50, -0.12)],
            Some(ExecutionMode::Sequential),
            Some(PrecisionTier::Fine),
        )
        .unwrap();
    let parallel = registry
        .lookup_many(
            vec![(-33.86, 151.20), (51.50, -0.12)],
            Some(ExecutionMode::Parallel),
            Some(PrecisionTier::Fine),
        )
        .unwrap();

    assert_eq!(names(&sequential), vec!["Sydney", "London"]);
    assert_eq!(sequential, parallel);
    assert_eq!(registry.build_count(), 2);
}

#[test]
fn test_parallel_matches_sequential_on_large_batch() {
    init_logging();
    let registry = Registry::with_source(
        Config::default().with_workers(4),
        MemorySource::new(grid(40, 60)),
    );
    let batch = queries(5_000);

    let sequential = registry
        .lookup_many(batch.as_slice(), Some(ExecutionMode::Sequential), None)
        .unwrap();
    let parallel = registry
        .lookup_many(batch.as_slice(), Some(ExecutionMode::Parallel), None)
        .unwrap();

    assert_eq!(sequential.len(), batch.len());
    assert_eq!(parallel.len(), batch.len());
    for (i, (s, p)) in sequential.iter().zip(&parallel).enumerate() {
        assert_eq!(s.get("id"), p.get("id"), "mismatch at position {}", i);
    }
}

#[test]
fn test_results_follow_input_order() {
    let registry = Registry::with_source(
        Config::default().with_workers(3),
        MemorySource::new(cities()),
    );
    let batch = vec![
        (35.0, 139.0),
        (-23.0, -43.0),
        (51.0, 0.0),
        (40.0, -74.0),
        (-34.0, 151.0),
        (35.0, 139.0),
    ];

    for mode in ExecutionMode::ALL {
        let places = registry.lookup_many(batch.clone(), Some(mode), None).unwrap();
        assert_eq!(
            names(&places),
            vec!["Tokyo", "Rio de Janeiro", "London", "New York", "Sydney", "Tokyo"]
        );
    }
}

#[test]
fn test_reference_coordinates_map_to_themselves() {
    let places = cities();
    let registry = Registry::with_source(
        Config::default().with_workers(2),
        MemorySource::new(places.clone()),
    );
    let batch: Vec<Coordinate> = places.iter().map(|p| p.coordinate()).collect();

    for mode in ExecutionMode::ALL {
        let found = registry.lookup_many(batch.as_slice(), Some(mode), None).unwrap();
        for (place, expected) in found.iter().zip(&places) {
            assert_eq!(**place, *expected);
        }
    }
}

#[test]
fn test_tiers_load_their_own_datasets() {
    let source = MemorySource::default()
        .with_tier(
            PrecisionTier::Coarse,
            vec![Place::new(Coordinate::new(50.0, 10.0)).with_attribute("name", Some("Europe"))],
        )
        .with_tier(PrecisionTier::Fine, cities());
    let registry = Registry::with_source(Config::default(), source);

    let coarse = registry
        .lookup_one((51.50, -0.12), None, Some(PrecisionTier::Coarse))
        .unwrap();
    let fine = registry
        .lookup_one((51.50, -0.12), None, Some(PrecisionTier::Fine))
        .unwrap();
    assert_eq!(coarse.get("name"), Some("Europe"));
    assert_eq!(fine.get("name"), Some("London"));

    let err = registry
        .lookup_one((51.50, -0.12), None, Some(PrecisionTier::Medium))
        .unwrap_err();
    assert!(matches!(err, GeocodeError::DatasetLoad { .. }));
    assert!(!registry.contains(ExecutionMode::Sequential, PrecisionTier::Medium));
}

#[test]
fn test_json_rows_dataset_from_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("places_medium.json")).unwrap();
    write!(
        file,
        r#"[
            {{"latitude": -33.86785, "longitude": 151.20732, "name": "Sydney", "admin1": "New South Wales", "cc": "AU"}},
            {{"latitude": 51.5074, "longitude": -0.1278, "name": "London", "admin1": "England", "cc": "GB"}},
            {{"latitude": "not a number", "longitude": 0.0, "name": "Broken"}}
        ]"#
    )
    .unwrap();

    let config = Config::default()
        .with_data_dir(dir.path())
        .with_default_tier(PrecisionTier::Medium)
        .with_attributes(["name", "cc"])
        .with_workers(2);
    let registry = Registry::new(config);

    let places = registry
        .lookup_many(vec![[51.50, -0.12], [-33.86, 151.20]], Some(ExecutionMode::Parallel), None)
        .unwrap();
    assert_eq!(names(&places), vec!["London", "Sydney"]);
    assert_eq!(places[0].get("cc"), Some("GB"));
    assert_eq!(places[0].get("admin1"), None);

    let geocoder = registry
        .get_or_create(ExecutionMode::Parallel, PrecisionTier::Medium)
        .unwrap();
    assert_eq!(geocoder.len(), 2);
}

#[cfg(feature = "geojson")]
#[test]
fn test_geojson_dataset_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("places_coarse.geojson"),
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [139.6917, 35.6895]},
                 "properties": {"name": "Tokyo"}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [-74.0060, 40.7128]},
                 "properties": {"name": "New York"}}
            ]
        }"#,
    )
    .unwrap();

    let geocoder = Geocoder::builder()
        .config(
            Config::default()
                .with_data_dir(dir.path())
                .with_format(DatasetFormat::GeoJson),
        )
        .tier(PrecisionTier::Coarse)
        .build()
        .unwrap();

    let place = geocoder.nearest(Coordinate::new(41.0, -73.0)).unwrap();
    assert_eq!(place.get("name"), Some("New York"));
}

#[test]
fn test_missing_dataset_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::new(Config::default().with_data_dir(dir.path()));

    match registry.lookup_one((0.0, 0.0), None, Some(PrecisionTier::Coarse)) {
        Err(GeocodeError::DatasetLoad { path, .. }) => {
            assert_eq!(path, Some(dir.path().join("places_coarse.json")));
        }
        other => panic!("expected DatasetLoad, got {:?}", other),
    }
    assert_eq!(registry.build_count(), 0);
}

#[test]
fn test_concurrent_lookups_share_one_entry() {
    let registry = Arc::new(Registry::with_source(
        Config::default().with_workers(2),
        MemorySource::new(grid(20, 20)),
    ));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let batch = queries(200 + t * 10);
                let places = registry
                    .lookup_many(batch.as_slice(), Some(ExecutionMode::Parallel), None)
                    .unwrap();
                assert_eq!(places.len(), batch.len());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.build_count(), 1);
    assert!(registry.contains(ExecutionMode::Parallel, PrecisionTier::Fine));
}

#[test]
fn test_owned_geocoder_matches_registry() {
    let geocoder = Geocoder::builder()
        .source(MemorySource::new(cities()))
        .mode(ExecutionMode::Parallel)
        .workers(2)
        .build()
        .unwrap();
    let registry = Registry::with_source(Config::default(), MemorySource::new(cities()));

    let batch = vec![
        Coordinate::new(48.85, 2.35),
        Coordinate::new(-30.0, 140.0),
        Coordinate::new(0.0, -60.0),
    ];
    assert_eq!(
        geocoder.query(&batch).unwrap(),
        registry.lookup_many(batch.as_slice(), None, None).unwrap()
    );
}
