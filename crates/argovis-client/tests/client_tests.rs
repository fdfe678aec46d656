//! Client, fetcher and table tests against a canned JSON getter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argo_common::{
    ArgoFetcher, DataMode, DatasetKind, FloatRequest, NameMode, PressureRange, ProfileId, Region,
    Shape, Values,
};
use argovis_client::{
    filter_data_mode, filter_qc, to_dataset, to_table, ArgovisClient, JsonGetter, Profile,
    RemoteError, RemoteRegionFetcher, RemoteResult, RemoteWmoFetcher,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use test_utils::{argovis_profile, argovis_profile_with, floats, selections};

const BASE: &str = "http://argovis.test";

/// Serves canned responses by URL and records every URL requested.
#[derive(Default)]
struct MockGetter {
    responses: HashMap<String, (u16, Value)>,
    requested: Mutex<Vec<String>>,
}

impl MockGetter {
    fn with(mut self, url: &str, status: u16, body: Value) -> Self {
        self.responses.insert(url.to_string(), (status, body));
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonGetter for MockGetter {
    async fn get_json(&self, url: &str) -> RemoteResult<(u16, Value)> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or((404, json!({"message": "not found"}))))
    }
}

fn as_profile(value: Value) -> Profile {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn test_get_profile_ok() {
    let url = format!("{}/catalog/profiles/3900737_279", BASE);
    let getter = MockGetter::default().with(&url, 200, argovis_profile(3900737, 279, 2));
    let client = ArgovisClient::with_getter(getter, BASE);

    let profile = client.get_profile(3900737, 279).await.unwrap();
    assert_eq!(profile["_id"], "3900737_279");
}

#[tokio::test]
async fn test_non_2xx_is_a_value_not_a_panic() {
    let url = format!("{}/catalog/platforms/1", BASE);
    let getter = MockGetter::default().with(&url, 500, Value::Null);
    let client = ArgovisClient::with_getter(getter, BASE);

    match client.get_platform_profiles(1).await {
        Err(RemoteError::UnexpectedStatus { status, url: failed }) => {
            assert_eq!(status, 500);
            assert_eq!(failed, url);
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_profiles_url_shape() {
    let getter = Arc::new(MockGetter::default());
    let client = ArgovisClient::with_getter(getter.clone(), BASE);
    let ids = [ProfileId::new(1900722, 1), ProfileId::new(1900722, 2)];

    let result = client.get_profiles(&ids, Some(PressureRange::new(0.0, 20.0))).await;
    assert!(result.is_err());
    assert_eq!(
        getter.requested(),
        vec![format!(
            "{}/catalog/mprofiles/?ids=['1900722_1','1900722_2']&presRange=[0,20]",
            BASE
        )]
    );
}

// ============================================================================
// Fetchers
// ============================================================================

#[tokio::test]
async fn test_wmo_fetcher_platform_per_float() {
    let a = format!("{}/catalog/platforms/{}", BASE, floats::AOML_FLOAT);
    let b = format!("{}/catalog/platforms/{}", BASE, floats::CORIOLIS_FLOAT);
    let getter = MockGetter::default()
        .with(&a, 200, json!([argovis_profile(floats::AOML_FLOAT, 1, 2)]))
        .with(&b, 200, json!([argovis_profile(floats::CORIOLIS_FLOAT, 1, 3)]));
    let client = Arc::new(ArgovisClient::with_getter(getter, BASE));

    let request = FloatRequest::new(vec![floats::AOML_FLOAT, floats::CORIOLIS_FLOAT]).unwrap();
    let fetcher = RemoteWmoFetcher::new(client.clone(), request, DatasetKind::Phy);

    let table = fetcher.to_table().await.unwrap();
    assert_eq!(table.len(), 5);
    assert_eq!(fetcher.cname(NameMode::Display), "phy_WMO3900737;WMO4901653");
}

#[tokio::test]
async fn test_wmo_fetcher_cycles_use_mprofiles() {
    let url = format!(
        "{}/catalog/mprofiles/?ids=['3900737_1','3900737_2']&presRange=[0,50]",
        BASE
    );
    let getter = MockGetter::default().with(
        &url,
        200,
        json!([argovis_profile(3900737, 1, 1), argovis_profile(3900737, 2, 1)]),
    );
    let client = Arc::new(ArgovisClient::with_getter(getter, BASE));

    let request = FloatRequest::float(3900737).with_cycles(vec![1, 2]);
    let fetcher = RemoteWmoFetcher::new(client, request, DatasetKind::Phy)
        .with_pressure(PressureRange::new(0.0, 50.0));

    let profiles = fetcher.fetch_profiles().await.unwrap();
    assert_eq!(profiles.len(), 2);
}

#[tokio::test]
async fn test_region_fetcher_bgc_sets_flag() {
    let start = NaiveDate::parse_from_str(selections::START_DATE, "%Y-%m-%d").unwrap();
    let end = NaiveDate::parse_from_str(selections::END_DATE, "%Y-%m-%d").unwrap();
    let region = Region::new(start, end, Shape::from_json(selections::PACIFIC_SHAPE).unwrap());

    let client = Arc::new(ArgovisClient::with_getter(MockGetter::default(), BASE));
    let fetcher = RemoteRegionFetcher::new(client.clone(), region, DatasetKind::Bgc);

    let err = fetcher.fetch_profiles().await.unwrap_err();
    assert!(err.is_unexpected_status());

    assert!(fetcher.region().bgc_only);
    assert_eq!(
        fetcher.cname(NameMode::CacheKey),
        "bgc_20170915_20170930_168.6_21.7_168.6_37.7_-145.9_37.7_-145.9_21.7_168.6_21.7"
    );
    assert!(fetcher
        .describe()
        .starts_with("<datafetcher 'Argovis Argo data fetcher for a space/time region'>"));
}

#[test]
fn test_region_name_tells_shapes_apart() {
    let start = NaiveDate::parse_from_str(selections::START_DATE, "%Y-%m-%d").unwrap();
    let end = NaiveDate::parse_from_str(selections::END_DATE, "%Y-%m-%d").unwrap();
    let client = Arc::new(ArgovisClient::with_getter(MockGetter::default(), BASE));
    let name_of = |shape: &str, mode| {
        let region = Region::new(start, end, Shape::from_json(shape).unwrap());
        RemoteRegionFetcher::new(client.clone(), region, DatasetKind::Phy).cname(mode)
    };

    let north = "[[[-75,33],[-55,33],[-55,45],[-75,33]]]";
    let south = "[[[-75,-45],[-55,-45],[-55,-33],[-75,-45]]]";
    for mode in [NameMode::Display, NameMode::CacheKey] {
        assert_ne!(name_of(north, mode), name_of(south, mode));
    }
    assert_eq!(
        name_of(north, NameMode::Display),
        "phy_20170915_20170930_[[[-75,33],[-55,33],[-55,45],[-75,33]]]"
    );
    assert!(!name_of(north, NameMode::CacheKey).contains(['[', ']', ',']));
}

#[test]
fn test_single_cycle_uses_profile_endpoint() {
    let getter = Arc::new(MockGetter::default());
    let client = Arc::new(ArgovisClient::with_getter(getter.clone(), BASE));
    let fetcher = RemoteWmoFetcher::new(
        client,
        FloatRequest::float(floats::AOML_FLOAT).with_cycles(12u32),
        DatasetKind::Phy,
    );

    let result = tokio_test::block_on(fetcher.fetch_profiles());
    assert!(result.is_err());
    assert_eq!(
        getter.requested(),
        vec![format!("{}/catalog/profiles/3900737_12", BASE)]
    );
}

// ============================================================================
// Tables and filters
// ============================================================================

#[test]
fn test_three_measurements_three_rows_same_metadata() {
    let profiles = vec![as_profile(argovis_profile(3900737, 5, 3))];
    let table = to_table(&profiles, "measurements");

    assert_eq!(table.len(), 3);
    let cycles = table.column("cycle_number");
    assert!(cycles.iter().all(|v| *v == Some(&json!(5))));
    let lats = table.column("lat");
    assert!(lats.iter().all(|v| *v == Some(&json!(21.5))));
    assert!(!table.columns.contains(&"measurements".to_string()));
}

#[test]
fn test_profiles_stacked_in_input_order() {
    let profiles = vec![
        as_profile(argovis_profile(1, 1, 2)),
        as_profile(argovis_profile(2, 1, 1)),
    ];
    let table = to_table(&profiles, "measurements");
    let ids: Vec<_> = table.column("_id").into_iter().flatten().cloned().collect();
    assert_eq!(ids, vec![json!("1_1"), json!("1_1"), json!("2_1")]);
}

#[test]
fn test_to_dataset_types() {
    let profiles = vec![as_profile(argovis_profile(3900737, 5, 3))];
    let ds = to_dataset(&profiles).unwrap();

    assert_eq!(ds.point_count(), 3);
    assert_eq!(ds.data_vars["pres"].values, Values::Float(vec![10.0, 20.0, 30.0]));
    assert_eq!(
        ds.data_vars["cycle_number"].values,
        Values::Int(vec![Some(5), Some(5), Some(5)])
    );
    assert!(matches!(ds.data_vars["date"].values, Values::Time(_)));
    assert!(matches!(ds.data_vars["DATA_MODE"].values, Values::Text(_)));
}

#[test]
fn test_filters_return_new_collections() {
    let profiles = vec![
        as_profile(argovis_profile_with(1, 1, 1, "D", 1)),
        as_profile(argovis_profile_with(1, 2, 1, "R", 1)),
        as_profile(argovis_profile_with(1, 3, 1, "D", 4)),
    ];

    let delayed = filter_data_mode(&profiles, DataMode::Delayed);
    assert_eq!(delayed.len(), 2);

    let good = filter_qc(&delayed, "position_qc", 1);
    assert_eq!(good.len(), 1);
    assert_eq!(good[0]["cycle_number"], 1);

    assert_eq!(profiles.len(), 3);
}
