// End-to-end controller scenarios: filter changes and map clicks driving
// the selection store across full pipeline passes.

use std::collections::BTreeSet;
use std::sync::Arc;

use geo::{LineString, MultiPolygon, Polygon};
use polars::prelude::*;

use komodash::{Dashboard, PoiRecord, PoiTable, Selection, VillageTable};

fn square_at(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![Polygon::new(
        LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0), (x, y)]),
        vec![],
    )])
}

/// District "A": two villages (KARET, PADI); district "B": one (KOPI).
fn three_village_table() -> Arc<VillageTable> {
    let df = df![
        "village" => ["Sukamaju", "Mekarsari", "Sigapiton"],
        "district" => ["A", "A", "B"],
        "area_km2" => [12.345, 8.0, 20.5],
        "commodity" => ["KARET", "PADI", "KOPI"],
        "poi_count" => [3i64, 1, 5],
    ].unwrap();
    let geoms = vec![square_at(0.0, 0.0), square_at(2.0, 0.0), square_at(4.0, 0.0)];
    Arc::new(VillageTable::from_parts(df, geoms).unwrap())
}

fn districts(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn poi(name: &str, lat: &str, lon: &str) -> PoiRecord {
    PoiRecord {
        name: name.to_string(),
        category: "Umum".to_string(),
        district: None,
        lat_raw: lat.to_string(),
        lon_raw: lon.to_string(),
    }
}

#[test]
fn initial_pass_shows_nothing_until_districts_are_chosen() {
    let mut dashboard = Dashboard::new(three_village_table(), PoiTable::empty(), None);

    let out = dashboard.refresh().unwrap();
    assert_eq!(out.kpis.villages_in_view, 0);
    assert!(out.commodity_counts.is_empty());
    assert!(out.detail.is_empty());
    assert!(out.notices.iter().any(|n| n.contains("Select at least one district")));
}

#[test]
fn district_switch_clears_a_selection_without_a_new_click() {
    let mut dashboard = Dashboard::new(three_village_table(), PoiTable::empty(), None);

    // Select district A: two villages, KARET=1 and PADI=1.
    let out = dashboard.on_filter_change(districts(&["A"])).unwrap();
    assert_eq!(out.kpis.villages_in_view, 2);
    assert_eq!(
        out.commodity_counts,
        vec![("KARET".to_string(), 1), ("PADI".to_string(), 1)],
    );

    // Click the KARET village: the selection becomes that record and the
    // controller reran once to reconcile.
    let out = dashboard.on_map_click("Sukamaju").unwrap();
    assert!(out.reran);
    match dashboard.selection() {
        Selection::Selected(attrs) => {
            assert_eq!(attrs.village.as_deref(), Some("Sukamaju"));
            assert_eq!(attrs.commodity.as_deref(), Some("KARET"));
        }
        Selection::Empty => panic!("expected a selection after the click"),
    }
    assert!(out.detail.iter().any(|row| row.label == "Area" && row.value == "12.35 km²"));

    // Switch the filter to district B only: the clicked village is gone
    // from the working subset, so the selection must clear even though no
    // new click occurred, and clearing is not a rerender.
    let out = dashboard.on_filter_change(districts(&["B"])).unwrap();
    assert_eq!(out.kpis.villages_in_view, 1);
    assert_eq!(dashboard.selection(), &Selection::Empty);
    assert!(out.detail.is_empty());
    assert!(!out.reran);
}

#[test]
fn replayed_click_feedback_does_not_rerender_again() {
    let mut dashboard = Dashboard::new(three_village_table(), PoiTable::empty(), None);
    dashboard.on_filter_change(districts(&["A"])).unwrap();

    let out = dashboard.on_map_click("Sukamaju").unwrap();
    assert!(out.reran);

    // The map keeps replaying the active feature: same key, no rerender.
    let out = dashboard.on_map_click("Sukamaju").unwrap();
    assert!(!out.reran);

    let out = dashboard.refresh().unwrap();
    assert!(!out.reran);
    assert!(matches!(dashboard.selection(), Selection::Selected(_)));
}

#[test]
fn clicking_across_villages_signals_once_per_change() {
    let mut dashboard = Dashboard::new(three_village_table(), PoiTable::empty(), None);
    dashboard.on_filter_change(districts(&["A"])).unwrap();

    assert!(dashboard.on_map_click("Sukamaju").unwrap().reran);
    assert!(dashboard.on_map_click("Mekarsari").unwrap().reran);
    match dashboard.selection() {
        Selection::Selected(attrs) => assert_eq!(attrs.village.as_deref(), Some("Mekarsari")),
        Selection::Empty => panic!("expected a selection"),
    }
}

#[test]
fn click_outside_the_working_subset_is_ignored_with_a_notice() {
    let mut dashboard = Dashboard::new(three_village_table(), PoiTable::empty(), None);
    dashboard.on_filter_change(districts(&["A"])).unwrap();

    // Sigapiton is in district B and therefore not rendered.
    let out = dashboard.on_map_click("Sigapiton").unwrap();
    assert!(!out.reran);
    assert_eq!(dashboard.selection(), &Selection::Empty);
    assert!(out.notices.iter().any(|n| n.contains("click ignored")));
}

#[test]
fn emptying_the_filter_clears_everything() {
    let mut dashboard = Dashboard::new(three_village_table(), PoiTable::empty(), None);
    dashboard.on_filter_change(districts(&["A", "B"])).unwrap();
    dashboard.on_map_click("Sigapiton").unwrap();
    assert!(matches!(dashboard.selection(), Selection::Selected(_)));

    let out = dashboard.on_filter_change(BTreeSet::new()).unwrap();
    assert_eq!(dashboard.selection(), &Selection::Empty);
    assert_eq!(out.kpis.villages_in_view, 0);
    assert!(out.detail.is_empty());
}

#[test]
fn invalid_poi_coordinates_skip_that_record_only() {
    let pois = PoiTable::from_records(vec![
        poi("Pasar Induk", "0.5", "0.5"),
        poi("Terminal", "not-a-number", "0.7"),
        poi("Puskesmas", "0.2", "0.9"),
    ]);
    let mut dashboard = Dashboard::new(three_village_table(), pois, None);

    let out = dashboard.on_filter_change(districts(&["A"])).unwrap();
    assert_eq!(out.map_stats.pois_drawn, 2);
    assert_eq!(out.map_stats.pois_skipped, 1);
    assert!(out.notices.iter().any(|n| n.contains("non-numeric coordinates")));
}

#[test]
fn artifacts_are_written_for_a_rendered_pass() {
    let dir = std::env::temp_dir().join(format!("komodash-test-{}", std::process::id()));
    let pois = PoiTable::from_records(vec![poi("Pasar Induk", "0.5", "0.5")]);
    let mut dashboard = Dashboard::new(three_village_table(), pois, Some(dir.clone()));

    let out = dashboard.on_filter_change(districts(&["A"])).unwrap();
    assert_eq!(out.map_stats.villages_drawn, 2);
    assert_eq!(out.map_stats.pois_drawn, 1);

    let map_svg = std::fs::read_to_string(dir.join("map.svg")).unwrap();
    assert!(map_svg.contains("Sukamaju"));
    assert!(map_svg.contains("Dominant commodity"));

    let geojson = std::fs::read_to_string(dir.join("map.geojson")).unwrap();
    assert!(geojson.contains("FeatureCollection"));
    assert!(geojson.contains("Mekarsari"));

    assert!(dir.join("commodity_chart.svg").exists());
    assert!(dir.join("poi_chart.svg").exists());

    std::fs::remove_dir_all(&dir).ok();
}
