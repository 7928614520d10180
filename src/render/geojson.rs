use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use serde_json::{json, Map, Value};

use crate::data::VillageTable;
use crate::filter::WorkingSubset;
use super::palette::{CommodityPalette, FALLBACK_COLOR};

/// Export the working subset as a GeoJSON FeatureCollection with display
/// properties, including the resolved choropleth fill per feature, for any
/// web map that wants to take over rendering.
pub fn subset_to_geojson(
    table: &VillageTable,
    subset: &WorkingSubset,
    palette: &CommodityPalette,
) -> Result<Value> {
    let mut features = Vec::with_capacity(subset.len());

    for &idx in subset.indices() {
        let attrs = table.attrs(idx);
        let fill = attrs.commodity.as_deref()
            .and_then(|label| palette.color_for(label))
            .unwrap_or(FALLBACK_COLOR);

        let mut properties = Map::new();
        properties.insert("village".to_string(), json!(attrs.village));
        properties.insert("district".to_string(), json!(attrs.district));
        properties.insert("commodity".to_string(), json!(attrs.commodity));
        properties.insert("poi_count".to_string(), json!(attrs.poi_count));
        properties.insert("area_km2".to_string(), json!(attrs.area_km2));
        properties.insert("fill".to_string(), json!(fill));

        features.push(json!({
            "type": "Feature",
            "id": attrs.key(),
            "geometry": multipolygon_to_geojson(&table.geoms()[idx]),
            "properties": properties,
        }));
    }

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// Write a GeoJSON value to a file.
pub fn write_geojson(path: &Path, value: &Value) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[to_geojson] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Helper to convert a MultiPolygon to a serde_json::Value representing GeoJSON Geometry.
fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let mut polygons_json = Vec::new();
    for polygon in mp.0.iter() {
        let exterior: Vec<Vec<f64>> = polygon.exterior().coords()
            .map(|c| vec![c.x, c.y])
            .collect();
        let interiors: Vec<Vec<Vec<f64>>> = polygon.interiors().iter()
            .map(|ls| ls.coords().map(|c| vec![c.x, c.y]).collect())
            .collect();
        let mut rings = vec![exterior];
        rings.extend(interiors);
        polygons_json.push(json!(rings));
    }
    json!({
        "type": "MultiPolygon",
        "coordinates": polygons_json
    })
}
