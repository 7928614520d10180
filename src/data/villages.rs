use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use geo::MultiPolygon;
use log::warn;
use polars::frame::DataFrame;
use polars::prelude::Column;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Reader, Shape};

use crate::common;
use super::attrs::VillageAttrs;

/// Douglas-Peucker tolerance (degrees) applied to every loaded boundary.
/// Keeps rendered artifacts small without visibly changing village shapes.
const SIMPLIFY_TOLERANCE: f64 = 0.001;

/// The village polygon table: one attribute row per village, with the
/// boundary geometries in a parallel vector indexed by row position.
///
/// Immutable for the lifetime of a session. Filtering produces row-index
/// views ([`crate::WorkingSubset`]), never a modified table.
#[derive(Debug, Clone)]
pub struct VillageTable {
    data: DataFrame,
    geoms: Vec<MultiPolygon<f64>>,
}

impl VillageTable {
    /// Loads villages from a `.shp` file (with its DBF attribute records).
    ///
    /// Source columns are renamed to the canonical schema (`WADMKD` →
    /// `village`, `WADMKK` → `district`, `Prediksi` → `commodity`,
    /// `jumlah_poi` → `poi_count`, `LUAS` → `area_km2`, indices lowercased).
    /// Rows missing district, commodity, or POI count are dropped, as are
    /// non-polygon shapes; both are counted in a warning.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        let mut reader = Reader::from_path(path)
            .with_context(|| format!("Failed to open village shapefile: {}", path.display()))?;

        let mut geoms = Vec::with_capacity(reader.shape_count()?);
        let mut rows: Vec<RawRow> = Vec::with_capacity(geoms.capacity());
        let mut dropped = 0usize;

        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.context("Error reading shape+record")?;

            let polygon = match shape {
                Shape::Polygon(p) => p,
                _ => {
                    dropped += 1;
                    continue;
                }
            };

            // Critical columns must be present; incomplete rows are excluded
            // here so every downstream component can rely on them.
            let Some(row) = RawRow::from_record(&record) else {
                dropped += 1;
                continue;
            };

            geoms.push(common::simplify_multipolygon(&common::shp_to_geo(&polygon), SIMPLIFY_TOLERANCE));
            rows.push(row);
        }

        if dropped > 0 {
            warn!("dropped {dropped} incomplete or non-polygon records from {}", path.display());
        }

        if rows.is_empty() {
            bail!("No usable village records in {}", path.display());
        }

        Self::from_parts(rows_to_dataframe(rows)?, geoms)
    }

    /// Assemble a table from an attribute frame plus parallel geometries.
    /// The frame must carry at least `village` and `district` string columns.
    pub fn from_parts(data: DataFrame, geoms: Vec<MultiPolygon<f64>>) -> Result<Self> {
        ensure!(
            data.height() == geoms.len(),
            "village table size mismatch: {} attribute rows for {} geometries",
            data.height(), geoms.len(),
        );
        data.column("village")
            .context("village table is missing the `village` column")?
            .str().context("`village` column must be of type String")?;
        data.column("district")
            .context("village table is missing the `district` column")?
            .str().context("`district` column must be of type String")?;

        Ok(Self { data, geoms })
    }

    /// Number of villages.
    pub fn len(&self) -> usize { self.data.height() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Read-only attribute frame.
    pub fn data(&self) -> &DataFrame { &self.data }

    /// Boundary geometries, parallel to the attribute rows.
    pub fn geoms(&self) -> &[MultiPolygon<f64>] { &self.geoms }

    /// Typed attribute record for row `idx`.
    pub fn attrs(&self, idx: usize) -> VillageAttrs {
        VillageAttrs::from_row(&self.data, idx)
    }
}

/// One validated source row before columnization. Required fields are plain,
/// optional indicator fields stay optional.
struct RawRow {
    village: Option<String>,
    district: String,
    area_km2: Option<f64>,
    indices: [Option<f64>; 12],
    commodity: String,
    poi_count: i64,
}

/// Source DBF field names for the twelve numeric indicator columns, in the
/// order they land in `RawRow::indices` and the canonical schema.
const INDEX_FIELDS: [(&str, &str); 12] = [
    ("EVI", "evi"),
    ("MNDWI", "mndwi"),
    ("NBR", "nbr"),
    ("NDRE", "ndre"),
    ("NDVI", "ndvi"),
    ("NDWI", "ndwi"),
    ("RVI", "rvi"),
    ("SAVI", "savi"),
    ("Elevation", "elevation_m"),
    ("Slope", "slope_deg"),
    ("Rainfall", "rainfall_mm"),
    ("TCI", "tci"),
];

impl RawRow {
    /// Returns `None` when any critical field (district, commodity, POI
    /// count) is missing, which excludes the row from the session.
    fn from_record(record: &Record) -> Option<Self> {
        let district = character_field(record, "WADMKK")?;
        let commodity = character_field(record, "Prediksi")?;
        let poi_count = numeric_field(record, "jumlah_poi")? as i64;

        let mut indices = [None; 12];
        for (slot, (source, _)) in indices.iter_mut().zip(INDEX_FIELDS.iter()) {
            *slot = numeric_field(record, source);
        }

        Some(Self {
            village: character_field(record, "WADMKD"),
            district,
            area_km2: numeric_field(record, "LUAS"),
            indices,
            commodity,
            poi_count,
        })
    }
}

/// Get the value of a character field from a Record.
fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

/// Get the value of a numeric field from a Record, tolerating the several
/// numeric storage classes DBF writers use.
fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    match record.get(field) {
        Some(FieldValue::Numeric(Some(n))) => Some(*n),
        Some(FieldValue::Float(Some(n))) => Some(*n as f64),
        Some(FieldValue::Double(n)) => Some(*n),
        Some(FieldValue::Integer(n)) => Some(*n as f64),
        _ => None,
    }
}

/// Convert validated rows to the canonical attribute DataFrame.
fn rows_to_dataframe(rows: Vec<RawRow>) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new(
            "village".into(),
            rows.iter().map(|row| row.village.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "district".into(),
            rows.iter().map(|row| row.district.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "area_km2".into(),
            rows.iter().map(|row| row.area_km2).collect::<Vec<_>>(),
        ),
    ];

    for (slot, (_, name)) in INDEX_FIELDS.iter().enumerate() {
        columns.push(Column::new(
            (*name).into(),
            rows.iter().map(|row| row.indices[slot]).collect::<Vec<_>>(),
        ));
    }

    columns.push(Column::new(
        "commodity".into(),
        rows.iter().map(|row| row.commodity.clone()).collect::<Vec<_>>(),
    ));
    columns.push(Column::new(
        "poi_count".into(),
        rows.iter().map(|row| row.poi_count).collect::<Vec<_>>(),
    ));

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};
    use polars::prelude::*;

    use super::*;

    fn unit_square() -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )])
    }

    #[test]
    fn from_parts_rejects_length_mismatch() {
        let df = df![
            "village" => ["A"],
            "district" => ["X"],
        ].unwrap();
        assert!(VillageTable::from_parts(df, vec![]).is_err());
    }

    #[test]
    fn from_parts_requires_district_column() {
        let df = df!["village" => ["A"]].unwrap();
        assert!(VillageTable::from_parts(df, vec![unit_square()]).is_err());
    }

    #[test]
    fn attrs_roundtrip_by_row() {
        let df = df![
            "village" => ["A", "B"],
            "district" => ["X", "Y"],
            "commodity" => ["PADI", "KOPI"],
            "poi_count" => [1i64, 2],
        ].unwrap();
        let table = VillageTable::from_parts(df, vec![unit_square(), unit_square()]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.attrs(1).village.as_deref(), Some("B"));
        assert_eq!(table.attrs(1).commodity.as_deref(), Some("KOPI"));
    }
}
