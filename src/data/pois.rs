use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::warn;
use polars::frame::DataFrame;
use polars::io::SerReader;
use polars::prelude::{Column, CsvReader, DataType};

/// Default labels substituted for missing optional POI columns.
const DEFAULT_POI_NAME: &str = "(tanpa nama)";
const DEFAULT_POI_CATEGORY: &str = "Umum";

/// One point of interest. Coordinates are kept as the raw source text and
/// parsed lazily: a record with garbage in its lat/lon stays in the table
/// and is skipped at render time instead of being dropped at load.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    pub name: String,
    pub category: String,
    pub district: Option<String>,
    pub lat_raw: String,
    pub lon_raw: String,
}

impl PoiRecord {
    /// Parsed (lat, lon), or `None` when either coordinate is not numeric.
    pub fn coords(&self) -> Option<(f64, f64)> {
        let lat = self.lat_raw.trim().parse::<f64>().ok()?;
        let lon = self.lon_raw.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

/// The POI table for a session. Never filtered by the district selection:
/// all POIs render regardless of which districts are in view, and a POI's
/// own district label is optional anyway.
#[derive(Debug, Clone, Default)]
pub struct PoiTable {
    records: Vec<PoiRecord>,
}

impl PoiTable {
    pub fn empty() -> Self { Self::default() }

    pub fn from_records(records: Vec<PoiRecord>) -> Self { Self { records } }

    /// Reads a POI CSV file. Column names are matched against the aliases
    /// the source exports have used over time (English and Indonesian).
    /// Latitude/longitude columns are required; name, category, and district
    /// fall back to defaults when absent.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open POI file: {}", path.display()))?;
        let df = CsvReader::new(file).finish()
            .with_context(|| format!("Failed to parse POI file: {}", path.display()))?;

        let Some(lat) = find_column(&df, &["lat", "latitude", "Latitude", "LAT", "y"]) else {
            bail!("POI file {} has no latitude column", path.display());
        };
        let Some(lon) = find_column(&df, &["lon", "lng", "longitude", "Longitude", "LON", "x"]) else {
            bail!("POI file {} has no longitude column", path.display());
        };
        let name = find_column(&df, &["name", "nama", "Name", "Nama"]);
        let category = find_column(&df, &["category", "kategori", "Category", "Kategori", "type"]);
        let district = find_column(&df, &["district", "kabupaten", "District", "Kabupaten", "WADMKK"]);

        let mut records = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            records.push(PoiRecord {
                name: cell_text(name, idx).unwrap_or_else(|| DEFAULT_POI_NAME.to_string()),
                category: cell_text(category, idx).unwrap_or_else(|| DEFAULT_POI_CATEGORY.to_string()),
                district: cell_text(district, idx),
                lat_raw: cell_text(Some(lat), idx).unwrap_or_default(),
                lon_raw: cell_text(Some(lon), idx).unwrap_or_default(),
            });
        }

        Ok(Self { records })
    }

    /// Degrading loader: a missing path or unreadable file yields an empty
    /// table plus a notice for the UI, never an error. Only the polygon
    /// dataset is fatal to the dashboard.
    pub fn load_or_empty(path: Option<&Path>) -> (Self, Option<String>) {
        match path {
            None => (Self::empty(), None),
            Some(path) => match Self::from_csv(path) {
                Ok(table) => (table, None),
                Err(err) => {
                    warn!("POI data unavailable: {err:#}");
                    (Self::empty(), Some(format!("POI data unavailable ({err}); continuing without markers")))
                }
            },
        }
    }

    pub fn records(&self) -> &[PoiRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

/// First column present under any of the given aliases.
fn find_column<'a>(df: &'a DataFrame, aliases: &[&str]) -> Option<&'a Column> {
    aliases.iter().find_map(|name| df.column(name).ok())
}

/// Render one cell as text whatever its dtype, `None` for nulls.
fn cell_text(col: Option<&Column>, idx: usize) -> Option<String> {
    let col = col?;
    match col.dtype() {
        DataType::String => col.str().ok()?.get(idx).map(|s| s.trim().to_string()),
        DataType::Float64 => col.f64().ok()?.get(idx).map(|v| v.to_string()),
        DataType::Int64 => col.i64().ok()?.get(idx).map(|v| v.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}
