use polars::frame::DataFrame;

/// Sentinel key used when a feature carries no village name. It compares
/// unequal to every real name, so a nameless click still changes the selection.
pub const UNKNOWN_VILLAGE: &str = "(unknown)";

/// Typed attribute record for one village, as carried by map click feedback
/// and the Selection. Fields mirror the canonical table schema; anything the
/// source row does not provide stays `None`, and extra source columns are
/// ignored at extraction time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VillageAttrs {
    pub village: Option<String>,
    pub district: Option<String>,
    pub area_km2: Option<f64>,
    pub evi: Option<f64>,
    pub mndwi: Option<f64>,
    pub nbr: Option<f64>,
    pub ndre: Option<f64>,
    pub ndvi: Option<f64>,
    pub ndwi: Option<f64>,
    pub rvi: Option<f64>,
    pub savi: Option<f64>,
    pub elevation_m: Option<f64>,
    pub slope_deg: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub tci: Option<f64>,
    pub commodity: Option<String>,
    pub poi_count: Option<i64>,
}

impl VillageAttrs {
    /// Extract the attributes of row `idx` from the village table.
    /// Missing or mistyped columns yield `None` rather than an error.
    pub fn from_row(df: &DataFrame, idx: usize) -> Self {
        Self {
            village: str_cell(df, "village", idx),
            district: str_cell(df, "district", idx),
            area_km2: f64_cell(df, "area_km2", idx),
            evi: f64_cell(df, "evi", idx),
            mndwi: f64_cell(df, "mndwi", idx),
            nbr: f64_cell(df, "nbr", idx),
            ndre: f64_cell(df, "ndre", idx),
            ndvi: f64_cell(df, "ndvi", idx),
            ndwi: f64_cell(df, "ndwi", idx),
            rvi: f64_cell(df, "rvi", idx),
            savi: f64_cell(df, "savi", idx),
            elevation_m: f64_cell(df, "elevation_m", idx),
            slope_deg: f64_cell(df, "slope_deg", idx),
            rainfall_mm: f64_cell(df, "rainfall_mm", idx),
            tci: f64_cell(df, "tci", idx),
            commodity: str_cell(df, "commodity", idx),
            poi_count: i64_cell(df, "poi_count", idx),
        }
    }

    /// Selection key: the village name, or the sentinel when absent.
    pub fn key(&self) -> &str {
        self.village.as_deref().unwrap_or(UNKNOWN_VILLAGE)
    }
}

/// Get a string cell, or `None` if the column is missing, not a string
/// column, or null at `idx`.
pub(crate) fn str_cell(df: &DataFrame, name: &str, idx: usize) -> Option<String> {
    df.column(name).ok()?.str().ok()?.get(idx).map(str::to_string)
}

/// Get a float cell, tolerating integer-typed columns.
pub(crate) fn f64_cell(df: &DataFrame, name: &str, idx: usize) -> Option<f64> {
    let col = df.column(name).ok()?;
    if let Ok(values) = col.f64() {
        values.get(idx)
    } else if let Ok(values) = col.i64() {
        values.get(idx).map(|v| v as f64)
    } else {
        None
    }
}

/// Get an integer cell, tolerating float-typed columns.
pub(crate) fn i64_cell(df: &DataFrame, name: &str, idx: usize) -> Option<i64> {
    let col = df.column(name).ok()?;
    if let Ok(values) = col.i64() {
        values.get(idx)
    } else if let Ok(values) = col.f64() {
        values.get(idx).map(|v| v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    fn sample_frame() -> DataFrame {
        df![
            "village" => ["Bandar Baru", "Sigapiton"],
            "district" => ["Deli Serdang", "Toba"],
            "area_km2" => [12.345, 3.5],
            "commodity" => ["KARET", "KOPI"],
            "poi_count" => [4i64, 0],
            "unrelated_extra" => ["x", "y"],
        ].unwrap()
    }

    #[test]
    fn extracts_known_fields_and_ignores_extras() {
        let df = sample_frame();
        let attrs = VillageAttrs::from_row(&df, 0);
        assert_eq!(attrs.village.as_deref(), Some("Bandar Baru"));
        assert_eq!(attrs.district.as_deref(), Some("Deli Serdang"));
        assert_eq!(attrs.area_km2, Some(12.345));
        assert_eq!(attrs.commodity.as_deref(), Some("KARET"));
        assert_eq!(attrs.poi_count, Some(4));
        // Columns not in the schema never show up anywhere.
        assert_eq!(attrs.ndvi, None);
    }

    #[test]
    fn missing_columns_become_none() {
        let df = df!["village" => ["A"]].unwrap();
        let attrs = VillageAttrs::from_row(&df, 0);
        assert_eq!(attrs.village.as_deref(), Some("A"));
        assert_eq!(attrs.district, None);
        assert_eq!(attrs.poi_count, None);
    }

    #[test]
    fn key_falls_back_to_sentinel() {
        let mut attrs = VillageAttrs::from_row(&sample_frame(), 1);
        assert_eq!(attrs.key(), "Sigapiton");
        attrs.village = None;
        assert_eq!(attrs.key(), UNKNOWN_VILLAGE);
    }
}
