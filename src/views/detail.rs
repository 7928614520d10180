use crate::data::VillageAttrs;
use crate::selection::Selection;

/// Shown in place of the attribute table while nothing is selected.
pub const DETAIL_PROMPT: &str = "Click a village on the map to see its details.";

/// One row of the two-column detail table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// Render the current selection as ordered label/value rows. Absent
/// attributes are omitted; `Empty` yields no rows (the caller shows
/// [`DETAIL_PROMPT`] instead).
pub fn detail_rows(selection: &Selection) -> Vec<DetailRow> {
    match selection {
        Selection::Empty => Vec::new(),
        Selection::Selected(attrs) => attrs_rows(attrs),
    }
}

fn attrs_rows(attrs: &VillageAttrs) -> Vec<DetailRow> {
    let mut rows = Vec::new();

    let mut text = |label: &'static str, value: &Option<String>| {
        if let Some(value) = value {
            rows.push(DetailRow { label, value: value.clone() });
        }
    };
    text("Village", &attrs.village);
    text("District", &attrs.district);

    let mut number = |label: &'static str, value: Option<f64>, unit: Option<&str>| {
        if let Some(value) = value {
            rows.push(DetailRow { label, value: format_number(value, unit) });
        }
    };
    number("Area", attrs.area_km2, Some("km²"));
    number("EVI", attrs.evi, None);
    number("MNDWI", attrs.mndwi, None);
    number("NBR", attrs.nbr, None);
    number("NDRE", attrs.ndre, None);
    number("NDVI", attrs.ndvi, None);
    number("NDWI", attrs.ndwi, None);
    number("RVI", attrs.rvi, None);
    number("SAVI", attrs.savi, None);
    number("Elevation", attrs.elevation_m, Some("m"));
    number("Slope", attrs.slope_deg, Some("°"));
    number("Rainfall", attrs.rainfall_mm, Some("mm"));
    number("TCI", attrs.tci, None);

    if let Some(commodity) = &attrs.commodity {
        rows.push(DetailRow { label: "Dominant commodity", value: commodity.clone() });
    }
    if let Some(count) = attrs.poi_count {
        rows.push(DetailRow { label: "POI count", value: format_number(count as f64, None) });
    }

    rows
}

/// 2-decimal numeric formatting, with a unit suffix where one applies.
fn format_number(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{value:.2} {unit}"),
        None => format!("{value:.2}"),
    }
}
