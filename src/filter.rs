use std::collections::{BTreeSet, HashSet};

use anyhow::{Context, Result};

use crate::data::{VillageTable, UNKNOWN_VILLAGE};

/// A read-only view over the village table: the rows matching the user's
/// district selection, in original order, plus the set of selection keys
/// visible through it. The Selection Store consults the key set to decide
/// what counts as stale.
#[derive(Debug, Clone, Default)]
pub struct WorkingSubset {
    indices: Vec<usize>,
    keys: HashSet<String>,
}

impl WorkingSubset {
    /// Build a subset directly from row indices and their selection keys.
    pub fn new(indices: Vec<usize>, keys: HashSet<String>) -> Self {
        Self { indices, keys }
    }

    /// Row indices into the base table, original order preserved.
    pub fn indices(&self) -> &[usize] { &self.indices }

    pub fn len(&self) -> usize { self.indices.len() }

    pub fn is_empty(&self) -> bool { self.indices.is_empty() }

    /// Whether a selection key belongs to a currently visible village.
    pub fn contains_key(&self, key: &str) -> bool { self.keys.contains(key) }
}

/// The filter engine: the rows of `table` whose district is in `selected`.
///
/// An empty selection yields an empty subset: the dashboard shows nothing
/// until the user opts in. Unrecognized district names simply match zero
/// rows. Pure; the base table is never touched.
pub fn filter_by_district(table: &VillageTable, selected: &BTreeSet<String>) -> Result<WorkingSubset> {
    if selected.is_empty() {
        return Ok(WorkingSubset::default());
    }

    let districts = table.data().column("district")
        .context("village table is missing the `district` column")?
        .str().context("`district` column must be of type String")?;
    let villages = table.data().column("village")
        .context("village table is missing the `village` column")?
        .str().context("`village` column must be of type String")?;

    let mut indices = Vec::new();
    let mut keys = HashSet::new();
    for idx in 0..table.len() {
        let Some(district) = districts.get(idx) else { continue };
        if selected.contains(district) {
            keys.insert(villages.get(idx).unwrap_or(UNKNOWN_VILLAGE).to_string());
            indices.push(idx);
        }
    }

    Ok(WorkingSubset::new(indices, keys))
}

/// Sorted distinct district names, for the filter control surface.
pub fn district_names(table: &VillageTable) -> Result<Vec<String>> {
    let districts = table.data().column("district")
        .context("village table is missing the `district` column")?
        .str().context("`district` column must be of type String")?;

    let names: BTreeSet<String> = districts.into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Polygon};
    use polars::prelude::*;

    use super::*;

    fn square() -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )])
    }

    fn table() -> VillageTable {
        let df = df![
            "village" => ["Desa1", "Desa2", "Desa3", "Desa4"],
            "district" => ["A", "B", "A", "C"],
            "commodity" => ["KARET", "KOPI", "PADI", "KOPI"],
            "poi_count" => [1i64, 2, 3, 4],
        ].unwrap();
        VillageTable::from_parts(df, vec![square(), square(), square(), square()]).unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_selection_yields_empty_subset() {
        let subset = filter_by_district(&table(), &BTreeSet::new()).unwrap();
        assert!(subset.is_empty());
    }

    #[test]
    fn matches_exactly_the_selected_districts_in_order() {
        let subset = filter_by_district(&table(), &set(&["A"])).unwrap();
        assert_eq!(subset.indices(), &[0, 2]);
        assert!(subset.contains_key("Desa1"));
        assert!(subset.contains_key("Desa3"));
        assert!(!subset.contains_key("Desa2"));
    }

    #[test]
    fn unrecognized_district_matches_nothing() {
        let subset = filter_by_district(&table(), &set(&["Z"])).unwrap();
        assert!(subset.is_empty());
    }

    #[test]
    fn multi_district_union_preserves_row_order() {
        let subset = filter_by_district(&table(), &set(&["C", "A"])).unwrap();
        assert_eq!(subset.indices(), &[0, 2, 3]);
    }

    #[test]
    fn district_names_are_sorted_and_distinct() {
        assert_eq!(district_names(&table()).unwrap(), vec!["A", "B", "C"]);
    }
}
