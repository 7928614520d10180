mod geojson;
mod map_svg;
mod palette;

pub use geojson::{subset_to_geojson, write_geojson};
pub use map_svg::{render_map_svg, MapRenderStats};
pub use palette::{CommodityPalette, FALLBACK_COLOR};

use crate::data::{VillageAttrs, VillageTable};
use crate::filter::WorkingSubset;

/// The map's interaction surface, modeled explicitly: the surface retains
/// the most recently activated feature and replays its attributes on every
/// pass until the visual session resets. This replay is exactly why the
/// selection store needs its idempotence guard.
#[derive(Debug, Default)]
pub struct MapSurface {
    active: Option<VillageAttrs>,
}

impl MapSurface {
    pub fn new() -> Self { Self::default() }

    /// Activate the named village, resolving it against the rendered
    /// features only. Returns `false` (and changes nothing) when the name
    /// is not in the working subset; a real map cannot emit clicks for
    /// features it is not showing. Matching is case-insensitive.
    pub fn click(&mut self, table: &VillageTable, subset: &WorkingSubset, village: &str) -> bool {
        for &idx in subset.indices() {
            let attrs = table.attrs(idx);
            let matches = attrs.village.as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(village));
            if matches {
                self.active = Some(attrs);
                return true;
            }
        }
        false
    }

    /// The ambient "last active drawing" observation for the current pass.
    pub fn last_active_drawing(&self) -> Option<&VillageAttrs> {
        self.active.as_ref()
    }

    /// Reset the visual session (no active feature any more).
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Drop the active feature if it is no longer rendered. A filter change
    /// that removes the clicked village rebuilds the map, so its feedback
    /// must not survive into the new visual session.
    pub fn sync(&mut self, subset: &WorkingSubset) {
        let stale = self.active.as_ref()
            .is_some_and(|attrs| !subset.contains_key(attrs.key()));
        if stale {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use geo::{LineString, MultiPolygon, Polygon};
    use polars::prelude::*;

    use super::*;

    fn table() -> VillageTable {
        let square = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )]);
        let df = df![
            "village" => ["Desa1", "Desa2"],
            "district" => ["A", "B"],
            "commodity" => ["KARET", "KOPI"],
            "poi_count" => [0i64, 0],
        ].unwrap();
        VillageTable::from_parts(df, vec![square.clone(), square]).unwrap()
    }

    fn subset_a() -> WorkingSubset {
        WorkingSubset::new(vec![0], HashSet::from(["Desa1".into()]))
    }

    #[test]
    fn click_resolves_only_rendered_features() {
        let table = table();
        let mut surface = MapSurface::new();
        assert!(!surface.click(&table, &subset_a(), "Desa2"));
        assert!(surface.last_active_drawing().is_none());

        assert!(surface.click(&table, &subset_a(), "desa1"));
        assert_eq!(surface.last_active_drawing().unwrap().key(), "Desa1");
    }

    #[test]
    fn replays_until_sync_drops_hidden_feature() {
        let table = table();
        let mut surface = MapSurface::new();
        surface.click(&table, &subset_a(), "Desa1");

        // Replayed on subsequent passes while still rendered.
        surface.sync(&subset_a());
        assert!(surface.last_active_drawing().is_some());

        // Filter switched away: the visual session resets.
        let subset_b = WorkingSubset::new(vec![1], HashSet::from(["Desa2".into()]));
        surface.sync(&subset_b);
        assert!(surface.last_active_drawing().is_none());
    }
}
