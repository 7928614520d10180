use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;

use crate::data::{PoiTable, VillageTable};
use crate::filter::{district_names, filter_by_district, WorkingSubset};
use crate::render::{render_map_svg, subset_to_geojson, write_geojson, CommodityPalette, MapRenderStats, MapSurface};
use crate::selection::{Selection, SelectionStore, Transition};
use crate::views::{commodity_counts, detail_rows, kpis, poi_per_district, render_hbar_svg, render_vbar_svg, DetailRow, Kpis};

/// Everything one pipeline pass produced for display.
#[derive(Debug, Clone)]
pub struct PassOutput {
    pub kpis: Kpis,
    pub commodity_counts: Vec<(String, u32)>,
    pub poi_totals: Vec<(String, i64)>,
    /// Detail rows for the current selection; empty means "show the prompt".
    pub detail: Vec<DetailRow>,
    pub map_stats: MapRenderStats,
    /// Inline warnings/info for the UI shell (non-fatal conditions).
    pub notices: Vec<String>,
    /// Whether this interaction changed the selection and forced the extra
    /// reconciling pass before control returned.
    pub reran: bool,
}

/// Top-level dashboard controller. Owns the session state the reactive
/// original kept in framework globals: the district filter, the selection
/// store, and the map surface. Every interaction handler recomputes the
/// working subset, reconciles the selection, renders, and, when the
/// selection genuinely changed, immediately runs one more pass so the
/// views hand back a consistent state.
///
/// Single-threaded by design: each pass runs to completion, the store has
/// one writer and one reader per pass, and no locking is needed.
pub struct Dashboard {
    table: Arc<VillageTable>,
    pois: PoiTable,
    out_dir: Option<PathBuf>,
    selected_districts: BTreeSet<String>,
    selection: SelectionStore,
    map: MapSurface,
    /// Notices repeated on every pass (e.g. a missing POI file).
    standing_notices: Vec<String>,
}

impl Dashboard {
    pub fn new(table: Arc<VillageTable>, pois: PoiTable, out_dir: Option<PathBuf>) -> Self {
        Self {
            table,
            pois,
            out_dir,
            selected_districts: BTreeSet::new(),
            selection: SelectionStore::new(),
            map: MapSurface::new(),
            standing_notices: Vec::new(),
        }
    }

    /// Add a notice surfaced on every subsequent pass.
    pub fn add_standing_notice(&mut self, notice: impl Into<String>) {
        self.standing_notices.push(notice.into());
    }

    /// District names offered by the filter control.
    pub fn district_choices(&self) -> Result<Vec<String>> {
        district_names(&self.table)
    }

    pub fn selected_districts(&self) -> &BTreeSet<String> {
        &self.selected_districts
    }

    pub fn selection(&self) -> &Selection {
        self.selection.current()
    }

    /// Render the dashboard without any interaction (session start).
    pub fn refresh(&mut self) -> Result<PassOutput> {
        self.run_reconciled()
    }

    /// The user changed the district multi-select.
    pub fn on_filter_change(&mut self, districts: BTreeSet<String>) -> Result<PassOutput> {
        self.selected_districts = districts;
        self.run_reconciled()
    }

    /// The user clicked a village on the map. Clicks resolve against the
    /// rendered features only; a name outside the working subset is ignored
    /// with a notice rather than an error.
    pub fn on_map_click(&mut self, village: &str) -> Result<PassOutput> {
        let subset = filter_by_district(&self.table, &self.selected_districts)?;
        if !self.map.click(&self.table, &subset, village) {
            let mut out = self.run_reconciled()?;
            out.notices.push(format!("{village:?} is not in the current view; click ignored"));
            return Ok(out);
        }
        self.run_reconciled()
    }

    /// Run one pass; if the selection changed, run exactly one more so the
    /// rendered views reflect the new selection before control returns.
    fn run_reconciled(&mut self) -> Result<PassOutput> {
        let (out, transition) = self.run_pass()?;
        if !transition.needs_rerender() {
            return Ok(out);
        }

        debug!("selection changed; rerendering");
        let (mut out, transition) = self.run_pass()?;
        // The replayed feedback now matches the stored selection, so the
        // idempotence guard must hold here.
        debug_assert!(!transition.needs_rerender());
        out.reran = true;
        Ok(out)
    }

    /// One full pipeline pass: filter → selection reconciliation → views.
    /// The selection is fully resolved before any view reads it.
    fn run_pass(&mut self) -> Result<(PassOutput, Transition)> {
        let subset = filter_by_district(&self.table, &self.selected_districts)?;

        // A filter change that hides the active feature rebuilds the map,
        // so its click feedback does not survive into the new view.
        self.map.sync(&subset);
        let feedback = self.map.last_active_drawing().cloned();
        let transition = self.selection.reconcile(&subset, feedback.as_ref());

        let palette = CommodityPalette::from_subset(&self.table, &subset)?;
        let mut notices = self.standing_notices.clone();
        if subset.is_empty() {
            notices.push("Select at least one district to see data.".to_string());
        }

        let map_stats = match &self.out_dir {
            Some(dir) => self.render_artifacts(dir.clone(), &subset, &palette)?,
            None => headless_stats(&subset, &self.pois),
        };
        if map_stats.pois_skipped > 0 {
            notices.push(format!(
                "{} POI record(s) have non-numeric coordinates and were not drawn",
                map_stats.pois_skipped,
            ));
        }

        let output = PassOutput {
            kpis: kpis(&self.table, &subset, self.selected_districts.len())?,
            commodity_counts: commodity_counts(&self.table, &subset)?,
            poi_totals: poi_per_district(&self.table, &subset)?,
            detail: detail_rows(self.selection.current()),
            map_stats,
            notices,
            reran: false,
        };
        Ok((output, transition))
    }

    /// Write the map, GeoJSON, and chart artifacts for this pass.
    fn render_artifacts(
        &self,
        dir: PathBuf,
        subset: &WorkingSubset,
        palette: &CommodityPalette,
    ) -> Result<MapRenderStats> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let stats = render_map_svg(&dir.join("map.svg"), &self.table, subset, &self.pois, palette)?;
        write_geojson(&dir.join("map.geojson"), &subset_to_geojson(&self.table, subset, palette)?)?;
        render_hbar_svg(
            &dir.join("commodity_chart.svg"),
            "Villages per dominant commodity",
            &commodity_counts(&self.table, subset)?,
        )?;
        render_vbar_svg(
            &dir.join("poi_chart.svg"),
            "Total POI per district",
            &poi_per_district(&self.table, subset)?,
        )?;
        Ok(stats)
    }
}

/// Marker stats without writing artifacts: what the map renderer would have
/// drawn. Used when the controller runs headless (tests, dry runs).
fn headless_stats(subset: &WorkingSubset, pois: &PoiTable) -> MapRenderStats {
    if subset.is_empty() {
        return MapRenderStats::default();
    }
    let valid = pois.records().iter().filter(|r| r.coords().is_some()).count();
    MapRenderStats {
        villages_drawn: subset.len(),
        pois_drawn: valid,
        pois_skipped: pois.len() - valid,
    }
}
