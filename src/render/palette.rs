use std::collections::BTreeSet;

use anyhow::{Context, Result};
use log::warn;

use crate::data::VillageTable;
use crate::filter::WorkingSubset;

/// Fixed categorical cycle assigned to commodities in first-appearance order.
const DISTINCT_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Fill used for commodity labels the palette has never seen.
pub const FALLBACK_COLOR: &str = "#ffffff";

/// Deterministic commodity → color mapping for one working subset.
/// Lookup is case-insensitive; unrecognized labels fall back to white and
/// are reported once per distinct label (they usually mean a typo in the
/// source data rather than a real category).
#[derive(Debug, Clone)]
pub struct CommodityPalette {
    // (display label as first seen, lowercased key, color)
    entries: Vec<(String, String, &'static str)>,
}

impl CommodityPalette {
    /// Build the palette from the distinct commodity labels visible through
    /// `subset`, in first-appearance order. Colors cycle past ten labels.
    pub fn from_subset(table: &VillageTable, subset: &WorkingSubset) -> Result<Self> {
        let commodities = table.data().column("commodity")
            .context("village table is missing the `commodity` column")?
            .str().context("`commodity` column must be of type String")?;

        let mut entries: Vec<(String, String, &'static str)> = Vec::new();
        for &idx in subset.indices() {
            let Some(label) = commodities.get(idx) else { continue };
            let key = label.to_lowercase();
            if !entries.iter().any(|(_, k, _)| *k == key) {
                let color = DISTINCT_COLORS[entries.len() % DISTINCT_COLORS.len()];
                entries.push((label.to_string(), key, color));
            }
        }

        Ok(Self { entries })
    }

    /// Color for a commodity label, `None` when unrecognized.
    pub fn color_for(&self, label: &str) -> Option<&'static str> {
        let key = label.to_lowercase();
        self.entries.iter()
            .find(|(_, k, _)| *k == key)
            .map(|(_, _, color)| *color)
    }

    /// Legend entries: (display label, color), in palette order.
    pub fn legend(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries.iter().map(|(label, _, color)| (label.as_str(), *color))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Resolve one fill color per subset row. Unrecognized labels map to
    /// [`FALLBACK_COLOR`] and are logged once each as a data-quality warning.
    pub fn fill_colors(&self, table: &VillageTable, subset: &WorkingSubset) -> Result<Vec<&'static str>> {
        let commodities = table.data().column("commodity")
            .context("village table is missing the `commodity` column")?
            .str().context("`commodity` column must be of type String")?;

        let mut unknown: BTreeSet<String> = BTreeSet::new();
        let mut colors = Vec::with_capacity(subset.len());
        for &idx in subset.indices() {
            let color = commodities.get(idx)
                .and_then(|label| {
                    let color = self.color_for(label);
                    if color.is_none() {
                        unknown.insert(label.to_string());
                    }
                    color
                })
                .unwrap_or(FALLBACK_COLOR);
            colors.push(color);
        }

        for label in &unknown {
            warn!("commodity label {label:?} has no palette entry; using fallback color");
        }

        Ok(colors)
    }
}
