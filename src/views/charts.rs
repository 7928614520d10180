use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Ok, Result};
use serde::Serialize;

use crate::common::{escape_text, SvgWriter};
use crate::data::VillageTable;
use crate::filter::WorkingSubset;

const CHART_WIDTH: f64 = 640.0;
const EMPTY_CHART_HEIGHT: f64 = 160.0;

/// Headline numbers recomputed from scratch every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub villages_in_view: usize,
    pub districts_selected: usize,
    pub poi_total: i64,
}

/// Villages per commodity in the working subset, most common first
/// (ties broken by label so output is stable).
pub fn commodity_counts(table: &VillageTable, subset: &WorkingSubset) -> Result<Vec<(String, u32)>> {
    let commodities = table.data().column("commodity")
        .context("village table is missing the `commodity` column")?
        .str().context("`commodity` column must be of type String")?;

    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for &idx in subset.indices() {
        if let Some(label) = commodities.get(idx) {
            *counts.entry(label.to_string()).or_default() += 1;
        }
    }

    let mut rows: Vec<(String, u32)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(rows)
}

/// Total POI count per district in the working subset, district order.
pub fn poi_per_district(table: &VillageTable, subset: &WorkingSubset) -> Result<Vec<(String, i64)>> {
    let districts = table.data().column("district")
        .context("village table is missing the `district` column")?
        .str().context("`district` column must be of type String")?;
    let poi_counts = table.data().column("poi_count")
        .context("village table is missing the `poi_count` column")?
        .i64().context("`poi_count` column must be of type Int64")?;

    let mut sums: BTreeMap<String, i64> = BTreeMap::new();
    for &idx in subset.indices() {
        let Some(district) = districts.get(idx) else { continue };
        *sums.entry(district.to_string()).or_default() += poi_counts.get(idx).unwrap_or(0);
    }

    Ok(sums.into_iter().collect())
}

/// KPI numbers for the current pass.
pub fn kpis(table: &VillageTable, subset: &WorkingSubset, districts_selected: usize) -> Result<Kpis> {
    let poi_total = poi_per_district(table, subset)?
        .into_iter()
        .map(|(_, sum)| sum)
        .sum();
    Ok(Kpis {
        villages_in_view: subset.len(),
        districts_selected,
        poi_total,
    })
}

/// Horizontal bar chart (used for villages-per-commodity).
pub fn render_hbar_svg(path: &Path, title: &str, rows: &[(String, u32)]) -> Result<()> {
    let mut writer = SvgWriter::new(path)?;
    if rows.is_empty() {
        return write_placeholder(writer, title);
    }

    let row_height = 24.0;
    let label_width = 150.0;
    let height = 48.0 + rows.len() as f64 * row_height;
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1) as f64;
    let span = CHART_WIDTH - label_width - 60.0;

    writer.write_header(CHART_WIDTH, height)?;
    writer.write_styles()?;
    writeln!(writer, r#"<text class="ttl" x="16" y="24">{}</text>"#, escape_text(title))?;
    for (i, (label, count)) in rows.iter().enumerate() {
        let y = 40.0 + i as f64 * row_height;
        let w = span * (*count as f64) / max;
        writeln!(writer, r#"<text class="lbl" x="{:.0}" y="{:.0}" text-anchor="end">{}</text>"#,
            label_width - 8.0, y + 12.0, escape_text(label))?;
        writeln!(writer, r#"<rect class="bar" x="{label_width:.0}" y="{y:.0}" width="{w:.1}" height="16"/>"#)?;
        writeln!(writer, r#"<text class="lbl" x="{:.1}" y="{:.0}">{count}</text>"#,
            label_width + w + 6.0, y + 12.0)?;
    }
    writer.write_footer()?;
    writer.flush()?;
    Ok(())
}

/// Vertical bar chart (used for POI totals per district).
pub fn render_vbar_svg(path: &Path, title: &str, rows: &[(String, i64)]) -> Result<()> {
    let mut writer = SvgWriter::new(path)?;
    if rows.is_empty() {
        return write_placeholder(writer, title);
    }

    let height = 320.0;
    let base = height - 60.0;
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1) as f64;
    let slot = (CHART_WIDTH - 40.0) / rows.len() as f64;
    let bar_width = (slot * 0.6).min(60.0);

    writer.write_header(CHART_WIDTH, height)?;
    writer.write_styles()?;
    writeln!(writer, r#"<text class="ttl" x="16" y="24">{}</text>"#, escape_text(title))?;
    for (i, (label, sum)) in rows.iter().enumerate() {
        let x = 20.0 + i as f64 * slot + (slot - bar_width) / 2.0;
        let h = (base - 48.0) * (*sum as f64) / max;
        let y = base - h;
        writeln!(writer, r#"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{h:.1}"/>"#)?;
        writeln!(writer, r#"<text class="lbl" x="{:.1}" y="{:.0}" text-anchor="middle">{sum}</text>"#,
            x + bar_width / 2.0, y - 6.0)?;
        writeln!(writer, r#"<text class="lbl" x="{:.1}" y="{:.0}" text-anchor="middle">{}</text>"#,
            x + bar_width / 2.0, base + 18.0, escape_text(label))?;
    }
    writer.write_footer()?;
    writer.flush()?;
    Ok(())
}

fn write_placeholder(mut writer: SvgWriter, title: &str) -> Result<()> {
    writer.write_header(CHART_WIDTH, EMPTY_CHART_HEIGHT)?;
    writer.write_styles()?;
    writeln!(writer, r#"<text class="ttl" x="16" y="24">{}</text>"#, escape_text(title))?;
    writer.write_message(CHART_WIDTH, EMPTY_CHART_HEIGHT, "No data for the current selection.")?;
    writer.write_footer()?;
    writer.flush()?;
    Ok(())
}
