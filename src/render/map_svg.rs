use std::io::Write;
use std::path::Path;

use anyhow::{Ok, Result};
use geo::{BoundingRect, Coord, CoordsIter, LineString, MultiPolygon, Rect};
use log::warn;

use crate::common::{escape_text, SvgWriter};
use crate::data::{PoiTable, VillageTable};
use crate::filter::WorkingSubset;
use super::palette::CommodityPalette;

const MAP_WIDTH: f64 = 900.0;
const MAP_MARGIN: f64 = 20.0;
const EMPTY_MAP_HEIGHT: f64 = 500.0;
const POI_RADIUS: f64 = 3.0;

/// What one map render actually put on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapRenderStats {
    pub villages_drawn: usize,
    pub pois_drawn: usize,
    pub pois_skipped: usize,
}

/// Projection function: lon/lat -> SVG coords (x,y)
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Render the choropleth map for the working subset, POI markers included,
/// to an SVG file. The viewport auto-fits the subset's bounding box; an
/// empty subset renders a placeholder prompt instead of a map.
pub fn render_map_svg(
    path: &Path,
    table: &VillageTable,
    subset: &WorkingSubset,
    pois: &PoiTable,
    palette: &CommodityPalette,
) -> Result<MapRenderStats> {
    let mut writer = SvgWriter::new(path)?;

    if subset.is_empty() {
        writer.write_header(MAP_WIDTH, EMPTY_MAP_HEIGHT)?;
        writer.write_styles()?;
        writer.write_message(MAP_WIDTH, EMPTY_MAP_HEIGHT, "Select at least one district to display the map.")?;
        writer.write_footer()?;
        writer.flush()?;
        return Ok(MapRenderStats::default());
    }

    let bounds = subset_bounds(table, subset);
    let scale = (MAP_WIDTH - 2.0 * MAP_MARGIN) / bounds.width().max(1e-9);
    let height = bounds.height() * scale + 2.0 * MAP_MARGIN;

    // --- Map lon/lat -> SVG coords (preserve aspect, Y down) ---
    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = MAP_MARGIN + (coord.x - bounds.min().x) * scale;
        let y = MAP_MARGIN + (bounds.max().y - coord.y) * scale; // invert vertically
        (x, y)
    };

    writer.write_header(MAP_WIDTH, height)?;
    writer.write_styles()?;

    let colors = palette.fill_colors(table, subset)?;
    let mut stats = MapRenderStats::default();
    for (&idx, color) in subset.indices().iter().zip(colors.iter()) {
        let shape = &table.geoms()[idx];
        let title = table.attrs(idx).village.unwrap_or_default();
        writeln!(
            writer,
            r#"<path class="vlg" d="{}" fill="{}"><title>{}</title></path>"#,
            multipolygon_to_path(shape, &project),
            color,
            escape_text(&title),
        )?;
        stats.villages_drawn += 1;
    }

    // POI markers are never filtered by district; invalid coordinates are
    // skipped record by record, not fatal.
    for record in pois.records() {
        let Some((lat, lon)) = record.coords() else {
            stats.pois_skipped += 1;
            continue;
        };
        let (x, y) = project(&Coord { x: lon, y: lat });
        writeln!(
            writer,
            r#"<circle class="poi" cx="{x:.3}" cy="{y:.3}" r="{POI_RADIUS}"><title>{} ({})</title></circle>"#,
            escape_text(&record.name),
            escape_text(&record.category),
        )?;
        stats.pois_drawn += 1;
    }
    if stats.pois_skipped > 0 {
        warn!("skipped {} POI record(s) with non-numeric coordinates", stats.pois_skipped);
    }

    draw_legend(&mut writer, palette)?;

    writer.write_footer()?;
    writer.flush()?;

    Ok(stats)
}

/// Bounding box of the subset's geometries (the auto-fit viewport).
fn subset_bounds(table: &VillageTable, subset: &WorkingSubset) -> Rect<f64> {
    let mut min = Coord { x: f64::INFINITY, y: f64::INFINITY };
    let mut max = Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
    for &idx in subset.indices() {
        if let Some(rect) = table.geoms()[idx].bounding_rect() {
            min.x = min.x.min(rect.min().x);
            min.y = min.y.min(rect.min().y);
            max.x = max.x.max(rect.max().x);
            max.y = max.y.max(rect.max().y);
        }
    }
    Rect::new(min, max)
}

/// Commodity legend in the top-left corner: one swatch + label per entry.
fn draw_legend(writer: &mut SvgWriter, palette: &CommodityPalette) -> Result<()> {
    if palette.is_empty() {
        return Ok(());
    }

    let rows = palette.len() as f64;
    writeln!(
        writer,
        r##"<rect x="10" y="10" width="190" height="{:.0}" fill="#ffffff" fill-opacity="0.9" stroke="#6b7280"/>"##,
        24.0 + rows * 18.0,
    )?;
    writeln!(writer, r#"<text class="ttl" x="18" y="28">Dominant commodity</text>"#)?;
    for (i, (label, color)) in palette.legend().enumerate() {
        let y = 40.0 + i as f64 * 18.0;
        writeln!(writer, r#"<rect x="18" y="{:.0}" width="12" height="12" fill="{}"/>"#, y - 10.0, color)?;
        writeln!(writer, r#"<text class="lgd" x="36" y="{y:.0}">{}</text>"#, escape_text(label))?;
    }
    Ok(())
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }

    out
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection) -> String {
    let mut out = String::new();

    let mut coords = ring.coords_iter()
        .map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }

    out
}
