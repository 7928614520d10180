pub mod render;
pub mod session;

use anyhow::Result;

use crate::app::{Dashboard, PassOutput};
use crate::cli::DataArgs;
use crate::data::{Loader, PoiTable};
use crate::views::DETAIL_PROMPT;

/// Load both datasets and build the controller. A broken POI file degrades
/// to an empty table with a standing notice; a broken village shapefile is
/// fatal and aborts before anything renders.
pub(crate) fn build_dashboard(data: &DataArgs) -> Result<Dashboard> {
    let mut loader = Loader::new();
    let table = loader.load_villages(&data.villages)?;
    let (pois, poi_notice) = PoiTable::load_or_empty(data.pois.as_deref());

    let mut dashboard = Dashboard::new(table, pois, Some(data.out.clone()));
    if let Some(notice) = poi_notice {
        dashboard.add_standing_notice(notice);
    }
    Ok(dashboard)
}

/// Print one pass the way the page lays it out: notices, KPIs, charts data,
/// then the detail table (or its prompt).
pub(crate) fn print_output(output: &PassOutput) {
    for notice in &output.notices {
        println!("! {notice}");
    }

    println!(
        "Villages in view: {}  |  Districts selected: {}  |  POI total: {}",
        output.kpis.villages_in_view,
        output.kpis.districts_selected,
        output.kpis.poi_total,
    );

    if !output.commodity_counts.is_empty() {
        println!("Villages per dominant commodity:");
        for (label, count) in &output.commodity_counts {
            println!("  {label:<20} {count}");
        }
    }
    if !output.poi_totals.is_empty() {
        println!("Total POI per district:");
        for (district, sum) in &output.poi_totals {
            println!("  {district:<20} {sum}");
        }
    }

    if output.detail.is_empty() {
        println!("{DETAIL_PROMPT}");
    } else {
        println!("Selected village detail:");
        for row in &output.detail {
            println!("  {:<20} {}", row.label, row.value);
        }
    }
}
