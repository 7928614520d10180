mod charts;
mod detail;

pub use charts::{commodity_counts, kpis, poi_per_district, render_hbar_svg, render_vbar_svg, Kpis};
pub use detail::{detail_rows, DetailRow, DETAIL_PROMPT};
