#![doc = "Komodash public API"]
mod app;
mod common;
mod data;
mod filter;
mod render;
mod selection;
mod views;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use app::{Dashboard, PassOutput};

#[doc(inline)]
pub use data::{Loader, PoiRecord, PoiTable, VillageAttrs, VillageTable, UNKNOWN_VILLAGE};

#[doc(inline)]
pub use filter::{district_names, filter_by_district, WorkingSubset};

#[doc(inline)]
pub use selection::{Selection, SelectionStore, Transition};

#[doc(inline)]
pub use render::{CommodityPalette, MapSurface};

#[doc(inline)]
pub use views::{commodity_counts, detail_rows, poi_per_district, DetailRow, Kpis};
