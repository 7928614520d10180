use anyhow::Result;
use log::info;

use crate::cli::{Cli, RenderArgs};
use super::{build_dashboard, print_output};

/// One-shot render: apply the district filter (and optionally a click),
/// write the artifacts, and print the resulting pass.
pub fn run(_cli: &Cli, args: &RenderArgs) -> Result<()> {
    let mut dashboard = build_dashboard(&args.data)?;

    info!("districts available: {}", dashboard.district_choices()?.join(", "));

    let mut output = dashboard.on_filter_change(args.districts.iter().cloned().collect())?;
    if let Some(village) = &args.click {
        output = dashboard.on_map_click(village)?;
    }

    print_output(&output);
    println!("Artifacts written to {}", args.data.out.display());
    Ok(())
}
