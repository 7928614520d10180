use std::path::PathBuf;

/// Dashboard CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "komodash", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// One-shot render of the dashboard artifacts
    Render(RenderArgs),

    /// Interactive dashboard session on stdin
    Session(SessionArgs),
}

#[derive(clap::Args, Debug)]
pub struct DataArgs {
    /// Village polygon shapefile (.shp with DBF attribute records)
    #[arg(long, env = "KOMODASH_VILLAGES", value_hint = clap::ValueHint::FilePath)]
    pub villages: PathBuf,

    /// Point-of-interest table (CSV); omitting it just disables markers
    #[arg(long, env = "KOMODASH_POIS", value_hint = clap::ValueHint::FilePath)]
    pub pois: Option<PathBuf>,

    /// Artifact output directory
    #[arg(short, long, default_value = "out", value_hint = clap::ValueHint::DirPath)]
    pub out: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Districts to select, semicolon-separated (default: none selected)
    #[arg(short, long, value_delimiter = ';')]
    pub districts: Vec<String>,

    /// Village to click once the filter is applied
    #[arg(long)]
    pub click: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SessionArgs {
    #[command(flatten)]
    pub data: DataArgs,
}
