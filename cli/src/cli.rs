use std::path::PathBuf;

/// Tract analysis CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "tractmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Count point incidents per tract and write the table as CSV
    Count(CountArgs),

    /// Count point incidents per tract and render a choropleth
    Render(RenderArgs),
}

#[derive(clap::Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output CSV file ("-" for stdout), defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Attribute column to color tracts by, defaults to the count field
    #[arg(long)]
    pub fill_field: Option<String>,

    /// Number of class bins
    #[arg(long, default_value_t = 5)]
    pub bins: usize,

    /// Color ramp: YlOrRd, Blues, Greens, RdPu, Greys
    #[arg(long, default_value = "YlOrRd")]
    pub palette: String,

    /// Attribute column for hover labels, defaults to the tract id
    #[arg(long)]
    pub label_field: Option<String>,

    /// JSON style file (overrides the individual style flags)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub style: Option<PathBuf>,

    /// Draw the incident points above the choropleth
    #[arg(long)]
    pub show_points: bool,

    /// Output file (.svg or .html), defaults to "./choropleth.svg"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

/// Shared load / filter / join / merge arguments.
#[derive(clap::Args, Debug)]
pub struct PipelineArgs {
    /// Tract polygons (.shp, .zip, or .geojson)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub tracts: PathBuf,

    /// Incident CSV with one point per row
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub incidents: PathBuf,

    /// Tract identifier field in the polygon attributes
    #[arg(long, default_value = "GEOID")]
    pub id_field: String,

    /// X coordinate column in the incident CSV
    #[arg(long, default_value = "longitude")]
    pub x_field: String,

    /// Y coordinate column in the incident CSV
    #[arg(long, default_value = "latitude")]
    pub y_field: String,

    /// EPSG code of the incident coordinates
    #[arg(long, default_value_t = 4326)]
    pub epsg: u32,

    /// Keep only rows where FIELD equals VALUE (repeatable)
    #[arg(long, value_name = "FIELD=VALUE")]
    pub filter: Vec<String>,

    /// Name for the per-tract count column
    #[arg(long, default_value = "n_incidents")]
    pub count_field: String,
}
