use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use tractmap::{render_html, render_svg, OverlayLayer, RenderConfig};

use crate::cli::{Cli, RenderArgs};

pub fn run(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let (merged, points) = super::run_pipeline(cli, &args.pipeline)?;

    let mut config = match &args.style {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read style file {}", path.display()))?;
            serde_json::from_str::<RenderConfig>(&text)
                .with_context(|| format!("bad style file {}", path.display()))?
        }
        None => {
            let fill = args.fill_field.clone()
                .unwrap_or_else(|| args.pipeline.count_field.clone());
            let mut config = RenderConfig::new(fill);
            config.bins = args.bins;
            config.palette = args.palette.clone();
            config.label_field = args.label_field.clone();
            config
        }
    };

    if args.show_points {
        let coords = points.points().iter().map(|p| (p.x(), p.y())).collect();
        config.layers.push(OverlayLayer::new("incidents", coords));
    }

    let output = args.output.clone().unwrap_or(PathBuf::from("./choropleth.svg"));
    match output.extension().and_then(|e| e.to_str()) {
        Some("svg") => render_svg(&merged, &config, &output)?,
        Some("html") => render_html(&merged, &config, &output)?,
        other => bail!("unsupported output format {other:?} (expected .svg or .html)"),
    }

    if cli.verbose > 0 {
        eprintln!("[render] wrote {}", output.display());
    }

    Ok(())
}
