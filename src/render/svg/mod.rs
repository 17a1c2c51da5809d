mod writer;

use std::{io::Write, path::Path};

use anyhow::{anyhow, Ok, Result};
use geo::{Coord, CoordsIter, LineString, MultiPolygon};

use crate::tract::TractLayer;

use super::{hover_labels, styled_fills, RenderConfig};
use writer::SvgWriter;

/// Projection function: lon/lat -> SVG coords (x,y)
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

const WIDTH: f64 = 1000.0;
const MARGIN: f64 = 20.0;

/// Render a static choropleth of the layer to an SVG file.
///
/// Fill colors come from binning `config.fill_field`; rows with a null fill
/// value get `config.na_color`. A legend and any configured point overlays
/// are drawn above the polygons.
pub fn render_svg(layer: &TractLayer, config: &RenderConfig, path: &Path) -> Result<()> {
    let bounds = layer.bounds()
        .ok_or_else(|| anyhow!("[to_svg] Could not determine bounds; nothing to draw."))?;

    let (bins, colors, fills) = styled_fills(layer, config)?;
    let labels = hover_labels(layer, config)?;

    let scale = (WIDTH - 2.0 * MARGIN) / bounds.width();
    let height = bounds.height() * scale + 2.0 * MARGIN;

    // --- Map lon/lat -> SVG coords (preserve aspect, Y down) ---
    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = MARGIN + (coord.x - bounds.min().x) * scale;
        let y = MARGIN + (bounds.max().y - coord.y) * scale; // invert vertically
        (x, y)
    };

    let mut writer = SvgWriter::new(path)?;
    writer.write_header(WIDTH, height, MARGIN, scale, &bounds)?;

    draw_polygons(&mut writer, layer.shapes(), &fills, &labels, config, &project)?;

    for overlay in &config.layers {
        draw_overlay(&mut writer, overlay, &project)?;
    }

    draw_legend(&mut writer, &bins.labels(), &colors, config)?;

    writer.write_footer()?;
    writer.flush()?;

    Ok(())
}

/// Draw every tract polygon with its computed fill and a hover `<title>`.
fn draw_polygons(
    writer: &mut impl Write,
    polygons: &[MultiPolygon<f64>],
    fills: &[String],
    labels: &[String],
    config: &RenderConfig,
    project: &Projection,
) -> Result<()> {
    assert_eq!(fills.len(), polygons.len(),
        "[to_svg] length mismatch: {} fills for {} geometries",
        fills.len(),
        polygons.len(),
    );

    for ((polygon, fill), label) in polygons.iter().zip(fills.iter()).zip(labels.iter()) {
        writeln!(
            writer,
            r##"<path d="{path}" fill="{fill}" fill-opacity="{opacity}" fill-rule="evenodd" stroke="{stroke}" stroke-width="{stroke_width}"><title>{title}</title></path>"##,
            path = multipolygon_to_path(polygon, project),
            opacity = config.fill_opacity,
            stroke = config.border_color,
            stroke_width = config.border_width,
            title = xml_escape(label),
        )?;
    }

    Ok(())
}

/// Draw one overlay point group as circles, tagged with the group name.
fn draw_overlay(
    writer: &mut impl Write,
    overlay: &crate::render::OverlayLayer,
    project: &Projection,
) -> Result<()> {
    writeln!(writer, r##"<g data-layer="{}">"##, xml_escape(&overlay.name))?;
    for &(x, y) in &overlay.points {
        let (cx, cy) = project(&Coord { x, y });
        writeln!(
            writer,
            r##"<circle cx="{cx:.3}" cy="{cy:.3}" r="{r}" fill="{color}" fill-opacity="0.8"/>"##,
            r = overlay.radius,
            color = overlay.color,
        )?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

/// Draw a legend: one swatch per bin, plus a distinct "no data" entry.
fn draw_legend(
    writer: &mut impl Write,
    labels: &[String],
    colors: &[String],
    config: &RenderConfig,
) -> Result<()> {
    const SWATCH: f64 = 14.0;
    const LINE: f64 = 20.0;

    writeln!(writer, r##"<g data-layer="legend" font-family="sans-serif" font-size="12">"##)?;
    for (i, (label, color)) in labels.iter().zip(colors.iter()).enumerate() {
        let y = MARGIN + i as f64 * LINE;
        writeln!(
            writer,
            r##"<rect x="{x}" y="{y}" width="{s}" height="{s}" fill="{color}" stroke="#444444" stroke-width="0.5"/>"##,
            x = MARGIN, s = SWATCH,
        )?;
        writeln!(
            writer,
            r##"<text x="{x}" y="{ty}">{text}</text>"##,
            x = MARGIN + SWATCH + 6.0,
            ty = y + SWATCH - 3.0,
            text = xml_escape(label),
        )?;
    }

    let y = MARGIN + labels.len() as f64 * LINE;
    writeln!(
        writer,
        r##"<rect x="{x}" y="{y}" width="{s}" height="{s}" fill="{color}" stroke="#444444" stroke-width="0.5"/>"##,
        x = MARGIN, s = SWATCH, color = config.na_color,
    )?;
    writeln!(
        writer,
        r##"<text x="{x}" y="{ty}">no data</text>"##,
        x = MARGIN + SWATCH + 6.0,
        ty = y + SWATCH - 3.0,
    )?;
    writeln!(writer, "</g>")?;

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

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_string_closes_every_ring() {
        let ring = LineString(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let shape = MultiPolygon(vec![geo::Polygon::new(ring, vec![])]);
        let identity = |coord: &Coord<f64>| (coord.x, coord.y);

        let path = multipolygon_to_path(&shape, &identity);
        assert!(path.starts_with(" M0.000,0.000"));
        assert!(path.ends_with('Z'));
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(xml_escape("Tract <1> & \"2\""), "Tract &lt;1&gt; &amp; &quot;2&quot;");
    }
}
