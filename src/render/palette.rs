use anyhow::{bail, Result};

// ColorBrewer-style sequential ramps, light to dark, 9 steps each.
const YLORRD: [&str; 9] = [
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c",
    "#fc4e2a", "#e31a1c", "#bd0026", "#800026",
];
const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6",
    "#4292c6", "#2171b5", "#08519c", "#08306b",
];
const GREENS: [&str; 9] = [
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476",
    "#41ab5d", "#238b45", "#006d2c", "#00441b",
];
const RDPU: [&str; 9] = [
    "#fff7f3", "#fde0dd", "#fcc5c0", "#fa9fb5", "#f768a1",
    "#dd3497", "#ae017e", "#7a0177", "#49006a",
];
const GREYS: [&str; 9] = [
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696",
    "#737373", "#525252", "#252525", "#000000",
];

/// Resolve a named palette to `n` fill colors, sampled evenly across the ramp.
pub(crate) fn palette_colors(name: &str, n: usize) -> Result<Vec<String>> {
    let ramp: &[&str; 9] = match name {
        "YlOrRd" => &YLORRD,
        "Blues" => &BLUES,
        "Greens" => &GREENS,
        "RdPu" => &RDPU,
        "Greys" => &GREYS,
        other => bail!("unknown palette {other:?} (expected YlOrRd, Blues, Greens, RdPu, or Greys)"),
    };

    if n == 0 {
        bail!("palette needs at least one bin");
    }
    let colors = if n == 1 {
        vec![ramp[4]]
    } else {
        // sample n evenly spaced stops; n > 9 repeats neighbors
        (0..n).map(|i| ramp[i * (ramp.len() - 1) / (n - 1)]).collect()
    };

    Ok(colors.into_iter().map(String::from).collect())
}
