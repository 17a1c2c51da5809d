use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde_json::json;

use crate::common;
use crate::tract::TractLayer;

use super::{field_values, hover_labels, styled_fills, RenderConfig};

/// Render an interactive Leaflet choropleth to a self-contained HTML file.
///
/// The layer is embedded as a GeoJSON FeatureCollection with the computed
/// fill color, hover label, and raw value attached to each feature, so the
/// page needs no data files next to it (tiles come from OpenStreetMap).
pub fn render_html(layer: &TractLayer, config: &RenderConfig, path: &Path) -> Result<()> {
    // Leaflet draws in geographic lon/lat; projected layers would land in
    // the wrong hemisphere without warning.
    ensure!(
        layer.epsg() == 4326 || layer.epsg() == 4269,
        "interactive output needs geographic coordinates, layer is EPSG:{}",
        layer.epsg()
    );

    let (bins, colors, fills) = styled_fills(layer, config)?;
    let labels = hover_labels(layer, config)?;
    let values = field_values(layer, &config.fill_field)?;

    let properties = layer.geo_ids().iter().enumerate()
        .map(|(i, id)| json!({
            "geo_id": id.as_str(),
            "fill": fills[i],
            "label": labels[i],
            "value": values[i],
        }))
        .collect();
    let collection = common::feature_collection(layer.shapes(), properties);

    let legend: Vec<serde_json::Value> = bins.labels().iter().zip(colors.iter())
        .map(|(label, color)| json!({ "label": label, "color": color }))
        .collect();

    let html = TEMPLATE
        .replace("__TITLE__", &config.fill_field)
        .replace("__GEOJSON__", &embed_json(&collection)?)
        .replace("__LEGEND__", &embed_json(&json!(legend))?)
        .replace("__OVERLAYS__", &embed_json(&json!(config.layers))?)
        .replace("__NA_COLOR__", &config.na_color)
        .replace("__BORDER_COLOR__", &config.border_color)
        .replace("__BORDER_WIDTH__", &config.border_width.to_string())
        .replace("__FILL_OPACITY__", &config.fill_opacity.to_string());

    fs::write(path, html)
        .with_context(|| format!("[to_html] Failed to write {}", path.display()))?;

    Ok(())
}

/// Serialize a value for inlining in a <script> block. "</" would close the
/// script element mid-document, so it is split.
fn embed_json(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
    html, body, #map { height: 100%; margin: 0; }
    .legend { background: #ffffff; padding: 8px 10px; font: 12px sans-serif; line-height: 18px; }
    .legend i { width: 14px; height: 14px; float: left; margin-right: 6px; opacity: 0.85; }
</style>
</head>
<body>
<div id="map"></div>
<script>
var collection = __GEOJSON__;
var legendEntries = __LEGEND__;
var overlays = __OVERLAYS__;

var map = L.map('map');
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

var tracts = L.geoJSON(collection, {
    style: function (feature) {
        return {
            fillColor: feature.properties.fill,
            fillOpacity: __FILL_OPACITY__,
            color: '__BORDER_COLOR__',
            weight: __BORDER_WIDTH__
        };
    },
    onEachFeature: function (feature, layer) {
        var value = feature.properties.value;
        var text = feature.properties.label
            + (value === null ? ' (no data)' : ': ' + value);
        layer.bindTooltip(text);
    }
}).addTo(map);
map.fitBounds(tracts.getBounds());

var legend = L.control({ position: 'bottomright' });
legend.onAdd = function () {
    var div = L.DomUtil.create('div', 'legend');
    legendEntries.forEach(function (entry) {
        div.innerHTML += '<i style="background:' + entry.color + '"></i>' + entry.label + '<br/>';
    });
    div.innerHTML += '<i style="background:__NA_COLOR__"></i>no data<br/>';
    return div;
};
legend.addTo(map);

var toggles = {};
overlays.forEach(function (overlay) {
    var markers = overlay.points.map(function (pt) {
        return L.circleMarker([pt[1], pt[0]], {
            radius: overlay.radius,
            color: overlay.color,
            fillColor: overlay.color,
            fillOpacity: 0.8,
            weight: 1
        });
    });
    var group = L.layerGroup(markers).addTo(map);
    toggles[overlay.name] = group;
});
if (overlays.length > 0) {
    L.control.layers(null, toggles).addTo(map);
}
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_json_cannot_close_the_script_tag() {
        let value = json!({ "label": "</script><script>alert(1)" });
        let text = embed_json(&value).unwrap();
        assert!(!text.contains("</script>"));
    }
}
