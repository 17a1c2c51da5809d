use serde::{Deserialize, Serialize};

use super::BinStrategy;

/// Styling for one render call.
///
/// An explicit, serializable struct instead of a loose keyword-argument bag:
/// every recognized option is a named field, and unrecognized JSON keys fail
/// deserialization instead of being silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Numeric attribute column driving the fill color.
    pub fill_field: String,

    /// Number of class bins.
    #[serde(default = "default_bins")]
    pub bins: usize,

    #[serde(default)]
    pub strategy: BinStrategy,

    /// Named color ramp (YlOrRd, Blues, Greens, RdPu, Greys).
    #[serde(default = "default_palette")]
    pub palette: String,

    /// Fill for tracts whose fill field is null. Kept visually distinct from
    /// the bin ramp: no data is not the same as zero.
    #[serde(default = "default_na_color")]
    pub na_color: String,

    #[serde(default = "default_border_color")]
    pub border_color: String,

    #[serde(default = "default_border_width")]
    pub border_width: f64,

    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,

    /// Attribute column used for hover text; tract id when absent.
    #[serde(default)]
    pub label_field: Option<String>,

    /// Ordered point overlays drawn above the polygons.
    #[serde(default)]
    pub layers: Vec<OverlayLayer>,
}

impl RenderConfig {
    /// Config with defaults for everything but the fill field.
    pub fn new(fill_field: impl Into<String>) -> Self {
        Self {
            fill_field: fill_field.into(),
            bins: default_bins(),
            strategy: BinStrategy::default(),
            palette: default_palette(),
            na_color: default_na_color(),
            border_color: default_border_color(),
            border_width: default_border_width(),
            fill_opacity: default_fill_opacity(),
            label_field: None,
            layers: Vec::new(),
        }
    }
}

/// A named overlay group of points (e.g. incident locations), drawn above
/// the choropleth in the same CRS as the layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayLayer {
    pub name: String,

    #[serde(default = "default_overlay_color")]
    pub color: String,

    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Point coordinates (x, y).
    pub points: Vec<(f64, f64)>,
}

impl OverlayLayer {
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            color: default_overlay_color(),
            radius: default_radius(),
            points,
        }
    }
}

fn default_bins() -> usize { 5 }
fn default_palette() -> String { "YlOrRd".to_string() }
fn default_na_color() -> String { "#d9d9d9".to_string() }
fn default_border_color() -> String { "#444444".to_string() }
fn default_border_width() -> f64 { 0.5 }
fn default_fill_opacity() -> f64 { 0.85 }
fn default_overlay_color() -> String { "#1d4ed8".to_string() }
fn default_radius() -> f64 { 2.5 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_in_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "fill_field": "num_homicides" }"#).unwrap();

        assert_eq!(config.fill_field, "num_homicides");
        assert_eq!(config.bins, 5);
        assert_eq!(config.strategy, BinStrategy::EqualWidth);
        assert_eq!(config.palette, "YlOrRd");
        assert!(config.layers.is_empty());
    }

    #[test]
    fn unrecognized_options_are_rejected() {
        let result = serde_json::from_str::<RenderConfig>(
            r#"{ "fill_field": "n", "opacity": 0.4 }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn quantile_strategy_round_trips() {
        let config: RenderConfig = serde_json::from_str(
            r#"{ "fill_field": "n", "strategy": "quantile", "bins": 7 }"#,
        ).unwrap();
        assert_eq!(config.strategy, BinStrategy::Quantile);

        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains("\"quantile\""));
    }
}
