use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

/// Read a GeoJSON FeatureCollection: geometries (file order), one property
/// map per feature, and the EPSG code if a legacy `crs` member names one.
pub(crate) fn read_feature_collection(
    bytes: &[u8],
) -> Result<(Vec<MultiPolygon<f64>>, Vec<Map<String, Value>>, Option<u32>)> {
    let value: Value = serde_json::from_slice(bytes).context("failed to parse GeoJSON bytes")?;
    let features = value["features"]
        .as_array()
        .context("GeoJSON document has no features array")?;

    let epsg = crs_epsg(&value);
    let mut geoms = Vec::with_capacity(features.len());
    let mut properties = Vec::with_capacity(features.len());

    for (i, feature) in features.iter().enumerate() {
        let geometry = &feature["geometry"];
        let coords = geometry["coordinates"]
            .as_array()
            .with_context(|| format!("feature {i}: geometry has no coordinates"))?;

        let mp = match geometry["type"].as_str() {
            Some("Polygon") => MultiPolygon(vec![parse_polygon(coords)?]),
            Some("MultiPolygon") => parse_multipolygon(coords)?,
            other => bail!("feature {i}: unsupported geometry type {other:?}"),
        };

        geoms.push(mp);
        properties.push(feature["properties"].as_object().cloned().unwrap_or_default());
    }

    Ok((geoms, properties, epsg))
}

/// Build a GeoJSON FeatureCollection value from geometries and per-feature
/// property objects (used to embed enriched layers in interactive output).
pub(crate) fn feature_collection(geoms: &[MultiPolygon<f64>], properties: Vec<Value>) -> Value {
    let features: Vec<Value> = geoms.iter().zip(properties).map(|(mp, props)| {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": multipolygon_coords(mp),
            },
            "properties": props,
        })
    }).collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Standard MultiPolygon coordinate nesting: polygons -> rings -> positions.
fn multipolygon_coords(mp: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = mp.0.iter().map(|polygon| {
        let mut rings = vec![ring_coords(polygon.exterior())];
        rings.extend(polygon.interiors().iter().map(ring_coords));
        json!(rings)
    }).collect();
    json!(polygons)
}

fn ring_coords(ring: &LineString<f64>) -> Value {
    let positions: Vec<Vec<f64>> = ring.coords().map(|c| vec![c.x, c.y]).collect();
    json!(positions)
}

/// Parse GeoJSON Polygon coordinates: first ring exterior, rest holes.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let exterior = rings.first()
        .and_then(|v| v.as_array())
        .context("polygon has no exterior ring")?;

    let mut interiors = Vec::new();
    for ring in &rings[1..] {
        let ring = ring.as_array().context("interior ring is not an array")?;
        interiors.push(parse_ring(ring)?);
    }

    Ok(Polygon::new(parse_ring(exterior)?, interiors))
}

fn parse_multipolygon(coords: &[Value]) -> Result<MultiPolygon<f64>> {
    let mut polygons = Vec::with_capacity(coords.len());
    for polygon_coords in coords {
        let rings = polygon_coords.as_array().context("polygon coordinates are not an array")?;
        polygons.push(parse_polygon(rings)?);
    }
    Ok(MultiPolygon(polygons))
}

/// Parse a ring (exterior or interior) and ensure it is closed.
fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());

    for pair in coords {
        let pair = pair.as_array().context("coordinate is not an array")?;
        if pair.len() < 2 {
            bail!("coordinate has fewer than two components");
        }
        let x = pair[0].as_f64().context("coordinate x must be a number")?;
        let y = pair[1].as_f64().context("coordinate y must be a number")?;
        points.push(Coord { x, y });
    }

    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}

/// Legacy `crs` member, e.g. "urn:ogc:def:crs:EPSG::4269" or "EPSG:4326".
fn crs_epsg(value: &Value) -> Option<u32> {
    let name = value["crs"]["properties"]["name"].as_str()?;
    name.rsplit(':').next()?.parse().ok()
}
