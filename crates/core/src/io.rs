//! GeoJSON ingestion
//!
//! Reads a GeoJSON FeatureCollection into a [`RegionTable`]. Only Polygon
//! and MultiPolygon geometries are accepted; the analysis operates on
//! areal units. Attribute retrieval, pagination and retries against remote
//! services are a collaborator's job; this module only materializes a table
//! that is already complete on disk.

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use std::path::Path;

use crate::{AttributeValue, Error, Region, RegionTable, Result};

/// Read a GeoJSON FeatureCollection file into a region table.
///
/// Region ids come from `id_field` (a property name) when given, otherwise
/// from the feature-level `id` member.
pub fn read_geojson<P: AsRef<Path>>(path: P, id_field: Option<&str>) -> Result<RegionTable> {
    let text = std::fs::read_to_string(path)?;
    parse_geojson(&text, id_field)
}

/// Parse GeoJSON FeatureCollection text into a region table.
pub fn parse_geojson(text: &str, id_field: Option<&str>) -> Result<RegionTable> {
    let root: Value =
        serde_json::from_str(text).map_err(|e| Error::Geojson(e.to_string()))?;

    if root["type"] != "FeatureCollection" {
        return Err(Error::Geojson(
            "expected a FeatureCollection root object".to_string(),
        ));
    }

    let features = root["features"]
        .as_array()
        .ok_or_else(|| Error::Geojson("missing 'features' array".to_string()))?;

    let mut table = RegionTable::new();
    for (index, feature) in features.iter().enumerate() {
        let geometry = parse_geometry(&feature["geometry"], index)?;
        let properties = feature["properties"].as_object();

        let id = region_id(feature, properties, id_field, index)?;
        let mut region = Region::new(id, geometry);

        if let Some(props) = properties {
            for (key, value) in props {
                region.set_attribute(key.clone(), attribute_value(value));
            }
        }
        table.push(region)?;
    }
    Ok(table)
}

fn region_id(
    feature: &Value,
    properties: Option<&serde_json::Map<String, Value>>,
    id_field: Option<&str>,
    index: usize,
) -> Result<String> {
    let raw = match id_field {
        Some(field) => properties.and_then(|p| p.get(field)).ok_or_else(|| {
            Error::Geojson(format!("feature {index}: no property '{field}' to use as id"))
        })?,
        None => &feature["id"],
    };

    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::Geojson(format!(
            "feature {index}: id must be a string or number"
        ))),
    }
}

fn parse_geometry(geometry: &Value, index: usize) -> Result<MultiPolygon<f64>> {
    let kind = geometry["type"].as_str().ok_or_else(|| {
        Error::Geojson(format!("feature {index}: missing geometry type"))
    })?;
    let coordinates = &geometry["coordinates"];

    match kind {
        "Polygon" => Ok(MultiPolygon(vec![parse_polygon(coordinates, index)?])),
        "MultiPolygon" => {
            let parts = coordinates.as_array().ok_or_else(|| {
                Error::Geojson(format!("feature {index}: MultiPolygon coordinates"))
            })?;
            let polygons = parts
                .iter()
                .map(|part| parse_polygon(part, index))
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => Err(Error::Geojson(format!(
            "feature {index}: unsupported geometry type '{other}' (areal data requires Polygon or MultiPolygon)"
        ))),
    }
}

fn parse_polygon(coordinates: &Value, index: usize) -> Result<Polygon<f64>> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| Error::Geojson(format!("feature {index}: Polygon coordinates")))?;
    if rings.is_empty() {
        return Err(Error::Geojson(format!(
            "feature {index}: polygon has no rings"
        )));
    }

    let mut parsed = rings
        .iter()
        .map(|ring| parse_ring(ring, index))
        .collect::<Result<Vec<_>>>()?;
    let exterior = parsed.remove(0);
    Ok(Polygon::new(exterior, parsed))
}

fn parse_ring(ring: &Value, index: usize) -> Result<LineString<f64>> {
    let positions = ring
        .as_array()
        .ok_or_else(|| Error::Geojson(format!("feature {index}: ring coordinates")))?;

    let coords = positions
        .iter()
        .map(|position| {
            let pair = position.as_array().filter(|p| p.len() >= 2);
            match pair {
                Some(p) => match (p[0].as_f64(), p[1].as_f64()) {
                    (Some(x), Some(y)) => Ok(Coord { x, y }),
                    _ => Err(Error::Geojson(format!(
                        "feature {index}: non-numeric coordinate"
                    ))),
                },
                None => Err(Error::Geojson(format!(
                    "feature {index}: coordinate must be a [x, y] pair"
                ))),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::from(coords))
}

fn attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Int(i)
            } else {
                AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => AttributeValue::String(s.clone()),
        // Nested arrays/objects have no tabular meaning here.
        other => AttributeValue::String(other.to_string()),
    }
}
