//! GeoJSON geometries.

use crate::{Error, Result, Value};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A position: longitude, latitude and an optional elevation.
pub type Position = Vec<f64>;

/// A GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// Parses a GeoJSON geometry, or the geometry of a GeoJSON `Feature`.
    pub fn from_json(json: Json) -> Result<Geometry> {
        let json = match json {
            Json::Object(mut object)
                if object.get("type").and_then(Json::as_str) == Some("Feature") =>
            {
                object
                    .remove("geometry")
                    .ok_or_else(|| Error::attribute_validation("Feature has no geometry"))?
            }
            json => json,
        };

        let geometry: Geometry = serde_json::from_value(json)
            .map_err(|err| Error::attribute_validation(format!("Invalid geometry: {err}")))?;
        geometry.verify()?;
        Ok(geometry)
    }

    /// Coerces a value into a geometry.
    ///
    /// Accepts a geometry, a GeoJSON mapping (geometry or feature) or a
    /// string containing GeoJSON.
    pub fn from_value(value: &Value) -> Result<Geometry> {
        match value {
            Value::Geometry(geometry) => Ok(geometry.clone()),
            Value::Record(_) => Geometry::from_json(value.to_json()?),
            Value::String(text) => {
                let json = serde_json::from_str(text).map_err(|err| {
                    Error::attribute_validation(format!("Invalid geometry: {err}"))
                })?;
                Geometry::from_json(json)
            }
            other => Err(Error::attribute_validation(format!(
                "Invalid geometry: expected a GeoJSON mapping, got {}",
                other.kind_name()
            ))),
        }
    }

    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "Point",
            Self::MultiPoint { .. } => "MultiPoint",
            Self::LineString { .. } => "LineString",
            Self::MultiLineString { .. } => "MultiLineString",
            Self::Polygon { .. } => "Polygon",
            Self::MultiPolygon { .. } => "MultiPolygon",
            Self::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    fn verify(&self) -> Result<()> {
        match self {
            Self::Point { coordinates } => verify_position(coordinates),
            Self::MultiPoint { coordinates } => coordinates.iter().try_for_each(verify_position),
            Self::LineString { coordinates } => verify_line(coordinates),
            Self::MultiLineString { coordinates } => coordinates.iter().try_for_each(|l| verify_line(l)),
            Self::Polygon { coordinates } => verify_polygon(coordinates),
            Self::MultiPolygon { coordinates } => coordinates.iter().try_for_each(|p| verify_polygon(p)),
            Self::GeometryCollection { geometries } => geometries.iter().try_for_each(Geometry::verify),
        }
    }
}

fn verify_position(position: &Position) -> Result<()> {
    if !(2..=3).contains(&position.len()) {
        return Err(Error::attribute_validation(format!(
            "Invalid geometry: a position needs 2 or 3 coordinates, got {}",
            position.len()
        )));
    }
    if position.iter().any(|c| !c.is_finite()) {
        return Err(Error::attribute_validation(
            "Invalid geometry: coordinates must be finite",
        ));
    }
    Ok(())
}

fn verify_line(line: &[Position]) -> Result<()> {
    if line.len() < 2 {
        return Err(Error::attribute_validation(
            "Invalid geometry: a line string needs at least 2 positions",
        ));
    }
    line.iter().try_for_each(verify_position)
}

fn verify_polygon(rings: &[Vec<Position>]) -> Result<()> {
    for ring in rings {
        if ring.len() < 4 {
            return Err(Error::attribute_validation(
                "Invalid geometry: a linear ring needs at least 4 positions",
            ));
        }
        ring.iter().try_for_each(verify_position)?;
        if ring.first() != ring.last() {
            return Err(Error::attribute_validation(
                "Invalid geometry: a linear ring must be closed",
            ));
        }
    }
    Ok(())
}
