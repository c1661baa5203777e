//! Spatial pixel resolution: a value with a unit.

use geocat_core::{
    record, Attribute, AttributeEnum, Error, MappingHooks, MappingType, MappingValue, Result,
    Schema, Value,
};

use regex::Regex;
use serde_json::Value as Json;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Unit a [`Resolution`] is measured in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionUnit {
    Meters,
    Degrees,
}

impl ResolutionUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionUnit::Meters => "meters",
            ResolutionUnit::Degrees => "degrees",
        }
    }

    /// Recognizes the unit designations accepted in resolution strings.
    fn from_designation(designation: &str) -> Option<ResolutionUnit> {
        match designation {
            "m" | "meter" | "meters" | "metre" | "metres" => Some(ResolutionUnit::Meters),
            "°" | "deg" | "degree" | "degrees" => Some(ResolutionUnit::Degrees),
            _ => None,
        }
    }
}

impl AttributeEnum for ResolutionUnit {
    const NAME: &'static str = "ResolutionUnit";
    const VALUES: &'static [&'static str] = &["meters", "degrees"];
}

impl FromStr for ResolutionUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<ResolutionUnit> {
        match s {
            "meters" => Ok(ResolutionUnit::Meters),
            "degrees" => Ok(ResolutionUnit::Degrees),
            _ => Err(Error::attribute_validation(format!(
                "'{s}' is not a valid {}",
                Self::NAME
            ))),
        }
    }
}

impl fmt::Display for ResolutionUnit {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// The mapping type behind [`Resolution`], with fields `value` and `unit`.
///
/// Besides a mapping, an attribute of this type accepts strings such as
/// `"60m"` or `"1.2 deg."`. A bare number serializes unchanged, which is how
/// resolutions are compared against a value in meters.
pub fn resolution_type() -> Arc<MappingType> {
    static TYPE: OnceLock<Arc<MappingType>> = OnceLock::new();

    TYPE.get_or_init(|| {
        MappingType::with_hooks(
            Schema::builder("Resolution")
                .attribute("value", Attribute::new().doc("The value of the resolution"))
                .attribute(
                    "unit",
                    Attribute::enumeration::<ResolutionUnit>()
                        .doc("The unit the resolution is measured in"),
                )
                .build(),
            ResolutionHooks,
        )
    })
    .clone()
}

struct ResolutionHooks;

impl MappingHooks for ResolutionHooks {
    fn coerce(&self, value: Value) -> Result<Value> {
        match value {
            Value::String(text) => {
                let (value, unit) = parse(&text)?;
                Ok(record! { "value" => value, "unit" => unit.as_str() })
            }
            value => Ok(value),
        }
    }

    fn serialize_scalar(&self, value: &Value) -> Option<Json> {
        match value {
            Value::I64(_) | Value::F64(_) => value.to_json().ok(),
            _ => None,
        }
    }
}

/// Splits `"<number><ws>?<unit>"` into its value and unit.
fn parse(text: &str) -> Result<(f64, ResolutionUnit)> {
    let unparseable =
        || Error::attribute_validation(format!("The given resolution string cannot be parsed: {text}"));

    let captures = pattern()?.captures(text).ok_or_else(unparseable)?;

    let designation = captures[2].to_lowercase();
    let unit = ResolutionUnit::from_designation(designation.trim_end_matches('.'))
        .ok_or_else(unparseable)?;
    let value = captures[1].parse::<f64>().map_err(|_| unparseable())?;

    Ok((value, unit))
}

fn pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    if let Some(pattern) = PATTERN.get() {
        return Ok(pattern);
    }

    let pattern = Regex::new(r"^([-0-9.]+)\s*([a-zA-Z.°]+)").map_err(anyhow::Error::from)?;
    Ok(PATTERN.get_or_init(|| pattern))
}

/// A typed handle to a resolution mapping value.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution(MappingValue);

impl Resolution {
    pub fn new(value: f64, unit: ResolutionUnit) -> Result<Resolution> {
        resolution_type()
            .instantiate([("value", Value::from(value)), ("unit", Value::from(unit.as_str()))], true)
            .map(Resolution)
    }

    /// Parses a resolution string such as `"60m"` or `"1.2 deg."`.
    pub fn parse(text: &str) -> Result<Resolution> {
        let (value, unit) = parse(text)?;
        Resolution::new(value, unit)
    }

    /// Wraps an existing mapping value of the resolution type.
    pub fn from_mapping(mapping: MappingValue) -> Result<Resolution> {
        if !Arc::ptr_eq(mapping.ty(), &resolution_type()) {
            return Err(Error::attribute_validation(format!(
                "Expected a Resolution, got {}",
                mapping.ty().name()
            )));
        }
        Ok(Resolution(mapping))
    }

    pub fn value(&self) -> Option<f64> {
        self.0.get("value").ok()?.as_f64()
    }

    pub fn unit(&self) -> Option<ResolutionUnit> {
        self.0.get("unit").ok()?.as_str()?.parse().ok()
    }

    pub fn set_value(&self, value: f64) -> Result<()> {
        self.0.set("value", value)
    }

    pub fn set_unit(&self, unit: ResolutionUnit) -> Result<()> {
        self.0.set("unit", unit.as_str())
    }

    pub fn as_mapping(&self) -> &MappingValue {
        &self.0
    }
}

impl From<Resolution> for Value {
    fn from(src: Resolution) -> Value {
        Value::Mapping(src.0)
    }
}
