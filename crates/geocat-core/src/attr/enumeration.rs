use crate::{Error, Result, Value};

/// A closed set of string constants usable as an enum attribute.
pub trait AttributeEnum {
    /// Name of the enum, used in error messages.
    const NAME: &'static str;

    /// Every member's string value.
    const VALUES: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumAttr {
    name: String,
    values: Vec<String>,
}

impl EnumAttr {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> EnumAttr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumAttr {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn of<E: AttributeEnum>() -> EnumAttr {
        EnumAttr::new(E::NAME, E::VALUES.iter().copied())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|member| member == value)
    }

    /// Values outside the set are rejected only when validating, so members
    /// the service adds later still load.
    pub(crate) fn deserialize(&self, value: Value, validate: bool) -> Result<Value> {
        if !validate || value.is_null() {
            return Ok(value);
        }

        match &value {
            Value::String(member) if self.contains(member) => Ok(value),
            Value::String(other) => Err(Error::attribute_validation(format!(
                "'{other}' is not a valid {}",
                self.name
            ))),
            other => Err(Error::attribute_validation(format!(
                "{} is not a valid {}",
                other.kind_name(),
                self.name
            ))),
        }
    }
}
