mod document;
pub use document::{Document, DocumentRef};

use crate::attr::timestamp;
use crate::{Error, Geometry, ListValue, MappingValue, Result};

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value as Json;

/// Canonical in-memory form of an attribute value.
#[derive(Debug, Default, Clone)]
pub enum Value {
    /// Null, also what an unset attribute reads as
    #[default]
    Null,

    Bool(bool),

    I64(i64),

    F64(f64),

    String(String),

    /// A timezone-aware instant
    DateTime(DateTime<Utc>),

    /// An instant without a timezone, as supplied by a caller
    NaiveDateTime(NaiveDateTime),

    Geometry(Geometry),

    /// A plain mapping, e.g. a JSON object received from the service
    Record(IndexMap<String, Value>),

    /// A plain sequence, e.g. a JSON array received from the service
    Array(Vec<Value>),

    /// A typed nested record, shared by reference
    Mapping(MappingValue),

    /// A typed list, shared by reference
    List(ListValue),

    /// A referenced catalog object
    Document(DocumentRef),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts wire JSON into a value. Objects become [`Value::Record`] and
    /// arrays [`Value::Array`]; no attribute-specific coercion happens here.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(v) => Self::Bool(v),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Self::I64(v),
                None => Self::F64(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(v) => Self::String(v),
            Json::Array(items) => Self::Array(items.into_iter().map(Self::from_json).collect()),
            Json::Object(fields) => Self::Record(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Converts the value to wire JSON without any attribute-specific rules.
    ///
    /// Typed values (mappings, lists, documents) serialize through their own
    /// schema. NaN and the infinities have no JSON form and are rejected.
    pub fn to_json(&self) -> Result<Json> {
        Ok(match self {
            Self::Null => Json::Null,
            Self::Bool(v) => Json::Bool(*v),
            Self::I64(v) => Json::from(*v),
            Self::F64(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .ok_or_else(|| {
                    Error::attribute_validation(format!("{v} is not a valid JSON number"))
                })?,
            Self::String(v) => Json::String(v.clone()),
            Self::DateTime(v) => Json::String(timestamp::format(v)),
            Self::NaiveDateTime(v) => Json::String(timestamp::format_naive(v)),
            Self::Geometry(v) => v.to_json()?,
            Self::Record(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), value.to_json()?)))
                    .collect::<Result<_>>()?,
            ),
            Self::Array(items) => Json::Array(
                items
                    .iter()
                    .map(Self::to_json)
                    .collect::<Result<_>>()?,
            ),
            Self::Mapping(mapping) => mapping.to_json()?,
            Self::List(list) => list.to_json()?,
            Self::Document(document) => document.serialize(false, false)?,
        })
    }

    /// Truthiness: null, `false`, zero, and empty strings or collections are
    /// false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(v) => *v,
            Self::I64(v) => *v != 0,
            Self::F64(v) => *v != 0.0,
            Self::String(v) => !v.is_empty(),
            Self::Record(fields) => !fields.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::List(list) => !list.is_empty(),
            Self::DateTime(_)
            | Self::NaiveDateTime(_)
            | Self::Geometry(_)
            | Self::Mapping(_)
            | Self::Document(_) => true,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I64(_) => "integer",
            Self::F64(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::NaiveDateTime(_) => "naive datetime",
            Self::Geometry(_) => "geometry",
            Self::Record(_) => "dict",
            Self::Array(_) => "list",
            Self::Mapping(_) => "mapping",
            Self::List(_) => "list attribute",
            Self::Document(_) => "document",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::I64(v) => Some(*v as f64),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::I64(_) | Self::F64(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Geometry(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&MappingValue> {
        match self {
            Self::Mapping(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentRef> {
        match self {
            Self::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Registers `owner` with the shared value this holds, if any.
    pub(crate) fn add_owner(
        &self,
        id: crate::OwnerId,
        owner: std::rc::Weak<dyn crate::Owner>,
        attribute: Option<&str>,
    ) {
        match self {
            Self::Mapping(mapping) => mapping.add_owner(id, owner, attribute),
            Self::List(list) => list.add_owner(id, owner, attribute),
            _ => {}
        }
    }

    /// Deregisters `owner` from the shared value this holds, if any.
    pub(crate) fn remove_owner(&self, id: crate::OwnerId, attribute: Option<&str>) {
        match self {
            Self::Mapping(mapping) => mapping.remove_owner(id, attribute),
            Self::List(list) => list.remove_owner(id, attribute),
            _ => {}
        }
    }

    /// True when both values are the same shared instance.
    pub(crate) fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Mapping(a), Self::Mapping(b)) => a.ptr_eq(b),
            (Self::List(a), Self::List(b)) => a.ptr_eq(b),
            (Self::Document(a), Self::Document(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (I64(a), F64(b)) | (F64(b), I64(a)) => (*a as f64) == *b,
            (String(a), String(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (NaiveDateTime(a), NaiveDateTime(b)) => a == b,
            (Geometry(a), Geometry(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (List(a), List(b)) => a == b,
            (List(a), Array(b)) | (Array(b), List(a)) => a == b,
            (Mapping(a), Mapping(b)) => a == b,
            (Document(a), Document(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I64(src.into())
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<u32> for Value {
    fn from(src: u32) -> Self {
        Self::I64(src.into())
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_owned())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Self {
        Self::DateTime(src)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(src: NaiveDateTime) -> Self {
        Self::NaiveDateTime(src)
    }
}

impl From<Geometry> for Value {
    fn from(src: Geometry) -> Self {
        Self::Geometry(src)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(src: IndexMap<String, Value>) -> Self {
        Self::Record(src)
    }
}

impl From<Vec<Value>> for Value {
    fn from(src: Vec<Value>) -> Self {
        Self::Array(src)
    }
}

impl From<MappingValue> for Value {
    fn from(src: MappingValue) -> Self {
        Self::Mapping(src)
    }
}

impl From<&MappingValue> for Value {
    fn from(src: &MappingValue) -> Self {
        Self::Mapping(src.clone())
    }
}

impl From<ListValue> for Value {
    fn from(src: ListValue) -> Self {
        Self::List(src)
    }
}

impl From<&ListValue> for Value {
    fn from(src: &ListValue) -> Self {
        Self::List(src.clone())
    }
}

impl From<DocumentRef> for Value {
    fn from(src: DocumentRef) -> Self {
        Self::Document(src)
    }
}

impl From<Json> for Value {
    fn from(src: Json) -> Self {
        Self::from_json(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

/// Builds a [`Value::Record`] from `name => value` pairs.
#[macro_export]
macro_rules! record {
    () => {
        $crate::Value::Record($crate::indexmap::IndexMap::new())
    };
    ( $( $name:expr => $value:expr ),+ $(,)? ) => {{
        let mut fields = $crate::indexmap::IndexMap::new();
        $(
            fields.insert(::std::string::String::from($name), $crate::Value::from($value));
        )+
        $crate::Value::Record(fields)
    }};
}
