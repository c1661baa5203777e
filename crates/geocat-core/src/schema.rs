mod builder;
pub use builder::Builder;

mod verify;

use crate::{Attribute, Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// The attributes of one type, merged from its own declarations and those of
/// every type it inherits from.
///
/// A schema is built once with [`Schema::builder`] and shared, immutable, by
/// every object of the type.
#[derive(Debug)]
pub struct Schema {
    /// Type name
    name: String,

    /// Every attribute, own declarations first
    attributes: IndexMap<String, Attribute>,

    /// The subset of `attributes` that reference other catalog objects
    references: IndexMap<String, Attribute>,

    /// Attribute names exposed for documentation and inspection
    documented: Vec<String>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute names, in declaration order.
    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.attributes.keys().map(String::as_str)
    }

    pub fn attribute_types(&self) -> &IndexMap<String, Attribute> {
        &self.attributes
    }

    pub fn reference_attribute_types(&self) -> &IndexMap<String, Attribute> {
        &self.references
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Like [`attribute`](Self::attribute), but an unknown name is an error.
    pub fn attribute_type(&self, name: &str) -> Result<&Attribute> {
        self.attributes.get(name).ok_or_else(|| {
            Error::attribute_access(format!("{} has no attribute {}", self.name, name))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes exposed to documentation. A type built with
    /// [`Builder::no_inherit`] lists only its own declarations here, while
    /// still carrying every inherited attribute.
    pub fn documented_attributes(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.documented
            .iter()
            .filter_map(|name| self.attributes.get(name))
    }

    /// Checks that the schema is internally consistent.
    pub fn verify(&self) -> Result<()> {
        verify::Verify { schema: self }.verify()
    }
}

impl Schema {
    fn new(
        name: String,
        attributes: IndexMap<String, Attribute>,
        references: IndexMap<String, Attribute>,
        documented: Vec<String>,
    ) -> Arc<Schema> {
        Arc::new(Schema {
            name,
            attributes,
            references,
            documented,
        })
    }
}
