//! Catalog model objects built on the [`geocat_core`] attribute framework.
//!
//! A [`CatalogType`] pairs a type name with a [`Schema`]; its objects are
//! [`CatalogObject`]s that track which attributes were modified, move through
//! the [`DocumentState`]s and synchronize with the service through a
//! [`Client`]. A [`Catalog`] collects the registered types.

pub mod catalog;
pub use catalog::Catalog;

mod catalog_type;
pub use catalog_type::{catalog_object_schema, CatalogType};

pub mod file;
pub use file::File;

mod object;
pub use object::CatalogObject;

pub mod resolution;
pub use resolution::{Resolution, ResolutionUnit};

mod state;
pub use state::DocumentState;

pub use geocat_core::{
    record, Attribute, AttributeEnum, Client, Error, ListValue, MappingType, MappingValue,
    ReferenceType, Result, Schema, Value,
};
