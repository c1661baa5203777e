//! Typed, validated and mutation-tracked attributes for catalog documents.
//!
//! A type declares its fields once, as a [`Schema`] of [`Attribute`]
//! descriptors. Every read and write of a field on an owning object is routed
//! through its descriptor, which converts between wire JSON and the canonical
//! [`Value`] form, enforces the field's policy and reports the change to the
//! owner before committing it.
//!
//! Nested records ([`MappingValue`]) and lists ([`ListValue`]) are shared
//! handles: the same instance may be held by several owners at once, and a
//! change made through any of them is reported to all of them.

mod error;
pub use error::{Error, IntoError};

pub mod attr;
pub use attr::{Attribute, AttributeEnum, AttributeTy, EnumAttr, ReferenceType};

pub mod client;
pub use client::Client;

mod eq;
pub use eq::attributes_equal;

pub mod geometry;
pub use geometry::Geometry;

pub mod list;
pub use list::ListValue;

pub mod mapping;
pub use mapping::{MappingHooks, MappingType, MappingValue};

pub mod owner;
pub use owner::{AttributeStore, AttributeValues, Owner, OwnerId};

pub mod schema;
pub use schema::Schema;

pub mod value;
pub use value::{Document, DocumentRef, Value};

#[doc(hidden)]
pub use indexmap;

/// A Result type alias that uses the crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
