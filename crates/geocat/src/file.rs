//! File descriptors for images.

use geocat_core::{Attribute, Error, MappingType, MappingValue, Result, Schema, Value};

use std::sync::{Arc, OnceLock};

/// The mapping type behind [`File`].
pub fn file_type() -> Arc<MappingType> {
    static TYPE: OnceLock<Arc<MappingType>> = OnceLock::new();

    TYPE.get_or_init(|| {
        MappingType::new(
            Schema::builder("File")
                .attribute(
                    "href",
                    Attribute::new().doc("Location of the file: a gs, http, https, ftp or ftps URL"),
                )
                .attribute("size_bytes", Attribute::new().doc("Size of the file in bytes"))
                .attribute("hash", Attribute::new().doc("MD5 hash of the file"))
                .attribute(
                    "provider_id",
                    Attribute::new().doc("Identifier at the external provider"),
                )
                .attribute(
                    "provider_href",
                    Attribute::new().doc("URI describing the file at the external provider"),
                )
                .build(),
        )
    })
    .clone()
}

/// A typed handle to a file mapping value.
#[derive(Debug, Clone, PartialEq)]
pub struct File(MappingValue);

impl File {
    pub fn new(href: impl Into<String>) -> Result<File> {
        file_type()
            .instantiate([("href", Value::from(href.into()))], true)
            .map(File)
    }

    /// Wraps an existing mapping value of the file type.
    pub fn from_mapping(mapping: MappingValue) -> Result<File> {
        if !Arc::ptr_eq(mapping.ty(), &file_type()) {
            return Err(Error::attribute_validation(format!(
                "Expected a File, got {}",
                mapping.ty().name()
            )));
        }
        Ok(File(mapping))
    }

    pub fn href(&self) -> Option<String> {
        self.string("href")
    }

    pub fn size_bytes(&self) -> Option<i64> {
        self.0.get("size_bytes").ok()?.as_i64()
    }

    pub fn hash(&self) -> Option<String> {
        self.string("hash")
    }

    pub fn provider_id(&self) -> Option<String> {
        self.string("provider_id")
    }

    pub fn provider_href(&self) -> Option<String> {
        self.string("provider_href")
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.0.set(name, value)
    }

    pub fn as_mapping(&self) -> &MappingValue {
        &self.0
    }

    fn string(&self, name: &str) -> Option<String> {
        self.0.get(name).ok()?.as_str().map(str::to_owned)
    }
}

impl From<File> for Value {
    fn from(src: File) -> Value {
        Value::Mapping(src.0)
    }
}
