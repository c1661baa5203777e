mod builder;
pub use builder::Builder;

use crate::{CatalogObject, CatalogType};

use geocat_core::{err, Client, Error, Result};

use indexmap::IndexMap;
use std::rc::Rc;
use std::sync::Arc;

/// The registered catalog types and the client used to reach the service.
#[derive(Clone)]
pub struct Catalog {
    types: IndexMap<String, Arc<CatalogType>>,
    client: Option<Rc<dyn Client>>,
}

impl Catalog {
    /// Returns a new builder with default configuration.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Looks up a registered type by name.
    pub fn ty(&self, name: &str) -> Result<&Arc<CatalogType>> {
        self.types
            .get(name)
            .ok_or_else(|| Error::attribute_access(format!("no catalog type named {name}")))
    }

    pub fn types(&self) -> impl ExactSizeIterator<Item = &Arc<CatalogType>> + '_ {
        self.types.values()
    }

    pub fn client(&self) -> Option<&Rc<dyn Client>> {
        self.client.as_ref()
    }

    /// A new, unsaved object of the type `name`, bound to the catalog's
    /// client.
    pub fn create(&self, name: &str) -> Result<CatalogObject> {
        Ok(self.ty(name)?.create(self.client.clone()))
    }

    /// Fetches the object `id` of the type `name` from the service.
    pub fn get(&self, name: &str, id: &str) -> Result<CatalogObject> {
        let ty = self.ty(name)?;
        let client = self
            .client
            .clone()
            .ok_or_else(|| err!("cannot get {name} '{id}' without a client"))?;

        ty.fetch(id, client)?
            .ok_or_else(|| Error::not_found(name, id))
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("Catalog")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("client", &self.client.is_some())
            .finish()
    }
}
