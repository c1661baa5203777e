use super::Catalog;
use crate::CatalogType;

use geocat_core::{Client, Error, Result};

use indexmap::IndexMap;
use tracing::debug;

use std::rc::Rc;
use std::sync::Arc;

#[derive(Default)]
pub struct Builder {
    /// Registered types, in registration order
    types: Vec<Arc<CatalogType>>,

    client: Option<Rc<dyn Client>>,
}

impl Builder {
    pub fn register(&mut self, ty: Arc<CatalogType>) -> &mut Self {
        self.types.push(ty);
        self
    }

    /// Sets the client used to fetch, save and delete objects.
    pub fn client(&mut self, client: Rc<dyn Client>) -> &mut Self {
        self.client = Some(client);
        self
    }

    pub fn build(&mut self) -> Result<Catalog> {
        let mut types = IndexMap::with_capacity(self.types.len());

        for ty in &self.types {
            ty.schema().verify()?;

            if types.insert(ty.name().to_owned(), ty.clone()).is_some() {
                return Err(Error::invalid_schema(format!(
                    "catalog type `{}` is registered more than once",
                    ty.name()
                )));
            }
        }

        debug!(types = types.len(), client = self.client.is_some(), "build catalog");

        Ok(Catalog {
            types,
            client: self.client.clone(),
        })
    }
}
