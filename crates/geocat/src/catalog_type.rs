use crate::CatalogObject;

use geocat_core::{err, Attribute, Client, DocumentRef, ReferenceType, Result, Schema};

use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, OnceLock, Weak};

/// A named catalog type, e.g. `product` or `band`, and the schema its
/// objects follow.
pub struct CatalogType {
    this: Weak<CatalogType>,
    name: String,
    schema: Arc<Schema>,
}

impl CatalogType {
    /// Registers `schema` as a catalog type named after the schema.
    ///
    /// Fails when the schema is inconsistent, see [`Schema::verify`].
    pub fn new(schema: Arc<Schema>) -> Result<Arc<CatalogType>> {
        schema.verify()?;

        Ok(Arc::new_cyclic(|this| CatalogType {
            this: this.clone(),
            name: schema.name().to_owned(),
            schema,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// A new, unsaved object of this type.
    pub fn create(self: &Arc<Self>, client: Option<Rc<dyn Client>>) -> CatalogObject {
        CatalogObject::with_client(self, client)
    }

    /// Fetches the object `id` from the service. Returns `None` when the
    /// service does not know the id.
    pub fn fetch(self: &Arc<Self>, id: &str, client: Rc<dyn Client>) -> Result<Option<CatalogObject>> {
        let Some(resource) = client.get_resource(&self.name, id)? else {
            return Ok(None);
        };

        let object = CatalogObject::with_client(self, Some(client));
        object.load_from_remote(resource)?;
        Ok(Some(object))
    }
}

impl ReferenceType for CatalogType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn get(&self, id: &str, client: Option<Rc<dyn Client>>) -> Result<Option<DocumentRef>> {
        let client =
            client.ok_or_else(|| err!("cannot look up {} '{id}' without a client", self.name))?;
        let this = self
            .this
            .upgrade()
            .ok_or_else(|| err!("catalog type {} is no longer registered", self.name))?;

        Ok(this.fetch(id, client)?.map(|object| object.to_document()))
    }
}

impl fmt::Debug for CatalogType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("CatalogType")
            .field("name", &self.name)
            .field("attributes", &self.schema.attributes().collect::<Vec<_>>())
            .finish()
    }
}

/// Attributes every catalog type inherits.
///
/// ```
/// use geocat::{catalog_object_schema, Attribute, Schema};
///
/// let product = Schema::builder("product")
///     .attribute("name", Attribute::new())
///     .inherit(&catalog_object_schema())
///     .build();
///
/// assert!(product.contains("created"));
/// assert!(product.attribute_type("created").unwrap().is_readonly());
/// ```
pub fn catalog_object_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();

    SCHEMA
        .get_or_init(|| {
            Schema::builder("catalog_object")
                .attribute(
                    "id",
                    Attribute::new()
                        .immutable()
                        .serializable(false)
                        .doc("Unique identifier, assigned at creation"),
                )
                .attribute(
                    "created",
                    Attribute::timestamp()
                        .readonly()
                        .doc("When the object was created"),
                )
                .attribute(
                    "modified",
                    Attribute::timestamp()
                        .readonly()
                        .doc("When the object was last modified"),
                )
                .attribute("owners", Attribute::list(Attribute::new()))
                .attribute("readers", Attribute::list(Attribute::new()))
                .attribute("writers", Attribute::list(Attribute::new()))
                .attribute("tags", Attribute::list(Attribute::new()))
                .attribute(
                    "extra_properties",
                    Attribute::new().doc("Free-form properties as a mapping of names to values"),
                )
                .build()
        })
        .clone()
}
