#![allow(dead_code)]

use geocat::file::file_type;
use geocat::resolution::resolution_type;
use geocat::{catalog_object_schema, Attribute, Catalog, CatalogType, Client, Result, Schema};

use indexmap::IndexMap;
use serde_json::{json, Map, Value as Json};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

pub const CREATED: &str = "2024-01-02T03:04:05Z";

/// An in-memory catalog service.
#[derive(Default)]
pub struct MemoryClient {
    resources: RefCell<IndexMap<(String, String), Map<String, Json>>>,
    next_id: Cell<u64>,
    lookups: Cell<usize>,
    requests: RefCell<Vec<Json>>,
}

impl MemoryClient {
    pub fn new() -> Rc<MemoryClient> {
        Rc::new(MemoryClient::default())
    }

    /// Stores a resource as if it had been created earlier.
    pub fn insert(&self, type_name: &str, id: &str, attributes: Json) {
        let Json::Object(attributes) = attributes else {
            panic!("attributes must be an object");
        };
        self.resources
            .borrow_mut()
            .insert((type_name.to_owned(), id.to_owned()), attributes);
    }

    /// Deletes a resource behind the back of any loaded object.
    pub fn remove(&self, type_name: &str, id: &str) {
        self.resources
            .borrow_mut()
            .shift_remove(&(type_name.to_owned(), id.to_owned()));
    }

    pub fn stored(&self, type_name: &str, id: &str) -> Option<Json> {
        self.resources
            .borrow()
            .get(&(type_name.to_owned(), id.to_owned()))
            .cloned()
            .map(Json::Object)
    }

    /// Number of `get_resource` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Every resource passed to `save_resource`, in order.
    pub fn save_requests(&self) -> Vec<Json> {
        self.requests.borrow().clone()
    }

    fn resource(type_name: &str, id: &str, attributes: &Map<String, Json>) -> Json {
        json!({
            "type": type_name,
            "id": id,
            "attributes": attributes,
        })
    }
}

impl Client for MemoryClient {
    fn get_resource(&self, type_name: &str, id: &str) -> Result<Option<Json>> {
        self.lookups.set(self.lookups.get() + 1);

        Ok(self
            .resources
            .borrow()
            .get(&(type_name.to_owned(), id.to_owned()))
            .map(|attributes| MemoryClient::resource(type_name, id, attributes)))
    }

    fn save_resource(&self, type_name: &str, resource: Json) -> Result<Json> {
        self.requests.borrow_mut().push(resource.clone());

        let id = match resource.get("id").and_then(Json::as_str) {
            Some(id) => id.to_owned(),
            None => {
                self.next_id.set(self.next_id.get() + 1);
                format!("{type_name}-{}", self.next_id.get())
            }
        };

        let mut resources = self.resources.borrow_mut();
        let stored = resources
            .entry((type_name.to_owned(), id.clone()))
            .or_insert_with(|| {
                let mut attributes = Map::new();
                attributes.insert("created".into(), json!(CREATED));
                attributes
            });

        if let Some(Json::Object(attributes)) = resource.get("attributes") {
            for (name, value) in attributes {
                stored.insert(name.clone(), value.clone());
            }
        }
        stored.insert("modified".into(), json!(CREATED));

        Ok(json!({ "data": MemoryClient::resource(type_name, &id, stored) }))
    }

    fn delete_resource(&self, type_name: &str, id: &str) -> Result<bool> {
        Ok(self
            .resources
            .borrow_mut()
            .shift_remove(&(type_name.to_owned(), id.to_owned()))
            .is_some())
    }
}

pub fn product_type() -> Arc<CatalogType> {
    CatalogType::new(
        Schema::builder("product")
            .attribute("name", Attribute::new())
            .attribute("description", Attribute::new().sticky())
            .attribute("start_datetime", Attribute::timestamp())
            .attribute("resolution", Attribute::mapping(&resolution_type()))
            .inherit(&catalog_object_schema())
            .build(),
    )
    .unwrap()
}

pub fn band_type(product: &Arc<CatalogType>) -> Arc<CatalogType> {
    CatalogType::new(
        Schema::builder("band")
            .attribute("name", Attribute::new())
            .attribute("product", Attribute::reference(product.clone()))
            .attribute("product_id", Attribute::new())
            .attribute("resolution", Attribute::mapping(&resolution_type()))
            .attribute("file", Attribute::mapping(&file_type()))
            .inherit(&catalog_object_schema())
            .build(),
    )
    .unwrap()
}

/// A catalog with `product` and `band` registered, backed by `client`.
pub fn catalog(client: &Rc<MemoryClient>) -> Catalog {
    let product = product_type();
    let band = band_type(&product);

    Catalog::builder()
        .register(product)
        .register(band)
        .client(client.clone())
        .build()
        .unwrap()
}
