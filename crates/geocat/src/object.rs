use crate::{CatalogType, DocumentState};

use geocat_core::{
    attributes_equal, bail, err, AttributeStore, AttributeValues, Client, Document, DocumentRef,
    Error, Owner, OwnerId, Result, Value,
};

use indexmap::IndexSet;
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// An object of a [`CatalogType`].
///
/// Cloning the handle shares the object. Every attribute write is checked
/// against the type's schema and recorded, so only modified attributes are
/// sent when the object is saved again.
#[derive(Clone)]
pub struct CatalogObject(Rc<ObjectInner>);

struct ObjectInner {
    this: Weak<ObjectInner>,
    id: OwnerId,
    ty: Arc<CatalogType>,
    values: RefCell<AttributeValues>,

    /// Names of attributes changed since the last load or save
    modified: RefCell<IndexSet<String>>,

    /// Synchronized with the service at least once
    saved: Cell<bool>,

    deleted: Cell<bool>,
    client: Option<Rc<dyn Client>>,
}

impl CatalogObject {
    /// A new, unsaved object without a client.
    pub fn new(ty: &Arc<CatalogType>) -> CatalogObject {
        CatalogObject::with_client(ty, None)
    }

    pub fn with_client(ty: &Arc<CatalogType>, client: Option<Rc<dyn Client>>) -> CatalogObject {
        CatalogObject(Rc::new_cyclic(|this| ObjectInner {
            this: this.clone(),
            id: OwnerId::next(),
            ty: ty.clone(),
            values: RefCell::new(AttributeValues::new()),
            modified: RefCell::new(IndexSet::new()),
            saved: Cell::new(false),
            deleted: Cell::new(false),
            client,
        }))
    }

    /// The object behind a reference, if it is a catalog object.
    pub fn from_document(document: &DocumentRef) -> Option<CatalogObject> {
        document.downcast::<ObjectInner>().map(CatalogObject)
    }

    pub fn to_document(&self) -> DocumentRef {
        DocumentRef::new(self.0.clone())
    }

    pub fn ty(&self) -> &Arc<CatalogType> {
        &self.0.ty
    }

    pub fn type_name(&self) -> &str {
        self.0.ty.name()
    }

    /// Identity of the object in owner registries.
    pub fn owner_id(&self) -> OwnerId {
        self.0.id
    }

    pub fn id(&self) -> Option<String> {
        self.0.object_id()
    }

    pub fn client(&self) -> Option<&Rc<dyn Client>> {
        self.0.client.as_ref()
    }

    pub fn state(&self) -> DocumentState {
        self.0.state()
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.0.ty.schema().attribute_type(name)?.get(&*self.0)
    }

    /// Sets an attribute, enforcing its policy.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.0
            .ty
            .schema()
            .attribute_type(name)?
            .set(&*self.0, value.into(), true)
    }

    /// Sets an attribute the way service data is applied: leniently and
    /// bypassing readonly and immutable checks.
    pub fn set_unvalidated(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.0
            .ty
            .schema()
            .attribute_type(name)?
            .set(&*self.0, value.into(), false)
    }

    pub fn unset(&self, name: &str) -> Result<()> {
        self.0.ty.schema().attribute_type(name)?.delete(&*self.0, true)
    }

    /// True when the attribute currently holds a value.
    pub fn contains(&self, name: &str) -> bool {
        self.0.values.borrow().contains_key(name)
    }

    pub fn is_modified(&self) -> bool {
        !self.0.modified.borrow().is_empty()
    }

    /// Attributes changed since the object was last loaded or saved, in the
    /// order they were first changed.
    pub fn modified_attributes(&self) -> Vec<String> {
        self.0.modified.borrow().iter().cloned().collect()
    }

    /// Serializable attributes of the object.
    ///
    /// With `jsonapi_format` the attributes are wrapped in a JSON:API
    /// document, `{"data": {"type", "id", "attributes"}}`.
    pub fn serialize(&self, modified_only: bool, jsonapi_format: bool) -> Result<Json> {
        self.0.serialize(modified_only, jsonapi_format)
    }

    /// The full JSON:API resource object, `{"type", "id", "attributes"}`.
    pub fn to_resource(&self) -> Result<Json> {
        self.0.resource(false, true)
    }

    /// Replaces the object's data with a resource received from the service.
    ///
    /// Sticky attributes keep their values unless the resource carries them.
    /// Everything else is cleared first. Values are applied without
    /// validation, attributes the schema does not know are ignored, and the
    /// object ends up `saved` with nothing modified.
    pub fn load_from_remote(&self, resource: Json) -> Result<()> {
        let inner = &*self.0;
        inner.check_not_deleted()?;

        let mut resource = resource_object(resource)?;
        let schema = inner.ty.schema();

        let cleared: Vec<String> = inner
            .values
            .borrow()
            .keys()
            .filter(|name| !schema.attribute(name).is_some_and(|attr| attr.is_sticky()))
            .cloned()
            .collect();

        for name in cleared {
            match schema.attribute(&name) {
                Some(attribute) => attribute.delete(inner, false)?,
                None => {
                    inner.values.borrow_mut().shift_remove(&name);
                }
            }
        }

        if let (Some(id), Some(attribute)) = (resource.remove("id"), schema.attribute("id")) {
            attribute.set(inner, Value::from_json(id), false)?;
        }

        match resource.remove("attributes") {
            Some(Json::Object(attributes)) => {
                for (name, value) in attributes {
                    match schema.attribute(&name) {
                        Some(attribute) if !attribute.ty().is_reference() => {
                            attribute.set(inner, Value::from_json(value), false)?;
                        }
                        _ => trace!(type_name = inner.ty.name(), attribute = %name, "skip attribute"),
                    }
                }
            }
            Some(Json::Null) | None => {}
            Some(other) => bail!("expected an attributes object, got {other}"),
        }

        inner.saved.set(true);
        inner.modified.borrow_mut().clear();
        Ok(())
    }

    /// Reloads the object from the service, discarding local changes.
    pub fn reload(&self) -> Result<()> {
        let inner = &*self.0;
        inner.check_not_deleted()?;

        let id = inner.saved_id("reload")?;
        let client = inner.require_client("reload")?;

        debug!(type_name = inner.ty.name(), %id, "reload");
        match client.get_resource(inner.ty.name(), &id)? {
            Some(resource) => self.load_from_remote(resource),
            None => Err(Error::not_found(inner.ty.name(), &id)),
        }
    }

    /// Writes the object to the service.
    ///
    /// An unsaved object is sent in full, a modified one with only its
    /// modified attributes. A saved, unmodified object is left alone. The
    /// service's response is loaded back into the object.
    pub fn save(&self) -> Result<()> {
        let inner = &*self.0;
        inner.check_not_deleted()?;

        let state = inner.state();
        if state == DocumentState::Saved {
            debug!(type_name = inner.ty.name(), id = ?inner.object_id(), "nothing to save");
            return Ok(());
        }

        let client = inner.require_client("save")?;
        let resource = inner.resource(state == DocumentState::Modified, true)?;

        debug!(type_name = inner.ty.name(), id = ?inner.object_id(), %state, "save");
        let response = client.save_resource(inner.ty.name(), resource)?;
        self.load_from_remote(response)
    }

    /// Deletes the object from the service. Afterwards the object is
    /// `deleted` and rejects every change.
    pub fn destroy(&self) -> Result<()> {
        let inner = &*self.0;
        inner.check_not_deleted()?;

        let id = inner.saved_id("delete")?;
        let client = inner.require_client("delete")?;

        debug!(type_name = inner.ty.name(), %id, "delete");
        if !client.delete_resource(inner.ty.name(), &id)? {
            return Err(Error::not_found(inner.ty.name(), &id));
        }

        inner.deleted.set(true);
        Ok(())
    }

    pub fn ptr_eq(&self, other: &CatalogObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ObjectInner {
    fn object_id(&self) -> Option<String> {
        match self.values.borrow().get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::I64(id) => Some(id.to_string()),
            _ => None,
        }
    }

    fn state(&self) -> DocumentState {
        if self.deleted.get() {
            DocumentState::Deleted
        } else if !self.saved.get() {
            DocumentState::Unsaved
        } else if !self.modified.borrow().is_empty() {
            DocumentState::Modified
        } else {
            DocumentState::Saved
        }
    }

    fn check_not_deleted(&self) -> Result<()> {
        if self.deleted.get() {
            return Err(Error::deleted_object(
                self.ty.name(),
                self.object_id().as_deref(),
            ));
        }
        Ok(())
    }

    fn saved_id(&self, operation: &str) -> Result<String> {
        match self.object_id() {
            Some(id) if self.saved.get() => Ok(id),
            _ => Err(err!(
                "cannot {operation} {}: it has not been saved",
                self.ty.name()
            )),
        }
    }

    fn require_client(&self, operation: &str) -> Result<Rc<dyn Client>> {
        self.client
            .clone()
            .ok_or_else(|| err!("cannot {operation} {} without a client", self.ty.name()))
    }

    fn attributes(&self, modified_only: bool, jsonapi_format: bool) -> Result<Map<String, Json>> {
        let values = self.values.borrow();
        let modified = self.modified.borrow();
        let mut attributes = Map::new();

        for (name, attribute) in self.ty.schema().attribute_types() {
            if !attribute.is_serializable() || (modified_only && !modified.contains(name)) {
                continue;
            }

            if let Some(value) = values.get(name) {
                attributes.insert(name.clone(), attribute.serialize(value, jsonapi_format)?);
            }
        }

        Ok(attributes)
    }

    fn resource(&self, modified_only: bool, jsonapi_format: bool) -> Result<Json> {
        let mut resource = Map::new();
        resource.insert("type".into(), Json::String(self.ty.name().to_owned()));
        if let Some(id) = self.object_id() {
            resource.insert("id".into(), Json::String(id));
        }
        resource.insert(
            "attributes".into(),
            Json::Object(self.attributes(modified_only, jsonapi_format)?),
        );
        Ok(Json::Object(resource))
    }

    fn serialize(&self, modified_only: bool, jsonapi_format: bool) -> Result<Json> {
        if jsonapi_format {
            let mut document = Map::new();
            document.insert("data".into(), self.resource(modified_only, true)?);
            Ok(Json::Object(document))
        } else {
            Ok(Json::Object(self.attributes(modified_only, false)?))
        }
    }

    fn same_document(&self, other: &ObjectInner) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        self.ty.name() == other.ty.name()
            && attributes_equal(
                self.ty.schema(),
                &self.values.borrow(),
                &other.values.borrow(),
            )
    }
}

/// Accepts either a bare resource object or a `{"data": ...}` document.
fn resource_object(json: Json) -> Result<Map<String, Json>> {
    let mut fields = match json {
        Json::Object(fields) => fields,
        other => bail!("expected a resource object, got {other}"),
    };

    match fields.remove("data") {
        Some(Json::Object(data)) => Ok(data),
        Some(other) => bail!("expected a resource object under `data`, got {other}"),
        None => Ok(fields),
    }
}

impl Owner for ObjectInner {
    fn owner_id(&self) -> OwnerId {
        self.id
    }

    fn set_modified(&self, name: Option<&str>, changed: bool, _validate: bool) -> Result<()> {
        self.check_not_deleted()?;

        if let (true, Some(name)) = (changed, name) {
            self.modified.borrow_mut().insert(name.to_owned());
        }
        Ok(())
    }
}

impl AttributeStore for ObjectInner {
    fn type_name(&self) -> &str {
        self.ty.name()
    }

    fn values(&self) -> &RefCell<AttributeValues> {
        &self.values
    }

    fn handle(&self) -> Weak<dyn Owner> {
        self.this.clone()
    }

    fn client(&self) -> Option<Rc<dyn Client>> {
        self.client.clone()
    }
}

impl Document for ObjectInner {
    fn type_name(&self) -> &str {
        self.ty.name()
    }

    fn id(&self) -> Option<String> {
        self.object_id()
    }

    fn is_unsaved(&self) -> bool {
        self.state() == DocumentState::Unsaved
    }

    fn serialize(&self, modified_only: bool, jsonapi_format: bool) -> Result<Json> {
        ObjectInner::serialize(self, modified_only, jsonapi_format)
    }

    fn document_eq(&self, other: &dyn Document) -> bool {
        other
            .as_any()
            .downcast_ref::<ObjectInner>()
            .is_some_and(|other| self.same_document(other))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl PartialEq for CatalogObject {
    fn eq(&self, other: &CatalogObject) -> bool {
        self.0.same_document(&other.0)
    }
}

impl fmt::Debug for ObjectInner {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.borrow();
        let mut debug = fmt.debug_struct(self.ty.name());

        for (name, value) in values.iter() {
            match value {
                // Referenced objects may refer back
                Value::Document(document) => debug.field(
                    name,
                    &format_args!("{}({:?})", document.type_name(), document.id()),
                ),
                value => debug.field(name, value),
            };
        }

        debug.finish()
    }
}

impl fmt::Debug for CatalogObject {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmt)
    }
}
