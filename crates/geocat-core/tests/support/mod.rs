#![allow(dead_code)]

use geocat_core::{
    AttributeStore, AttributeValues, Document, DocumentRef, Error, Owner, OwnerId, ReferenceType,
    Result, Schema, Value,
};

use serde_json::{json, Value as Json};

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A minimal owning object that records every modification notice.
pub struct TestObject {
    this: Weak<TestObject>,
    id: OwnerId,
    schema: Arc<Schema>,
    values: RefCell<AttributeValues>,
    notices: RefCell<Vec<(Option<String>, bool)>>,
    deleted: Cell<bool>,
}

impl TestObject {
    pub fn new(schema: &Arc<Schema>) -> Rc<TestObject> {
        Rc::new_cyclic(|this| TestObject {
            this: this.clone(),
            id: OwnerId::next(),
            schema: schema.clone(),
            values: RefCell::new(AttributeValues::new()),
            notices: RefCell::new(vec![]),
            deleted: Cell::new(false),
        })
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.schema.attribute_type(name)?.get(self)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.schema.attribute_type(name)?.set(self, value.into(), true)
    }

    pub fn set_unvalidated(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.schema.attribute_type(name)?.set(self, value.into(), false)
    }

    pub fn unset(&self, name: &str) -> Result<()> {
        self.schema.attribute_type(name)?.delete(self, true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Notices received so far, clearing the log.
    pub fn take_notices(&self) -> Vec<(Option<String>, bool)> {
        self.notices.take()
    }

    /// Every further modification is vetoed.
    pub fn mark_deleted(&self) {
        self.deleted.set(true);
    }
}

impl Owner for TestObject {
    fn owner_id(&self) -> OwnerId {
        self.id
    }

    fn set_modified(&self, name: Option<&str>, changed: bool, _validate: bool) -> Result<()> {
        if self.deleted.get() {
            return Err(Error::deleted_object(self.schema.name(), None));
        }
        self.notices
            .borrow_mut()
            .push((name.map(str::to_owned), changed));
        Ok(())
    }
}

impl AttributeStore for TestObject {
    fn type_name(&self) -> &str {
        self.schema.name()
    }

    fn values(&self) -> &RefCell<AttributeValues> {
        &self.values
    }

    fn handle(&self) -> Weak<dyn Owner> {
        self.this.clone()
    }
}

pub fn notice(name: &str, changed: bool) -> (Option<String>, bool) {
    (Some(name.to_string()), changed)
}

/// A referenced document that is only an id.
#[derive(Debug)]
pub struct TestDocument {
    pub type_name: String,
    pub id: Option<String>,
}

impl TestDocument {
    pub fn saved(type_name: &str, id: &str) -> DocumentRef {
        DocumentRef::new(Rc::new(TestDocument {
            type_name: type_name.to_string(),
            id: Some(id.to_string()),
        }))
    }

    pub fn unsaved(type_name: &str) -> DocumentRef {
        DocumentRef::new(Rc::new(TestDocument {
            type_name: type_name.to_string(),
            id: None,
        }))
    }
}

impl Document for TestDocument {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn is_unsaved(&self) -> bool {
        self.id.is_none()
    }

    fn serialize(&self, _modified_only: bool, jsonapi_format: bool) -> Result<Json> {
        if jsonapi_format {
            Ok(json!({"data": {"type": self.type_name, "id": self.id}}))
        } else {
            Ok(json!({"id": self.id}))
        }
    }

    fn document_eq(&self, other: &dyn Document) -> bool {
        self.type_name == other.type_name() && self.id == other.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A reference target knowing a fixed set of ids, counting lookups.
pub struct TestTarget {
    pub type_name: String,
    pub known: Vec<String>,
    pub lookups: AtomicUsize,
}

impl TestTarget {
    pub fn new(type_name: &str, known: &[&str]) -> Arc<TestTarget> {
        Arc::new(TestTarget {
            type_name: type_name.to_string(),
            known: known.iter().map(|id| id.to_string()).collect(),
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ReferenceType for TestTarget {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(
        &self,
        id: &str,
        _client: Option<Rc<dyn geocat_core::Client>>,
    ) -> Result<Option<DocumentRef>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .known
            .iter()
            .any(|known| known == id)
            .then(|| TestDocument::saved(&self.type_name, id)))
    }
}
