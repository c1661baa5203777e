use crate::Result;

use serde_json::Value as Json;

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A catalog object that can be the target of a reference attribute.
pub trait Document: fmt::Debug {
    /// Name of the catalog type, e.g. `product`.
    fn type_name(&self) -> &str;

    fn id(&self) -> Option<String>;

    /// True when the object was never synchronized with the service.
    fn is_unsaved(&self) -> bool;

    /// The object's full (or modified-only) attribute document.
    fn serialize(&self, modified_only: bool, jsonapi_format: bool) -> Result<Json>;

    /// Structural equality with another document.
    fn document_eq(&self, other: &dyn Document) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

/// A shared handle to a referenced [`Document`].
#[derive(Clone)]
pub struct DocumentRef(Rc<dyn Document>);

impl DocumentRef {
    pub fn new<D: Document + 'static>(document: Rc<D>) -> DocumentRef {
        DocumentRef(document)
    }

    pub fn ptr_eq(&self, other: &DocumentRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        self.0.clone().into_any_rc().downcast().ok()
    }
}

impl Deref for DocumentRef {
    type Target = dyn Document;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for DocumentRef {
    fn eq(&self, other: &DocumentRef) -> bool {
        self.ptr_eq(other) || self.0.document_eq(&*other.0)
    }
}

impl fmt::Debug for DocumentRef {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmt)
    }
}
