use super::Attribute;
use crate::{AttributeStore, Client, DocumentRef, Error, Result, Value};

use tracing::debug;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A catalog type that reference attributes can point to.
pub trait ReferenceType: Send + Sync {
    /// Name of the referenced type, e.g. `product`.
    fn type_name(&self) -> &str;

    /// Looks up an object by id. Returns `None` when the service has no such
    /// object.
    fn get(&self, id: &str, client: Option<Rc<dyn Client>>) -> Result<Option<DocumentRef>>;
}

#[derive(Clone)]
pub struct ReferenceAttr {
    target: Arc<dyn ReferenceType>,
    pub(super) allow_unsaved: bool,
}

impl ReferenceAttr {
    pub(super) fn new(target: Arc<dyn ReferenceType>) -> ReferenceAttr {
        ReferenceAttr {
            target,
            allow_unsaved: false,
        }
    }

    pub fn target(&self) -> &Arc<dyn ReferenceType> {
        &self.target
    }

    pub fn allows_unsaved(&self) -> bool {
        self.allow_unsaved
    }

    /// Returns the cached object while its id matches the `<name>_id` field,
    /// and looks it up again otherwise.
    pub(super) fn get(&self, attr: &Attribute, owner: &dyn AttributeStore) -> Result<Value> {
        let id_field = attr.id_field();
        let (cached, reference_id) = {
            let values = owner.values().borrow();
            let reference_id = values.get(&id_field).and_then(reference_id);
            (values.get(&attr.name).cloned(), reference_id)
        };

        if let Some(Value::Document(document)) = &cached {
            if document.id() == reference_id {
                return Ok(Value::Document(document.clone()));
            }
        }

        let resolved = match reference_id {
            Some(id) => {
                debug!(
                    attribute = %attr.name,
                    target = self.target.type_name(),
                    %id,
                    "resolve reference"
                );
                self.target
                    .get(&id, owner.client())?
                    .map(Value::Document)
                    .unwrap_or_default()
            }
            None => Value::Null,
        };

        // Caching is not a modification
        owner
            .values()
            .borrow_mut()
            .insert(attr.name.clone(), resolved.clone());
        Ok(resolved)
    }

    /// Stores the referenced object and forces the `<name>_id` field to its
    /// id, bypassing that field's own policy.
    pub(super) fn set(
        &self,
        attr: &Attribute,
        owner: &dyn AttributeStore,
        value: Value,
        validate: bool,
    ) -> Result<()> {
        if validate {
            attr.check_readonly("set")?;
        }

        let value = self.deserialize(attr, value, validate)?;
        let previous = owner.values().borrow().get(&attr.name).cloned();

        if validate {
            attr.check_immutable("set", previous.as_ref(), Some(&value))?;
        }

        let changed = previous.as_ref() != Some(&value);
        let id = match &value {
            Value::Document(document) => document.id().map(Value::String).unwrap_or_default(),
            _ => Value::Null,
        };

        owner.set_modified(Some(&attr.name), changed, validate)?;
        owner
            .values()
            .borrow_mut()
            .insert(attr.name.clone(), value);

        let id_field = attr.id_field();
        owner.set_modified(Some(&id_field), changed, false)?;
        owner.values().borrow_mut().insert(id_field, id);
        Ok(())
    }

    pub(super) fn deserialize(&self, attr: &Attribute, value: Value, validate: bool) -> Result<Value> {
        let document = match &value {
            Value::Null => return Ok(value),
            Value::Document(document) => document,
            other => {
                return Err(Error::attribute_validation(format!(
                    "Expected {} instance for attribute '{}' but got {}",
                    self.target.type_name(),
                    attr.name,
                    other.kind_name()
                )))
            }
        };

        if validate {
            if document.type_name() != self.target.type_name() {
                return Err(Error::attribute_validation(format!(
                    "Expected {} instance for attribute '{}' but got '{}'",
                    self.target.type_name(),
                    attr.name,
                    document.type_name()
                )));
            }

            if !self.allow_unsaved && document.is_unsaved() {
                return Err(Error::attribute_validation(format!(
                    "Can't assign unsaved related object to '{}'. Save it first.",
                    attr.name
                )));
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for ReferenceAttr {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("ReferenceAttr")
            .field("target", &self.target.type_name())
            .field("allow_unsaved", &self.allow_unsaved)
            .finish()
    }
}

fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::I64(id) => Some(id.to_string()),
        _ => None,
    }
}
