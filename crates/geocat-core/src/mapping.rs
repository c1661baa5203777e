use crate::owner::{notify, Owners};
use crate::{
    attributes_equal, AttributeStore, AttributeValues, Error, Owner, OwnerId, Result, Schema,
    Value,
};

use serde_json::Value as Json;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Customizes how a mapping type accepts and emits values that are not
/// mappings.
pub trait MappingHooks: Send + Sync {
    /// Converts input before the standard mapping coercion runs, e.g. a
    /// string shorthand into a record of fields.
    fn coerce(&self, value: Value) -> Result<Value> {
        Ok(value)
    }

    /// Wire form of a value that is not a mapping. `None` falls through to
    /// the standard serialization.
    fn serialize_scalar(&self, value: &Value) -> Option<Json> {
        let _ = value;
        None
    }
}

/// A nested record type: a named schema whose instances are
/// [`MappingValue`]s.
pub struct MappingType {
    name: String,
    schema: Arc<Schema>,
    hooks: Option<Arc<dyn MappingHooks>>,
}

impl MappingType {
    pub fn new(schema: Arc<Schema>) -> Arc<MappingType> {
        Arc::new(MappingType {
            name: schema.name().to_owned(),
            schema,
            hooks: None,
        })
    }

    pub fn with_hooks(schema: Arc<Schema>, hooks: impl MappingHooks + 'static) -> Arc<MappingType> {
        Arc::new(MappingType {
            name: schema.name().to_owned(),
            schema,
            hooks: Some(Arc::new(hooks)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Builds a new instance from named field values.
    ///
    /// Every field is set through its attribute. When validating, an
    /// undeclared field is an error; otherwise it is ignored.
    pub fn instantiate<I, K, V>(self: &Arc<Self>, fields: I, validate: bool) -> Result<MappingValue>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mapping = MappingValue::new(self);

        for (name, value) in fields {
            let attribute = if validate {
                self.schema.attribute_type(name.as_ref())?
            } else {
                match self.schema.attribute(name.as_ref()) {
                    Some(attribute) => attribute,
                    None => continue,
                }
            };

            attribute.set(&*mapping.0, value.into(), validate)?;
        }

        Ok(mapping)
    }

    /// Wire form of `value`: an object holding only the serializable fields.
    pub fn serialize(&self, value: &Value, jsonapi_format: bool) -> Result<Json> {
        if let Some(json) = self
            .hooks
            .as_ref()
            .and_then(|hooks| hooks.serialize_scalar(value))
        {
            return Ok(json);
        }

        match value {
            Value::Null => Ok(Json::Null),
            Value::Mapping(mapping) => {
                let values = mapping.0.values.borrow();
                self.serialize_fields(&values, jsonapi_format)
            }
            Value::Record(fields) => self.serialize_fields(fields, jsonapi_format),
            other => Err(Error::attribute_validation(format!(
                "Expected a dict or {}, got {}",
                self.name,
                other.kind_name()
            ))),
        }
    }

    /// Canonical form of `value` for the attribute named `attribute`.
    ///
    /// An instance of this type passes through unchanged, keeping its
    /// identity; a record builds a fresh instance.
    pub fn deserialize(self: &Arc<Self>, value: Value, validate: bool, attribute: &str) -> Result<Value> {
        let value = match &self.hooks {
            Some(hooks) => hooks.coerce(value)?,
            None => value,
        };

        match value {
            Value::Null => Ok(Value::Null),
            Value::Mapping(mapping) if Arc::ptr_eq(&mapping.0.ty, self) => Ok(Value::Mapping(mapping)),
            Value::Record(fields) => Ok(Value::Mapping(self.instantiate(fields, validate)?)),
            _ => Err(Error::attribute_validation(format!(
                "Expected a dict or {} for attribute {attribute}",
                self.name
            ))),
        }
    }

    fn serialize_fields(&self, fields: &AttributeValues, jsonapi_format: bool) -> Result<Json> {
        let mut serialized = serde_json::Map::new();

        for (name, value) in fields {
            let attribute = self.schema.attribute_type(name)?;
            if attribute.is_serializable() {
                serialized.insert(name.clone(), attribute.serialize(value, jsonapi_format)?);
            }
        }

        Ok(Json::Object(serialized))
    }
}

impl fmt::Debug for MappingType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("MappingType")
            .field("name", &self.name)
            .field("attributes", &self.schema.attributes().collect::<Vec<_>>())
            .finish()
    }
}

/// An instance of a [`MappingType`].
///
/// Cloning the handle shares the instance. The same instance may be held by
/// several owners at once; a change to any of its fields is reported to all
/// of them, each under the attribute name it holds the instance by.
#[derive(Clone)]
pub struct MappingValue(Rc<MappingInner>);

struct MappingInner {
    this: Weak<MappingInner>,
    id: OwnerId,
    ty: Arc<MappingType>,
    values: RefCell<AttributeValues>,
    owners: RefCell<Owners>,
}

impl MappingValue {
    /// An empty instance of `ty`.
    pub fn new(ty: &Arc<MappingType>) -> MappingValue {
        MappingValue(Rc::new_cyclic(|this| MappingInner {
            this: this.clone(),
            id: OwnerId::next(),
            ty: ty.clone(),
            values: RefCell::new(AttributeValues::new()),
            owners: RefCell::new(Owners::default()),
        }))
    }

    pub fn ty(&self) -> &Arc<MappingType> {
        &self.0.ty
    }

    pub fn id(&self) -> OwnerId {
        self.0.id
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.0.ty.schema.attribute_type(name)?.get(&*self.0)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.0
            .ty
            .schema
            .attribute_type(name)?
            .set(&*self.0, value.into(), true)
    }

    pub fn unset(&self, name: &str) -> Result<()> {
        self.0.ty.schema.attribute_type(name)?.delete(&*self.0, true)
    }

    /// True when the field currently holds a value.
    pub fn contains(&self, name: &str) -> bool {
        self.0.values.borrow().contains_key(name)
    }

    /// A snapshot of the field values.
    pub fn fields(&self) -> AttributeValues {
        self.0.values.borrow().clone()
    }

    pub fn to_json(&self) -> Result<Json> {
        let values = self.0.values.borrow();
        self.0.ty.serialize_fields(&values, false)
    }

    pub fn ptr_eq(&self, other: &MappingValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of `(owner, attribute)` pairs holding this instance.
    pub fn owner_count(&self) -> usize {
        self.0.owners.borrow().len()
    }

    pub fn is_owned_by(&self, id: OwnerId) -> bool {
        self.0.owners.borrow().contains(id)
    }

    pub(crate) fn add_owner(&self, id: OwnerId, owner: Weak<dyn Owner>, attribute: Option<&str>) {
        self.0.owners.borrow_mut().insert(id, owner, attribute);
    }

    pub(crate) fn remove_owner(&self, id: OwnerId, attribute: Option<&str>) {
        self.0.owners.borrow_mut().remove(id, attribute);
    }
}

impl Drop for MappingInner {
    fn drop(&mut self) {
        for (name, value) in self.values.get_mut().iter() {
            value.remove_owner(self.id, Some(name));
        }
    }
}

impl Owner for MappingInner {
    fn owner_id(&self) -> OwnerId {
        self.id
    }

    /// Owners know this instance by their own attribute name, so the field
    /// name is not forwarded.
    fn set_modified(&self, _name: Option<&str>, changed: bool, validate: bool) -> Result<()> {
        notify(&self.owners, changed, validate)
    }
}

impl AttributeStore for MappingInner {
    fn type_name(&self) -> &str {
        &self.ty.name
    }

    fn values(&self) -> &RefCell<AttributeValues> {
        &self.values
    }

    fn handle(&self) -> Weak<dyn Owner> {
        self.this.clone()
    }
}

impl PartialEq for MappingValue {
    fn eq(&self, other: &MappingValue) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        if !Arc::ptr_eq(&self.0.ty, &other.0.ty) {
            return false;
        }

        attributes_equal(
            &self.0.ty.schema,
            &self.0.values.borrow(),
            &other.0.values.borrow(),
        )
    }
}

impl fmt::Debug for MappingValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.0.values.borrow();
        let mut fields: Vec<_> = values.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let mut debug = fmt.debug_struct(self.0.ty.name());
        for (name, value) in fields {
            debug.field(name, value);
        }
        debug.finish()
    }
}
