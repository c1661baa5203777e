mod enumeration;
pub use enumeration::{AttributeEnum, EnumAttr};

mod reference;
pub use reference::{ReferenceAttr, ReferenceType};

pub mod timestamp;

use crate::{AttributeStore, Error, Geometry, ListValue, MappingType, Result, Value};

use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// Describes one named field of a type: how its values are coerced between
/// wire JSON and [`Value`], and which writes are allowed.
///
/// An attribute stores nothing itself. Values live in the owning object's
/// value store, keyed by the attribute name, and every read or write passes
/// through the descriptor.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Field name, bound when the attribute is added to a schema
    pub(crate) name: String,

    /// Plain, timestamp, enum, reference, mapping, list, ...
    ty: AttributeTy,

    /// May be set more than once
    mutable: bool,

    /// Included in the wire representation
    serializable: bool,

    /// Survives a reload from the service
    sticky: bool,

    /// May never be set by the client
    readonly: bool,

    doc: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AttributeTy {
    /// Values are stored and serialized unchanged
    Plain,

    /// An instant, serialized as `YYYY-MM-DDTHH:MM:SS[.ffffff]Z`
    Timestamp,

    /// A member of a closed set of strings
    Enum(EnumAttr),

    /// A GeoJSON geometry
    Geometry,

    /// Coerced through truthiness
    Boolean,

    /// Another catalog object, referenced by id through a `<name>_id` field
    Reference(ReferenceAttr),

    /// A typed nested record
    Mapping(Arc<MappingType>),

    /// A typed list
    List(ListAttr),
}

#[derive(Debug, Clone)]
pub struct ListAttr {
    /// Descriptor applied to every item of the list
    pub item: Arc<Attribute>,
}

impl Attribute {
    /// A plain attribute: mutable, serializable, not sticky, not readonly.
    pub fn new() -> Attribute {
        Attribute::with_ty(AttributeTy::Plain)
    }

    pub fn timestamp() -> Attribute {
        Attribute::with_ty(AttributeTy::Timestamp)
    }

    /// An attribute restricted to the members of `E`.
    pub fn enumeration<E: AttributeEnum>() -> Attribute {
        Attribute::with_ty(AttributeTy::Enum(EnumAttr::of::<E>()))
    }

    /// An attribute restricted to the given set of strings.
    pub fn enum_values(enum_attr: EnumAttr) -> Attribute {
        Attribute::with_ty(AttributeTy::Enum(enum_attr))
    }

    pub fn geometry() -> Attribute {
        Attribute::with_ty(AttributeTy::Geometry)
    }

    pub fn boolean() -> Attribute {
        Attribute::with_ty(AttributeTy::Boolean)
    }

    /// A reference to an object of the `target` type.
    ///
    /// References are not serializable unless configured otherwise; the
    /// `<name>_id` field carries the reference on the wire.
    pub fn reference(target: Arc<dyn ReferenceType>) -> Attribute {
        let mut attribute = Attribute::with_ty(AttributeTy::Reference(ReferenceAttr::new(target)));
        attribute.serializable = false;
        attribute
    }

    pub fn mapping(ty: &Arc<MappingType>) -> Attribute {
        Attribute::with_ty(AttributeTy::Mapping(ty.clone()))
    }

    /// A list whose items are described by `item`.
    pub fn list(item: Attribute) -> Attribute {
        Attribute::with_ty(AttributeTy::List(ListAttr {
            item: Arc::new(item),
        }))
    }

    fn with_ty(ty: AttributeTy) -> Attribute {
        Attribute {
            name: String::new(),
            ty,
            mutable: true,
            serializable: true,
            sticky: false,
            readonly: false,
            doc: None,
        }
    }

    /// The attribute may be set once; later writes must carry the same value.
    pub fn immutable(mut self) -> Attribute {
        self.mutable = false;
        self
    }

    /// The attribute may never be set by the client.
    pub fn readonly(mut self) -> Attribute {
        self.readonly = true;
        self
    }

    /// The attribute keeps its value across reloads.
    pub fn sticky(mut self) -> Attribute {
        self.sticky = true;
        self
    }

    pub fn serializable(mut self, serializable: bool) -> Attribute {
        self.serializable = serializable;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Attribute {
        self.doc = Some(doc.into());
        self
    }

    /// Allow unsaved objects to be assigned to a reference attribute.
    ///
    /// Has no effect on other attribute kinds.
    pub fn allow_unsaved(mut self) -> Attribute {
        if let AttributeTy::Reference(reference) = &mut self.ty {
            reference.allow_unsaved = true;
        }
        self
    }

    /// Binds the attribute to the field name it is declared under.
    pub(crate) fn bind(&mut self, name: &str) {
        self.name = name.to_owned();

        // List items report errors under the list's name
        if let AttributeTy::List(list) = &mut self.ty {
            let mut item = (*list.item).clone();
            item.bind(name);
            list.item = Arc::new(item);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &AttributeTy {
        &self.ty
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn is_serializable(&self) -> bool {
        self.serializable
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn doc_str(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Name of the shadow field holding the id of a referenced object.
    pub fn id_field(&self) -> String {
        format!("{}_id", self.name)
    }

    /// Reads the attribute from `owner`.
    ///
    /// An attribute that was never set reads as [`Value::Null`]. Reference
    /// attributes resolve the referenced object on demand.
    pub fn get(&self, owner: &dyn AttributeStore) -> Result<Value> {
        if let AttributeTy::Reference(reference) = &self.ty {
            return reference.get(self, owner);
        }

        Ok(owner
            .values()
            .borrow()
            .get(&self.name)
            .cloned()
            .unwrap_or_default())
    }

    /// Reading an attribute without an owning object always fails.
    pub fn get_unbound(&self, type_name: &str) -> Result<Value> {
        Err(Error::attribute_access(format!(
            "type object '{type_name}' has no attribute '{}'",
            self.name
        )))
    }

    /// Writes `value` to `owner`.
    ///
    /// With `validate`, the attribute's policy is enforced first. The owner is
    /// told about the change before it is committed, and may veto it by
    /// returning an error; in that case the owner's store is left untouched.
    pub fn set(&self, owner: &dyn AttributeStore, value: Value, validate: bool) -> Result<()> {
        if let AttributeTy::Reference(reference) = &self.ty {
            return reference.set(self, owner, value, validate);
        }

        if validate {
            self.check_readonly("set")?;
        }

        let value = self.deserialize(value, validate)?;
        let previous = owner.values().borrow().get(&self.name).cloned();

        if validate {
            self.check_immutable("set", previous.as_ref(), Some(&value))?;
        }

        let changed = previous.as_ref() != Some(&value);
        owner.set_modified(Some(&self.name), changed, validate)?;

        let id = owner.owner_id();
        if let Some(previous) = &previous {
            previous.remove_owner(id, Some(&self.name));
        }
        value.add_owner(id, owner.handle(), Some(&self.name));

        owner
            .values()
            .borrow_mut()
            .insert(self.name.clone(), value);
        Ok(())
    }

    /// Removes the attribute's value from `owner`, leaving it unset.
    pub fn delete(&self, owner: &dyn AttributeStore, validate: bool) -> Result<()> {
        if validate {
            self.check_readonly("delete")?;
            let present = owner.values().borrow().contains_key(&self.name);
            if !self.mutable && present {
                return Err(self.immutable_error("delete"));
            }
        }

        let previous = owner.values().borrow_mut().shift_remove(&self.name);
        if let Some(previous) = previous {
            previous.remove_owner(owner.owner_id(), Some(&self.name));
        }
        Ok(())
    }

    /// Converts a canonical value into its wire representation.
    pub fn serialize(&self, value: &Value, jsonapi_format: bool) -> Result<Json> {
        if value.is_null() {
            return Ok(Json::Null);
        }

        match &self.ty {
            AttributeTy::Plain | AttributeTy::Enum(_) => value.to_json(),
            AttributeTy::Timestamp => timestamp::serialize(value),
            AttributeTy::Geometry => match value {
                Value::Geometry(geometry) => geometry.to_json(),
                other => other.to_json(),
            },
            AttributeTy::Boolean => Ok(Json::Bool(value.is_truthy())),
            AttributeTy::Reference(_) => match value {
                Value::Document(document) => document.serialize(false, jsonapi_format),
                other => other.to_json(),
            },
            AttributeTy::Mapping(ty) => ty.serialize(value, jsonapi_format),
            AttributeTy::List(list) => {
                let items = match value {
                    Value::List(items) => items.to_vec(),
                    Value::Array(items) => items.clone(),
                    other => return other.to_json(),
                };
                let items = items
                    .iter()
                    .map(|item| list.item.serialize(item, jsonapi_format))
                    .collect::<Result<_>>()?;
                Ok(Json::Array(items))
            }
        }
    }

    /// Converts wire data or user input into the canonical value.
    ///
    /// Without `validate` the conversion is lenient: values received from
    /// the service are trusted.
    pub fn deserialize(&self, value: Value, validate: bool) -> Result<Value> {
        match &self.ty {
            AttributeTy::Plain => Ok(value),
            AttributeTy::Timestamp => timestamp::deserialize(value, validate),
            AttributeTy::Enum(enum_attr) => enum_attr.deserialize(value, validate),
            AttributeTy::Geometry => match value {
                Value::Null => Ok(Value::Null),
                value => Ok(Value::Geometry(Geometry::from_value(&value)?)),
            },
            AttributeTy::Boolean => Ok(Value::Bool(value.is_truthy())),
            AttributeTy::Reference(reference) => reference.deserialize(self, value, validate),
            AttributeTy::Mapping(ty) => ty.deserialize(value, validate, &self.name),
            AttributeTy::List(list) => match value {
                Value::Null => Ok(Value::Null),
                Value::List(items) => Ok(Value::List(items)),
                Value::Array(items) => Ok(Value::List(ListValue::with_policy(
                    &self.name,
                    list.item.clone(),
                    self.mutable,
                    self.readonly,
                    items,
                    validate,
                )?)),
                _ => Err(Error::attribute_validation(format!(
                    "Expected a list or ListAttribute for attribute {}",
                    self.name
                ))),
            },
        }
    }

    pub(crate) fn check_readonly(&self, operation: &str) -> Result<()> {
        if self.readonly {
            return Err(Error::attribute_validation(format!(
                "Can't {operation} '{}' item because it is a readonly attribute",
                self.name
            )));
        }
        Ok(())
    }

    /// An immutable attribute may be written while unset, or rewritten with
    /// an equal value.
    pub(crate) fn check_immutable(
        &self,
        operation: &str,
        previous: Option<&Value>,
        value: Option<&Value>,
    ) -> Result<()> {
        match previous {
            Some(previous) if !self.mutable && Some(previous) != value => {
                Err(self.immutable_error(operation))
            }
            _ => Ok(()),
        }
    }

    fn immutable_error(&self, operation: &str) -> Error {
        Error::attribute_validation(format!(
            "Can't {operation} '{}' item because it is an immutable attribute",
            self.name
        ))
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeTy {
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, Self::Timestamp)
    }

    pub fn as_enum(&self) -> Option<&EnumAttr> {
        match self {
            Self::Enum(enum_attr) => Some(enum_attr),
            _ => None,
        }
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::Geometry)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(..))
    }

    pub fn as_reference(&self) -> Option<&ReferenceAttr> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_reference(&self) -> &ReferenceAttr {
        match self {
            Self::Reference(reference) => reference,
            _ => panic!("expected reference attribute, but was {self:?}"),
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(..))
    }

    pub fn as_mapping(&self) -> Option<&Arc<MappingType>> {
        match self {
            Self::Mapping(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(..))
    }

    pub fn as_list(&self) -> Option<&ListAttr> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeTy {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => fmt.write_str("Attribute"),
            Self::Timestamp => fmt.write_str("Timestamp"),
            Self::Enum(enum_attr) => write!(fmt, "EnumAttribute({})", enum_attr.name()),
            Self::Geometry => fmt.write_str("GeometryAttribute"),
            Self::Boolean => fmt.write_str("BooleanAttribute"),
            Self::Reference(reference) => {
                write!(fmt, "CatalogObjectReference({})", reference.target().type_name())
            }
            Self::Mapping(ty) => fmt.write_str(ty.name()),
            Self::List(list) => write!(fmt, "ListAttribute({})", list.item.ty),
        }
    }
}
