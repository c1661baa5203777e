use crate::owner::{notify, Owners};
use crate::{Attribute, Error, Owner, OwnerId, Result, Value};

use serde_json::Value as Json;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// An ordered, typed list of values.
///
/// Every item is coerced through the list's item attribute on entry. Like a
/// [`MappingValue`](crate::MappingValue), a list is shared by reference and
/// reports every change to all of its owners. Mapping items are in turn
/// owned by the list, so changing a field of an item is reported through the
/// list as well.
///
/// Each mutator checks the list's policy first, then tells the owners
/// whether the content actually changes, and commits only if no owner
/// objects.
///
/// A list coerced from a plain array registers with its items only once it
/// is committed to an owner, and deregisters when it is dropped.
#[derive(Clone)]
pub struct ListValue(Rc<ListInner>);

struct ListInner {
    this: Weak<ListInner>,
    id: OwnerId,

    /// Name of the attribute the list was created for, used in errors
    name: String,

    item: Arc<Attribute>,
    mutable: bool,
    readonly: bool,
    items: RefCell<Vec<Value>>,
    owners: RefCell<Owners>,
}

impl ListValue {
    /// An empty, mutable list whose items are described by `item`.
    pub fn new(item: Attribute) -> ListValue {
        ListValue::empty("", Arc::new(item), true, false)
    }

    /// A mutable list holding `items`, each coerced through `item`.
    pub fn from_items<I>(item: Attribute, items: I, validate: bool) -> Result<ListValue>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let items = items.into_iter().map(Into::into).collect();
        let list = ListValue::with_policy("", Arc::new(item), true, false, items, validate)?;
        list.bind_items();
        Ok(list)
    }

    /// A list of the coerced `items`, not yet registered with them.
    ///
    /// The list binds once it gains an owner, which happens only after the
    /// owner accepted the assignment.
    pub(crate) fn with_policy(
        name: &str,
        item: Arc<Attribute>,
        mutable: bool,
        readonly: bool,
        items: Vec<Value>,
        validate: bool,
    ) -> Result<ListValue> {
        let list = ListValue::empty(name, item, mutable, readonly);
        let items = list.coerce_all(items, validate)?;
        *list.0.items.borrow_mut() = items;
        Ok(list)
    }

    fn empty(name: &str, item: Arc<Attribute>, mutable: bool, readonly: bool) -> ListValue {
        ListValue(Rc::new_cyclic(|this| ListInner {
            this: this.clone(),
            id: OwnerId::next(),
            name: name.to_owned(),
            item,
            mutable,
            readonly,
            items: RefCell::new(vec![]),
            owners: RefCell::new(Owners::default()),
        }))
    }

    pub fn id(&self) -> OwnerId {
        self.0.id
    }

    pub fn item(&self) -> &Attribute {
        &self.0.item
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    /// Iterates over a snapshot of the items.
    pub fn iter(&self) -> std::vec::IntoIter<Value> {
        self.to_vec().into_iter()
    }

    /// A shallow copy of the items. Shared items keep their identity.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    pub fn contains(&self, value: impl Into<Value>) -> bool {
        match self.coerce(value.into(), true) {
            Ok(value) => self.0.items.borrow().contains(&value),
            Err(_) => false,
        }
    }

    /// Position of the first item equal to `value`.
    pub fn index_of(&self, value: impl Into<Value>) -> Result<usize> {
        let value = self.coerce(value.into(), true)?;
        self.0
            .items
            .borrow()
            .iter()
            .position(|item| *item == value)
            .ok_or_else(|| Error::index(format!("{value:?} is not in list")))
    }

    pub fn count(&self, value: impl Into<Value>) -> usize {
        match self.coerce(value.into(), true) {
            Ok(value) => self
                .0
                .items
                .borrow()
                .iter()
                .filter(|item| **item == value)
                .count(),
            Err(_) => 0,
        }
    }

    /// The items followed by `other`, coerced. The result is a plain vector;
    /// the new items are not owned by this list.
    pub fn concat<I>(&self, other: I) -> Result<Vec<Value>>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let other = self.coerce_all(other.into_iter().map(Into::into).collect(), true)?;
        let mut items = self.to_vec();
        items.extend(other);
        Ok(items)
    }

    /// The items repeated `n` times, as a plain vector.
    pub fn repeat(&self, n: usize) -> Result<Vec<Value>> {
        repeated(&self.0.items.borrow(), n)
    }

    pub fn append(&self, item: impl Into<Value>) -> Result<()> {
        self.check_policy("append")?;
        let item = self.coerce(item.into(), true)?;

        self.set_modified(true)?;
        self.0.items.borrow_mut().push(item.clone());
        self.bind(&[item]);
        Ok(())
    }

    /// Appends every item of `items`. Extending by nothing is not a change.
    pub fn extend<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.check_policy("extend")?;
        self.push_all(items.into_iter().map(Into::into).collect())
    }

    /// In-place concatenation; behaves as [`extend`](Self::extend).
    pub fn extend_assign<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.check_policy("extend")?;
        self.push_all(items.into_iter().map(Into::into).collect())
    }

    /// Inserts `item` before `index`.
    pub fn insert(&self, index: usize, item: impl Into<Value>) -> Result<()> {
        self.check_policy("insert")?;
        let len = self.len();
        if index > len {
            return Err(Error::index(format!(
                "insert index {index} out of range for list of length {len}"
            )));
        }
        let item = self.coerce(item.into(), true)?;

        self.set_modified(true)?;
        self.0.items.borrow_mut().insert(index, item.clone());
        self.bind(&[item]);
        Ok(())
    }

    /// Removes and returns the last item.
    pub fn pop(&self) -> Result<Value> {
        self.check_policy("pop")?;
        match self.len() {
            0 => Err(Error::index("pop from empty list")),
            len => self.take(len - 1),
        }
    }

    /// Removes and returns the item at `index`.
    pub fn pop_at(&self, index: usize) -> Result<Value> {
        self.check_policy("pop")?;
        self.check_index(index)?;
        self.take(index)
    }

    /// Removes the first item equal to `value`.
    pub fn remove(&self, value: impl Into<Value>) -> Result<()> {
        self.check_policy("remove")?;
        let index = self.index_of(value)?;
        self.take(index)?;
        Ok(())
    }

    /// Removes the item at `index`.
    pub fn delete(&self, index: usize) -> Result<()> {
        self.check_policy("delete")?;
        self.check_index(index)?;
        self.take(index)?;
        Ok(())
    }

    /// Removes the items in `range`.
    pub fn delete_range(&self, range: impl RangeBounds<usize>) -> Result<()> {
        self.check_policy("delete")?;
        let range = self.resolve(range)?;
        self.replace_range(range, vec![])
    }

    pub fn clear(&self) -> Result<()> {
        self.check_policy("clear")?;

        let removed = self.to_vec();
        self.set_modified(!removed.is_empty())?;
        self.0.items.borrow_mut().clear();
        self.unbind(removed);
        Ok(())
    }

    pub fn reverse(&self) -> Result<()> {
        self.check_policy("reverse")?;

        let mut items = self.to_vec();
        items.reverse();
        self.reorder(items)
    }

    /// Stable sort with a comparator.
    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.check_policy("sort")?;

        let mut items = self.to_vec();
        items.sort_by(compare);
        self.reorder(items)
    }

    /// Stable sort by a key.
    pub fn sort_by_key<K, F>(&self, key: F) -> Result<()>
    where
        F: FnMut(&Value) -> K,
        K: Ord,
    {
        self.check_policy("sort")?;

        let mut items = self.to_vec();
        items.sort_by_key(key);
        self.reorder(items)
    }

    /// Replaces the item at `index`.
    pub fn set(&self, index: usize, item: impl Into<Value>) -> Result<()> {
        self.check_policy("set")?;
        self.check_index(index)?;
        self.replace_range(index..index + 1, vec![item.into()])
    }

    /// Replaces the items in `range` with `items`.
    pub fn splice<I>(&self, range: impl RangeBounds<usize>, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.check_policy("set")?;
        let range = self.resolve(range)?;
        self.replace_range(range, items.into_iter().map(Into::into).collect())
    }

    /// Repeats the items in place `n` times.
    pub fn repeat_assign(&self, n: usize) -> Result<()> {
        self.check_policy("repeat")?;

        let items = self.to_vec();
        let updated = repeated(&items, n)?;

        self.set_modified(!items.is_empty() && n != 1)?;
        *self.0.items.borrow_mut() = updated;

        if n == 0 {
            self.unbind(items);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<Json> {
        self.serialize(false)
    }

    pub(crate) fn serialize(&self, jsonapi_format: bool) -> Result<Json> {
        let items = self
            .0
            .items
            .borrow()
            .iter()
            .map(|item| self.0.item.serialize(item, jsonapi_format))
            .collect::<Result<_>>()?;
        Ok(Json::Array(items))
    }

    pub fn ptr_eq(&self, other: &ListValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of `(owner, attribute)` pairs holding this list.
    pub fn owner_count(&self) -> usize {
        self.0.owners.borrow().len()
    }

    pub fn is_owned_by(&self, id: OwnerId) -> bool {
        self.0.owners.borrow().contains(id)
    }

    pub(crate) fn add_owner(&self, id: OwnerId, owner: Weak<dyn Owner>, attribute: Option<&str>) {
        self.0.owners.borrow_mut().insert(id, owner, attribute);
        self.bind_items();
    }

    pub(crate) fn remove_owner(&self, id: OwnerId, attribute: Option<&str>) {
        self.0.owners.borrow_mut().remove(id, attribute);
    }

    /// Registers the list as owner of every shared item it holds. Binding an
    /// already bound item has no effect.
    pub(crate) fn bind_items(&self) {
        let items = self.to_vec();
        self.bind(&items);
    }

    fn check_policy(&self, operation: &str) -> Result<()> {
        if self.0.readonly {
            return Err(Error::attribute_validation(format!(
                "Can't {operation} '{}' item because it is a readonly attribute",
                self.0.name
            )));
        }
        if !self.0.mutable {
            return Err(Error::attribute_validation(format!(
                "Can't {operation} '{}' item because it is an immutable attribute",
                self.0.name
            )));
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index >= len {
            return Err(Error::index(format!(
                "list index {index} out of range for list of length {len}"
            )));
        }
        Ok(())
    }

    fn resolve(&self, range: impl RangeBounds<usize>) -> Result<Range<usize>> {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(start) => *start,
            Bound::Excluded(start) => bound_after(*start, len)?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(end) => bound_after(*end, len)?,
            Bound::Excluded(end) => *end,
            Bound::Unbounded => len,
        };

        if start > end || end > len {
            return Err(Error::index(format!(
                "range {start}..{end} out of range for list of length {len}"
            )));
        }
        Ok(start..end)
    }

    fn coerce(&self, item: Value, validate: bool) -> Result<Value> {
        self.0.item.deserialize(item, validate)
    }

    fn coerce_all(&self, items: Vec<Value>, validate: bool) -> Result<Vec<Value>> {
        items
            .into_iter()
            .map(|item| self.coerce(item, validate))
            .collect()
    }

    fn set_modified(&self, changed: bool) -> Result<()> {
        notify(&self.0.owners, changed, true)
    }

    fn push_all(&self, items: Vec<Value>) -> Result<()> {
        let items = self.coerce_all(items, true)?;

        self.set_modified(!items.is_empty())?;
        self.0.items.borrow_mut().extend(items.iter().cloned());
        self.bind(&items);
        Ok(())
    }

    fn take(&self, index: usize) -> Result<Value> {
        self.set_modified(true)?;
        let item = self.0.items.borrow_mut().remove(index);
        self.unbind(vec![item.clone()]);
        Ok(item)
    }

    /// Commits a permutation of the current items.
    fn reorder(&self, items: Vec<Value>) -> Result<()> {
        let changed = *self.0.items.borrow() != items;
        self.set_modified(changed)?;
        *self.0.items.borrow_mut() = items;
        Ok(())
    }

    fn replace_range(&self, range: Range<usize>, items: Vec<Value>) -> Result<()> {
        let items = self.coerce_all(items, true)?;

        let mut updated = self.to_vec();
        let removed: Vec<Value> = updated.splice(range, items.iter().cloned()).collect();

        let changed = *self.0.items.borrow() != updated;
        self.set_modified(changed)?;
        *self.0.items.borrow_mut() = updated;

        self.unbind(removed);
        self.bind(&items);
        Ok(())
    }

    /// Registers the list as owner of the shared values among `items`.
    fn bind(&self, items: &[Value]) {
        for item in items {
            let handle: Weak<dyn Owner> = self.0.this.clone();
            item.add_owner(self.0.id, handle, None);
        }
    }

    /// Deregisters the list from removed shared values it no longer holds.
    fn unbind(&self, removed: Vec<Value>) {
        let items = self.0.items.borrow();

        for item in removed {
            if !items.iter().any(|current| current.same_instance(&item)) {
                item.remove_owner(self.0.id, None);
            }
        }
    }
}

fn repeated(items: &[Value], n: usize) -> Result<Vec<Value>> {
    let len = items.len();
    let too_long = || Error::index(format!("cannot repeat list of length {len} {n} times"));

    if len == 0 {
        return Ok(vec![]);
    }

    let total = len.checked_mul(n).ok_or_else(too_long)?;
    let mut repeated = Vec::new();
    repeated.try_reserve_exact(total).map_err(|_| too_long())?;

    for _ in 0..n {
        repeated.extend(items.iter().cloned());
    }
    Ok(repeated)
}

/// The exclusive position following the inclusive `bound`.
fn bound_after(bound: usize, len: usize) -> Result<usize> {
    bound.checked_add(1).ok_or_else(|| {
        Error::index(format!(
            "range bound {bound} out of range for list of length {len}"
        ))
    })
}

impl Drop for ListInner {
    fn drop(&mut self) {
        for item in self.items.get_mut().iter() {
            item.remove_owner(self.id, None);
        }
    }
}

impl Owner for ListInner {
    fn owner_id(&self) -> OwnerId {
        self.id
    }

    /// A change to an item is a change to the list.
    fn set_modified(&self, _name: Option<&str>, changed: bool, validate: bool) -> Result<()> {
        notify(&self.owners, changed, validate)
    }
}

impl PartialEq for ListValue {
    fn eq(&self, other: &ListValue) -> bool {
        self.ptr_eq(other) || *self.0.items.borrow() == *other.0.items.borrow()
    }
}

impl PartialEq<[Value]> for ListValue {
    fn eq(&self, other: &[Value]) -> bool {
        self.0.items.borrow().as_slice() == other
    }
}

impl PartialEq<Vec<Value>> for ListValue {
    fn eq(&self, other: &Vec<Value>) -> bool {
        self == other.as_slice()
    }
}

impl fmt::Debug for ListValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_list().entries(self.0.items.borrow().iter()).finish()
    }
}
