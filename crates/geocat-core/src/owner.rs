use crate::{Client, Result, Value};

use indexmap::IndexMap;
use tracing::trace;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Attribute values held by one object, keyed by attribute name.
pub type AttributeValues = IndexMap<String, Value>;

/// Stable identity of an object that can own nested values.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

impl OwnerId {
    /// Generate a unique owner id.
    ///
    /// Uses a global atomic counter, so ids are unique for the lifetime of the
    /// process.
    pub fn next() -> OwnerId {
        static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(0);

        OwnerId(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "OwnerId({})", self.0)
    }
}

/// Receives modification notices.
///
/// Catalog objects, mapping values and list values all implement this. A
/// notice is delivered *before* a change is committed, so returning an error
/// vetoes the change.
pub trait Owner {
    fn owner_id(&self) -> OwnerId;

    /// Called for every attempted change of the attribute `name`.
    ///
    /// `name` is `None` when the notice comes from an item of a list, where
    /// the position rather than a name identifies the item.
    fn set_modified(&self, name: Option<&str>, changed: bool, validate: bool) -> Result<()>;
}

/// An owner that stores attribute values, i.e. something attributes can be
/// read from and written to.
pub trait AttributeStore: Owner {
    /// Name of the type, used in error messages.
    fn type_name(&self) -> &str;

    fn values(&self) -> &RefCell<AttributeValues>;

    /// A non-owning handle to this object, registered with the nested values
    /// it holds.
    fn handle(&self) -> Weak<dyn Owner>;

    /// Client used to resolve references by id.
    fn client(&self) -> Option<Rc<dyn Client>> {
        None
    }
}

/// Reverse registry from a shared nested value to the objects holding it.
///
/// Entries are keyed by owner identity and the attribute name the owner
/// holds the value under, and never keep the owner alive. Entries of dropped
/// owners are not counted and are pruned on the next write.
#[derive(Default)]
pub(crate) struct Owners {
    entries: IndexMap<(OwnerId, Option<String>), Weak<dyn Owner>>,
}

impl Owners {
    pub(crate) fn insert(&mut self, id: OwnerId, owner: Weak<dyn Owner>, attribute: Option<&str>) {
        trace!(owner = ?id, attribute, "register owner");
        self.entries.retain(|_, owner| owner.strong_count() > 0);
        self.entries
            .insert((id, attribute.map(str::to_owned)), owner);
    }

    pub(crate) fn remove(&mut self, id: OwnerId, attribute: Option<&str>) -> bool {
        trace!(owner = ?id, attribute, "deregister owner");
        self.entries
            .shift_remove(&(id, attribute.map(str::to_owned)))
            .is_some()
    }

    pub(crate) fn contains(&self, id: OwnerId) -> bool {
        self.entries
            .iter()
            .any(|((owner, _), handle)| *owner == id && handle.strong_count() > 0)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|owner| owner.strong_count() > 0)
            .count()
    }

    /// Owners that are still alive, paired with the attribute name each one
    /// knows the value by. Dropped owners are pruned.
    fn live(&mut self) -> Vec<(Rc<dyn Owner>, Option<String>)> {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|(_, attribute), owner| match owner.upgrade() {
            Some(owner) => {
                live.push((owner, attribute.clone()));
                true
            }
            None => false,
        });
        live
    }
}

/// Replays a change on a shared value to every registered owner.
///
/// The registry borrow is released before any owner runs, so owners may read
/// or register against the value while handling the notice.
pub(crate) fn notify(owners: &RefCell<Owners>, changed: bool, validate: bool) -> Result<()> {
    let targets = owners.borrow_mut().live();
    trace!(owners = targets.len(), changed, "fan out modification");

    for (owner, attribute) in targets {
        owner.set_modified(attribute.as_deref(), changed, validate)?;
    }

    Ok(())
}
