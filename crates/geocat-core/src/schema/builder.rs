use super::Schema;
use crate::Attribute;

use indexmap::IndexMap;
use std::sync::Arc;

/// Collects the attributes of a type and merges in the schemas it inherits.
///
/// ```
/// use geocat_core::{Attribute, Schema};
///
/// let base = Schema::builder("base")
///     .attribute("id", Attribute::new().immutable())
///     .build();
///
/// let band = Schema::builder("band")
///     .attribute("name", Attribute::new())
///     .inherit(&base)
///     .build();
///
/// assert_eq!(band.attributes().collect::<Vec<_>>(), ["name", "id"]);
/// ```
#[derive(Debug)]
pub struct Builder {
    name: String,

    /// Attributes declared by the type itself
    own: IndexMap<String, Attribute>,

    /// Inherited schemas, in resolution order
    bases: Vec<Arc<Schema>>,

    /// When false, inherited attributes are hidden from documentation
    inherit_docs: bool,
}

impl Builder {
    pub(super) fn new(name: impl Into<String>) -> Builder {
        Builder {
            name: name.into(),
            own: IndexMap::new(),
            bases: vec![],
            inherit_docs: true,
        }
    }

    /// Declares an attribute, binding it to `name`. A later declaration of
    /// the same name replaces the earlier one.
    pub fn attribute(mut self, name: impl Into<String>, mut attribute: Attribute) -> Builder {
        let name = name.into();
        attribute.bind(&name);
        self.own.insert(name, attribute);
        self
    }

    /// Inherits the attributes of `base`.
    ///
    /// Names declared by the type itself, or by a base added earlier, win
    /// over those of `base`.
    pub fn inherit(mut self, base: &Arc<Schema>) -> Builder {
        self.bases.push(base.clone());
        self
    }

    /// Hides inherited attributes from [`Schema::documented_attributes`].
    /// The schema itself still contains them.
    pub fn no_inherit(mut self) -> Builder {
        self.inherit_docs = false;
        self
    }

    pub fn build(self) -> Arc<Schema> {
        let mut attributes = self.own;
        let mut documented: Vec<String> = attributes.keys().cloned().collect();

        for base in &self.bases {
            for (name, attribute) in &base.attributes {
                if attributes.contains_key(name) {
                    continue;
                }
                attributes.insert(name.clone(), attribute.clone());

                if self.inherit_docs {
                    documented.push(name.clone());
                }
            }
        }

        // Tracked after merging, so a reference shadowed by a plain
        // declaration is not a reference of this type.
        let references = attributes
            .iter()
            .filter(|(_, attribute)| attribute.ty().is_reference())
            .map(|(name, attribute)| (name.clone(), attribute.clone()))
            .collect();

        Schema::new(self.name, attributes, references, documented)
    }
}
