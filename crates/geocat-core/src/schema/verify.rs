use super::Schema;
use crate::{Error, Result};

pub(super) struct Verify<'a> {
    pub(super) schema: &'a Schema,
}

impl Verify<'_> {
    pub(super) fn verify(&self) -> Result<()> {
        self.verify_references_have_id_fields()?;
        self.verify_id_fields_are_plain()?;
        Ok(())
    }

    fn verify_references_have_id_fields(&self) -> Result<()> {
        for attribute in self.schema.references.values() {
            let id_field = attribute.id_field();

            if !self.schema.attributes.contains_key(&id_field) {
                return Err(Error::invalid_schema(format!(
                    "{}: reference attribute `{}` has no `{id_field}` attribute",
                    self.schema.name,
                    attribute.name()
                )));
            }
        }

        Ok(())
    }

    fn verify_id_fields_are_plain(&self) -> Result<()> {
        for attribute in self.schema.references.values() {
            let id_field = attribute.id_field();

            if self.schema.references.contains_key(&id_field) {
                return Err(Error::invalid_schema(format!(
                    "{}: `{id_field}` shadows reference attribute `{}` and cannot itself be a reference",
                    self.schema.name,
                    attribute.name()
                )));
            }
        }

        Ok(())
    }
}
