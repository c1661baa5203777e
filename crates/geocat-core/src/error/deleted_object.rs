use super::Error;

/// A catalog object was modified after it was deleted.
#[derive(Debug)]
pub(super) struct DeletedObjectError {
    type_name: Box<str>,
    id: Option<Box<str>>,
}

impl std::error::Error for DeletedObjectError {}

impl core::fmt::Display for DeletedObjectError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} '{}'", self.type_name, id)?,
            None => write!(f, "{}", self.type_name)?,
        }
        f.write_str(" has been deleted and can no longer be modified")
    }
}

impl Error {
    /// Creates a deleted object error.
    pub fn deleted_object(type_name: &str, id: Option<&str>) -> Error {
        Error::from(super::ErrorKind::DeletedObject(DeletedObjectError {
            type_name: type_name.into(),
            id: id.map(Into::into),
        }))
    }

    /// Returns `true` if this error is a deleted object error.
    pub fn is_deleted_object(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DeletedObject(_))
    }
}
