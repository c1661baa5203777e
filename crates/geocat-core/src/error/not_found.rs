use super::Error;

/// The catalog service does not know the requested object.
#[derive(Debug)]
pub(super) struct NotFoundError {
    type_name: Box<str>,
    id: Box<str>,
}

impl std::error::Error for NotFoundError {}

impl core::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} '{}' not found", self.type_name, self.id)
    }
}

impl Error {
    /// Creates a not found error.
    pub fn not_found(type_name: &str, id: &str) -> Error {
        Error::from(super::ErrorKind::NotFound(NotFoundError {
            type_name: type_name.into(),
            id: id.into(),
        }))
    }

    /// Returns `true` if this error is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NotFound(_))
    }
}
