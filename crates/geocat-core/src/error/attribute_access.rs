use super::Error;

/// An attribute was accessed that does not exist on the type, or was read
/// without an owning instance.
#[derive(Debug)]
pub(super) struct AttributeAccessError {
    message: Box<str>,
}

impl std::error::Error for AttributeAccessError {}

impl core::fmt::Display for AttributeAccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Creates an attribute access error.
    pub fn attribute_access(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AttributeAccess(AttributeAccessError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an attribute access error.
    pub fn is_attribute_access(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AttributeAccess(_))
    }
}
