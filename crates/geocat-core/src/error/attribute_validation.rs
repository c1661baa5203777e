use super::Error;

/// There was a problem validating an attribute.
///
/// Raised when:
/// - a readonly attribute is written
/// - an already-set immutable attribute is rewritten with a different value
/// - an immutable or readonly list is mutated
/// - a value cannot be coerced into the attribute's canonical form
///   (malformed timestamp or geometry, enum value outside its set, wrong
///   reference type, non-mapping for a mapping field, ...)
#[derive(Debug)]
pub(super) struct AttributeValidationError {
    message: Box<str>,
}

impl std::error::Error for AttributeValidationError {}

impl core::fmt::Display for AttributeValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Creates an attribute validation error.
    pub fn attribute_validation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AttributeValidation(
            AttributeValidationError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an attribute validation error.
    pub fn is_attribute_validation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AttributeValidation(_))
    }
}
