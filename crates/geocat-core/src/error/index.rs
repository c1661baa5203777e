use super::Error;

/// A list position was out of range, or a value was not present in a list.
#[derive(Debug)]
pub(super) struct IndexError {
    message: Box<str>,
}

impl std::error::Error for IndexError {}

impl core::fmt::Display for IndexError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error {
    /// Creates a list index error.
    pub fn index(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Index(IndexError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a list index error.
    pub fn is_index(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Index(_))
    }
}
