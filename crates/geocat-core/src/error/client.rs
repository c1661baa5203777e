use super::Error;

/// Error from a catalog client implementation.
#[derive(Debug)]
pub(super) struct ClientError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a transport failure inside a `Client`.
    pub fn client(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Client(ClientError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error came from a `Client`.
    pub fn is_client(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Client(_))
    }
}
