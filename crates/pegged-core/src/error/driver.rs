use super::Error;

/// Error surfaced by the database driver, passed through verbatim.
#[derive(Debug)]
pub(super) enum DriverFailed {
    Source(Box<dyn std::error::Error + Send + Sync>),
    Message(Box<str>),
}

impl std::error::Error for DriverFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverFailed::Source(inner) => Some(inner.as_ref()),
            DriverFailed::Message(_) => None,
        }
    }
}

impl core::fmt::Display for DriverFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("driver error: ")?;
        match self {
            DriverFailed::Source(inner) => {
                core::fmt::Display::fmt(inner, f)?;
                let mut source = inner.source();
                while let Some(err) = source {
                    write!(f, ": {}", err)?;
                    source = err.source();
                }
                Ok(())
            }
            DriverFailed::Message(message) => f.write_str(message),
        }
    }
}

impl Error {
    /// Wraps a driver-specific error (rusqlite, postgres, ...) verbatim.
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Driver(DriverFailed::Source(Box::new(
            err,
        ))))
    }

    /// Wraps a driver-reported message without a source error.
    pub fn driver_msg(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Driver(DriverFailed::Message(
            message.into().into(),
        )))
    }
}
