use super::Error;

/// Error when a driver value cannot be converted to the type a record field
/// expects.
#[derive(Debug)]
pub(super) struct InvalidTypeConversion {
    from: Box<str>,
    to: &'static str,
}

impl std::error::Error for InvalidTypeConversion {}

impl core::fmt::Display for InvalidTypeConversion {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "cannot convert {} to {}", self.from, self.to)
    }
}

impl Error {
    /// Creates a type conversion error from a value's variant name.
    pub fn type_conversion(from: impl AsRef<str>, to: &'static str) -> Error {
        Error::from(super::ErrorKind::TypeConversion(InvalidTypeConversion {
            from: from.as_ref().into(),
            to,
        }))
    }
}
