use super::Error;

/// Error when a single-row retrieval finds zero rows.
///
/// An empty result for a sequence target is not an error; only `first` and
/// `take` promote zero rows to this kind.
#[derive(Debug)]
pub(super) struct RecordNotFound;

impl std::error::Error for RecordNotFound {}

impl core::fmt::Display for RecordNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("record not found")
    }
}

impl Error {
    /// Creates a record-not-found error.
    pub fn not_found() -> Error {
        Error::from(super::ErrorKind::NotFound(RecordNotFound))
    }
}
