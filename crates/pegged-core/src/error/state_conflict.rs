use super::Error;

/// Error when a mutation conflicts with the ownership state already in the
/// database.
#[derive(Debug)]
pub(super) struct StateConflict {
    message: Box<str>,
}

impl std::error::Error for StateConflict {}

impl core::fmt::Display for StateConflict {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "state conflict: {}", self.message)
    }
}

impl Error {
    /// Creates the error raised when a pegged descendant carries a primary
    /// key that already exists in its table. Create aborts before any insert.
    pub fn pegged_id_exists(table: impl AsRef<str>) -> Error {
        Error::from(super::ErrorKind::StateConflict(StateConflict {
            message: format!(
                "pegged record id already exists in `{}`",
                table.as_ref()
            )
            .into(),
        }))
    }

    /// Creates the error raised when a peg-associated target is referenced
    /// but does not exist in its table.
    pub fn pegassoc_missing(table: impl AsRef<str>) -> Error {
        Error::from(super::ErrorKind::StateConflict(StateConflict {
            message: format!(
                "peg-associated record in `{}` does not exist",
                table.as_ref()
            )
            .into(),
        }))
    }
}
