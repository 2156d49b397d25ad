use super::Error;

/// Error when the record metadata cannot resolve a name.
///
/// This occurs when:
/// - A field path segment does not exist on the record type it is resolved
///   against
/// - A table name is referenced that no descriptor declares
/// - A per-field annotation string is not part of the closed tag set
#[derive(Debug)]
pub(super) struct SchemaInvalid {
    message: Box<str>,
}

impl std::error::Error for SchemaInvalid {}

impl core::fmt::Display for SchemaInvalid {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an unknown-field error for a path segment that does not
    /// resolve on the given record type.
    pub fn unknown_field(record: impl AsRef<str>, field: impl AsRef<str>) -> Error {
        Error::from(super::ErrorKind::Schema(SchemaInvalid {
            message: format!(
                "no field `{}` on record type `{}`",
                field.as_ref(),
                record.as_ref()
            )
            .into(),
        }))
    }

    /// Creates an unknown-table error.
    pub fn unknown_table(table: impl AsRef<str>) -> Error {
        Error::from(super::ErrorKind::Schema(SchemaInvalid {
            message: format!("no record type maps to table `{}`", table.as_ref()).into(),
        }))
    }

    /// Creates an ill-formed-annotation error.
    pub fn invalid_annotation(annotation: impl AsRef<str>) -> Error {
        Error::from(super::ErrorKind::Schema(SchemaInvalid {
            message: format!("ill-formed relation annotation `{}`", annotation.as_ref()).into(),
        }))
    }
}
