mod driver;
mod not_found;
mod predicate;
mod schema;
mod state_conflict;
mod type_conversion;
mod unscoped;

use driver::DriverFailed;
use not_found::RecordNotFound;
use predicate::PredicateInvalid;
use schema::SchemaInvalid;
use state_conflict::StateConflict;
use std::sync::Arc;
use type_conversion::InvalidTypeConversion;
use unscoped::UnscopedDelete;

/// An error that can occur in the pegged access layer.
///
/// The set of error kinds is closed: schema resolution, predicate
/// construction/compilation, ownership state conflicts, unscoped deletes,
/// driver failures, type conversions, and missing records.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    Schema(SchemaInvalid),
    Predicate(PredicateInvalid),
    StateConflict(StateConflict),
    Unscoped(UnscopedDelete),
    Driver(DriverFailed),
    TypeConversion(InvalidTypeConversion),
    NotFound(RecordNotFound),
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, ending with the root cause.
    pub fn context(self, consequent: Error) -> Error {
        let mut err = consequent;
        let inner = Arc::get_mut(&mut err.inner).expect("consequent error must be freshly built");
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        inner.cause = Some(self);
        err
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }

    /// True if the error (or any cause) is a missing-record error.
    pub fn is_not_found(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), ErrorKind::NotFound(_)))
    }

    /// True if the error is an ownership state conflict (pegged id already
    /// present, or peg-associated target missing).
    pub fn is_state_conflict(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), ErrorKind::StateConflict(_)))
    }

    /// True if the error is a schema resolution failure.
    pub fn is_schema(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), ErrorKind::Schema(_)))
    }

    /// True if the error is a predicate construction or compilation failure.
    pub fn is_predicate(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), ErrorKind::Predicate(_)))
    }

    /// True if the error is an unscoped-delete rejection.
    pub fn is_unscoped(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), ErrorKind::Unscoped(_)))
    }

    /// True if the error was surfaced by the database driver.
    pub fn is_driver(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), ErrorKind::Driver(_)))
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Schema(err) => core::fmt::Display::fmt(err, f),
            Predicate(err) => core::fmt::Display::fmt(err, f),
            StateConflict(err) => core::fmt::Display::fmt(err, f),
            Unscoped(err) => core::fmt::Display::fmt(err, f),
            Driver(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
            NotFound(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}
