use crate::{driver::Row, schema::Descriptor, stmt::Value, Result};

use jiff::Timestamp;
use std::any::Any;
use uuid::Uuid;

/// A record type the engine can store and traverse.
///
/// Implementations declare their [`Descriptor`] once (lazily, behind a
/// `LazyLock`) and expose scalar row serialization in both directions. The
/// primary key is a single opaque 128-bit identifier; `created_at` and
/// `updated_at` are stamped by the engine.
pub trait Record: Any + Send {
    /// The type's descriptor.
    fn descriptor() -> &'static Descriptor
    where
        Self: Sized;

    /// The descriptor, reachable through a trait object.
    fn desc(&self) -> &'static Descriptor;

    fn id(&self) -> Option<Uuid>;

    fn set_id(&mut self, id: Uuid);

    fn created_at(&self) -> Option<Timestamp>;

    fn set_created_at(&mut self, at: Timestamp);

    fn updated_at(&self) -> Option<Timestamp>;

    fn set_updated_at(&mut self, at: Timestamp);

    /// The record's scalar columns in declaration order, including the
    /// implicit id/timestamp columns and any back-pointer columns. Nested
    /// records are not part of the row.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Populates the scalar columns from a driver row.
    fn load_row(&mut self, row: &Row) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// The implicit columns every record carries. Record types embed a `Base`
/// as their `base` field and delegate the base accessors to it with
/// [`crate::impl_record_base!`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Base {
    pub id: Option<Uuid>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
}

impl Base {
    /// A base with a preset id, for records built by hand.
    pub fn with_id(id: Uuid) -> Base {
        Base {
            id: Some(id),
            ..Base::default()
        }
    }

    /// The base columns of a scalar row.
    pub fn row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
            ("deleted_at", self.deleted_at.into()),
        ]
    }

    /// Loads the base columns from a driver row.
    pub fn load(&mut self, row: &Row) -> Result<()> {
        self.id = row.get("id")?.to_uuid_opt()?;
        self.created_at = row.get("created_at")?.to_timestamp_opt()?;
        self.updated_at = row.get("updated_at")?.to_timestamp_opt()?;
        self.deleted_at = row.get("deleted_at")?.to_timestamp_opt()?;
        Ok(())
    }
}

/// Expands the [`Record`] accessors that every record type delegates to its
/// embedded [`Base`], plus the `Any` upcasts.
#[macro_export]
macro_rules! impl_record_base {
    () => {
        fn desc(&self) -> &'static $crate::schema::Descriptor {
            <Self as $crate::Record>::descriptor()
        }

        fn id(&self) -> Option<$crate::Uuid> {
            self.base.id
        }

        fn set_id(&mut self, id: $crate::Uuid) {
            self.base.id = Some(id);
        }

        fn created_at(&self) -> Option<$crate::Timestamp> {
            self.base.created_at
        }

        fn set_created_at(&mut self, at: $crate::Timestamp) {
            self.base.created_at = Some(at);
        }

        fn updated_at(&self) -> Option<$crate::Timestamp> {
            self.base.updated_at
        }

        fn set_updated_at(&mut self, at: $crate::Timestamp) {
            self.base.updated_at = Some(at);
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
            self
        }
    };
}
