use super::{snake_case, Backref, ColumnDef, Descriptor, FieldShape, TaggedField};
use crate::{record::Record, tag};

use uuid::Uuid;

/// Builds a [`Descriptor`] for one record type.
///
/// Record schemas are defined statically, so an ill-formed annotation is a
/// programming error: the builder panics with the schema error at first use
/// rather than threading a `Result` through every descriptor.
///
/// Every record implicitly carries the `id`, `created_at`, `updated_at`, and
/// `deleted_at` columns; `field`/`field_as` declare the rest.
pub struct DescriptorBuilder {
    type_name: &'static str,
    table: Option<String>,
    columns: Vec<ColumnDef>,
    tagged: Vec<TaggedField>,
}

impl Descriptor {
    pub fn builder(type_name: &'static str) -> DescriptorBuilder {
        let columns = ["id", "created_at", "updated_at", "deleted_at"]
            .into_iter()
            .map(|name| ColumnDef {
                field: name,
                column: name,
            })
            .collect();

        DescriptorBuilder {
            type_name,
            table: None,
            columns,
            tagged: Vec::new(),
        }
    }
}

impl DescriptorBuilder {
    /// Overrides the default snake-cased table name.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Declares a scalar field whose column shares its name.
    pub fn field(self, field: &'static str) -> Self {
        self.field_as(field, field)
    }

    /// Declares a scalar field with an explicit column name.
    pub fn field_as(mut self, field: &'static str, column: &'static str) -> Self {
        self.columns.push(ColumnDef { field, column });
        self
    }

    /// Declares an embedded single nested field.
    pub fn one<P: Record, C: Record>(
        mut self,
        name: &'static str,
        annotation: &str,
        get: fn(&P) -> &C,
        get_mut: fn(&mut P) -> &mut C,
        backref_get: fn(&C) -> Option<Uuid>,
        backref_set: fn(&mut C, Option<Uuid>),
    ) -> Self {
        let Some(tag) = parse_annotation(annotation) else {
            return self;
        };
        self.tagged.push(TaggedField {
            name,
            tag,
            shape: FieldShape::Single,
            target: C::descriptor,
            children: Box::new(move |p| vec![get(downcast::<P>(p)) as &dyn Record]),
            children_mut: Box::new(move |p| {
                vec![get_mut(downcast_mut::<P>(p)) as &mut dyn Record]
            }),
            attach: Box::new(move |p, c| *get_mut(downcast_mut::<P>(p)) = *downcast_owned::<C>(c)),
            backref: Some(erase_backref(backref_get, backref_set)),
        });
        self
    }

    /// Declares an optional single nested field.
    pub fn opt<P: Record, C: Record>(
        mut self,
        name: &'static str,
        annotation: &str,
        get: fn(&P) -> &Option<C>,
        get_mut: fn(&mut P) -> &mut Option<C>,
        backref_get: fn(&C) -> Option<Uuid>,
        backref_set: fn(&mut C, Option<Uuid>),
    ) -> Self {
        let Some(tag) = parse_annotation(annotation) else {
            return self;
        };
        self.tagged.push(TaggedField {
            name,
            tag,
            shape: FieldShape::Optional,
            target: C::descriptor,
            children: Box::new(move |p| {
                get(downcast::<P>(p))
                    .as_ref()
                    .map(|c| c as &dyn Record)
                    .into_iter()
                    .collect()
            }),
            children_mut: Box::new(move |p| {
                get_mut(downcast_mut::<P>(p))
                    .as_mut()
                    .map(|c| c as &mut dyn Record)
                    .into_iter()
                    .collect()
            }),
            attach: Box::new(move |p, c| {
                *get_mut(downcast_mut::<P>(p)) = Some(*downcast_owned::<C>(c))
            }),
            backref: Some(erase_backref(backref_get, backref_set)),
        });
        self
    }

    /// Declares a sequence nested field.
    pub fn many<P: Record, C: Record>(
        mut self,
        name: &'static str,
        annotation: &str,
        get: fn(&P) -> &Vec<C>,
        get_mut: fn(&mut P) -> &mut Vec<C>,
        backref_get: fn(&C) -> Option<Uuid>,
        backref_set: fn(&mut C, Option<Uuid>),
    ) -> Self {
        let Some(tag) = parse_annotation(annotation) else {
            return self;
        };
        self.tagged.push(TaggedField {
            name,
            tag,
            shape: FieldShape::Sequence,
            target: C::descriptor,
            children: sequence_children(get),
            children_mut: sequence_children_mut(get_mut),
            attach: Box::new(move |p, c| {
                get_mut(downcast_mut::<P>(p)).push(*downcast_owned::<C>(c))
            }),
            backref: Some(erase_backref(backref_get, backref_set)),
        });
        self
    }

    /// Declares a many-to-many sequence field. Link rows are the only thing
    /// the engine manages for these, so there is no back-pointer.
    pub fn many_linked<P: Record, C: Record>(
        mut self,
        name: &'static str,
        annotation: &str,
        get: fn(&P) -> &Vec<C>,
        get_mut: fn(&mut P) -> &mut Vec<C>,
    ) -> Self {
        let Some(tag) = parse_annotation(annotation) else {
            return self;
        };
        self.tagged.push(TaggedField {
            name,
            tag,
            shape: FieldShape::Sequence,
            target: C::descriptor,
            children: sequence_children(get),
            children_mut: sequence_children_mut(get_mut),
            attach: Box::new(move |p, c| {
                get_mut(downcast_mut::<P>(p)).push(*downcast_owned::<C>(c))
            }),
            backref: None,
        });
        self
    }

    pub fn build<T: Record + Default>(self) -> Descriptor {
        Descriptor {
            type_name: self.type_name,
            table: self
                .table
                .unwrap_or_else(|| snake_case(self.type_name)),
            columns: self.columns,
            tagged: self.tagged,
            new: Box::new(|| Box::new(T::default())),
        }
    }
}

/// Parses a field annotation, skipping ignored fields.
fn parse_annotation(annotation: &str) -> Option<tag::RelationTag> {
    let tag = tag::parse(annotation)
        .unwrap_or_else(|err| panic!("record schema: {err}"));
    match tag {
        tag::RelationTag::Ignore => None,
        other => Some(other),
    }
}

fn erase_backref<C: Record>(
    get: fn(&C) -> Option<Uuid>,
    set: fn(&mut C, Option<Uuid>),
) -> Backref {
    Backref {
        get: Box::new(move |c| get(downcast::<C>(c))),
        set: Box::new(move |c, id| set(downcast_mut::<C>(c), id)),
    }
}

fn sequence_children<P: Record, C: Record>(
    get: fn(&P) -> &Vec<C>,
) -> Box<dyn Fn(&dyn Record) -> Vec<&dyn Record> + Send + Sync> {
    Box::new(move |p| {
        get(downcast::<P>(p))
            .iter()
            .map(|c| c as &dyn Record)
            .collect()
    })
}

fn sequence_children_mut<P: Record, C: Record>(
    get_mut: fn(&mut P) -> &mut Vec<C>,
) -> Box<dyn Fn(&mut dyn Record) -> Vec<&mut dyn Record> + Send + Sync> {
    Box::new(move |p| {
        get_mut(downcast_mut::<P>(p))
            .iter_mut()
            .map(|c| c as &mut dyn Record)
            .collect()
    })
}

fn downcast<T: Record>(record: &dyn Record) -> &T {
    record
        .as_any()
        .downcast_ref::<T>()
        .expect("record schema: navigator applied to a record of the wrong type")
}

fn downcast_mut<T: Record>(record: &mut dyn Record) -> &mut T {
    record
        .as_any_mut()
        .downcast_mut::<T>()
        .expect("record schema: navigator applied to a record of the wrong type")
}

fn downcast_owned<T: Record>(record: Box<dyn Record>) -> Box<T> {
    record
        .into_any()
        .downcast::<T>()
        .unwrap_or_else(|_| panic!("record schema: navigator applied to a record of the wrong type"))
}
