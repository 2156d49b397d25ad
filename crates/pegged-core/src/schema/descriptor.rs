use crate::{record::Record, stmt::Path, tag::RelationTag, Error, Result};

use uuid::Uuid;

/// Metadata for one record type: table name, scalar columns, and the ordered
/// list of tagged nested fields with their erased navigators.
pub struct Descriptor {
    pub(super) type_name: &'static str,
    pub(super) table: String,
    pub(super) columns: Vec<ColumnDef>,
    pub(super) tagged: Vec<TaggedField>,
    pub(super) new: Box<dyn Fn() -> Box<dyn Record> + Send + Sync>,
}

/// A scalar field and the SQL column it maps to.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub field: &'static str,
    pub column: &'static str,
}

/// The shape of a tagged nested field on the parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Embedded single record.
    Single,
    /// Optional single record.
    Optional,
    /// Sequence of records.
    Sequence,
}

/// Accessors for the back-pointer field a child record carries toward its
/// parent (`<parent_table>_id`). Present for `peg` and `pegassoc` fields.
pub struct Backref {
    pub(super) get: Box<dyn Fn(&dyn Record) -> Option<Uuid> + Send + Sync>,
    pub(super) set: Box<dyn Fn(&mut dyn Record, Option<Uuid>) + Send + Sync>,
}

impl Backref {
    pub fn get(&self, child: &dyn Record) -> Option<Uuid> {
        (self.get)(child)
    }

    pub fn set(&self, child: &mut dyn Record, id: Option<Uuid>) {
        (self.set)(child, id)
    }
}

/// A nested field carrying a relation tag, with navigators that let the
/// engine walk concrete records without knowing their types.
pub struct TaggedField {
    pub(super) name: &'static str,
    pub(super) tag: RelationTag,
    pub(super) shape: FieldShape,
    pub(super) target: fn() -> &'static Descriptor,
    pub(super) children: Box<dyn Fn(&dyn Record) -> Vec<&dyn Record> + Send + Sync>,
    pub(super) children_mut: Box<dyn Fn(&mut dyn Record) -> Vec<&mut dyn Record> + Send + Sync>,
    pub(super) attach: Box<dyn Fn(&mut dyn Record, Box<dyn Record>) + Send + Sync>,
    pub(super) backref: Option<Backref>,
}

impl TaggedField {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> &RelationTag {
        &self.tag
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// Descriptor of the nested record type.
    pub fn target(&self) -> &'static Descriptor {
        (self.target)()
    }

    /// The field's present children, in declaration order. Empty for an
    /// unset optional.
    pub fn children<'a>(&self, parent: &'a dyn Record) -> Vec<&'a dyn Record> {
        (self.children)(parent)
    }

    pub fn children_mut<'a>(&self, parent: &'a mut dyn Record) -> Vec<&'a mut dyn Record> {
        (self.children_mut)(parent)
    }

    /// Attaches a loaded child to the parent: replaces a single, fills an
    /// optional, appends to a sequence.
    pub fn attach(&self, parent: &mut dyn Record, child: Box<dyn Record>) {
        (self.attach)(parent, child)
    }

    /// Back-pointer accessors; `None` for many-to-many fields.
    pub fn backref(&self) -> Option<&Backref> {
        self.backref.as_ref()
    }
}

/// What a dotted field path resolves to.
pub enum PathTarget {
    /// A scalar column, aliased `"<table>"."<column>"` where `<table>`
    /// belongs to the record type at the path's parent prefix.
    Column {
        table: &'static str,
        column: &'static str,
    },
    /// A tagged nested record type, usable as a join anchor.
    Nested(&'static Descriptor),
}

impl Descriptor {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The SQL table backing this record type.
    pub fn table(&'static self) -> &'static str {
        &self.table
    }

    /// A fresh, empty instance of the record type.
    pub fn new_record(&self) -> Box<dyn Record> {
        (self.new)()
    }

    /// The SQL column for a scalar field, if declared.
    pub fn column_of(&self, field: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|def| def.field == field)
            .map(|def| def.column)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Ordered iteration over the tagged nested fields.
    pub fn tagged_fields(&self) -> impl Iterator<Item = &TaggedField> {
        self.tagged.iter()
    }

    /// Looks up a tagged field by its path-segment name.
    pub fn tagged(&self, name: &str) -> Option<&TaggedField> {
        self.tagged.iter().find(|tf| tf.name == name)
    }

    /// Walks a dotted field path. Every non-final segment must be a tagged
    /// field; the final segment is either a scalar column or a tagged field.
    pub fn resolve(&'static self, path: &Path) -> Result<PathTarget> {
        let mut current: &'static Descriptor = self;
        let segments = path.segments();

        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            if let Some(tagged) = current.tagged(segment) {
                if last {
                    return Ok(PathTarget::Nested(tagged.target()));
                }
                current = tagged.target();
            } else if last {
                let column = current
                    .column_of(segment)
                    .ok_or_else(|| Error::unknown_field(current.type_name, segment))?;
                return Ok(PathTarget::Column {
                    table: current.table(),
                    column,
                });
            } else {
                return Err(Error::unknown_field(current.type_name, segment));
            }
        }

        Err(Error::unknown_field(self.type_name, ""))
    }

    /// The descriptor reached by following a dotted prefix of tagged fields.
    pub fn descriptor_at(&'static self, prefix: &str) -> Result<&'static Descriptor> {
        if prefix.is_empty() {
            return Ok(self);
        }
        match self.resolve(&Path::parse(prefix))? {
            PathTarget::Nested(target) => Ok(target),
            PathTarget::Column { column, .. } => {
                Err(Error::unknown_field(self.type_name, column))
            }
        }
    }

    /// Every dotted path into tagged nested record types, parents before
    /// children. This is the eager-load list for retrieval terminals.
    pub fn nested_paths(&'static self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_nested_paths("", &mut out);
        out
    }

    fn collect_nested_paths(&'static self, prefix: &str, out: &mut Vec<String>) {
        for tagged in &self.tagged {
            let path = if prefix.is_empty() {
                tagged.name.to_owned()
            } else {
                format!("{prefix}.{}", tagged.name)
            };
            out.push(path.clone());
            tagged.target().collect_nested_paths(&path, out);
        }
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("tagged", &self.tagged.iter().map(|tf| tf.name).collect::<Vec<_>>())
            .finish()
    }
}
