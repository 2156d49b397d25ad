//! Record metadata: per-type descriptors mapping a record type to its table,
//! columns, and tagged nested fields.
//!
//! A descriptor is built once per record type (lazily, at first use) and the
//! engine's hot paths consume descriptors and their erased navigators rather
//! than concrete types.

mod builder;
pub use builder::DescriptorBuilder;

mod descriptor;
pub use descriptor::{Backref, ColumnDef, Descriptor, FieldShape, PathTarget, TaggedField};

/// Lowercased snake-case of a type name, the default table name.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}
