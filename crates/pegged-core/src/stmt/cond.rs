use crate::{Error, Result};

/// The closed set of predicate conditions.
///
/// `EQ` doubles as the `IN` condition when the bound value is a sequence;
/// parsing the human token `IN` therefore yields `EQ` and the compiler picks
/// the operator from the operand shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Eq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Between,
}

impl Cond {
    /// Fixed SQL operator for the condition.
    pub fn sql_op(self) -> &'static str {
        match self {
            Cond::Eq => "=",
            Cond::Lt => "<",
            Cond::LtEq => "<=",
            Cond::Gt => ">",
            Cond::GtEq => ">=",
            Cond::In => "IN",
            Cond::Between => "BETWEEN",
        }
    }
}

/// Splits a human predicate string `<FieldPath> <OP>` into its field path
/// and condition.
///
/// Symbolic operators may sit flush against the field (`Name=`); the `IN`
/// token is matched case-insensitively and requires whitespace before it so
/// a field name ending in `in` is never misread. `BETWEEN` has no string
/// form.
pub fn parse_query(query: &str) -> Result<(&str, Cond)> {
    let query = query.trim_end();

    // Word operators first: they need a separating space.
    if let Some((field, op)) = query.rsplit_once(char::is_whitespace) {
        if op.eq_ignore_ascii_case("in") {
            return Ok((field.trim_end(), Cond::Eq));
        }
    }

    for (token, cond) in [
        (">=", Cond::GtEq),
        ("<=", Cond::LtEq),
        ("=", Cond::Eq),
        (">", Cond::Gt),
        ("<", Cond::Lt),
    ] {
        if let Some(field) = query.strip_suffix(token) {
            let field = field.trim_end();
            if field.is_empty() || field.contains(char::is_whitespace) {
                return Err(Error::operator_parse(query));
            }
            return Ok((field, cond));
        }
    }

    Err(Error::operator_parse(query))
}
