use std::fmt;

/// A dotted field-path designator, e.g. `dogs.dog_toys.toy_name`.
///
/// Each segment names a field on the record type reached at that prefix. A
/// valid path ends either at a scalar column (usable in predicates) or at a
/// tagged nested field (usable as a join anchor).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Splits a dotted designator into segments.
    pub fn parse(raw: &str) -> Path {
        Path {
            segments: raw.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the path descends into nested record types.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    pub fn last(&self) -> &str {
        self.segments.last().expect("path has at least one segment")
    }

    /// The path minus its final segment: the join anchor this path attaches
    /// to. Empty string for a top-level field.
    pub fn anchor(&self) -> String {
        self.segments[..self.segments.len() - 1].join(".")
    }

    /// Every proper prefix of the path, shallowest first. For `a.b.c` this
    /// is `a` and `a.b`: the join chain the planner must establish.
    pub fn prefixes(&self) -> impl Iterator<Item = String> + '_ {
        (1..self.segments.len()).map(|end| self.segments[..end].join("."))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Path {
        Path::parse(raw)
    }
}
