/// Marker wrapping a SQL fragment that is spliced verbatim into the compiled
/// statement instead of being bound as a parameter.
///
/// Used internally by the planner to synthesize join equalities
/// (`"top_level".id`) and available to callers that need a raw column
/// reference on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escape {
    pub fragment: String,
}

impl Escape {
    pub fn new(fragment: impl Into<String>) -> Escape {
        Escape {
            fragment: fragment.into(),
        }
    }
}
