use crate::db::Db;
use crate::engine::plan::{JoinGroup, Order, Projection, SelectPlan};
use crate::engine::{create, delete, load, save, update};

use pegged_core::{
    stmt::{
        Cond, Criteria, Escape, Logic, Path, Predicate, PredicateBuilder, PredicateRelation,
        Value,
    },
    Error, Record, Result,
};

/// A fluent query handle bound to a [`Db`].
///
/// Chained builders record the first error and no-op afterwards; the error
/// surfaces from the terminal's `Result`. Every terminal, successful or
/// not, resets the builder state (main group, join groups, ordering,
/// pagination), so a handle can be reused for the next chain.
pub struct Query<'db> {
    db: &'db Db,
    err: Option<Error>,
    main: Vec<PredicateRelation>,
    joins: Vec<JoinGroup>,
    order: Option<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

struct BuilderState {
    main: Vec<PredicateRelation>,
    joins: Vec<JoinGroup>,
    order: Option<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'db> Query<'db> {
    pub(crate) fn new(db: &'db Db) -> Query<'db> {
        Query {
            db,
            err: None,
            main: Vec::new(),
            joins: Vec::new(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    pub(crate) fn with_builders(
        db: &'db Db,
        builders: impl IntoIterator<Item = PredicateBuilder>,
    ) -> Query<'db> {
        let mut query = Query::new(db);
        for builder in builders {
            match builder.relation() {
                Ok(rel) => query.main.push(rel),
                Err(err) => {
                    query.record_err(err);
                    break;
                }
            }
        }
        query
    }

    /// Starts a fresh chain on the same database handle. The receiver is
    /// untouched, so one handle can serve many callers as long as each
    /// starts from `q`.
    pub fn q(&self, builders: impl IntoIterator<Item = PredicateBuilder>) -> Query<'db> {
        Query::with_builders(self.db, builders)
    }

    fn record_err(&mut self, err: Error) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Orders results by a top-level field of the root record. Calling it
    /// twice keeps the last value.
    pub fn order(mut self, field: &str, order: Order) -> Self {
        if self.err.is_some() {
            return self;
        }
        if self.order.is_some() {
            tracing::warn!(field, "query order already set");
        }
        if field.contains('.') {
            self.record_err(Error::dot_in_order(field));
            return self;
        }
        self.order = Some((field.to_owned(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        if self.limit.is_some() {
            tracing::warn!(limit, "query limit already set");
        }
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        if self.offset.is_some() {
            tracing::warn!(offset, "query offset already set");
        }
        self.offset = Some(offset);
        self
    }

    /// Adds an inner-join group on a foreign record type `J` whose table
    /// carries a back-pointer to `F` (usually the root). The join equality
    /// `J.<f_table>_id = "<f_table>".id` is synthesized unless the caller's
    /// first relation already scopes the joined table at the top level.
    pub fn inner_join<J: Record, F: Record>(
        mut self,
        builders: impl IntoIterator<Item = PredicateBuilder>,
    ) -> Self {
        if self.err.is_some() {
            return self;
        }
        let target = J::descriptor();
        let foreign = F::descriptor();

        let mut rels = Vec::new();
        for builder in builders {
            match builder.relation() {
                Ok(rel) => rels.push(rel),
                Err(err) => {
                    self.record_err(err);
                    return self;
                }
            }
        }

        let fk_pred = Predicate {
            path: Path::parse(&format!("{}_id", foreign.table())),
            cond: Cond::Eq,
            operand: Escape::new(format!("\"{}\".id", foreign.table())).into(),
        };
        let merge_into_first = rels
            .first()
            .is_some_and(|first| !first.contains_dotted_path());
        if merge_into_first {
            rels[0].push(Logic::And, Criteria::Pred(fk_pred));
        } else {
            rels.push(PredicateRelation::single(fk_pred));
        }

        self.joins.push(JoinGroup { target, rels });
        self
    }

    /// Takes the builder state out, leaving the handle reset, and surfaces
    /// any recorded error. Runs for every terminal.
    fn finish(&mut self) -> Result<BuilderState> {
        let state = BuilderState {
            main: std::mem::take(&mut self.main),
            joins: std::mem::take(&mut self.joins),
            order: self.order.take(),
            limit: self.limit.take(),
            offset: self.offset.take(),
        };
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }

    /// Renders the select statement the current chain would execute.
    /// Consumes the builder state like any terminal.
    pub fn render_select<T: Record>(&mut self) -> Result<(String, Vec<Value>)> {
        let state = self.finish()?;
        state.plan::<T>().render(Projection::Rows)
    }

    /// Fetches the first matching record, eagerly loading every nested
    /// path. Zero rows is a [not-found error](Error::not_found).
    pub fn first<T: Record + Default>(&mut self) -> Result<T> {
        let state = self.finish()?;
        self.fetch_one::<T>(state)
    }

    /// Fetches one matching record; behaves like [`Query::first`].
    pub fn take<T: Record + Default>(&mut self) -> Result<T> {
        let state = self.finish()?;
        self.fetch_one::<T>(state)
    }

    fn fetch_one<T: Record + Default>(&self, mut state: BuilderState) -> Result<T> {
        state.limit = Some(1);
        let (sql, params) = state.plan::<T>().render(Projection::Rows)?;
        let rows = self.db.query_rows(sql, params)?;
        let row = rows.first().ok_or_else(Error::not_found)?;

        let mut record = T::default();
        record.load_row(row)?;
        load::preload(self.db, T::descriptor(), &mut [&mut record as &mut dyn Record])?;
        Ok(record)
    }

    /// Fetches every matching record, eagerly loading every nested path.
    /// An empty result is not an error.
    pub fn find<T: Record + Default>(&mut self) -> Result<Vec<T>> {
        let state = self.finish()?;
        let (sql, params) = state.plan::<T>().render(Projection::Rows)?;
        let rows = self.db.query_rows(sql, params)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = T::default();
            record.load_row(row)?;
            records.push(record);
        }
        let mut refs: Vec<&mut dyn Record> = records
            .iter_mut()
            .map(|record| record as &mut dyn Record)
            .collect();
        load::preload(self.db, T::descriptor(), &mut refs)?;
        Ok(records)
    }

    /// Counts matching rows with `SELECT COUNT(*)`.
    pub fn count<T: Record>(&mut self) -> Result<u64> {
        let state = self.finish()?;
        let (sql, params) = state.plan::<T>().render(Projection::Count)?;
        self.db.query_count(sql, params)
    }

    /// Creates the record together with its nested records.
    pub fn create<T: Record>(&mut self, record: &mut T) -> Result<()> {
        self.finish()?;
        create::create(self.db, &mut [record as &mut dyn Record])
    }

    /// Creates a same-typed batch together with every record's nested
    /// records.
    pub fn create_many<T: Record>(&mut self, records: &mut [T]) -> Result<()> {
        self.finish()?;
        let mut refs: Vec<&mut dyn Record> = records
            .iter_mut()
            .map(|record| record as &mut dyn Record)
            .collect();
        create::create(self.db, &mut refs)
    }

    /// Saves a fully materialized record, reconciling its nested records
    /// against the stored version. Saves on one handle are serialized.
    pub fn save<T: Record + Default>(&mut self, record: &mut T) -> Result<()> {
        let _guard = self
            .db
            .save_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.finish()?;
        save::save(self.db, record)
    }

    /// Deletes the record, scoped by the chain's predicates when present,
    /// by the record's id otherwise.
    pub fn delete<T: Record>(&mut self, record: &T) -> Result<()> {
        let state = self.finish()?;
        delete::delete(self.db, record, &state.main)
    }

    /// Deletes a same-typed batch by id.
    pub fn delete_many<T: Record>(&mut self, records: &[T]) -> Result<()> {
        self.finish()?;
        let refs: Vec<&dyn Record> = records.iter().map(|record| record as &dyn Record).collect();
        delete::delete_many(self.db, &refs)
    }

    /// Updates root-table columns in place: the chain's predicates scope
    /// the rows, `set` names the columns (flat `EQ` predicates only).
    pub fn update<T: Record>(&mut self, set: PredicateBuilder) -> Result<()> {
        let state = self.finish()?;
        let set = set.relation()?;
        update::update(self.db, T::descriptor(), &state.main, &set)
    }

    /// The recorded error, if any, clearing it. Terminals already surface
    /// errors through their `Result`; this is for inspecting a chain before
    /// any terminal runs.
    pub fn err(&mut self) -> Option<Error> {
        self.err.take()
    }
}

impl BuilderState {
    fn plan<T: Record>(&self) -> SelectPlan<'_> {
        SelectPlan {
            root: T::descriptor(),
            main: &self.main,
            joins: &self.joins,
            order: self.order.as_ref(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Convenience entry point mirroring `Db::q`, so call sites read
/// `q(&db, c("age >", 20)).find()`.
pub fn q<'db>(
    db: &'db Db,
    builders: impl IntoIterator<Item = PredicateBuilder>,
) -> Query<'db> {
    db.q(builders)
}
