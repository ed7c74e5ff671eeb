use crate::{
    Error,
    db::{
        ExecutionContext, Session,
        query::{QueryDescriptor, SortDescriptor, UpdateDescriptor},
        record::{RecordAccessor, RecordReader},
        store::{FetchRequest, Record, RecordStore, StoreContext, StorePredicate, StoreSort},
    },
    obs::sink::{self, ExecKind, MetricsEvent, Span},
    traits::EntityKind,
};
use std::marker::PhantomData;
use tracing::debug;

///
/// FetchQuery
///
/// Fluent fetch builder for entity `E`.
///
/// Accumulates one predicate, one sort and one limit, then runs a terminal
/// operation against a single resolved context. Reads default to the
/// session's read context and writes to its write context.
///

pub struct FetchQuery<'s, S: RecordStore, E: EntityKind> {
    session: &'s Session<S>,
    predicate: Option<StorePredicate>,
    sort: Option<StoreSort>,
    limit: Option<usize>,
    context: Option<ExecutionContext>,
    _marker: PhantomData<E>,
}

impl<'s, S: RecordStore, E: EntityKind> FetchQuery<'s, S, E> {
    pub(crate) const fn new(session: &'s Session<S>) -> Self {
        Self {
            session,
            predicate: None,
            sort: None,
            limit: None,
            context: None,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Replace the predicate with the conjunction of `descriptors`.
    /// Calling this twice keeps only the second set.
    #[must_use]
    pub fn query(mut self, descriptors: impl IntoIterator<Item = QueryDescriptor<E>>) -> Self {
        let clauses = descriptors
            .into_iter()
            .map(|descriptor| descriptor.to_predicate())
            .collect();
        self.predicate = Some(StorePredicate::and(clauses));
        self
    }

    /// Replace the predicate with a prebuilt store-native one.
    #[must_use]
    pub fn filter(mut self, predicate: StorePredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortDescriptor<E>) -> Self {
        self.sort = Some(sort.to_store_sort());
        self
    }

    /// Maximum result count; zero means unlimited.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn in_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub const fn limit_one(self) -> FetchOne<'s, S, E> {
        FetchOne {
            query: self,
            strict: false,
        }
    }

    /// Newest record by `date_key`.
    #[must_use]
    pub fn latest(self, date_key: E::Key) -> FetchOne<'s, S, E> {
        self.sort(SortDescriptor::descending(date_key)).limit_one()
    }

    /// Oldest record by `date_key`.
    #[must_use]
    pub fn earliest(self, date_key: E::Key) -> FetchOne<'s, S, E> {
        self.sort(SortDescriptor::ascending(date_key)).limit_one()
    }

    /// The store-native request this builder currently describes.
    #[must_use]
    pub fn request(&self) -> FetchRequest {
        FetchRequest {
            entity: E::ENTITY_NAME.to_string(),
            predicate: self.predicate.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
        }
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    pub fn fetch(self) -> Result<Vec<E>, Error> {
        self.session.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Load);
            let records = self.load(self.read_context(), &self.request())?;
            let entities = decode::<E>(&records);
            span.set_rows(entities.len());

            Ok(entities)
        })
    }

    /// Number of matching records, ignoring decode failures.
    pub fn count(self) -> Result<usize, Error> {
        self.session.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Load);
            let records = self.load(self.read_context(), &self.request())?;
            span.set_rows(records.len());

            Ok(records.len())
        })
    }

    pub fn exists(self) -> Result<bool, Error> {
        self.limit_one().exists()
    }

    /// Delete every matching record and persist; returns how many were
    /// deleted. Zero matches is not an error.
    pub fn delete(self) -> Result<usize, Error> {
        self.session.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Delete);
            let context = self.write_context();
            let store = self.session.resolver().resolve(context);

            let deleted = self.session.transact(store, |store| {
                let records = self.load(context, &self.request())?;
                for record in &records {
                    store.delete(record.id())?;
                }

                Ok(records.len())
            })?;
            span.set_rows(deleted);

            Ok(deleted)
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn read_context(&self) -> ExecutionContext {
        self.context.unwrap_or(self.session.config().read_context)
    }

    fn write_context(&self) -> ExecutionContext {
        self.context.unwrap_or(self.session.config().write_context)
    }

    fn load(
        &self,
        context: ExecutionContext,
        request: &FetchRequest,
    ) -> Result<Vec<Record>, Error> {
        if self.session.is_debug() {
            debug!(entity = E::ENTITY_NAME, %context, %request, "fetch");
        }

        let records = self.session.resolver().resolve(context).fetch(request)?;

        Ok(records)
    }
}

///
/// FetchOne
///
/// Single-result narrowing of a `FetchQuery`.
///
/// Relaxed by default: the first record the store ranks is returned and
/// uniqueness is not checked. `strict()` loads every match and fails with
/// `ElementNotUnique` when there is more than one.
///

pub struct FetchOne<'s, S: RecordStore, E: EntityKind> {
    query: FetchQuery<'s, S, E>,
    strict: bool,
}

impl<'s, S: RecordStore, E: EntityKind> FetchOne<'s, S, E> {
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub const fn in_context(mut self, context: ExecutionContext) -> Self {
        self.query.context = Some(context);
        self
    }

    #[must_use]
    pub fn request(&self) -> FetchRequest {
        let mut request = self.query.request();
        request.limit = if self.strict { None } else { Some(1) };

        request
    }

    pub fn fetch(self) -> Result<E, Error> {
        let session = self.query.session;

        session.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Load);
            let records = self.query.load(self.query.read_context(), &self.request())?;
            let entities = decode::<E>(&records);
            span.set_rows(entities.len());

            self.narrow(entities)
        })
    }

    /// Whether a fetch would succeed. Store failures propagate.
    pub fn exists(self) -> Result<bool, Error> {
        let session = self.query.session;

        session.with_metrics(|| {
            sink::record(MetricsEvent::ExistsCall {
                entity: E::ENTITY_NAME,
            });

            match self.fetch() {
                Ok(_) | Err(Error::ElementNotUnique { .. }) => Ok(true),
                Err(Error::ElementNotFound { .. }) => Ok(false),
                Err(err) => Err(err),
            }
        })
    }

    /// Apply every assignment to the located record and persist.
    pub fn update(self, updates: impl IntoIterator<Item = UpdateDescriptor<E>>) -> Result<(), Error> {
        let session = self.query.session;
        let updates: Vec<_> = updates.into_iter().collect();

        session.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Save);
            let context = self.query.write_context();
            let store = session.resolver().resolve(context);

            session.transact(store, |store| {
                let records = self.query.load(context, &self.request())?;
                let mut record = self.narrow(records)?;

                let mut accessor = RecordAccessor::<E>::new(&mut record);
                for update in &updates {
                    update.apply(&mut accessor);
                }
                store.stage(record)?;

                Ok(())
            })?;
            span.set_rows(1);

            Ok(())
        })
    }

    /// Delete the located record and persist.
    pub fn delete(self) -> Result<(), Error> {
        let session = self.query.session;

        session.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Delete);
            let context = self.query.write_context();
            let store = session.resolver().resolve(context);

            session.transact(store, |store| {
                let records = self.query.load(context, &self.request())?;
                let record = self.narrow(records)?;
                store.delete(record.id())?;

                Ok(())
            })?;
            span.set_rows(1);

            Ok(())
        })
    }

    fn narrow<T>(&self, mut found: Vec<T>) -> Result<T, Error> {
        match found.len() {
            0 => {
                sink::record(MetricsEvent::NotFound {
                    entity: E::ENTITY_NAME,
                });

                Err(Error::not_found::<E>())
            }
            n if self.strict && n > 1 => Err(Error::not_unique::<E>(n)),
            _ => Ok(found.swap_remove(0)),
        }
    }
}

/// Decode fetched records, skipping any `E::from_record` rejects.
pub(crate) fn decode<E: EntityKind>(records: &[Record]) -> Vec<E> {
    records
        .iter()
        .filter_map(|record| {
            let entity = E::from_record(&RecordReader::new(record));
            if entity.is_none() {
                debug!(entity = E::ENTITY_NAME, id = %record.id(), "skipping undecodable record");
            }

            entity
        })
        .collect()
}
