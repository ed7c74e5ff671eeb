use crate::{
    Error,
    db::{
        ExecutionContext,
        config::SessionConfig,
        context::ContextResolver,
        query::{Comparison, FetchQuery, QueryDescriptor, SortDescriptor, Sorting, UpdateDescriptor},
        record::RecordAccessor,
        store::{RecordId, RecordStore, StoreContext},
    },
    key::resolve_key,
    obs::sink::{self, ExecKind, MetricsEvent, MetricsSink, Span, with_metrics_sink},
    traits::{EntityKind, Identifiable},
    types::{DateRange, Timestamp, Urn},
};
use std::{rc::Rc, time::Duration};
use tracing::{debug, warn};

///
/// Upserted
/// Which branch an insert-or-update took.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Upserted {
    Inserted(RecordId),
    Updated,
}

///
/// RangeQuery
///
/// Date-bounded fetch: `start <= date <= end`, sorted on the same key.
/// An open range ends now, order defaults to oldest first, and the key
/// defaults to the entity's date key.
///

pub struct RangeQuery<E: EntityKind> {
    pub range: DateRange,
    pub ascending: bool,
    pub key: Option<E::Key>,
    pub query: Vec<QueryDescriptor<E>>,
}

impl<E: EntityKind> RangeQuery<E> {
    #[must_use]
    pub const fn new(range: DateRange) -> Self {
        Self {
            range,
            ascending: true,
            key: None,
            query: Vec::new(),
        }
    }

    #[must_use]
    pub const fn since(start: Timestamp) -> Self {
        Self::new(DateRange::since(start))
    }

    /// The trailing window ending now.
    #[must_use]
    pub fn last(duration: Duration) -> Self {
        Self::new(DateRange::last(duration))
    }

    #[must_use]
    pub const fn until(mut self, end: Timestamp) -> Self {
        self.range.end = Some(end);
        self
    }

    #[must_use]
    pub const fn newest_first(mut self) -> Self {
        self.ascending = false;
        self
    }

    #[must_use]
    pub fn key(mut self, key: E::Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Extra descriptors ANDed after the two date bounds.
    #[must_use]
    pub fn query(mut self, descriptors: impl IntoIterator<Item = QueryDescriptor<E>>) -> Self {
        self.query.extend(descriptors);
        self
    }
}

///
/// Session
///
/// Session-scoped store handle with policy (debug, metrics) and the
/// multi-step mutations: insert, upsert, insert-unique, update and delete.
///
/// Check-then-act operations hold the resolver's write gate across both
/// store calls, so callers sharing one session never interleave between the
/// check and the write. Writers going through another session or another
/// store handle are not covered.
///
/// Plain writes (`insert`, `update`, `delete`) do not take the gate. A
/// failed save rolls back every pending change on its context, including
/// changes another thread staged there, so callers that share one context
/// across threads must serialize those writes themselves.
///

pub struct Session<S: RecordStore> {
    resolver: ContextResolver<S>,
    config: SessionConfig,
    metrics: Option<&'static (dyn MetricsSink + Sync)>,
}

impl<S: RecordStore> Session<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    #[must_use]
    pub const fn with_config(store: S, config: SessionConfig) -> Self {
        Self {
            resolver: ContextResolver::new(store),
            config,
            metrics: None,
        }
    }

    /// Enable debug logging for subsequent operations in this session.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static (dyn MetricsSink + Sync)) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn resolver(&self) -> &ContextResolver<S> {
        &self.resolver
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        self.resolver.store()
    }

    // ---------------------------------------------------------------------
    // Query entry point
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn fetch<E: EntityKind>(&self) -> FetchQuery<'_, S, E> {
        FetchQuery::new(self)
    }

    /// Fetch the one record whose identifier field equals `urn`.
    pub fn fetch_by_urn<E: Identifiable>(
        &self,
        urn: &Urn,
        context: ExecutionContext,
    ) -> Result<E, Error> {
        self.fetch_by_urn_with_key(urn, None, context)
    }

    pub fn fetch_by_urn_with_key<E: Identifiable>(
        &self,
        urn: &Urn,
        key: Option<E::Key>,
        context: ExecutionContext,
    ) -> Result<E, Error> {
        let key = self.identifier_key::<E>(key)?;

        self.fetch::<E>()
            .query([QueryDescriptor::urn(key, urn)])
            .in_context(context)
            .limit_one()
            .fetch()
    }

    pub fn fetch_range<E: EntityKind>(
        &self,
        range: RangeQuery<E>,
        context: ExecutionContext,
    ) -> Result<Vec<E>, Error> {
        let key = self.date_key::<E>(range.key)?;
        let (start, end) = (range.range.start, range.range.resolved_end());
        let sorting = if range.ascending {
            Sorting::Ascending
        } else {
            Sorting::Descending
        };

        let mut descriptors = vec![
            QueryDescriptor::date(key, Comparison::Gte, &start),
            QueryDescriptor::date(key, Comparison::Lte, &end),
        ];
        descriptors.extend(range.query);

        self.fetch::<E>()
            .query(descriptors)
            .sort(SortDescriptor::new(key, sorting))
            .in_context(context)
            .fetch()
    }

    /// Newest record by the entity's date key.
    pub fn fetch_latest<E: EntityKind>(&self, context: ExecutionContext) -> Result<E, Error> {
        self.fetch_latest_by(None, context)
    }

    pub fn fetch_latest_by<E: EntityKind>(
        &self,
        key: Option<E::Key>,
        context: ExecutionContext,
    ) -> Result<E, Error> {
        let key = self.date_key::<E>(key)?;

        self.fetch::<E>().latest(key).in_context(context).fetch()
    }

    // ---------------------------------------------------------------------
    // Inserts
    // ---------------------------------------------------------------------

    pub fn insert<E: EntityKind>(
        &self,
        entity: &E,
        context: ExecutionContext,
    ) -> Result<RecordId, Error> {
        self.insert_with(entity, &[], context)
    }

    /// Insert every entity and persist them with one save.
    pub fn insert_many<E: EntityKind>(
        &self,
        entities: &[E],
        context: ExecutionContext,
    ) -> Result<Vec<RecordId>, Error> {
        self.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Save);
            let store = self.resolver.resolve(context);

            let ids = self.transact(store, |store| {
                entities
                    .iter()
                    .map(|entity| stage_new(store, entity, &[]))
                    .collect::<Result<Vec<_>, _>>()
            })?;
            span.set_rows(ids.len());

            Ok(ids)
        })
    }

    /// Update the record sharing `entity`'s identifier, or insert `entity`
    /// when there is none.
    ///
    /// `updates` are applied on both branches, so repeating the call with
    /// the same arguments leaves the record unchanged.
    pub fn insert_or_update<E: Identifiable>(
        &self,
        entity: &E,
        updates: impl IntoIterator<Item = UpdateDescriptor<E>>,
        context: ExecutionContext,
    ) -> Result<Upserted, Error> {
        let key = self.identifier_key::<E>(None)?;

        self.insert_or_update_where(
            entity,
            [QueryDescriptor::urn(key, entity.urn())],
            updates,
            context,
        )
    }

    /// Insert-or-update matched by an arbitrary predicate.
    pub fn insert_or_update_where<E: EntityKind>(
        &self,
        entity: &E,
        selectors: impl IntoIterator<Item = QueryDescriptor<E>>,
        updates: impl IntoIterator<Item = UpdateDescriptor<E>>,
        context: ExecutionContext,
    ) -> Result<Upserted, Error> {
        let updates: Vec<_> = updates.into_iter().collect();
        let _gate = self.resolver.write_gate();

        let outcome = self
            .fetch::<E>()
            .query(selectors)
            .in_context(context)
            .limit_one()
            .update(updates.iter().cloned());

        match outcome {
            Ok(()) => Ok(Upserted::Updated),
            Err(err) if err.is_not_found() => self
                .insert_with(entity, &updates, context)
                .map(Upserted::Inserted),
            Err(err) => Err(err),
        }
    }

    /// Insert `entity` unless a record with its identifier already exists.
    pub fn insert_unique<E: Identifiable>(
        &self,
        entity: &E,
        context: ExecutionContext,
    ) -> Result<RecordId, Error> {
        self.insert_unique_by(entity, None, context)
    }

    pub fn insert_unique_by<E: Identifiable>(
        &self,
        entity: &E,
        key: Option<E::Key>,
        context: ExecutionContext,
    ) -> Result<RecordId, Error> {
        let key = self.identifier_key::<E>(key)?;

        self.insert_unique_where(entity, [QueryDescriptor::urn(key, entity.urn())], context)
    }

    /// Insert `entity` unless some record matches `query`.
    pub fn insert_unique_where<E: EntityKind>(
        &self,
        entity: &E,
        query: impl IntoIterator<Item = QueryDescriptor<E>>,
        context: ExecutionContext,
    ) -> Result<RecordId, Error> {
        let _gate = self.resolver.write_gate();

        let exists = self
            .fetch::<E>()
            .query(query)
            .in_context(context)
            .exists()?;
        if exists {
            self.with_metrics(|| {
                sink::record(MetricsEvent::UniqueViolation {
                    entity: E::ENTITY_NAME,
                });
            });

            return Err(Error::already_exists::<E>());
        }

        self.insert(entity, context)
    }

    // ---------------------------------------------------------------------
    // Updates and deletes
    // ---------------------------------------------------------------------

    /// Update the record sharing `entity`'s identifier.
    pub fn update<E: Identifiable>(
        &self,
        entity: &E,
        updates: impl IntoIterator<Item = UpdateDescriptor<E>>,
        context: ExecutionContext,
    ) -> Result<(), Error> {
        let key = self.identifier_key::<E>(None)?;

        self.update_where([QueryDescriptor::urn(key, entity.urn())], updates, context)
    }

    pub fn update_where<E: EntityKind>(
        &self,
        selectors: impl IntoIterator<Item = QueryDescriptor<E>>,
        updates: impl IntoIterator<Item = UpdateDescriptor<E>>,
        context: ExecutionContext,
    ) -> Result<(), Error> {
        self.fetch::<E>()
            .query(selectors)
            .in_context(context)
            .limit_one()
            .update(updates)
    }

    /// Delete every record whose identifier equals `urn`; returns the count.
    pub fn delete<E: Identifiable>(
        &self,
        urn: &Urn,
        context: ExecutionContext,
    ) -> Result<usize, Error> {
        let key = self.identifier_key::<E>(None)?;

        self.fetch::<E>()
            .query([QueryDescriptor::urn(key, urn)])
            .in_context(context)
            .delete()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    pub(crate) const fn is_debug(&self) -> bool {
        self.config.debug
    }

    pub(crate) fn with_metrics<T>(&self, f: impl FnOnce() -> T) -> T {
        if let Some(sink) = self.metrics {
            with_metrics_sink(Rc::new(sink), f)
        } else {
            f()
        }
    }

    /// Run `op` and save. Any failure rolls back the context's pending
    /// changes and returns the error unchanged.
    pub(crate) fn transact<T>(
        &self,
        context: &S::Context,
        op: impl FnOnce(&S::Context) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let result = op(context).and_then(|value| {
            context.save()?;
            Ok(value)
        });

        if let Err(err) = &result
            && context.has_changes()
        {
            context.rollback();
            warn!(error = %err, "write failed, pending changes rolled back");
        }

        result
    }

    fn insert_with<E: EntityKind>(
        &self,
        entity: &E,
        updates: &[UpdateDescriptor<E>],
        context: ExecutionContext,
    ) -> Result<RecordId, Error> {
        self.with_metrics(|| {
            let mut span = Span::<E>::new(ExecKind::Save);
            let store = self.resolver.resolve(context);
            if self.is_debug() {
                debug!(entity = E::ENTITY_NAME, %context, "insert");
            }

            let id = self.transact(store, |store| stage_new(store, entity, updates))?;
            span.set_rows(1);

            Ok(id)
        })
    }

    fn identifier_key<E: Identifiable>(&self, explicit: Option<E::Key>) -> Result<E::Key, Error> {
        let field = &self.config.identifier_field;

        resolve_key(explicit.or(E::IDENTIFIER_KEY), field)
            .ok_or_else(|| Error::key_does_not_exist::<E>(field.as_str()))
    }

    fn date_key<E: EntityKind>(&self, explicit: Option<E::Key>) -> Result<E::Key, Error> {
        let field = &self.config.date_field;

        resolve_key(explicit.or(E::DATE_KEY), field)
            .ok_or_else(|| Error::key_does_not_exist::<E>(field.as_str()))
    }
}

// Serialize `entity` (plus `updates`) into a fresh record and stage it.
fn stage_new<C: StoreContext, E: EntityKind>(
    store: &C,
    entity: &E,
    updates: &[UpdateDescriptor<E>],
) -> Result<RecordId, Error> {
    let mut record = RecordAccessor::<E>::new_instance(store)?;
    let id = record.id();

    let mut accessor = RecordAccessor::<E>::new(&mut record);
    entity.write_record(&mut accessor);
    for update in updates {
        update.apply(&mut accessor);
    }
    store.stage(record)?;

    Ok(id)
}
