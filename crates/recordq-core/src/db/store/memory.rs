use crate::db::store::{
    FetchRequest, Record, RecordId, RecordStore, StoreContext, StoreError,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc, Mutex, MutexGuard, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

///
/// StoreSchema
///
/// Registered entity names and the fields each one requires at save time.
///

#[derive(Clone, Debug, Default)]
pub struct StoreSchema {
    entities: BTreeMap<String, Vec<String>>,
}

impl StoreSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity and its required fields.
    #[must_use]
    pub fn entity(mut self, name: impl Into<String>, required: &[&str]) -> Self {
        self.entities.insert(
            name.into(),
            required.iter().map(ToString::to_string).collect(),
        );
        self
    }

    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    fn required(&self, entity: &str) -> &[String] {
        self.entities.get(entity).map_or(&[], Vec::as_slice)
    }
}

///
/// Shared
/// State common to every context of one store.
///

#[derive(Debug)]
struct Shared {
    schema: StoreSchema,
    committed: RwLock<BTreeMap<RecordId, Record>>,
    next_id: AtomicU64,
}

impl Shared {
    fn allocate(&self) -> RecordId {
        RecordId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

///
/// MemoryStore
///
/// In-process record store. Committed records live in one map shared by all
/// contexts; each context keeps its own pending change set until `save`.
///

#[derive(Debug)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    interactive: MemoryContext,
}

impl MemoryStore {
    #[must_use]
    pub fn new(schema: StoreSchema) -> Self {
        let shared = Arc::new(Shared {
            schema,
            committed: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        });

        Self {
            interactive: MemoryContext::new(Arc::clone(&shared)),
            shared,
        }
    }

    /// Committed records of one entity, in insertion order.
    pub fn committed(&self, entity: &str) -> Result<Vec<Record>, StoreError> {
        let committed = self
            .shared
            .committed
            .read()
            .map_err(|_| StoreError::Poisoned)?;

        Ok(committed
            .values()
            .filter(|record| record.entity() == entity)
            .cloned()
            .collect())
    }

    /// Number of committed records of one entity.
    pub fn len(&self, entity: &str) -> Result<usize, StoreError> {
        self.committed(entity).map(|records| records.len())
    }
}

impl RecordStore for MemoryStore {
    type Context = MemoryContext;

    fn interactive(&self) -> &Self::Context {
        &self.interactive
    }

    fn new_background(&self) -> Self::Context {
        MemoryContext::new(Arc::clone(&self.shared))
    }
}

///
/// Pending
///

#[derive(Debug, Default)]
struct Pending {
    upserts: BTreeMap<RecordId, Record>,
    deletes: BTreeSet<RecordId>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

///
/// MemoryContext
///

#[derive(Debug)]
pub struct MemoryContext {
    shared: Arc<Shared>,
    pending: Mutex<Pending>,
}

impl MemoryContext {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            pending: Mutex::new(Pending::default()),
        }
    }

    fn pending(&self) -> Result<MutexGuard<'_, Pending>, StoreError> {
        self.pending.lock().map_err(|_| StoreError::Poisoned)
    }

    fn validate(&self, record: &Record) -> Result<(), StoreError> {
        for field in self.shared.schema.required(record.entity()) {
            if record.get(field).is_none() {
                return Err(StoreError::MissingRequiredField {
                    entity: record.entity().to_string(),
                    field: field.clone(),
                    id: record.id(),
                });
            }
        }

        Ok(())
    }
}

impl StoreContext for MemoryContext {
    fn create(&self, entity: &str) -> Result<Record, StoreError> {
        if !self.shared.schema.contains(entity) {
            return Err(StoreError::UnknownEntity {
                entity: entity.to_string(),
            });
        }

        Ok(Record::new(self.shared.allocate(), entity))
    }

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Record>, StoreError> {
        let pending = self.pending()?;
        let committed = self
            .shared
            .committed
            .read()
            .map_err(|_| StoreError::Poisoned)?;

        // pending changes layered over committed rows, keyed by id so the
        // candidate stream stays in insertion order
        let mut view: BTreeMap<RecordId, &Record> = committed
            .iter()
            .filter(|(id, _)| !pending.deletes.contains(*id))
            .map(|(id, record)| (*id, record))
            .collect();
        for (id, record) in &pending.upserts {
            view.insert(*id, record);
        }

        Ok(request.apply(view.into_values().cloned()))
    }

    fn stage(&self, record: Record) -> Result<(), StoreError> {
        if !self.shared.schema.contains(record.entity()) {
            return Err(StoreError::UnknownEntity {
                entity: record.entity().to_string(),
            });
        }

        let mut pending = self.pending()?;
        pending.deletes.remove(&record.id());
        pending.upserts.insert(record.id(), record);

        Ok(())
    }

    fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let mut pending = self.pending()?;
        let staged = pending.upserts.remove(&id).is_some();
        let stored = self
            .shared
            .committed
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .contains_key(&id);

        if stored {
            pending.deletes.insert(id);
        } else if !staged {
            return Err(StoreError::RecordNotFound { id });
        }

        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let mut pending = self.pending()?;
        if pending.is_empty() {
            return Ok(());
        }

        for record in pending.upserts.values() {
            self.validate(record)?;
        }

        let mut committed = self
            .shared
            .committed
            .write()
            .map_err(|_| StoreError::Poisoned)?;
        let Pending { upserts, deletes } = std::mem::take(&mut *pending);
        for id in deletes {
            committed.remove(&id);
        }
        committed.extend(upserts);

        Ok(())
    }

    fn rollback(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Pending::default();
        }
    }

    fn has_changes(&self) -> bool {
        self.pending.lock().is_ok_and(|pending| !pending.is_empty())
    }
}
