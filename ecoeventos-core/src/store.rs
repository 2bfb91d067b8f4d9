//! CRUD and filtering over the event collection.

use crate::criteria::Criteria;
use crate::error::{StoreError, StoreResult};
use crate::event::{Event, EventChanges, NewEvent};
use crate::ids::{Clock, IdGenerator, SystemClock, UuidV7Ids};
use crate::storage::EventStorage;

/// Attempts at drawing an id that is not already in the store.
const MAX_ID_ATTEMPTS: usize = 8;

/// The event catalog.
///
/// Nothing is cached: every call reads the backing storage again. Mutations
/// run under the storage lock from read to write, so concurrent writers never
/// lose each other's changes.
pub struct EventStore {
    storage: Box<dyn EventStorage>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl EventStore {
    pub fn new(storage: impl EventStorage + 'static) -> Self {
        EventStore {
            storage: Box::new(storage),
            ids: Box::new(UuidV7Ids),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// All events in storage order.
    pub fn list_all(&self) -> Vec<Event> {
        self.storage.load()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Event> {
        self.storage.load().into_iter().find(|e| e.id == id)
    }

    pub fn create(&self, fields: NewEvent) -> StoreResult<Event> {
        let event = self.mutate(|events| {
            let id = self.fresh_id(events)?;
            let event = fields.into_event(id, self.clock.now())?;
            events.push(event.clone());
            Ok(event)
        })?;

        tracing::info!("Created event {} ({})", event.id, event.titulo);
        Ok(event)
    }

    pub fn update_by_id(&self, id: &str, changes: EventChanges) -> StoreResult<Event> {
        let event = self.mutate(|events| {
            let event = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            changes.validate()?.apply_to(event, self.clock.now());
            Ok(event.clone())
        })?;

        tracing::info!("Updated event {}", event.id);
        Ok(event)
    }

    /// Remove the first event with this id. Returns `true` once removed.
    pub fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        self.mutate(|events| {
            let index = events
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            events.remove(index);
            Ok(())
        })?;

        tracing::info!("Deleted event {}", id);
        Ok(true)
    }

    /// Events matching every given criterion, in storage order.
    pub fn filter(&self, criteria: &Criteria) -> Vec<Event> {
        let matcher = criteria.matcher();
        let events: Vec<Event> = self
            .storage
            .load()
            .into_iter()
            .filter(|e| matcher.matches(e))
            .collect();

        tracing::debug!("Filter {:?} matched {} events", criteria, events.len());
        events
    }

    /// Run one locked read-modify-write cycle. If `f` fails nothing is written;
    /// the lock is released either way when the transaction drops.
    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<Event>) -> StoreResult<T>) -> StoreResult<T> {
        let mut tx = self.storage.lock()?;
        let mut events = tx.load();
        let out = f(&mut events)?;
        tx.save_all(&events)?;
        Ok(out)
    }

    fn fresh_id(&self, events: &[Event]) -> StoreResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !events.iter().any(|e| e.id == id) {
                return Ok(id);
            }
            tracing::warn!("Generated id {} already exists, retrying", id);
        }

        Err(StoreError::Storage(
            "Could not generate a unique event id".to_string(),
        ))
    }
}
