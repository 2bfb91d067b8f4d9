//! Id and timestamp sources, injectable so tests can be deterministic.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix shared by every generated event id.
pub const EVENT_ID_PREFIX: &str = "ev_";

/// Produces ids for new events.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// `ev_` + UUIDv7: millisecond timestamp followed by random bits, so ids
/// generated in quick succession stay distinct and roughly ordered.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&self) -> String {
        format!("{}{}", EVENT_ID_PREFIX, Uuid::now_v7().simple())
    }
}

/// Source of the current instant for `creado_en` / `actualizado_en`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_prefixed_and_unique() {
        let ids = UuidV7Ids;
        let generated: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();

        assert_eq!(generated.len(), 1000);
        assert!(generated.iter().all(|id| id.starts_with(EVENT_ID_PREFIX)));
    }
}
