//! Core of the EcoEventos catalog.
//!
//! - `Event` and the field sets used to create and edit it
//! - `EventStore`: locked read-modify-write CRUD plus filtering
//! - `storage`: JSON file and in-memory backends
//! - date (`dd/mm/yyyy`) and time-of-day (12h/24h) handling

pub mod categoria;
pub mod config;
pub mod criteria;
pub mod error;
pub mod event;
pub mod fecha;
pub mod ids;
pub mod storage;
pub mod store;
pub mod time_of_day;

pub use config::EcoConfig;
pub use criteria::Criteria;
pub use error::{StoreError, StoreResult};
pub use event::{Event, EventChanges, NewEvent};
pub use store::EventStore;
pub use time_of_day::{StoredTime, TimeOfDay};
