//! Entity stores: the in-memory cache layer between the gateway and
//! any presentation code.
//!
//! Each [`EntityStore`] owns the list of one table's rows plus
//! loading/error state, and mediates every write through the gateway —
//! local state is a cache of server truth, never optimistic. A
//! [`ChangeListener`] keeps a store consistent with writes made by
//! other sessions, and [`MeasurementRecorder`] implements the one
//! cross-entity invariant (recording a measurement overwrites the
//! parent indicator's current value).

pub mod entity;
pub mod error;
pub mod listener;
pub mod recorder;
pub mod store;

pub use entity::Entity;
pub use error::StoreError;
pub use listener::ChangeListener;
pub use recorder::{MeasurementRecorder, RecordError};
pub use store::EntityStore;
