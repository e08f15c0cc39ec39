//! Persistence contracts and in-memory stores.
//!
//! The engine and credential manager talk to storage exclusively through the
//! traits in [`traits`]: [`EventStore`] for events and series, [`UserStore`]
//! for accounts, and [`TokenStore`] for the fast keyed refresh-token store.
//! Store handles are constructed explicitly and passed in at component
//! construction time; there is no process-wide singleton.
//!
//! [`memory`] provides implementations backed by in-process maps, used for
//! tests and embedding. The in-memory event store enforces the "no two
//! overlapping non-cancelled events on the same date" exclusion constraint
//! inside its write lock, making it the authoritative conflict guard.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, MemoryTokenStore};
pub use traits::{EventStore, TokenStore, UserStore};
