//! Implementations of the host collaborator traits.
//!
//! - [`MemoryFieldStore`], [`MemoryEntityKindRegistry`], [`StaticDomainRegistry`]:
//!   in-process state behind `parking_lot` locks.
//! - [`SledFieldStore`]: field records, displays, and settings persisted in sled trees.

mod memory;
mod sled_store;

pub use memory::{MemoryEntityKindRegistry, MemoryFieldStore, StaticDomainRegistry};
pub use sled_store::SledFieldStore;
