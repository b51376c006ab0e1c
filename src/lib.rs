#![cfg_attr(feature = "nightly", feature(core_intrinsics))]

/// Table construction knobs
pub mod config;
/// Record and identifier contracts
pub mod data;
/// Identifier hash primitives
pub mod hash;
/// Identifier adapters
pub mod ident;
/// Available resource indexes
pub mod index;

mod error;
/// Set of compiler hints
mod hint;

pub use crate::config::TableConfig;
pub use crate::data::{ChronoResource, Link, Resource, ResourceId};
pub use crate::error::{DuplicateId, ResidentError, Result};
pub use crate::ident::{ChronoId, IntId, StringId};
pub use crate::index::chrono::ChronoTable;
pub use crate::index::resource::{Iter, Occupancy, ResourceTable};
pub use crate::index::IndexOps;

#[cfg(feature = "resident-derive")]
pub use resident_derive::Resource;
