//! Query cache for remote reads.
//!
//! Reads are addressed by structured [`QueryKey`]s, served from memory while
//! fresh, and fetched at most once at a time per key. Mutations mark key
//! scopes stale through the [`Mutation`] rule table.

#![warn(missing_docs)]

mod key;
mod store;
mod invalidation;

pub use key::{keys, QueryKey};
pub use store::{
    CacheConfig, CacheError, CacheEvent, CacheStats, QueryCache, Result,
    DEFAULT_GC_TIME, DEFAULT_STALE_TIME,
};
pub use invalidation::Mutation;
