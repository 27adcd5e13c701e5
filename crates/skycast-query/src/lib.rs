//! Generic keyed cache for asynchronous queries.
//!
//! Deduplicates concurrent fetches per key, remembers outcomes, and
//! supersedes in-flight fetches with last-writer-wins generations.

mod cache;

pub use cache::{QueryCache, QueryState};
