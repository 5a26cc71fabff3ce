//! Client-side persistence facade for the Parish admin tooling.
//!
//! One interface for "save/load a named JSON document" regardless of where it
//! physically lives. Calling code picks a backend once at startup — the
//! ephemeral in-process store or the remote `/api/data` service — and never
//! needs to know which it got.
//!
//! The [`Facade`] wrapper deliberately swallows backend failures: every
//! operation logs the cause and returns a safe default, so call sites never
//! handle errors. [`Facade::try_load`] is the escape hatch for the few that
//! need to tell an absent record from a broken backend.

#![allow(async_fn_in_trait)]

mod api;
mod backend;
mod facade;
mod memory;

pub mod error;

pub use api::ApiBackend;
pub use backend::{LocalStats, StorageBackend};
pub use error::BackendError;
pub use facade::{Facade, LoadOutcome, Statistics, Validation};
pub use memory::MemoryBackend;

#[cfg(test)]
mod tests;
