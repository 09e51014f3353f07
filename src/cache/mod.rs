//! Key-Value Cache Façade
//!
//! Serves the `/cache` routes over one named map of the store.
//!
//! ## Behaviour
//! - **Not found is not an error**: a missing key reads as the `"Entry not found."` sentinel.
//! - **Idempotent deletes**: removing an absent key answers exactly like removing a present one.
//! - **Structured queries**: prefix queries reach the store as a `KeyPredicate`, never as text.
//! - **Bounded locks**: lock requests wait at most the configured (or requested) timeout.
//! - **Atomic unlock**: the locked/not-locked answer comes from one store call.
//!
//! ## Submodules
//! - **`facade`**: `KeyValueFacade`, one method per endpoint.
//! - **`handlers`**: axum handlers translating HTTP to façade calls.
//! - **`protocol`**: endpoint paths, response strings and DTOs.

pub mod facade;
pub mod handlers;
pub mod protocol;
