//! Data Grid Façade Library
//!
//! An HTTP façade over two data structures held in an embedded data grid: a
//! key-value map and a bounded append-only ring buffer. The binary
//! (`main.rs`) wires them together from a TOML config.
//!
//! ## Architecture Modules
//! - **`store`**: the store interface (`KeyValueStore`, `SequenceStore`) and its error type.
//!   Façades depend on nothing below this line.
//! - **`grid`**: the embedded, single-member implementation of the store: partitioned
//!   maps with expiry, eviction, locks and entry listeners, plus ring buffers.
//! - **`cache`**: the key-value façade and its `/cache` routes.
//! - **`ringbuffer`**: the append-log façade and its `/ringbuffer` routes.
//! - **`server`**: router assembly, error-to-status mapping and graceful serving.
//! - **`config`**: TOML configuration with defaults for every key.

pub mod cache;
pub mod config;
pub mod grid;
pub mod ringbuffer;
pub mod server;
pub mod store;
