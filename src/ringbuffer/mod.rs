//! Append-Log Façade
//!
//! Serves the `/ringbuffer` routes over one named sequence of the store.
//! Appends never fail for lack of space: the oldest item is overwritten
//! and the head sequence moves forward.

pub mod facade;
pub mod handlers;
pub mod protocol;
