//! Wire shapes exchanged with the realtime model.
//!
//! Inbound events are decoded leniently: anything this crate does not model
//! is preserved as raw JSON instead of failing the whole frame.

pub mod client_events;
pub mod models;
pub mod server_events;
