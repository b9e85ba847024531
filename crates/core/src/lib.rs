//! Shared domain types for the taskdeck client.
//!
//! The backend owns every record defined here; the client only ever
//! deserializes them from responses or serializes the create/update DTOs
//! into request bodies.

pub mod models;
pub mod types;
