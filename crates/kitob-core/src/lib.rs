//! Service plumbing shared by the Kitob binaries: health handlers, tracing
//! setup, request-id middleware, and serialization helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
