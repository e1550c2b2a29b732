//! Adapters to the outside world: the Torn API and the liveness endpoint.

pub mod keepalive;
pub mod torn;
