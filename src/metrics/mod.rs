//! The `userdir::metrics` module holds the in-process metric registry and
//! the two producers that feed it: the per-request counter facade and the
//! periodic system sampler.
//!
//! The 'manager' owns the registry and is shared by handle with the HTTP
//! layer, which renders it through the exposition endpoint.
pub mod http_metrics;
pub mod manager;
pub mod registry;
pub mod system_metrics;
