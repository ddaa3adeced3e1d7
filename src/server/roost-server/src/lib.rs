//! # Roost Server
//!
//! HTTP layer over the keyring service: the `/v1/keys` management API and
//! the per-platform key-validation middleware gating the ingest surface.
//!
//! The binary in `main.rs` is the composition root; everything here is
//! built from an explicit [`AppState`] so tests can drive the router with
//! an in-memory store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
